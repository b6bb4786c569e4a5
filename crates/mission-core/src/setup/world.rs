//! World Setup
//!
//! Builds the zoned grid and populates it from a configuration: every tier's
//! agents and waste are scattered over distinct random cells of that tier's
//! zone.

use mission_events::Tier;
use rand::seq::SliceRandom;
use rand::Rng;

use super::agents::AgentSpec;
use crate::components::geometry::Position;
use crate::components::grid::ZoneLayout;
use crate::config::{ConfigError, SimulationConfig};
use crate::error::SimResult;
use crate::policy::build_policy;
use crate::world::World;
use crate::SimRng;

/// Empty world construction
#[derive(Debug, Clone)]
pub struct WorldBuilder {
    width: u32,
    height: u32,
    proportions: [f64; Tier::COUNT],
    dump: Option<Position>,
    seed: u64,
}

impl WorldBuilder {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            proportions: [1.0 / 3.0; Tier::COUNT],
            dump: None,
            seed: 42,
        }
    }

    pub fn proportions(mut self, proportions: [f64; Tier::COUNT]) -> Self {
        self.proportions = proportions;
        self
    }

    pub fn dump(mut self, dump: Position) -> Self {
        self.dump = Some(dump);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Without an explicit dump, the dump goes to the last column at a
    /// random row.
    pub fn build(self) -> SimResult<World> {
        if self.height == 0 {
            return Err(ConfigError::Invalid("grid height must be positive".into()).into());
        }
        let layout = ZoneLayout::new(self.width, self.proportions)?;
        let mut rng = SimRng::new(self.seed);

        let dump = match self.dump {
            Some(dump) => {
                let inside = dump.x >= 0
                    && dump.y >= 0
                    && (dump.x as u32) < self.width
                    && (dump.y as u32) < self.height;
                if !inside {
                    return Err(ConfigError::Invalid(format!(
                        "dump {} lies outside the {}x{} grid",
                        dump, self.width, self.height
                    ))
                    .into());
                }
                dump
            }
            None => Position::new(
                self.width as i32 - 1,
                rng.0.gen_range(0..self.height) as i32,
            ),
        };

        World::new(self.height, layout, dump, rng)
    }
}

/// Rejects tiers with more agents or waste than their zone has cells.
/// The dump cell never receives initial waste.
pub fn check_zone_capacity(config: &SimulationConfig, layout: &ZoneLayout, dump: Position) -> Result<(), ConfigError> {
    let height = config.world.height as usize;
    for tier in Tier::all() {
        let tier_config = config.tiers.get(tier);
        let columns = layout.columns(tier);
        let cells = columns.len() * height;
        let dump_here = columns.contains(&(dump.x as u32));
        let waste_cells = if dump_here { cells.saturating_sub(1) } else { cells };

        if tier_config.agents > cells {
            return Err(ConfigError::Invalid(format!(
                "{} zone has {} cells but {} agents are configured",
                tier, cells, tier_config.agents
            )));
        }
        if tier_config.wastes > waste_cells {
            return Err(ConfigError::Invalid(format!(
                "{} zone has room for {} waste but {} are configured",
                tier, waste_cells, tier_config.wastes
            )));
        }
    }
    Ok(())
}

/// Builds and populates a world from configuration.
pub fn world_from_config(config: &SimulationConfig) -> SimResult<World> {
    config.validate()?;
    let settings = &config.world;

    let mut builder = WorldBuilder::new(settings.width, settings.height)
        .proportions(config.tiers.proportions())
        .seed(settings.seed);
    if let Some((x, y)) = settings.dump {
        builder = builder.dump(Position::new(x, y));
    }
    let mut world = builder.build()?;
    check_zone_capacity(config, world.layout(), world.dump())?;

    for tier in Tier::all() {
        let tier_config = config.tiers.get(tier);
        let kind = tier_config.policy_kind()?;
        let columns = world.layout().columns(tier);

        let free: Vec<Position> = world
            .grid()
            .positions()
            .filter(|p| columns.contains(&(p.x as u32)) && !world.grid().is_occupied_by_agent(*p))
            .collect();
        let cells: Vec<Position> = free
            .choose_multiple(world.rng_mut(), tier_config.agents)
            .copied()
            .collect();
        for position in cells {
            let policy = build_policy(kind, tier, &tier_config.params, world.rng_mut())?;
            let spec = AgentSpec::from_params(tier, &tier_config.params, policy);
            world.spawn_agent(spec, position)?;
        }

        let dump = world.dump();
        let clear: Vec<Position> = world
            .grid()
            .positions()
            .filter(|p| {
                columns.contains(&(p.x as u32)) && *p != dump && !world.grid().is_occupied_by_waste(*p)
            })
            .collect();
        let cells: Vec<Position> = clear
            .choose_multiple(world.rng_mut(), tier_config.wastes)
            .copied()
            .collect();
        for position in cells {
            world.spawn_waste(tier, position)?;
        }

        tracing::info!(
            tier = %tier,
            agents = tier_config.agents,
            wastes = tier_config.wastes,
            policy = kind.name(),
            "tier populated"
        );
    }

    Ok(world)
}
