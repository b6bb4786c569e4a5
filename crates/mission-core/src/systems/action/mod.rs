//! Action Systems
//!
//! Legality checks and effects of agent actions. Legality is always checked
//! against the live grid, never against the agent's possibly stale
//! perception.

pub mod execute;

pub use execute::{execute_action, ActionOutcome, TickEvents};

use mission_events::WasteId;

use crate::actions::Action;
use crate::components::agent::Agent;
use crate::components::geometry::Direction;
use crate::components::grid::Grid;
use crate::error::SimResult;

/// Whether `agent` may perform `action` in the current world.
pub fn can_apply(action: &Action, grid: &Grid, agent: &Agent) -> SimResult<bool> {
    let position = agent.position()?;
    let legal = match *action {
        Action::Wait => true,
        Action::Move { direction } => {
            if direction == Direction::None {
                return Ok(false);
            }
            match grid.step(position, direction) {
                Some(destination) => {
                    let terrain = grid.terrain(destination)?;
                    !grid.is_occupied_by_agent(destination) && terrain.tier <= agent.tier
                }
                None => false,
            }
        }
        Action::Pick => {
            !agent.inventory.is_full()
                && grid
                    .waste_at(position)
                    .is_some_and(|w| w.tier() == agent.tier)
        }
        Action::Drop { waste } => {
            agent.inventory.contains(waste) && !grid.is_occupied_by_waste(position)
        }
        Action::Merge { first, second } => {
            if first == second || agent.tier.is_terminal() {
                return Ok(false);
            }
            let tier_of = |id: WasteId| agent.inventory.iter().find(|w| w.id() == id).map(|w| w.tier());
            match (tier_of(first), tier_of(second)) {
                (Some(a), Some(b)) => a == b && a == agent.tier,
                _ => false,
            }
        }
    };
    Ok(legal)
}
