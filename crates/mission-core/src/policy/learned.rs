//! Learned Policy
//!
//! Encodes knowledge as a fixed-length observation, scores the eight actions
//! with a Q-network and maps the best index back to an action.
//!
//! Observation layout (`OBSERVATION_LEN` = 40), with every tier taken
//! relative to the observer's own:
//! - 3: carried items below, at and above own tier, divided by capacity
//! - 5 x 7: per direction (own cell, up, down, left, right): in bounds,
//!   terrain offset, waste present, waste offset, other agent present,
//!   agent offset, is dump
//! - 2: position normalized to [0, 1]
//!
//! An offset is `(tier - own) / 2`, so -1, -0.5, 0, 0.5 or 1.

use mission_events::Tier;
use rand::rngs::SmallRng;
use rand::Rng;

use super::network::{load_network, HiddenState, LinearQNetwork, QNetwork, RecurrentQNetwork};
use super::{Policy, TurnContext};
use crate::actions::{Action, ACTION_COUNT};
use crate::components::geometry::Direction;
use crate::config::PolicyParams;
use crate::error::{SimError, SimResult};
use crate::systems::knowledge::Knowledge;

const CELL_FEATURES: usize = 7;

pub const OBSERVATION_LEN: usize = Tier::COUNT + Direction::ALL.len() * CELL_FEATURES + 2;

fn tier_offset(tier: Tier, own: Tier) -> f32 {
    (tier.index() as f32 - own.index() as f32) / (Tier::COUNT - 1) as f32
}

/// Slot 0, 1 or 2 for a tier below, equal to or above `own`.
fn relative_slot(tier: Tier, own: Tier) -> usize {
    match tier.cmp(&own) {
        std::cmp::Ordering::Less => 0,
        std::cmp::Ordering::Equal => 1,
        std::cmp::Ordering::Greater => 2,
    }
}

/// Fixed-length observation of an agent's knowledge. All zeros before the
/// first perception.
pub fn observe(knowledge: &Knowledge) -> Vec<f32> {
    let mut observation = vec![0.0; OBSERVATION_LEN];
    let Some(perception) = knowledge.mission().perception() else {
        return observation;
    };

    let own = perception.tier;
    let capacity = perception.capacity.max(1) as f32;
    for item in &perception.inventory {
        observation[relative_slot(item.tier, own)] += 1.0 / capacity;
    }

    for direction in Direction::ALL {
        let Some(cell) = perception.get(direction) else {
            continue;
        };
        let base = Tier::COUNT + direction.index() * CELL_FEATURES;
        observation[base] = 1.0;
        observation[base + 1] = tier_offset(cell.terrain, own);
        if let Some(waste) = cell.waste {
            observation[base + 2] = 1.0;
            observation[base + 3] = tier_offset(waste.tier, own);
        }
        // The own cell always holds the observer; report other agents only.
        if let Some(agent) = cell.agent.as_ref().filter(|a| a.id != perception.agent_id) {
            observation[base + 4] = 1.0;
            observation[base + 5] = tier_offset(agent.tier, own);
        }
        observation[base + 6] = if cell.dump { 1.0 } else { 0.0 };
    }

    let span = |extent: u32| (extent.saturating_sub(1)).max(1) as f32;
    observation[OBSERVATION_LEN - 2] = perception.position.x as f32 / span(perception.width);
    observation[OBSERVATION_LEN - 1] = perception.position.y as f32 / span(perception.height);
    observation
}

/// Maps an action index to an action. Drop takes the highest-tier carried
/// item and Merge asks knowledge for a pair; either falls back to Wait.
pub fn act_from_index(index: usize, knowledge: &Knowledge) -> SimResult<Action> {
    let action = match index {
        0 => Action::Wait,
        1 => Action::moving(Direction::Up),
        2 => Action::moving(Direction::Down),
        3 => Action::moving(Direction::Left),
        4 => Action::moving(Direction::Right),
        5 => Action::Pick,
        6 => knowledge
            .mission()
            .highest_waste()
            .map_or(Action::Wait, |w| Action::dropping(w.id)),
        7 => knowledge.try_merge().unwrap_or(Action::Wait),
        other => return Err(SimError::InvalidActionIndex(other)),
    };
    Ok(action)
}

/// Index of the largest finite Q-value; `None` if there is none.
pub fn argmax(values: &[f32]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .fold(None, |best: Option<(usize, f32)>, (i, v)| match best {
            Some((_, b)) if b >= *v => best,
            _ => Some((i, *v)),
        })
        .map(|(i, _)| i)
}

#[derive(Debug)]
pub struct LearnedPolicy {
    network: Box<dyn QNetwork>,
    hidden: Option<HiddenState>,
    epsilon: f64,
}

impl LearnedPolicy {
    pub fn new(network: Box<dyn QNetwork>, epsilon: f64) -> Self {
        Self {
            network,
            hidden: None,
            epsilon,
        }
    }

    /// Loads weights when a file is configured, otherwise starts from a
    /// seeded random network of the configured shape.
    pub fn from_params(params: &PolicyParams, rng: &mut SmallRng) -> SimResult<Self> {
        let network: Box<dyn QNetwork> = match &params.weights {
            Some(path) => load_network(path, OBSERVATION_LEN)?,
            None if params.recurrent => Box::new(RecurrentQNetwork::random(
                OBSERVATION_LEN,
                params.hidden_size,
                rng,
            )),
            None => Box::new(LinearQNetwork::random(
                OBSERVATION_LEN,
                params.hidden_size,
                rng,
            )),
        };
        Ok(Self::new(network, params.epsilon))
    }

    pub fn hidden(&self) -> Option<&HiddenState> {
        self.hidden.as_ref()
    }

    /// Q-values for the current knowledge, advancing recurrent memory.
    pub fn q_values(&mut self, knowledge: &Knowledge) -> SimResult<Vec<f32>> {
        let observation = observe(knowledge);
        let (q_values, hidden) = self.network.forward(&observation, self.hidden.as_ref())?;
        if self.network.is_recurrent() {
            self.hidden = hidden;
        }
        Ok(q_values)
    }
}

impl Policy for LearnedPolicy {
    fn name(&self) -> &'static str {
        "learned"
    }

    fn decide(&mut self, ctx: &mut TurnContext<'_>) -> SimResult<Action> {
        let q_values = self.q_values(ctx.knowledge)?;
        let index = if self.epsilon > 0.0 && ctx.rng.gen_bool(self.epsilon) {
            ctx.rng.gen_range(0..ACTION_COUNT)
        } else {
            match argmax(&q_values) {
                Some(index) => index,
                None => {
                    tracing::debug!("degenerate q-values, waiting");
                    return Ok(Action::Wait);
                }
            }
        };
        act_from_index(index, ctx.knowledge)
    }

    fn reset(&mut self) {
        self.hidden = None;
    }
}
