//! Training Environment
//!
//! Wraps a world for externally chosen actions. Controlled agents are the
//! ones running the learned policy, ordered by tier then id; every other
//! agent keeps deciding for itself.

use std::collections::BTreeMap;

use mission_events::{AgentId, EventKind};

use super::tensor::StateTensor;
use crate::actions::{Action, ACTION_COUNT};
use crate::components::agent::Agent;
use crate::config::SimulationConfig;
use crate::error::{SimError, SimResult};
use crate::policy::observe;
use crate::setup::world_from_config;
use crate::systems::action::ActionOutcome;
use crate::world::World;

pub const MERGE_REWARD: f32 = 10.0;
pub const PICK_REWARD: f32 = 0.1;
/// Dropping an item of the agent's own tier
pub const OWN_DROP_PENALTY: f32 = 0.2;
/// Per carried item of another tier, every step
pub const OFF_TIER_PENALTY: f32 = 0.1;

/// Reward for one controlled agent after its turn.
pub fn reward(outcome: &ActionOutcome, agent: &Agent) -> f32 {
    let mut reward = 0.0;
    if outcome.applied {
        match outcome.action {
            Action::Merge { .. } => reward += MERGE_REWARD,
            Action::Pick => reward += PICK_REWARD,
            Action::Drop { .. } => {
                let own_tier = outcome.events.iter().any(|event| match event {
                    EventKind::Dropped { tier, .. } | EventKind::Disposed { tier, .. } => {
                        *tier == agent.tier
                    }
                    _ => false,
                });
                if own_tier {
                    reward -= OWN_DROP_PENALTY;
                }
            }
            Action::Wait | Action::Move { .. } => {}
        }
    }
    let off_tier = agent
        .inventory
        .iter()
        .filter(|w| w.tier() != agent.tier)
        .count();
    reward - off_tier as f32 * OFF_TIER_PENALTY
}

/// What the learner sees after a step
#[derive(Debug, Clone)]
pub struct StepResult {
    /// One observation per controlled agent
    pub observations: Vec<Vec<f32>>,
    pub state: StateTensor,
    pub rewards: Vec<f32>,
    /// Mission complete or horizon reached
    pub done: bool,
}

#[derive(Debug)]
pub struct MissionEnv {
    world: World,
    controlled: Vec<AgentId>,
    horizon: u64,
}

impl MissionEnv {
    pub fn new(world: World, horizon: u64) -> Self {
        let mut controlled: Vec<&Agent> = world
            .agents()
            .iter()
            .filter(|a| a.policy.name() == "learned")
            .collect();
        controlled.sort_by_key(|a| (a.tier, a.id));
        let controlled = controlled.into_iter().map(|a| a.id).collect();
        Self {
            world,
            controlled,
            horizon,
        }
    }

    /// Builds the world from configuration; the horizon is `max_steps`.
    pub fn from_config(config: &SimulationConfig) -> SimResult<Self> {
        let world = world_from_config(config)?;
        tracing::info!(seed = config.world.seed, horizon = config.world.max_steps, "training environment ready");
        Ok(Self::new(world, config.world.max_steps))
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn controlled(&self) -> &[AgentId] {
        &self.controlled
    }

    pub fn action_count(&self) -> usize {
        ACTION_COUNT
    }

    /// Observations from each controlled agent's latest perception.
    pub fn observations(&self) -> SimResult<Vec<Vec<f32>>> {
        self.controlled
            .iter()
            .map(|id| {
                let agent = self.world.agent(*id)?;
                let mut knowledge = agent.knowledge.clone();
                if let Some(perception) = &agent.perception {
                    knowledge.update(perception, None);
                }
                Ok(observe(&knowledge))
            })
            .collect()
    }

    pub fn state_tensor(&self) -> StateTensor {
        StateTensor::from_world(&self.world)
    }

    pub fn is_done(&self) -> bool {
        self.world.is_done() || self.world.step_count() >= self.horizon
    }

    /// Runs one step with `actions[i]` for `controlled()[i]`.
    pub fn step(&mut self, actions: &[usize]) -> SimResult<StepResult> {
        if actions.len() != self.controlled.len() {
            return Err(SimError::ShapeMismatch {
                expected: self.controlled.len(),
                actual: actions.len(),
            });
        }
        if let Some(bad) = actions.iter().find(|a| **a >= ACTION_COUNT) {
            return Err(SimError::InvalidActionIndex(*bad));
        }

        let choices: BTreeMap<AgentId, usize> = self
            .controlled
            .iter()
            .copied()
            .zip(actions.iter().copied())
            .collect();
        let report = self.world.step_with_choices(&choices)?;

        let rewards = self
            .controlled
            .iter()
            .map(|id| {
                let agent = self.world.agent(*id)?;
                Ok(report
                    .outcome(*id)
                    .map_or(0.0, |outcome| reward(outcome, agent)))
            })
            .collect::<SimResult<Vec<f32>>>()?;

        Ok(StepResult {
            observations: self.observations()?,
            state: self.state_tensor(),
            rewards,
            done: self.is_done(),
        })
    }
}
