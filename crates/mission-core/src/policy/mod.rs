//! Agent Decision Policies
//!
//! A policy turns an agent's knowledge into one action per turn. Policies
//! never touch the world; they read knowledge, draw from the world RNG and
//! queue messages in the turn's outbox.

use mission_events::{AgentId, Tier};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use crate::actions::Action;
use crate::components::geometry::{Direction, Position};
use crate::components::mailbox::Information;
use crate::config::{PolicyKind, PolicyParams};
use crate::error::SimResult;
use crate::systems::knowledge::{Facet, Knowledge};
use crate::systems::messaging::Outgoing;

pub mod cooperative;
pub mod greedy;
pub mod learned;
pub mod network;
pub mod random;

pub use cooperative::CooperativePolicy;
pub use greedy::GreedyPolicy;
pub use learned::{act_from_index, observe, LearnedPolicy, OBSERVATION_LEN};
pub use network::{HiddenState, LinearQNetwork, QNetwork, RecurrentQNetwork};
pub use random::RandomPolicy;

/// Everything a policy may use while deciding
pub struct TurnContext<'a> {
    pub knowledge: &'a Knowledge,
    pub rng: &'a mut SmallRng,
    pub outbox: &'a mut Vec<Outgoing>,
}

impl<'a> TurnContext<'a> {
    pub fn new(knowledge: &'a Knowledge, rng: &'a mut SmallRng, outbox: &'a mut Vec<Outgoing>) -> Self {
        Self {
            knowledge,
            rng,
            outbox,
        }
    }

    pub fn send(&mut self, to: AgentId, information: Information) {
        self.outbox.push(Outgoing { to, information });
    }

    /// A uniformly chosen legal cardinal move, skipping `exclude`.
    pub fn random_move(&mut self, exclude: &[Direction]) -> Option<Action> {
        let knowledge = self.knowledge;
        let mission = knowledge.mission();
        let options: Vec<Action> = Direction::CARDINAL
            .into_iter()
            .filter(|d| !exclude.contains(d))
            .filter_map(|d| mission.try_move(d))
            .collect();
        options.choose(&mut *self.rng).copied()
    }

    /// First legal step that shortens the distance to `goal`, horizontal
    /// first. Only when neither direction is open do the remaining facets
    /// answer, which may mean waiting for an agent to clear the way.
    pub fn step_toward(&self, goal: Position) -> Option<Action> {
        let mission = self.knowledge.mission();
        let here = mission.position()?;
        let directions = Direction::toward(here, goal);
        let mut useful = directions.iter().copied().filter(|d| *d != Direction::None);
        useful
            .clone()
            .find_map(|d| mission.try_move(d))
            .or_else(|| useful.find_map(|d| self.knowledge.try_move(d)))
    }
}

pub trait Policy {
    fn name(&self) -> &'static str;

    fn decide(&mut self, ctx: &mut TurnContext<'_>) -> SimResult<Action>;

    /// Whether the policy acts on target hand-off messages.
    fn follows_targets(&self) -> bool {
        false
    }

    /// Forget per-episode state such as recurrent memory.
    fn reset(&mut self) {}
}

/// Builds the policy named by `kind` for an agent of `tier`.
pub fn build_policy(
    kind: PolicyKind,
    tier: Tier,
    params: &PolicyParams,
    rng: &mut SmallRng,
) -> SimResult<Box<dyn Policy>> {
    let policy: Box<dyn Policy> = match kind {
        PolicyKind::Random => Box::new(RandomPolicy),
        PolicyKind::Greedy => Box::new(GreedyPolicy::new(tier)),
        PolicyKind::Cooperative => Box::new(CooperativePolicy::new(tier, params.commit_turns)),
        PolicyKind::Learned => Box::new(LearnedPolicy::from_params(params, rng)?),
    };
    Ok(policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_factory_names() {
        let mut rng = SmallRng::seed_from_u64(1);
        let params = PolicyParams::default();
        for kind in PolicyKind::ALL {
            let policy = build_policy(kind, Tier::Green, &params, &mut rng).unwrap();
            assert_eq!(policy.name(), kind.name());
        }
    }

    #[test]
    fn test_missing_weights_file_fails() {
        let mut rng = SmallRng::seed_from_u64(1);
        let params = PolicyParams {
            weights: Some("/definitely/not/here.json".into()),
            ..PolicyParams::default()
        };
        assert!(build_policy(PolicyKind::Learned, Tier::Green, &params, &mut rng).is_err());
    }
}
