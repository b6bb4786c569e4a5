//! Random Policy
//!
//! Uniform over the actions that make sense to offer: drop only with
//! something carried, merge only with two items. Legality is left to the gate.

use rand::seq::SliceRandom;

use super::{Policy, TurnContext};
use crate::actions::Action;
use crate::components::geometry::Direction;
use crate::error::SimResult;

#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPolicy;

impl Policy for RandomPolicy {
    fn name(&self) -> &'static str {
        "random"
    }

    fn decide(&mut self, ctx: &mut TurnContext<'_>) -> SimResult<Action> {
        let inventory = ctx.knowledge.mission().inventory();

        let mut options = vec![Action::Wait, Action::Pick];
        options.extend(Direction::CARDINAL.map(Action::moving));
        if let Some(item) = inventory.choose(&mut *ctx.rng) {
            options.push(Action::dropping(item.id));
        }
        if inventory.len() >= 2 {
            let pair: Vec<_> = inventory.choose_multiple(&mut *ctx.rng, 2).collect();
            options.push(Action::merging(pair[0].id, pair[1].id));
        }

        Ok(options.choose(&mut *ctx.rng).copied().unwrap_or(Action::Wait))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::geometry::Position;
    use crate::systems::knowledge::{Facet, Knowledge};
    use crate::systems::perception::fixtures::PerceptionBuilder;
    use mission_events::Tier;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_only_offers_sensible_actions() {
        let mut knowledge = Knowledge::mission_only();
        knowledge.update(
            &PerceptionBuilder::new(Tier::Green, Position::new(1, 1)).build(),
            None,
        );
        let mut rng = SmallRng::seed_from_u64(3);
        let mut outbox = Vec::new();
        let mut policy = RandomPolicy;

        for _ in 0..200 {
            let mut ctx = TurnContext::new(&knowledge, &mut rng, &mut outbox);
            let action = policy.decide(&mut ctx).unwrap();
            assert!(!matches!(action, Action::Drop { .. } | Action::Merge { .. }));
        }
        assert!(outbox.is_empty());
    }

    #[test]
    fn test_merge_pairs_are_distinct() {
        let mut knowledge = Knowledge::mission_only();
        knowledge.update(
            &PerceptionBuilder::new(Tier::Green, Position::new(1, 1))
                .carrying(1, Tier::Green)
                .carrying(2, Tier::Green)
                .build(),
            None,
        );
        let mut rng = SmallRng::seed_from_u64(9);
        let mut outbox = Vec::new();
        let mut policy = RandomPolicy;
        let mut saw_merge = false;

        for _ in 0..200 {
            let mut ctx = TurnContext::new(&knowledge, &mut rng, &mut outbox);
            if let Action::Merge { first, second } = policy.decide(&mut ctx).unwrap() {
                assert_ne!(first, second);
                saw_merge = true;
            }
        }
        assert!(saw_merge);
        assert!(knowledge.mission().try_merge().is_some());
    }
}
