//! Cooperative Policy
//!
//! Greedy rules plus a pairing shortcut: an agent holding exactly one item
//! of its own tier, next to a same-tier agent that also holds exactly one,
//! drops its item for the neighbour to pick and merge. It then commits for a
//! few turns (wait, then a random move) so the pair does not keep trading
//! the item back and forth.

use mission_events::Tier;

use super::greedy::GreedyPolicy;
use super::{Policy, TurnContext};
use crate::actions::Action;
use crate::components::geometry::Direction;
use crate::error::SimResult;

#[derive(Debug, Clone)]
pub struct CooperativePolicy {
    greedy: GreedyPolicy,
    commit_turns: u32,
    /// Remaining committed turns
    committed: u32,
}

impl CooperativePolicy {
    pub fn new(tier: Tier, commit_turns: u32) -> Self {
        Self {
            greedy: GreedyPolicy::new(tier),
            commit_turns,
            committed: 0,
        }
    }

    pub fn is_committed(&self) -> bool {
        self.committed > 0
    }

    fn adjacent_drop(&self, ctx: &TurnContext<'_>) -> Option<Action> {
        let knowledge = ctx.knowledge;
        let perception = knowledge.mission().perception()?;
        let own = perception.tier;

        let mut own_items = perception.inventory.iter().filter(|w| w.tier == own);
        let item = own_items.next()?;
        if own_items.next().is_some() {
            return None;
        }

        let partner = Direction::CARDINAL.into_iter().any(|d| {
            perception
                .get(d)
                .and_then(|cell| cell.agent.as_ref())
                .is_some_and(|agent| {
                    agent.tier == own && agent.inventory.iter().filter(|t| **t == own).count() == 1
                })
        });
        if !partner {
            return None;
        }
        knowledge.try_drop(item.id)
    }
}

impl Policy for CooperativePolicy {
    fn name(&self) -> &'static str {
        "cooperative"
    }

    fn decide(&mut self, ctx: &mut TurnContext<'_>) -> SimResult<Action> {
        if self.committed > 0 {
            self.committed -= 1;
            if self.committed > 0 {
                return Ok(Action::Wait);
            }
            return Ok(ctx.random_move(&[]).unwrap_or(Action::Wait));
        }

        if let Some(drop) = self.adjacent_drop(ctx) {
            self.committed = self.commit_turns;
            return Ok(drop);
        }

        self.greedy.decide(ctx)
    }

    fn follows_targets(&self) -> bool {
        true
    }

    fn reset(&mut self) {
        self.greedy.reset();
        self.committed = 0;
    }
}
