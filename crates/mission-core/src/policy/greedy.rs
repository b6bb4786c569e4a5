//! Greedy Rule-Based Policy
//!
//! Per-tier rules, in priority order:
//! 1. merge two own-tier items;
//! 2. carry an over-tier item right to the zone border, drop it there and
//!    tell the nearest agent of that tier where it is;
//! 3. pick own-tier waste underfoot, or step toward a visible one;
//! 4. head for the oldest hand-off target;
//! 5. sweep the patrol zone column by column.
//!
//! The terminal tier instead picks and then beelines for the dump.

use mission_events::Tier;

use super::{Policy, TurnContext};
use crate::actions::Action;
use crate::components::geometry::{Direction, Position};
use crate::components::mailbox::Information;
use crate::components::waste::WasteView;
use crate::error::SimResult;
use crate::systems::knowledge::{Facet, MissionKnowledge};

#[derive(Debug, Clone)]
pub struct GreedyPolicy {
    tier: Tier,
    /// Current sweep direction along a column
    vertical: Direction,
    /// Next column to sweep
    horizontal: Direction,
}

impl GreedyPolicy {
    pub fn new(tier: Tier) -> Self {
        Self {
            tier,
            vertical: Direction::Up,
            horizontal: Direction::Right,
        }
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Inclusive column range swept by the patrol: the own zone plus, for
    /// tiers with a lower neighbour, the hand-off column just left of it.
    pub fn patrol_columns(&self, mission: &MissionKnowledge) -> Option<(i32, i32)> {
        let perception = mission.perception()?;
        let columns = perception.layout.columns(self.tier);
        if columns.is_empty() {
            return None;
        }
        let mut low = columns.start as i32;
        if self.tier.previous().is_some() && low > 0 {
            low -= 1;
        }
        Some((low, columns.end as i32 - 1))
    }

    fn patrol(&mut self, ctx: &mut TurnContext<'_>) -> Option<Action> {
        let knowledge = ctx.knowledge;
        let here = knowledge.mission().position()?;
        let Some((low, high)) = self.patrol_columns(knowledge.mission()) else {
            return ctx.random_move(&[]);
        };

        if here.x < low {
            return knowledge.try_move(Direction::Right).or_else(|| ctx.random_move(&[]));
        }
        if here.x > high {
            return knowledge.try_move(Direction::Left).or_else(|| ctx.random_move(&[]));
        }

        // Turn on the mission rules alone so a yielding agent still reverses
        // when something parks in its column.
        if let Some(step) = knowledge.mission().try_move(self.vertical) {
            return Some(step);
        }

        // End of the column, or blocked: shift one column and sweep back.
        self.vertical = self.vertical.opposite();
        let next_x = here.offset(self.horizontal).x;
        if next_x < low || next_x > high {
            self.horizontal = self.horizontal.opposite();
        }
        knowledge
            .try_move(self.horizontal)
            .or_else(|| knowledge.try_move(self.vertical))
            .or_else(|| ctx.random_move(&[]))
    }

    /// Step 2: deliver an over-tier item to the next zone.
    fn deliver(&mut self, ctx: &mut TurnContext<'_>, item: WasteView) -> Option<Action> {
        let knowledge = ctx.knowledge;
        let here = knowledge.mission().position()?;

        if !knowledge.mission().at_right_zone_edge() {
            if let Some(step) = knowledge.mission().try_move(Direction::Right) {
                return Some(step);
            }
            return ctx
                .random_move(&[Direction::Left, Direction::Right])
                .or_else(|| knowledge.try_move(Direction::Right));
        }

        match knowledge.try_drop(item.id) {
            Some(drop) => {
                hand_off(ctx, here, item.tier);
                Some(drop)
            }
            // Border cell already holds waste; slide along the border.
            None => ctx.random_move(&[Direction::Left, Direction::Right]),
        }
    }

    fn follow_target(&self, ctx: &TurnContext<'_>) -> Option<Action> {
        let target = ctx.knowledge.comms()?.current_target()?;
        ctx.step_toward(target)
    }

    fn decide_terminal(&mut self, ctx: &mut TurnContext<'_>) -> Option<Action> {
        let knowledge = ctx.knowledge;
        if let Some(pick) = knowledge.try_pick() {
            return Some(pick);
        }

        let mission = knowledge.mission();
        if let Some(item) = mission.inventory().first().copied() {
            if mission.at_dump() {
                return knowledge.try_drop(item.id).or(Some(Action::Wait));
            }
            let dump = mission.dump()?;
            return ctx.step_toward(dump).or_else(|| ctx.random_move(&[]));
        }

        self.search(ctx)
    }

    /// Steps 3b to 5: look for work when there is nothing to carry.
    fn search(&mut self, ctx: &mut TurnContext<'_>) -> Option<Action> {
        if let Some(action) = ctx.knowledge.mission().look_around() {
            return Some(action);
        }
        if let Some(action) = self.follow_target(ctx) {
            return Some(action);
        }
        self.patrol(ctx)
    }

    /// The full rule list, without a fallback.
    pub(crate) fn choose(&mut self, ctx: &mut TurnContext<'_>) -> Option<Action> {
        if self.tier.is_terminal() {
            return self.decide_terminal(ctx);
        }

        if let Some(merge) = ctx.knowledge.try_merge() {
            return Some(merge);
        }
        if let Some(item) = ctx.knowledge.mission().over_tier_waste() {
            return self.deliver(ctx, item);
        }
        if let Some(pick) = ctx.knowledge.try_pick() {
            return Some(pick);
        }
        self.search(ctx)
    }
}

/// Tells the nearest known agent of `tier` that waste waits at `at`.
pub(crate) fn hand_off(ctx: &mut TurnContext<'_>, at: Position, tier: Tier) {
    let knowledge = ctx.knowledge;
    let Some(comms) = knowledge.comms() else {
        return;
    };
    if let Some((receiver, _)) = comms.nearest_agent_of_tier(tier, at) {
        ctx.send(receiver, Information::Target { position: at, tier });
    }
}

impl Policy for GreedyPolicy {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn decide(&mut self, ctx: &mut TurnContext<'_>) -> SimResult<Action> {
        Ok(self.choose(ctx).unwrap_or(Action::Wait))
    }

    fn follows_targets(&self) -> bool {
        true
    }

    fn reset(&mut self) {
        *self = Self::new(self.tier);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::mailbox::{Mailbox, Message};
    use crate::systems::knowledge::{CommsKnowledge, Knowledge, YieldKnowledge};
    use crate::systems::perception::fixtures::PerceptionBuilder;
    use crate::systems::perception::Perception;
    use mission_events::{AgentId, WasteId};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn decide(policy: &mut GreedyPolicy, knowledge: &Knowledge) -> (Action, Vec<crate::systems::Outgoing>) {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut outbox = Vec::new();
        let action = {
            let mut ctx = TurnContext::new(knowledge, &mut rng, &mut outbox);
            policy.decide(&mut ctx).unwrap()
        };
        (action, outbox)
    }

    fn knowing(perception: Perception) -> Knowledge {
        let mut knowledge = Knowledge::mission_only().with(CommsKnowledge::default());
        knowledge.update(&perception, None);
        knowledge
    }

    #[test]
    fn test_picks_waste_underfoot() {
        let knowledge = knowing(
            PerceptionBuilder::new(Tier::Green, Position::new(1, 1))
                .waste(Direction::None, 1, Tier::Green)
                .build(),
        );
        let mut policy = GreedyPolicy::new(Tier::Green);
        assert_eq!(decide(&mut policy, &knowledge).0, Action::Pick);
    }

    #[test]
    fn test_merge_beats_everything() {
        let knowledge = knowing(
            PerceptionBuilder::new(Tier::Green, Position::new(1, 1))
                .waste(Direction::None, 3, Tier::Green)
                .carrying(1, Tier::Green)
                .carrying(2, Tier::Green)
                .build(),
        );
        let mut policy = GreedyPolicy::new(Tier::Green);
        assert_eq!(
            decide(&mut policy, &knowledge).0,
            Action::merging(WasteId(1), WasteId(2))
        );
    }

    #[test]
    fn test_carries_over_tier_item_right() {
        let knowledge = knowing(
            PerceptionBuilder::new(Tier::Green, Position::new(0, 4))
                .carrying(7, Tier::Yellow)
                .build(),
        );
        let mut policy = GreedyPolicy::new(Tier::Green);
        assert_eq!(
            decide(&mut policy, &knowledge).0,
            Action::moving(Direction::Right)
        );
    }

    #[test]
    fn test_drops_at_border_and_hands_off() {
        let perception = PerceptionBuilder::new(Tier::Green, Position::new(2, 4))
            .carrying(7, Tier::Yellow)
            .build();
        let mut mailbox = Mailbox::new();
        mailbox.receive(
            Message::encode(&Information::PositionTier {
                agent: AgentId(4),
                position: Position::new(5, 6),
                tier: Tier::Yellow,
            })
            .unwrap(),
        );
        let mut knowledge = Knowledge::mission_only().with(CommsKnowledge::default());
        knowledge.update(&perception, Some(&mut mailbox));

        let mut policy = GreedyPolicy::new(Tier::Green);
        let (action, outbox) = decide(&mut policy, &knowledge);
        assert_eq!(action, Action::dropping(WasteId(7)));
        assert_eq!(outbox.len(), 1);
        assert_eq!(outbox[0].to, AgentId(4));
        assert_eq!(
            outbox[0].information,
            Information::Target {
                position: Position::new(2, 4),
                tier: Tier::Yellow,
            }
        );
    }

    #[test]
    fn test_steps_toward_visible_waste() {
        let knowledge = knowing(
            PerceptionBuilder::new(Tier::Yellow, Position::new(4, 4))
                .waste(Direction::Down, 2, Tier::Yellow)
                .build(),
        );
        let mut policy = GreedyPolicy::new(Tier::Yellow);
        assert_eq!(
            decide(&mut policy, &knowledge).0,
            Action::moving(Direction::Down)
        );
    }

    #[test]
    fn test_patrol_sweeps_then_shifts_column() {
        let mut policy = GreedyPolicy::new(Tier::Green);
        let open = knowing(PerceptionBuilder::new(Tier::Green, Position::new(0, 4)).build());
        assert_eq!(decide(&mut policy, &open).0, Action::moving(Direction::Up));

        let top = knowing(PerceptionBuilder::new(Tier::Green, Position::new(0, 8)).build());
        assert_eq!(decide(&mut policy, &top).0, Action::moving(Direction::Right));
        let after = knowing(PerceptionBuilder::new(Tier::Green, Position::new(1, 8)).build());
        assert_eq!(decide(&mut policy, &after).0, Action::moving(Direction::Down));
    }

    #[test]
    fn test_yielding_patrol_reverses_at_parked_agent() {
        let mut knowledge = Knowledge::mission_only().with(YieldKnowledge::default());
        knowledge.update(
            &PerceptionBuilder::new(Tier::Green, Position::new(0, 4))
                .agent(Direction::Up, 2, Tier::Green)
                .build(),
            None,
        );
        assert_eq!(knowledge.try_move(Direction::Up), Some(Action::Wait));

        let mut policy = GreedyPolicy::new(Tier::Green);
        assert_eq!(decide(&mut policy, &knowledge).0, Action::moving(Direction::Right));
        assert_eq!(decide(&mut policy, &knowledge).0, Action::moving(Direction::Down));
    }

    #[test]
    fn test_yielding_step_toward_takes_open_direction() {
        let perception = PerceptionBuilder::new(Tier::Yellow, Position::new(5, 5))
            .agent(Direction::Left, 2, Tier::Yellow)
            .build();
        let mut mailbox = Mailbox::new();
        mailbox.receive(
            Message::encode(&Information::Target {
                position: Position::new(3, 7),
                tier: Tier::Yellow,
            })
            .unwrap(),
        );
        let mut knowledge = Knowledge::mission_only()
            .with(CommsKnowledge::default())
            .with(YieldKnowledge::default());
        knowledge.update(&perception, Some(&mut mailbox));

        let mut policy = GreedyPolicy::new(Tier::Yellow);
        assert_eq!(
            decide(&mut policy, &knowledge).0,
            Action::moving(Direction::Up)
        );
    }

    #[test]
    fn test_patrol_zone_includes_hand_off_column() {
        let knowledge = knowing(PerceptionBuilder::new(Tier::Yellow, Position::new(4, 4)).build());
        let yellow = GreedyPolicy::new(Tier::Yellow);
        assert_eq!(yellow.patrol_columns(knowledge.mission()), Some((2, 5)));

        let knowledge = knowing(PerceptionBuilder::new(Tier::Green, Position::new(1, 4)).build());
        let green = GreedyPolicy::new(Tier::Green);
        assert_eq!(green.patrol_columns(knowledge.mission()), Some((0, 2)));
    }

    #[test]
    fn test_follows_target_when_idle() {
        let perception = PerceptionBuilder::new(Tier::Yellow, Position::new(5, 5)).build();
        let mut mailbox = Mailbox::new();
        mailbox.receive(
            Message::encode(&Information::Target {
                position: Position::new(2, 5),
                tier: Tier::Yellow,
            })
            .unwrap(),
        );
        let mut knowledge = Knowledge::mission_only().with(CommsKnowledge::default());
        knowledge.update(&perception, Some(&mut mailbox));

        let mut policy = GreedyPolicy::new(Tier::Yellow);
        assert_eq!(
            decide(&mut policy, &knowledge).0,
            Action::moving(Direction::Left)
        );
    }

    #[test]
    fn test_terminal_tier_heads_for_dump() {
        let dump = Position::new(8, 4);
        let loaded = knowing(
            PerceptionBuilder::new(Tier::Red, Position::new(6, 2))
                .carrying(9, Tier::Red)
                .dump(dump)
                .build(),
        );
        let mut policy = GreedyPolicy::new(Tier::Red);
        assert_eq!(
            decide(&mut policy, &loaded).0,
            Action::moving(Direction::Right)
        );

        let arrived = knowing(
            PerceptionBuilder::new(Tier::Red, dump)
                .carrying(9, Tier::Red)
                .dump(dump)
                .build(),
        );
        assert_eq!(
            decide(&mut policy, &arrived).0,
            Action::dropping(WasteId(9))
        );
    }
}
