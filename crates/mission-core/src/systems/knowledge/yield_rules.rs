//! Yield Rules
//!
//! Turns a move into a cell held by another agent into an explicit wait.
//! Placed after the mission facet, it only answers moves the mission facet
//! has already refused.

use std::any::Any;

use super::Facet;
use crate::actions::Action;
use crate::components::geometry::Direction;
use crate::components::mailbox::Message;
use crate::systems::perception::Perception;

#[derive(Debug, Clone, Default)]
pub struct YieldKnowledge {
    perception: Option<Perception>,
}

impl Facet for YieldKnowledge {
    fn name(&self) -> &'static str {
        "yield"
    }

    fn update(&mut self, perception: &Perception, _mail: &[Message]) {
        self.perception = Some(perception.clone());
    }

    fn try_move(&self, direction: Direction) -> Option<Action> {
        if direction == Direction::None {
            return None;
        }
        let cell = self.perception.as_ref()?.get(direction)?;
        cell.agent.as_ref().map(|_| Action::Wait)
    }

    fn clone_box(&self) -> Box<dyn Facet> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::geometry::Position;
    use crate::systems::perception::fixtures::PerceptionBuilder;
    use mission_events::Tier;

    #[test]
    fn test_waits_only_for_agents() {
        let mut rules = YieldKnowledge::default();
        rules.update(
            &PerceptionBuilder::new(Tier::Green, Position::new(1, 1))
                .agent(Direction::Left, 2, Tier::Green)
                .build(),
            &[],
        );
        assert_eq!(rules.try_move(Direction::Left), Some(Action::Wait));
        assert_eq!(rules.try_move(Direction::Right), None);
        assert_eq!(rules.try_move(Direction::None), None);
        assert_eq!(rules.try_pick(), None);
    }
}
