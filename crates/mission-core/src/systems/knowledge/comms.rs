//! Communication Knowledge
//!
//! What an agent learns from its mailbox: the last announced position of
//! every broadcasting agent, and a queue of cells where waste was left for it.

use std::any::Any;
use std::collections::{BTreeMap, VecDeque};

use mission_events::{AgentId, Tier};

use super::Facet;
use crate::components::geometry::Position;
use crate::components::mailbox::{Information, Message};
use crate::systems::perception::Perception;

#[derive(Debug, Clone, Default)]
pub struct CommsKnowledge {
    own: Option<(AgentId, Tier, Position)>,
    positions: BTreeMap<AgentId, (Position, Option<Tier>)>,
    targets: VecDeque<Position>,
}

impl CommsKnowledge {
    /// Last known position and tier of every other agent heard from.
    pub fn known_agents(&self) -> impl Iterator<Item = (AgentId, Position, Option<Tier>)> + '_ {
        self.positions
            .iter()
            .map(|(id, (position, tier))| (*id, *position, *tier))
    }

    /// Closest known agent of `tier` by Manhattan distance; ties go to the
    /// lower id.
    pub fn nearest_agent_of_tier(&self, tier: Tier, from: Position) -> Option<(AgentId, Position)> {
        self.positions
            .iter()
            .filter(|(_, (_, t))| *t == Some(tier))
            .min_by_key(|(id, (position, _))| (position.manhattan(from), **id))
            .map(|(id, (position, _))| (*id, *position))
    }

    pub fn current_target(&self) -> Option<Position> {
        self.targets.front().copied()
    }

    pub fn targets(&self) -> impl Iterator<Item = &Position> {
        self.targets.iter()
    }

    fn absorb(&mut self, information: Information) {
        let own = self.own;
        match information {
            Information::Position { agent, position } => {
                if own.is_some_and(|(id, _, _)| id == agent) {
                    return;
                }
                let entry = self.positions.entry(agent).or_insert((position, None));
                entry.0 = position;
            }
            Information::PositionTier {
                agent,
                position,
                tier,
            } => {
                if own.is_some_and(|(id, _, _)| id == agent) {
                    return;
                }
                self.positions.insert(agent, (position, Some(tier)));
            }
            Information::Target { position, tier } => {
                let mine = own.map(|(_, t, _)| t) == Some(tier);
                if mine && !self.targets.contains(&position) {
                    self.targets.push_back(position);
                }
            }
        }
    }
}

impl Facet for CommsKnowledge {
    fn name(&self) -> &'static str {
        "comms"
    }

    fn update(&mut self, perception: &Perception, mail: &[Message]) {
        self.own = Some((perception.agent_id, perception.tier, perception.position));
        for message in mail {
            match message.decode() {
                Ok(information) => self.absorb(information),
                Err(e) => tracing::warn!(
                    agent = %perception.agent_id,
                    kind = message.kind.label(),
                    error = %e,
                    "dropping undecodable message"
                ),
            }
        }

        while let Some(target) = self.targets.front() {
            if target.manhattan(perception.position) <= 1 {
                self.targets.pop_front();
            } else {
                break;
            }
        }
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
    use crate::systems::perception::fixtures::PerceptionBuilder;

    fn encode(information: Information) -> Message {
        Message::encode(&information).unwrap()
    }

    #[test]
    fn test_tracks_broadcast_positions() {
        let mut comms = CommsKnowledge::default();
        let perception = PerceptionBuilder::new(Tier::Green, Position::new(1, 1)).build();
        comms.update(
            &perception,
            &[
                encode(Information::PositionTier {
                    agent: AgentId(1),
                    position: Position::new(4, 7),
                    tier: Tier::Yellow,
                }),
                encode(Information::PositionTier {
                    agent: AgentId(2),
                    position: Position::new(3, 1),
                    tier: Tier::Yellow,
                }),
                encode(Information::Position {
                    agent: AgentId(1),
                    position: Position::new(4, 2),
                }),
                // Own broadcast echoed back is ignored.
                encode(Information::PositionTier {
                    agent: AgentId(0),
                    position: Position::new(1, 1),
                    tier: Tier::Green,
                }),
            ],
        );

        assert_eq!(comms.known_agents().count(), 2);
        assert_eq!(
            comms.nearest_agent_of_tier(Tier::Yellow, Position::new(1, 1)),
            Some((AgentId(2), Position::new(3, 1)))
        );
        assert_eq!(comms.nearest_agent_of_tier(Tier::Red, Position::new(1, 1)), None);
    }

    #[test]
    fn test_target_queue_is_fifo_and_filtered() {
        let mut comms = CommsKnowledge::default();
        let start = PerceptionBuilder::new(Tier::Yellow, Position::new(5, 5)).build();
        comms.update(
            &start,
            &[
                encode(Information::Target {
                    position: Position::new(2, 1),
                    tier: Tier::Yellow,
                }),
                encode(Information::Target {
                    position: Position::new(2, 7),
                    tier: Tier::Yellow,
                }),
                encode(Information::Target {
                    position: Position::new(2, 1),
                    tier: Tier::Yellow,
                }),
                encode(Information::Target {
                    position: Position::new(5, 1),
                    tier: Tier::Red,
                }),
            ],
        );
        assert_eq!(comms.targets().count(), 2);
        assert_eq!(comms.current_target(), Some(Position::new(2, 1)));

        // Arriving next to the front target retires it.
        let near = PerceptionBuilder::new(Tier::Yellow, Position::new(3, 1)).build();
        comms.update(&near, &[]);
        assert_eq!(comms.current_target(), Some(Position::new(2, 7)));
    }

    #[test]
    fn test_bad_payload_is_skipped() {
        let mut comms = CommsKnowledge::default();
        let perception = PerceptionBuilder::new(Tier::Green, Position::new(1, 1)).build();
        let garbage = Message {
            kind: crate::components::mailbox::MessageKind::Target,
            payload: vec![0xff, 0x00],
        };
        comms.update(&perception, &[garbage]);
        assert_eq!(comms.current_target(), None);
    }
}
