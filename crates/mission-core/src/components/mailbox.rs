//! Mailbox Component
//!
//! Typed messages with serialized payloads, and the per-agent inbox that
//! receives them.

use mission_events::{AgentId, Tier};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::geometry::Position;
use crate::error::SimResult;

/// Payload discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Sender id and position
    Position,
    /// Sender id, position and tier
    PositionTier,
    /// A cell where waste was left for the receiver's tier
    Target,
}

impl MessageKind {
    pub fn label(self) -> &'static str {
        match self {
            MessageKind::Position => "position",
            MessageKind::PositionTier => "position_tier",
            MessageKind::Target => "target",
        }
    }
}

/// Decoded message content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Information {
    Position {
        agent: AgentId,
        position: Position,
    },
    PositionTier {
        agent: AgentId,
        position: Position,
        tier: Tier,
    },
    Target {
        position: Position,
        tier: Tier,
    },
}

impl Information {
    pub fn kind(&self) -> MessageKind {
        match self {
            Information::Position { .. } => MessageKind::Position,
            Information::PositionTier { .. } => MessageKind::PositionTier,
            Information::Target { .. } => MessageKind::Target,
        }
    }
}

/// A message in transit or in a mailbox
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageKind,
    pub payload: Vec<u8>,
}

impl Message {
    pub fn encode(information: &Information) -> SimResult<Self> {
        Ok(Self {
            kind: information.kind(),
            payload: serde_json::to_vec(information)?,
        })
    }

    pub fn decode(&self) -> SimResult<Information> {
        Ok(serde_json::from_slice(&self.payload)?)
    }
}

/// FIFO inbox. Reading moves messages to the read list, which keeps only
/// the most recent `read_limit` messages.
#[derive(Debug, Clone)]
pub struct Mailbox {
    unread: VecDeque<Message>,
    read: VecDeque<Message>,
    read_limit: usize,
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::with_read_limit(Self::DEFAULT_READ_LIMIT)
    }
}

impl Mailbox {
    pub const DEFAULT_READ_LIMIT: usize = 64;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_read_limit(read_limit: usize) -> Self {
        Self {
            unread: VecDeque::new(),
            read: VecDeque::new(),
            read_limit,
        }
    }

    pub fn receive(&mut self, message: Message) {
        self.unread.push_back(message);
    }

    fn mark_read(&mut self, message: Message) {
        self.read.push_back(message);
        while self.read.len() > self.read_limit {
            self.read.pop_front();
        }
    }

    /// Oldest unread message, moved to the read list.
    pub fn read_latest_unread(&mut self) -> Option<Message> {
        let message = self.unread.pop_front()?;
        self.mark_read(message.clone());
        Some(message)
    }

    /// All unread messages, oldest first. With `keep_unread` the inbox is
    /// left untouched so another consumer can read the same batch.
    pub fn drain_all(&mut self, keep_unread: bool) -> Vec<Message> {
        if keep_unread {
            return self.unread.iter().cloned().collect();
        }
        let drained: Vec<Message> = self.unread.drain(..).collect();
        for message in &drained {
            self.mark_read(message.clone());
        }
        drained
    }

    /// Most recently read messages, oldest first.
    pub fn read_messages(&self) -> &VecDeque<Message> {
        &self.read
    }

    pub fn unread_count(&self) -> usize {
        self.unread.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(x: i32) -> Message {
        Message::encode(&Information::Target {
            position: Position::new(x, 0),
            tier: Tier::Yellow,
        })
        .unwrap()
    }

    #[test]
    fn test_payload_codec() {
        let info = Information::PositionTier {
            agent: AgentId(3),
            position: Position::new(2, 5),
            tier: Tier::Red,
        };
        let message = Message::encode(&info).unwrap();
        assert_eq!(message.kind, MessageKind::PositionTier);
        assert_eq!(message.decode().unwrap(), info);

        let garbage = Message {
            kind: MessageKind::Target,
            payload: b"not json".to_vec(),
        };
        assert!(garbage.decode().is_err());
    }

    #[test]
    fn test_drain_is_fifo() {
        let mut mailbox = Mailbox::new();
        mailbox.receive(target(1));
        mailbox.receive(target(2));

        let drained = mailbox.drain_all(false);
        assert_eq!(drained, vec![target(1), target(2)]);
        assert_eq!(mailbox.unread_count(), 0);
        assert_eq!(mailbox.read_messages().len(), 2);
    }

    #[test]
    fn test_read_list_is_bounded() {
        let mut mailbox = Mailbox::with_read_limit(3);
        for x in 0..10 {
            mailbox.receive(target(x));
            mailbox.drain_all(false);
        }
        assert_eq!(mailbox.read_messages().len(), 3);
        assert_eq!(mailbox.read_messages().front(), Some(&target(7)));
        assert_eq!(mailbox.read_messages().back(), Some(&target(9)));

        mailbox.receive(target(10));
        mailbox.read_latest_unread();
        assert_eq!(mailbox.read_messages().len(), 3);
        assert_eq!(mailbox.read_messages().front(), Some(&target(8)));
    }

    #[test]
    fn test_keep_unread_fans_out() {
        let mut mailbox = Mailbox::new();
        mailbox.receive(target(1));

        let first = mailbox.drain_all(true);
        let second = mailbox.drain_all(true);
        assert_eq!(first, second);
        assert_eq!(mailbox.unread_count(), 1);
        assert!(mailbox.read_messages().is_empty());

        assert_eq!(mailbox.read_latest_unread(), Some(target(1)));
        assert_eq!(mailbox.read_latest_unread(), None);
    }
}
