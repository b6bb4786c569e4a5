//! Event Types
//!
//! One event per notable thing an agent did during its turn.

use serde::{Deserialize, Serialize};

use crate::ids::{AgentId, WasteId};
use crate::tier::Tier;

/// What happened during a turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    Waited,
    Moved {
        from: (i32, i32),
        to: (i32, i32),
    },
    Picked {
        waste: WasteId,
        tier: Tier,
    },
    Dropped {
        waste: WasteId,
        tier: Tier,
        at: (i32, i32),
    },
    /// Terminal waste retired at the dump
    Disposed {
        waste: WasteId,
        tier: Tier,
    },
    Merged {
        inputs: [WasteId; 2],
        output: WasteId,
        tier: Tier,
    },
    /// The proposed action failed its legality check and became a no-op
    Rejected {
        action: String,
    },
    MessageSent {
        to: AgentId,
        kind: String,
    },
}

impl EventKind {
    /// Short snake_case label, matching the serialized tag.
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::Waited => "waited",
            EventKind::Moved { .. } => "moved",
            EventKind::Picked { .. } => "picked",
            EventKind::Dropped { .. } => "dropped",
            EventKind::Disposed { .. } => "disposed",
            EventKind::Merged { .. } => "merged",
            EventKind::Rejected { .. } => "rejected",
            EventKind::MessageSent { .. } => "message_sent",
        }
    }
}

/// A single logged event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub event_id: String,
    pub step: u64,
    pub agent_id: AgentId,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl Event {
    pub fn new(event_id: impl Into<String>, step: u64, agent_id: AgentId, kind: EventKind) -> Self {
        Self {
            event_id: event_id.into(),
            step,
            agent_id,
            kind,
        }
    }
}
