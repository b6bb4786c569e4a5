//! Error Types
//!
//! Everything here is fatal to a run: a corrupted world, a routing mistake,
//! or an I/O failure. Illegal actions are not errors; the action gate turns
//! them into no-ops.

use mission_events::{AgentId, WasteId};
use thiserror::Error;

use crate::components::geometry::Position;
use crate::config::ConfigError;

/// Errors raised by the simulation engine
#[derive(Debug, Error)]
pub enum SimError {
    #[error("position {pos} is outside the {width}x{height} grid")]
    OutOfBounds { pos: Position, width: u32, height: u32 },

    #[error("cell {pos} already holds {what}")]
    CellOccupied { pos: Position, what: &'static str },

    #[error("no waste at {0}")]
    NoWasteAt(Position),

    #[error("no agent at {0}")]
    NoAgentAt(Position),

    #[error("{0} has not been placed on the grid")]
    AgentNotPlaced(AgentId),

    #[error("unknown agent id {id}; valid ids are [{}]", join_ids(.valid))]
    UnknownAgent { id: AgentId, valid: Vec<AgentId> },

    #[error("inventory is full (capacity {capacity})")]
    InventoryFull { capacity: usize },

    #[error("{agent} does not carry {waste}")]
    NotInInventory { agent: AgentId, waste: WasteId },

    #[error("action index {0} is outside the action space")]
    InvalidActionIndex(usize),

    #[error("expected {expected} values, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("replay has no step {0}")]
    MissingReplayStep(usize),

    #[error("replay diverged at step {step}: {reason}")]
    ReplayMismatch { step: u64, reason: String },

    #[error("message codec error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn join_ids(ids: &[AgentId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type SimResult<T> = Result<T, SimError>;
