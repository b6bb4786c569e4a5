//! Simulation Systems
//!
//! Perception, knowledge, action gating and message delivery.

pub mod action;
pub mod knowledge;
pub mod messaging;
pub mod perception;

pub use action::{can_apply, execute_action, ActionOutcome, TickEvents};
pub use knowledge::{CommsKnowledge, Facet, History, Knowledge, MissionKnowledge, YieldKnowledge};
pub use messaging::{MessageService, Outgoing};
pub use perception::{build_perception, AgentView, CellView, Perception};
