//! Shared data types and serialization for the robot mission simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! Replay tooling and training harnesses read these types without pulling
//! in the simulation engine.

pub mod event;
pub mod ids;
pub mod snapshot;
pub mod tier;

pub use event::{Event, EventKind};
pub use ids::{AgentId, WasteId};
pub use snapshot::{AgentInfo, AgentState, RunExport, StepSnapshot, WastePlacement};
pub use tier::{ParseTierError, Tier};
