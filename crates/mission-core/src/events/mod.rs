//! Event System
//!
//! Turn events are defined in `mission-events`; this module persists them.

pub mod logger;

pub use logger::EventLogger;
pub use mission_events::{Event, EventKind};
