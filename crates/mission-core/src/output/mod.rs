//! Output
//!
//! Snapshots, run exports, replay and statistics.

pub mod replay;
pub mod snapshot;
pub mod stats;

pub use replay::{Frame, Replay};
pub use snapshot::{capture, export, load_export, write_export, EXPORT_PATH};
pub use stats::{RunSummary, WasteCensus};
