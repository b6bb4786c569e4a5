//! Stable identifiers for agents and waste objects.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an agent, stable for the whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub u32);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent_{:03}", self.0)
    }
}

/// Unique identifier for a waste object; merged waste gets a fresh id
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WasteId(pub u64);

impl fmt::Display for WasteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "waste_{:05}", self.0)
    }
}
