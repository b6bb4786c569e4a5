//! Snapshot Types
//!
//! Serialization structs for per-step world snapshots and full-run exports.
//!
//! A run export is what the replay viewer and the analysis scripts consume:
//! the grid size, the roster of agents, and one snapshot per step.

use serde::{Deserialize, Serialize};

use crate::ids::AgentId;
use crate::tier::Tier;

/// One agent's state at the end of a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentState {
    pub agent_id: AgentId,
    pub x: i32,
    pub y: i32,
    /// Tiers of the carried waste, in inventory order
    #[serde(default)]
    pub inventory: Vec<Tier>,
}

/// A waste lying on the grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WastePlacement {
    pub x: i32,
    pub y: i32,
    pub tier: Tier,
}

/// World state after a given step.
///
/// Agents are ordered by id and wastes by `(x, y)` so that identical worlds
/// serialize to identical bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSnapshot {
    pub step: u64,
    pub agents: Vec<AgentState>,
    #[serde(default)]
    pub wastes: Vec<WastePlacement>,
}

impl StepSnapshot {
    /// Count of waste per tier across the grid and all inventories.
    pub fn tier_counts(&self) -> [usize; Tier::COUNT] {
        let mut counts = [0usize; Tier::COUNT];
        for waste in &self.wastes {
            counts[waste.tier.index()] += 1;
        }
        for agent in &self.agents {
            for tier in &agent.inventory {
                counts[tier.index()] += 1;
            }
        }
        counts
    }

    /// Finds an agent's state by id.
    pub fn agent(&self, agent_id: AgentId) -> Option<&AgentState> {
        self.agents.iter().find(|a| a.agent_id == agent_id)
    }
}

/// Roster entry of a run export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentInfo {
    pub agent_id: AgentId,
    pub tier: Tier,
}

/// A complete recorded run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunExport {
    pub width: u32,
    pub height: u32,
    pub agents: Vec<AgentInfo>,
    pub steps: Vec<StepSnapshot>,
}

impl RunExport {
    /// Serializes the export as pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parses an export from JSON.
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// Tier of a rostered agent.
    pub fn tier_of(&self, agent_id: AgentId) -> Option<Tier> {
        self.agents
            .iter()
            .find(|a| a.agent_id == agent_id)
            .map(|a| a.tier)
    }
}
