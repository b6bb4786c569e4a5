//! Statistics Output
//!
//! Waste census and run summaries for analysis.

use std::collections::BTreeMap;

use mission_events::{Event, StepSnapshot, Tier};
use serde::Serialize;

use crate::world::World;

/// Waste per tier by location.
///
/// Weighted mass (green 1, yellow 2, red 4) over grid, inventories and the
/// disposed list is the same at every step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WasteCensus {
    pub on_grid: [usize; Tier::COUNT],
    pub carried: [usize; Tier::COUNT],
    pub disposed: [usize; Tier::COUNT],
}

impl WasteCensus {
    pub fn from_world(world: &World) -> Self {
        let mut census = Self::default();
        for (_, waste) in world.grid().wastes() {
            census.on_grid[waste.tier().index()] += 1;
        }
        for agent in world.agents() {
            for waste in agent.inventory.iter() {
                census.carried[waste.tier().index()] += 1;
            }
        }
        for waste in world.disposed() {
            census.disposed[waste.tier().index()] += 1;
        }
        census
    }

    /// Snapshots do not record disposed waste.
    pub fn from_snapshot(snapshot: &StepSnapshot) -> Self {
        let mut census = Self::default();
        for waste in &snapshot.wastes {
            census.on_grid[waste.tier.index()] += 1;
        }
        for agent in &snapshot.agents {
            for tier in &agent.inventory {
                census.carried[tier.index()] += 1;
            }
        }
        census
    }

    /// Waste of `tier` still in play.
    pub fn live(&self, tier: Tier) -> usize {
        self.on_grid[tier.index()] + self.carried[tier.index()]
    }

    pub fn live_mass(&self) -> u64 {
        Tier::all()
            .into_iter()
            .map(|tier| self.live(tier) as u64 * tier.mass())
            .sum()
    }

    pub fn total_mass(&self) -> u64 {
        self.live_mass()
            + Tier::all()
                .into_iter()
                .map(|tier| self.disposed[tier.index()] as u64 * tier.mass())
                .sum::<u64>()
    }
}

/// End-of-run summary
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub steps: u64,
    pub done: bool,
    pub census: WasteCensus,
    pub total_events: usize,
    pub events_by_kind: BTreeMap<String, usize>,
}

impl RunSummary {
    pub fn record_events(&mut self, events: &[Event]) {
        self.total_events += events.len();
        for event in events {
            *self
                .events_by_kind
                .entry(event.kind.label().to_string())
                .or_default() += 1;
        }
    }

    /// Fills the final state fields from the world.
    pub fn finish(&mut self, world: &World) {
        self.steps = world.step_count();
        self.done = world.is_done();
        self.census = WasteCensus::from_world(world);
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mission_events::{AgentId, AgentState, EventKind, WastePlacement};

    #[test]
    fn test_snapshot_census() {
        let snapshot = StepSnapshot {
            step: 1,
            agents: vec![AgentState {
                agent_id: AgentId(0),
                x: 0,
                y: 0,
                inventory: vec![Tier::Yellow, Tier::Yellow],
            }],
            wastes: vec![WastePlacement {
                x: 1,
                y: 0,
                tier: Tier::Green,
            }],
        };
        let census = WasteCensus::from_snapshot(&snapshot);
        assert_eq!(census.live(Tier::Yellow), 2);
        assert_eq!(census.live_mass(), 5);
        assert_eq!(census.total_mass(), 5);
    }

    #[test]
    fn test_disposed_counts_toward_total_mass() {
        let census = WasteCensus {
            on_grid: [2, 0, 0],
            carried: [0, 0, 0],
            disposed: [0, 0, 1],
        };
        assert_eq!(census.live_mass(), 2);
        assert_eq!(census.total_mass(), 6);
    }

    #[test]
    fn test_summary_counts_event_kinds() {
        let mut summary = RunSummary::default();
        summary.record_events(&[
            Event::new("evt_00000001", 1, AgentId(0), EventKind::Waited),
            Event::new("evt_00000002", 1, AgentId(1), EventKind::Waited),
            Event::new(
                "evt_00000003",
                1,
                AgentId(1),
                EventKind::Rejected {
                    action: "pick".into(),
                },
            ),
        ]);
        assert_eq!(summary.total_events, 3);
        assert_eq!(summary.events_by_kind["waited"], 2);
        assert_eq!(summary.events_by_kind["rejected"], 1);
    }
}
