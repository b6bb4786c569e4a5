//! Replay
//!
//! Rebuilds grid occupancy from a run export, one frame per recorded step,
//! and checks each frame for consistency.

use std::collections::BTreeMap;
use std::path::Path;

use mission_events::{AgentId, AgentState, RunExport, StepSnapshot, Tier};

use super::snapshot::load_export;
use super::stats::WasteCensus;
use crate::error::{SimError, SimResult};

/// Occupancy of the grid at one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub step: u64,
    agents: BTreeMap<(i32, i32), AgentState>,
    wastes: BTreeMap<(i32, i32), Tier>,
}

impl Frame {
    pub fn agent_at(&self, x: i32, y: i32) -> Option<AgentId> {
        self.agents.get(&(x, y)).map(|a| a.agent_id)
    }

    pub fn waste_at(&self, x: i32, y: i32) -> Option<Tier> {
        self.wastes.get(&(x, y)).copied()
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    pub fn waste_count(&self) -> usize {
        self.wastes.len()
    }

    /// Where an agent stands and what it carries.
    pub fn agent(&self, id: AgentId) -> Option<&AgentState> {
        self.agents.values().find(|a| a.agent_id == id)
    }
}

#[derive(Debug, Clone)]
pub struct Replay {
    export: RunExport,
}

impl Replay {
    pub fn new(export: RunExport) -> Self {
        Self { export }
    }

    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        Ok(Self::new(load_export(path)?))
    }

    pub fn export(&self) -> &RunExport {
        &self.export
    }

    pub fn len(&self) -> usize {
        self.export.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.export.steps.is_empty()
    }

    /// Occupancy at the `index`-th recorded step. Two agents or two wastes
    /// in one cell, an unrostered agent or a cell outside the grid make the
    /// frame inconsistent.
    pub fn frame(&self, index: usize) -> SimResult<Frame> {
        let snapshot = self
            .export
            .steps
            .get(index)
            .ok_or(SimError::MissingReplayStep(index))?;
        self.build_frame(snapshot)
    }

    fn build_frame(&self, snapshot: &StepSnapshot) -> SimResult<Frame> {
        let mismatch = |reason: String| SimError::ReplayMismatch {
            step: snapshot.step,
            reason,
        };

        let mut agents = BTreeMap::new();
        for agent in &snapshot.agents {
            self.check_bounds(agent.x, agent.y).map_err(&mismatch)?;
            if self.export.tier_of(agent.agent_id).is_none() {
                return Err(mismatch(format!("{} is not in the roster", agent.agent_id)));
            }
            if let Some(other) = agents.insert((agent.x, agent.y), agent.clone()) {
                return Err(mismatch(format!(
                    "{} and {} share cell ({}, {})",
                    other.agent_id, agent.agent_id, agent.x, agent.y
                )));
            }
        }

        let mut wastes = BTreeMap::new();
        for waste in &snapshot.wastes {
            self.check_bounds(waste.x, waste.y).map_err(&mismatch)?;
            if wastes.insert((waste.x, waste.y), waste.tier).is_some() {
                return Err(mismatch(format!(
                    "two wastes in cell ({}, {})",
                    waste.x, waste.y
                )));
            }
        }

        Ok(Frame {
            step: snapshot.step,
            agents,
            wastes,
        })
    }

    fn check_bounds(&self, x: i32, y: i32) -> Result<(), String> {
        let inside =
            x >= 0 && y >= 0 && (x as u32) < self.export.width && (y as u32) < self.export.height;
        if inside {
            Ok(())
        } else {
            Err(format!(
                "cell ({}, {}) outside the {}x{} grid",
                x, y, self.export.width, self.export.height
            ))
        }
    }

    pub fn frames(&self) -> impl Iterator<Item = SimResult<Frame>> + '_ {
        (0..self.len()).map(|index| self.frame(index))
    }

    /// Every frame is consistent, steps increase, and waste mass never
    /// grows.
    pub fn verify(&self) -> SimResult<()> {
        let mut previous: Option<(u64, u64)> = None;
        for (frame, snapshot) in self.frames().zip(&self.export.steps) {
            frame?;
            let mass = WasteCensus::from_snapshot(snapshot).live_mass();
            if let Some((step, last_mass)) = previous {
                if snapshot.step <= step {
                    return Err(SimError::ReplayMismatch {
                        step: snapshot.step,
                        reason: format!("step does not follow step {}", step),
                    });
                }
                if mass > last_mass {
                    return Err(SimError::ReplayMismatch {
                        step: snapshot.step,
                        reason: format!("waste mass grew from {} to {}", last_mass, mass),
                    });
                }
            }
            previous = Some((snapshot.step, mass));
        }
        Ok(())
    }

    /// Compares the replay with snapshots recorded by a live world.
    pub fn verify_against(&self, history: &[StepSnapshot]) -> SimResult<()> {
        if history.len() != self.len() {
            return Err(SimError::ReplayMismatch {
                step: history.len().min(self.len()) as u64,
                reason: format!(
                    "replay has {} steps, history has {}",
                    self.len(),
                    history.len()
                ),
            });
        }
        for (index, recorded) in history.iter().enumerate() {
            if self.frame(index)? != self.build_frame(recorded)? {
                return Err(SimError::ReplayMismatch {
                    step: recorded.step,
                    reason: "occupancy differs from the recorded world".into(),
                });
            }
        }
        Ok(())
    }
}
