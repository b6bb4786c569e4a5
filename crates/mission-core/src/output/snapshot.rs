//! Snapshot Generation
//!
//! Captures world state as `StepSnapshot`s and writes run exports as JSON.

use std::fs;
use std::path::Path;

use mission_events::{AgentInfo, AgentState, RunExport, StepSnapshot, WastePlacement};

use crate::error::SimResult;
use crate::world::World;

/// Default export path
pub const EXPORT_PATH: &str = "output/run.json";

/// Current state of the world. Agents come in id order and wastes in
/// `(x, y)` order.
pub fn capture(world: &World) -> SimResult<StepSnapshot> {
    let agents = world
        .agents()
        .iter()
        .map(|agent| {
            let position = agent.position()?;
            Ok(AgentState {
                agent_id: agent.id,
                x: position.x,
                y: position.y,
                inventory: agent.inventory.tiers(),
            })
        })
        .collect::<SimResult<Vec<_>>>()?;

    let mut wastes: Vec<WastePlacement> = world
        .grid()
        .wastes()
        .map(|(position, waste)| WastePlacement {
            x: position.x,
            y: position.y,
            tier: waste.tier(),
        })
        .collect();
    wastes.sort_by_key(|w| (w.x, w.y));

    Ok(StepSnapshot {
        step: world.step_count(),
        agents,
        wastes,
    })
}

/// Roster plus every recorded step. A world that has not stepped yet
/// exports its current state as the only step.
pub fn export(world: &World) -> SimResult<RunExport> {
    let steps = if world.history().is_empty() {
        vec![capture(world)?]
    } else {
        world.history().to_vec()
    };
    Ok(RunExport {
        width: world.grid().width(),
        height: world.grid().height(),
        agents: world
            .agents()
            .iter()
            .map(|agent| AgentInfo {
                agent_id: agent.id,
                tier: agent.tier,
            })
            .collect(),
        steps,
    })
}

/// Write an export to disk, creating parent directories as needed.
pub fn write_export(export: &RunExport, path: impl AsRef<Path>) -> SimResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, export.to_json()?)?;
    tracing::info!(path = %path.display(), steps = export.steps.len(), "run exported");
    Ok(())
}

pub fn load_export(path: impl AsRef<Path>) -> SimResult<RunExport> {
    let content = fs::read_to_string(path)?;
    Ok(RunExport::from_json(&content)?)
}
