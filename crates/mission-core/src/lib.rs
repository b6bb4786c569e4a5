//! Robot Mission Simulation Engine Library
//!
//! Tiered robots collect, merge and dispose of waste on a zoned grid. The
//! public API covers world construction, stepping, recording and the
//! reinforcement-learning surface.

use rand::rngs::SmallRng;
use rand::SeedableRng;

pub mod actions;
pub mod components;
pub mod config;
pub mod error;
pub mod events;
pub mod output;
pub mod policy;
pub mod rl;
pub mod setup;
pub mod systems;
pub mod world;

pub use actions::Action;
pub use config::{ConfigError, PolicyKind, PolicyParams, SimulationConfig};
pub use error::{SimError, SimResult};
pub use mission_events::{AgentId, Tier, WasteId};
pub use setup::{AgentSpec, WorldBuilder};
pub use world::{StepReport, World};

/// Seeded random number generator owned by the world
#[derive(Debug, Clone)]
pub struct SimRng(pub SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self(SmallRng::seed_from_u64(seed))
    }
}
