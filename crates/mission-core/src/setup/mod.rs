//! World Setup
//!
//! Grid construction, zone population and agent spawning.

pub mod agents;
pub mod world;

pub use agents::{knowledge_for, AgentSpec};
pub use world::{check_zone_capacity, world_from_config, WorldBuilder};
