//! Simulation Components
//!
//! Grid, waste, mailbox and agent data.

pub mod agent;
pub mod geometry;
pub mod grid;
pub mod mailbox;
pub mod waste;

pub use agent::{Agent, Comms};
pub use geometry::{Direction, Position};
pub use grid::{Cell, Grid, Terrain, ZoneLayout};
pub use mailbox::{Information, Mailbox, Message, MessageKind};
pub use waste::{default_capacity, Inventory, Waste, WasteIdAllocator, WasteView};
