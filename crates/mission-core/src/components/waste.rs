//! Waste and Inventory Components
//!
//! `Waste` is neither `Clone` nor `Copy`: a waste object lives in
//! exactly one place (a grid cell, an inventory, or the disposed list) and
//! moving it is the only way to change where.

use mission_events::{Tier, WasteId};
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// A waste object
#[derive(Debug, PartialEq, Eq)]
pub struct Waste {
    id: WasteId,
    tier: Tier,
}

impl Waste {
    pub(crate) fn new(id: WasteId, tier: Tier) -> Self {
        Self { id, tier }
    }

    pub fn id(&self) -> WasteId {
        self.id
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn view(&self) -> WasteView {
        WasteView {
            id: self.id,
            tier: self.tier,
        }
    }
}

/// Read-only copy of a waste's identity, used by perception and actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WasteView {
    pub id: WasteId,
    pub tier: Tier,
}

/// Hands out fresh waste ids, for initial scattering and for merges
#[derive(Debug, Default)]
pub struct WasteIdAllocator {
    next: u64,
}

impl WasteIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, tier: Tier) -> Waste {
        let id = WasteId(self.next);
        self.next += 1;
        Waste::new(id, tier)
    }

    /// Number of waste objects ever created.
    pub fn created(&self) -> u64 {
        self.next
    }
}

/// Default inventory capacity for an agent of the given tier.
pub fn default_capacity(tier: Tier) -> usize {
    if tier.is_terminal() {
        1
    } else {
        2
    }
}

/// Bounded, ordered collection of waste owned by one agent
#[derive(Debug)]
pub struct Inventory {
    wastes: Vec<Waste>,
    capacity: usize,
}

impl Inventory {
    pub fn new(capacity: usize) -> Self {
        Self {
            wastes: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.wastes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wastes.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.wastes.len() >= self.capacity
    }

    /// Identity check; two wastes of the same tier are still different items.
    pub fn contains(&self, id: WasteId) -> bool {
        self.wastes.iter().any(|w| w.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Waste> {
        self.wastes.iter()
    }

    pub fn views(&self) -> Vec<WasteView> {
        self.wastes.iter().map(Waste::view).collect()
    }

    pub fn tiers(&self) -> Vec<Tier> {
        self.wastes.iter().map(Waste::tier).collect()
    }

    pub fn count_tier(&self, tier: Tier) -> usize {
        self.wastes.iter().filter(|w| w.tier == tier).count()
    }

    pub fn add(&mut self, waste: Waste) -> SimResult<()> {
        if self.is_full() {
            return Err(SimError::InventoryFull {
                capacity: self.capacity,
            });
        }
        self.wastes.push(waste);
        Ok(())
    }

    pub fn remove(&mut self, id: WasteId) -> Option<Waste> {
        let index = self.wastes.iter().position(|w| w.id == id)?;
        Some(self.wastes.remove(index))
    }
}
