//! Tier Types
//!
//! The ordered tier (colour) shared by zones, waste and agents.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordered waste severity / agent capability / zone colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Green,
    Yellow,
    Red,
}

impl Tier {
    /// Number of tiers.
    pub const COUNT: usize = 3;

    /// Returns all tiers in ascending order.
    pub fn all() -> [Tier; Tier::COUNT] {
        [Tier::Green, Tier::Yellow, Tier::Red]
    }

    /// Zero-based rank of this tier.
    pub fn index(self) -> usize {
        match self {
            Tier::Green => 0,
            Tier::Yellow => 1,
            Tier::Red => 2,
        }
    }

    /// Returns the tier with the given rank, if any.
    pub fn from_index(index: usize) -> Option<Tier> {
        Tier::all().get(index).copied()
    }

    /// The tier produced by merging two wastes of this tier.
    /// `None` for the terminal tier.
    pub fn next(self) -> Option<Tier> {
        Tier::from_index(self.index() + 1)
    }

    /// The tier directly below, if any.
    pub fn previous(self) -> Option<Tier> {
        self.index().checked_sub(1).and_then(Tier::from_index)
    }

    /// Terminal waste cannot be merged and is retired at the dump.
    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    /// Mass of one waste of this tier, in lowest-tier units.
    pub fn mass(self) -> u64 {
        1 << self.index()
    }

    /// Lowercase name, matching the serialized form.
    pub fn name(self) -> &'static str {
        match self {
            Tier::Green => "green",
            Tier::Yellow => "yellow",
            Tier::Red => "red",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown tier name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTierError(pub String);

impl fmt::Display for ParseTierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown tier '{}' (expected green, yellow or red)", self.0)
    }
}

impl std::error::Error for ParseTierError {}

impl FromStr for Tier {
    type Err = ParseTierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "green" => Ok(Tier::Green),
            "yellow" => Ok(Tier::Yellow),
            "red" => Ok(Tier::Red),
            _ => Err(ParseTierError(s.to_string())),
        }
    }
}
