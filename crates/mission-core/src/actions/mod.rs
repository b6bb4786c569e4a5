//! Action Definitions
//!
//! The closed set of things an agent can attempt in one turn, and the fixed
//! index mapping used by learned policies.

use mission_events::WasteId;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::components::geometry::Direction;

/// Size of the discrete action space
pub const ACTION_COUNT: usize = 8;

/// Human-readable names, by action index
pub const ACTION_LABELS: [&str; ACTION_COUNT] = [
    "wait",
    "move_up",
    "move_down",
    "move_left",
    "move_right",
    "pick",
    "drop",
    "merge",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Wait,
    Move { direction: Direction },
    /// Take the waste on the current cell
    Pick,
    Drop { waste: WasteId },
    Merge { first: WasteId, second: WasteId },
}

impl Action {
    pub fn moving(direction: Direction) -> Self {
        Action::Move { direction }
    }

    pub fn dropping(waste: WasteId) -> Self {
        Action::Drop { waste }
    }

    pub fn merging(first: WasteId, second: WasteId) -> Self {
        Action::Merge { first, second }
    }

    /// Index of this action in the learned action space.
    pub fn index(&self) -> usize {
        match self {
            Action::Wait => 0,
            Action::Move { direction } => direction.index(),
            Action::Pick => 5,
            Action::Drop { .. } => 6,
            Action::Merge { .. } => 7,
        }
    }

    pub fn label(&self) -> &'static str {
        ACTION_LABELS[self.index()]
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Drop { waste } => write!(f, "drop({})", waste),
            Action::Merge { first, second } => write!(f, "merge({}, {})", first, second),
            other => f.write_str(other.label()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_mapping() {
        assert_eq!(Action::Wait.index(), 0);
        assert_eq!(Action::moving(Direction::Up).index(), 1);
        assert_eq!(Action::moving(Direction::Down).index(), 2);
        assert_eq!(Action::moving(Direction::Left).index(), 3);
        assert_eq!(Action::moving(Direction::Right).index(), 4);
        assert_eq!(Action::Pick.index(), 5);
        assert_eq!(Action::dropping(WasteId(1)).index(), 6);
        assert_eq!(Action::merging(WasteId(1), WasteId(2)).index(), 7);
        assert_eq!(Action::moving(Direction::Left).label(), "move_left");
    }

    #[test]
    fn test_display() {
        assert_eq!(Action::dropping(WasteId(4)).to_string(), "drop(waste_00004)");
        assert_eq!(Action::Pick.to_string(), "pick");
    }
}
