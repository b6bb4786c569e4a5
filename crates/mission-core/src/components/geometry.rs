//! Grid Geometry
//!
//! Positions and the five perception directions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A cell coordinate. `x` grows to the right, `y` grows upward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring coordinate in `direction`, unchecked against any grid.
    pub fn offset(self, direction: Direction) -> Position {
        let (dx, dy) = direction.delta();
        Position::new(self.x + dx, self.y + dy)
    }

    pub fn manhattan(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    pub fn as_tuple(self) -> (i32, i32) {
        (self.x, self.y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// `None` addresses the agent's own cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    None,
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All five directions, own cell first.
    pub const ALL: [Direction; 5] = [
        Direction::None,
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// The four cardinal directions.
    pub const CARDINAL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::None => (0, 0),
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::None => Direction::None,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    /// Slot of this direction in fixed-size per-direction arrays.
    pub fn index(self) -> usize {
        match self {
            Direction::None => 0,
            Direction::Up => 1,
            Direction::Down => 2,
            Direction::Left => 3,
            Direction::Right => 4,
        }
    }

    /// The direction leading from `from` to the adjacent or equal `to`.
    /// Returns `None` (the Rust option) when the cells are not adjacent.
    pub fn between(from: Position, to: Position) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|d| from.offset(*d) == to)
    }

    /// Horizontal-first step that reduces the distance from `from` to `to`,
    /// or the vertical one. `Direction::None` when already there.
    pub fn toward(from: Position, to: Position) -> [Direction; 2] {
        let horizontal = match to.x.cmp(&from.x) {
            std::cmp::Ordering::Greater => Direction::Right,
            std::cmp::Ordering::Less => Direction::Left,
            std::cmp::Ordering::Equal => Direction::None,
        };
        let vertical = match to.y.cmp(&from.y) {
            std::cmp::Ordering::Greater => Direction::Up,
            std::cmp::Ordering::Less => Direction::Down,
            std::cmp::Ordering::Equal => Direction::None,
        };
        [horizontal, vertical]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_and_opposites() {
        let origin = Position::new(3, 3);
        assert_eq!(origin.offset(Direction::Up), Position::new(3, 4));
        assert_eq!(origin.offset(Direction::Down), Position::new(3, 2));
        assert_eq!(origin.offset(Direction::Left), Position::new(2, 3));
        assert_eq!(origin.offset(Direction::Right), Position::new(4, 3));
        assert_eq!(origin.offset(Direction::None), origin);

        for d in Direction::CARDINAL {
            assert_eq!(origin.offset(d).offset(d.opposite()), origin);
        }
    }

    #[test]
    fn test_between_and_toward() {
        let a = Position::new(1, 1);
        assert_eq!(Direction::between(a, Position::new(1, 2)), Some(Direction::Up));
        assert_eq!(Direction::between(a, a), Some(Direction::None));
        assert_eq!(Direction::between(a, Position::new(3, 1)), None);

        let steps = Direction::toward(a, Position::new(4, 0));
        assert_eq!(steps, [Direction::Right, Direction::Down]);
        assert_eq!(a.manhattan(Position::new(4, 0)), 4);
    }
}
