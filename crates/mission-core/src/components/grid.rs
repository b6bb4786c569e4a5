//! Grid and Zone Components
//!
//! A bounded, non-wrapping grid. Each cell carries one terrain marker and at
//! most one waste and one agent; the `Option` slots make "two of a kind in a
//! cell" unrepresentable, and placing into an occupied slot is an error.

use mission_events::{AgentId, Tier};
use serde::{Deserialize, Serialize};
use std::ops::Range;

use super::geometry::{Direction, Position};
use super::waste::Waste;
use crate::config::ConfigError;
use crate::error::{SimError, SimResult};

/// Column partition of the grid into tier zones.
///
/// Borders are `floor(width * cumulative_proportion)`, so the last zone
/// absorbs any rounding remainder and the zones always cover the full width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneLayout {
    width: u32,
    /// First column of each zone after the first
    borders: [u32; Tier::COUNT - 1],
}

impl ZoneLayout {
    const TOLERANCE: f64 = 1e-6;

    pub fn new(width: u32, proportions: [f64; Tier::COUNT]) -> Result<Self, ConfigError> {
        if width == 0 {
            return Err(ConfigError::Invalid("grid width must be positive".into()));
        }
        if let Some(p) = proportions.iter().find(|p| !p.is_finite() || **p < 0.0) {
            return Err(ConfigError::Invalid(format!(
                "zone proportions must be non-negative, got {}",
                p
            )));
        }
        let total: f64 = proportions.iter().sum();
        if (total - 1.0).abs() > Self::TOLERANCE {
            return Err(ConfigError::Invalid(format!(
                "zone proportions must sum to 1, got {:.6}",
                total
            )));
        }

        let mut borders = [0u32; Tier::COUNT - 1];
        let mut cumulative = 0.0;
        for (border, proportion) in borders.iter_mut().zip(proportions.iter()) {
            cumulative += proportion;
            // Nudge so that 1/3 + 1/3 of 9 lands on 6, not 5.999...
            let column = (width as f64 * cumulative + Self::TOLERANCE).floor() as u32;
            *border = column.min(width);
        }

        Ok(Self { width, borders })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    /// Zone tier of column `x`. Columns outside the grid clamp to the edge zones.
    pub fn tier_at(&self, x: i32) -> Tier {
        let x = x.max(0) as u32;
        let rank = self.borders.iter().filter(|border| x >= **border).count();
        Tier::from_index(rank).unwrap_or(Tier::Red)
    }

    /// Columns belonging to `tier`'s zone; may be empty.
    pub fn columns(&self, tier: Tier) -> Range<u32> {
        let index = tier.index();
        let start = if index == 0 { 0 } else { self.borders[index - 1] };
        let end = self.borders.get(index).copied().unwrap_or(self.width);
        start..end.max(start)
    }

    /// Centre cell of a tier's zone, used as a homing point.
    pub fn home_center(&self, tier: Tier, height: u32) -> Position {
        let columns = self.columns(tier);
        let x = if columns.is_empty() {
            columns.start.min(self.width.saturating_sub(1))
        } else {
            columns.start + (columns.end - columns.start - 1) / 2
        };
        Position::new(x as i32, (height.saturating_sub(1) / 2) as i32)
    }
}

/// Terrain marker of one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Terrain {
    pub tier: Tier,
    /// The single disposal cell
    pub dump: bool,
}

/// Contents of one cell
#[derive(Debug)]
pub struct Cell {
    pub terrain: Terrain,
    pub waste: Option<Waste>,
    pub agent: Option<AgentId>,
}

/// The spatial grid
#[derive(Debug)]
pub struct Grid {
    width: u32,
    height: u32,
    layout: ZoneLayout,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates an empty grid coloured by `layout`.
    pub fn new(height: u32, layout: &ZoneLayout) -> Self {
        let width = layout.width();
        let mut cells = Vec::with_capacity((width * height) as usize);
        for _y in 0..height {
            for x in 0..width {
                cells.push(Cell {
                    terrain: Terrain {
                        tier: layout.tier_at(x as i32),
                        dump: false,
                    },
                    waste: None,
                    agent: None,
                });
            }
        }
        Self {
            width,
            height,
            layout: *layout,
            cells,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    fn index(&self, pos: Position) -> SimResult<usize> {
        if !self.in_bounds(pos) {
            return Err(SimError::OutOfBounds {
                pos,
                width: self.width,
                height: self.height,
            });
        }
        Ok(pos.y as usize * self.width as usize + pos.x as usize)
    }

    pub fn cell(&self, pos: Position) -> SimResult<&Cell> {
        let index = self.index(pos)?;
        Ok(&self.cells[index])
    }

    fn cell_mut(&mut self, pos: Position) -> SimResult<&mut Cell> {
        let index = self.index(pos)?;
        Ok(&mut self.cells[index])
    }

    pub fn terrain(&self, pos: Position) -> SimResult<Terrain> {
        Ok(self.cell(pos)?.terrain)
    }

    /// Marks the disposal cell; its terrain becomes terminal-tier. A previous
    /// dump cell gets its zone colour back.
    pub fn set_dump(&mut self, pos: Position) -> SimResult<()> {
        let index = self.index(pos)?;
        let width = self.width as usize;
        for (i, cell) in self.cells.iter_mut().enumerate() {
            if cell.terrain.dump {
                cell.terrain = Terrain {
                    tier: self.layout.tier_at((i % width) as i32),
                    dump: false,
                };
            }
        }
        self.cells[index].terrain = Terrain {
            tier: Tier::Red,
            dump: true,
        };
        Ok(())
    }

    /// The neighbour of `pos` in `direction`, if it is inside the grid.
    pub fn step(&self, pos: Position, direction: Direction) -> Option<Position> {
        let next = pos.offset(direction);
        self.in_bounds(next).then_some(next)
    }

    /// In-bounds cardinal neighbours of `pos`.
    pub fn neighbors(&self, pos: Position) -> Vec<Position> {
        Direction::CARDINAL
            .iter()
            .filter_map(|d| self.step(pos, *d))
            .collect()
    }

    pub fn is_occupied_by_agent(&self, pos: Position) -> bool {
        self.agent_at(pos).is_some()
    }

    pub fn is_occupied_by_waste(&self, pos: Position) -> bool {
        self.waste_at(pos).is_some()
    }

    pub fn agent_at(&self, pos: Position) -> Option<AgentId> {
        self.cell(pos).ok().and_then(|c| c.agent)
    }

    pub fn waste_at(&self, pos: Position) -> Option<&Waste> {
        self.cell(pos).ok().and_then(|c| c.waste.as_ref())
    }

    pub fn place_agent(&mut self, agent: AgentId, pos: Position) -> SimResult<()> {
        let cell = self.cell_mut(pos)?;
        if cell.agent.is_some() {
            return Err(SimError::CellOccupied { pos, what: "an agent" });
        }
        cell.agent = Some(agent);
        Ok(())
    }

    pub fn remove_agent(&mut self, pos: Position) -> SimResult<AgentId> {
        self.cell_mut(pos)?
            .agent
            .take()
            .ok_or(SimError::NoAgentAt(pos))
    }

    /// Relocates the agent standing at `from`. Game legality is checked by
    /// the caller; only the single-occupancy invariant is enforced here.
    pub fn move_agent(&mut self, from: Position, to: Position) -> SimResult<()> {
        if self.cell(to)?.agent.is_some() {
            return Err(SimError::CellOccupied { pos: to, what: "an agent" });
        }
        let agent = self.remove_agent(from)?;
        self.place_agent(agent, to)
    }

    pub fn place_waste(&mut self, waste: Waste, pos: Position) -> SimResult<()> {
        let cell = self.cell_mut(pos)?;
        if cell.waste.is_some() {
            return Err(SimError::CellOccupied { pos, what: "a waste" });
        }
        cell.waste = Some(waste);
        Ok(())
    }

    pub fn take_waste(&mut self, pos: Position) -> SimResult<Waste> {
        self.cell_mut(pos)?
            .waste
            .take()
            .ok_or(SimError::NoWasteAt(pos))
    }

    /// All positions, row by row from the bottom.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        let width = self.width as i32;
        (0..self.cells.len() as i32).map(move |i| Position::new(i % width, i / width))
    }

    /// Free-standing waste, in row-major order.
    pub fn wastes(&self) -> impl Iterator<Item = (Position, &Waste)> + '_ {
        self.positions()
            .zip(self.cells.iter())
            .filter_map(|(pos, cell)| cell.waste.as_ref().map(|w| (pos, w)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::waste::WasteIdAllocator;

    const THIRDS: [f64; 3] = [1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0];

    #[test]
    fn test_zone_borders_partition_width() {
        let layout = ZoneLayout::new(10, THIRDS).unwrap();
        assert_eq!(layout.columns(Tier::Green), 0..3);
        assert_eq!(layout.columns(Tier::Yellow), 3..6);
        assert_eq!(layout.columns(Tier::Red), 6..10);

        let layout = ZoneLayout::new(9, THIRDS).unwrap();
        assert_eq!(layout.columns(Tier::Yellow), 3..6);
        assert_eq!(layout.columns(Tier::Red), 6..9);

        let total: u32 = Tier::all()
            .iter()
            .map(|t| layout.columns(*t).len() as u32)
            .sum();
        assert_eq!(total, 9);
    }

    #[test]
    fn test_zone_tier_lookup() {
        let layout = ZoneLayout::new(10, [0.5, 0.3, 0.2]).unwrap();
        assert_eq!(layout.tier_at(0), Tier::Green);
        assert_eq!(layout.tier_at(4), Tier::Green);
        assert_eq!(layout.tier_at(5), Tier::Yellow);
        assert_eq!(layout.tier_at(8), Tier::Red);
        assert_eq!(layout.home_center(Tier::Green, 10), Position::new(2, 4));
    }

    #[test]
    fn test_zone_validation() {
        assert!(ZoneLayout::new(10, [0.5, 0.5, 0.5]).is_err());
        assert!(ZoneLayout::new(10, [1.2, -0.2, 0.0]).is_err());
        assert!(ZoneLayout::new(0, THIRDS).is_err());
        assert!(ZoneLayout::new(10, [1.0, 0.0, 0.0]).is_ok());
    }

    #[test]
    fn test_bounds_and_neighbors() {
        let layout = ZoneLayout::new(4, THIRDS).unwrap();
        let grid = Grid::new(3, &layout);
        assert!(grid.in_bounds(Position::new(3, 2)));
        assert!(!grid.in_bounds(Position::new(4, 0)));
        assert!(!grid.in_bounds(Position::new(0, -1)));
        assert!(grid.cell(Position::new(-1, 0)).is_err());

        assert_eq!(grid.neighbors(Position::new(0, 0)).len(), 2);
        assert_eq!(grid.neighbors(Position::new(1, 1)).len(), 4);
        assert_eq!(grid.step(Position::new(0, 0), Direction::Left), None);
    }

    #[test]
    fn test_single_occupancy() {
        let layout = ZoneLayout::new(5, THIRDS).unwrap();
        let mut grid = Grid::new(5, &layout);
        let mut ids = WasteIdAllocator::new();
        let here = Position::new(1, 1);

        grid.place_agent(AgentId(0), here).unwrap();
        assert!(matches!(
            grid.place_agent(AgentId(1), here),
            Err(SimError::CellOccupied { .. })
        ));

        grid.place_waste(ids.create(Tier::Green), here).unwrap();
        assert!(grid.place_waste(ids.create(Tier::Green), here).is_err());
        assert!(grid.is_occupied_by_agent(here));
        assert!(grid.is_occupied_by_waste(here));

        grid.place_agent(AgentId(1), Position::new(2, 1)).unwrap();
        assert!(grid.move_agent(here, Position::new(2, 1)).is_err());
        grid.move_agent(here, Position::new(1, 2)).unwrap();
        assert_eq!(grid.agent_at(Position::new(1, 2)), Some(AgentId(0)));
        assert!(!grid.is_occupied_by_agent(here));
    }

    #[test]
    fn test_take_waste_from_empty_cell_fails() {
        let layout = ZoneLayout::new(3, THIRDS).unwrap();
        let mut grid = Grid::new(3, &layout);
        assert!(matches!(
            grid.take_waste(Position::new(0, 0)),
            Err(SimError::NoWasteAt(_))
        ));
    }

    #[test]
    fn test_dump_overrides_zone() {
        let layout = ZoneLayout::new(6, THIRDS).unwrap();
        let mut grid = Grid::new(4, &layout);
        grid.set_dump(Position::new(5, 2)).unwrap();
        let terrain = grid.terrain(Position::new(5, 2)).unwrap();
        assert!(terrain.dump);
        assert_eq!(terrain.tier, Tier::Red);
        assert!(!grid.terrain(Position::new(5, 1)).unwrap().dump);
    }

    #[test]
    fn test_moving_dump_restores_zone() {
        let layout = ZoneLayout::new(6, THIRDS).unwrap();
        let mut grid = Grid::new(4, &layout);
        grid.set_dump(Position::new(1, 2)).unwrap();
        assert_eq!(grid.terrain(Position::new(1, 2)).unwrap().tier, Tier::Red);

        grid.set_dump(Position::new(5, 3)).unwrap();
        let old = grid.terrain(Position::new(1, 2)).unwrap();
        assert_eq!(old, Terrain { tier: Tier::Green, dump: false });
        assert!(grid.terrain(Position::new(5, 3)).unwrap().dump);

        // A rejected move leaves the current dump in place.
        assert!(grid.set_dump(Position::new(9, 9)).is_err());
        assert!(grid.terrain(Position::new(5, 3)).unwrap().dump);
    }
}
