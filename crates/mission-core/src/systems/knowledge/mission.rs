//! Mission Knowledge
//!
//! The rule facet every agent carries: legality of the four basic queries
//! against the latest perception, plus the derived queries the rule-based
//! policies steer by.

use std::any::Any;

use mission_events::{Tier, WasteId};

use super::Facet;
use crate::actions::Action;
use crate::components::geometry::{Direction, Position};
use crate::components::mailbox::Message;
use crate::components::waste::WasteView;
use crate::systems::perception::{CellView, Perception};

#[derive(Debug, Clone, Default)]
pub struct MissionKnowledge {
    perception: Option<Perception>,
    steps: u64,
    previous_position: Option<Position>,
}

impl MissionKnowledge {
    pub fn perception(&self) -> Option<&Perception> {
        self.perception.as_ref()
    }

    /// Number of updates received so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn tier(&self) -> Option<Tier> {
        self.perception.as_ref().map(|p| p.tier)
    }

    pub fn position(&self) -> Option<Position> {
        self.perception.as_ref().map(|p| p.position)
    }

    pub fn previous_position(&self) -> Option<Position> {
        self.previous_position
    }

    pub fn moved_last_turn(&self) -> bool {
        match (self.previous_position, self.position()) {
            (Some(before), Some(now)) => before != now,
            _ => false,
        }
    }

    pub fn dump(&self) -> Option<Position> {
        self.perception.as_ref().map(|p| p.dump)
    }

    pub fn at_dump(&self) -> bool {
        self.perception
            .as_ref()
            .is_some_and(|p| p.position == p.dump)
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.perception.as_ref().map(|p| (p.width, p.height))
    }

    pub fn inventory(&self) -> &[WasteView] {
        self.perception
            .as_ref()
            .map(|p| p.inventory.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_full(&self) -> bool {
        self.perception.as_ref().is_some_and(Perception::is_full)
    }

    /// Highest-tier carried item; the first one among equals.
    pub fn highest_waste(&self) -> Option<WasteView> {
        self.inventory()
            .iter()
            .copied()
            .reduce(|best, w| if w.tier > best.tier { w } else { best })
    }

    /// First carried item whose tier is above the agent's own.
    pub fn over_tier_waste(&self) -> Option<WasteView> {
        let tier = self.tier()?;
        self.inventory().iter().copied().find(|w| w.tier > tier)
    }

    /// Centre of a tier's zone.
    pub fn home_center(&self, tier: Tier) -> Option<Position> {
        self.perception
            .as_ref()
            .map(|p| p.layout.home_center(tier, p.height))
    }

    /// Furthest cell along `direction` that is still in the agent's own
    /// zone (for horizontal directions) or on the grid (for vertical ones).
    pub fn zone_edge(&self, direction: Direction) -> Option<Position> {
        let p = self.perception.as_ref()?;
        let columns = p.layout.columns(p.tier);
        let here = p.position;
        match direction {
            Direction::None => None,
            Direction::Up => Some(Position::new(here.x, p.height as i32 - 1)),
            Direction::Down => Some(Position::new(here.x, 0)),
            Direction::Left if !columns.is_empty() => Some(Position::new(columns.start as i32, here.y)),
            Direction::Right if !columns.is_empty() => Some(Position::new(columns.end as i32 - 1, here.y)),
            Direction::Left | Direction::Right => None,
        }
    }

    /// Whether the agent stands on the last column of its own zone.
    pub fn at_right_zone_edge(&self) -> bool {
        match (self.zone_edge(Direction::Right), self.position()) {
            (Some(edge), Some(here)) => here.x >= edge.x,
            _ => false,
        }
    }

    fn own_tier_waste_in(&self, cell: &CellView) -> bool {
        match (cell.waste, self.tier()) {
            (Some(waste), Some(tier)) => waste.tier == tier,
            _ => false,
        }
    }

    /// Closest visible waste of the agent's own tier, own cell first.
    pub fn nearest_same_tier_waste(&self) -> Option<Position> {
        let p = self.perception.as_ref()?;
        p.cells()
            .find(|(_, cell)| self.own_tier_waste_in(cell))
            .map(|(_, cell)| cell.position)
    }

    /// Reacts to own-tier waste in a neighbouring cell: step toward it when
    /// legal, wait when another agent stands on it. `None` when no such
    /// waste is visible, it lies on forbidden terrain, or the inventory is full.
    pub fn look_around(&self) -> Option<Action> {
        let p = self.perception.as_ref()?;
        if p.is_full() {
            return None;
        }
        for direction in Direction::CARDINAL {
            let Some(cell) = p.get(direction) else {
                continue;
            };
            if !self.own_tier_waste_in(cell) {
                continue;
            }
            if let Some(step) = self.try_move(direction) {
                return Some(step);
            }
            if cell.agent.is_some() {
                return Some(Action::Wait);
            }
        }
        None
    }
}

impl Facet for MissionKnowledge {
    fn name(&self) -> &'static str {
        "mission"
    }

    fn update(&mut self, perception: &Perception, _mail: &[Message]) {
        self.previous_position = self.position();
        self.perception = Some(perception.clone());
        self.steps += 1;
    }

    /// The first two carried items of the agent's own tier.
    fn try_merge(&self) -> Option<Action> {
        let tier = self.tier()?;
        let mut same_tier = self.inventory().iter().filter(|w| w.tier == tier);
        let first = same_tier.next()?;
        let second = same_tier.next()?;
        Some(Action::merging(first.id, second.id))
    }

    fn try_move(&self, direction: Direction) -> Option<Action> {
        let p = self.perception.as_ref()?;
        let cell = p.get(direction)?;
        if cell.agent.is_some() || cell.terrain > p.tier {
            return None;
        }
        Some(Action::moving(direction))
    }

    fn try_pick(&self) -> Option<Action> {
        let p = self.perception.as_ref()?;
        if p.is_full() {
            return None;
        }
        let waste = p.here()?.waste?;
        (waste.tier == p.tier).then_some(Action::Pick)
    }

    fn try_drop(&self, waste: WasteId) -> Option<Action> {
        let p = self.perception.as_ref()?;
        if !p.carries(waste) || p.here()?.waste.is_some() {
            return None;
        }
        Some(Action::dropping(waste))
    }

    fn clone_box(&self) -> Box<dyn Facet> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
