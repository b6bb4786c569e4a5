//! Perception System
//!
//! Builds each agent's local view: its own cell plus the in-bounds
//! orthogonal neighbours, together with what it knows about itself.
//! A perception is an owned snapshot, so it stays valid after the world moves on.

use mission_events::{AgentId, Tier, WasteId};
use serde::{Deserialize, Serialize};

use crate::components::agent::Agent;
use crate::components::geometry::{Direction, Position};
use crate::components::grid::{Grid, ZoneLayout};
use crate::components::waste::WasteView;
use crate::error::{SimError, SimResult};

/// Another agent as seen from a neighbouring cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentView {
    pub id: AgentId,
    pub tier: Tier,
    pub inventory: Vec<Tier>,
}

/// One observed cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellView {
    pub position: Position,
    pub terrain: Tier,
    pub dump: bool,
    pub waste: Option<WasteView>,
    pub agent: Option<AgentView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Perception {
    pub agent_id: AgentId,
    pub tier: Tier,
    pub position: Position,
    pub inventory: Vec<WasteView>,
    pub capacity: usize,
    pub dump: Position,
    pub width: u32,
    pub height: u32,
    pub layout: ZoneLayout,
    /// Indexed by `Direction::index`; `None` where the grid ends
    cells: [Option<CellView>; 5],
}

impl Perception {
    /// Whether `direction` leads to a cell inside the grid.
    pub fn contains(&self, direction: Direction) -> bool {
        self.cells[direction.index()].is_some()
    }

    pub fn get(&self, direction: Direction) -> Option<&CellView> {
        self.cells[direction.index()].as_ref()
    }

    /// The agent's own cell, which is always observed.
    pub fn here(&self) -> Option<&CellView> {
        self.get(Direction::None)
    }

    /// Observed cells with their direction, own cell first.
    pub fn cells(&self) -> impl Iterator<Item = (Direction, &CellView)> {
        Direction::ALL
            .into_iter()
            .filter_map(|d| self.get(d).map(|cell| (d, cell)))
    }

    pub fn is_full(&self) -> bool {
        self.inventory.len() >= self.capacity
    }

    pub fn carries(&self, waste: WasteId) -> bool {
        self.inventory.iter().any(|w| w.id == waste)
    }
}

/// Builds the perception of `agents[agent_index]`.
pub fn build_perception(
    grid: &Grid,
    agents: &[Agent],
    agent_index: usize,
    layout: &ZoneLayout,
    dump: Position,
) -> SimResult<Perception> {
    let agent = agents.get(agent_index).ok_or_else(|| SimError::UnknownAgent {
        id: AgentId(agent_index as u32),
        valid: agents.iter().map(|a| a.id).collect(),
    })?;
    let position = agent.position()?;

    let mut cells: [Option<CellView>; 5] = Default::default();
    for direction in Direction::ALL {
        let Some(target) = grid.step(position, direction) else {
            continue;
        };
        let cell = grid.cell(target)?;
        let agent_view = match cell.agent {
            Some(id) => {
                let other = agents
                    .iter()
                    .find(|a| a.id == id)
                    .ok_or_else(|| SimError::UnknownAgent {
                        id,
                        valid: agents.iter().map(|a| a.id).collect(),
                    })?;
                Some(AgentView {
                    id,
                    tier: other.tier,
                    inventory: other.inventory.tiers(),
                })
            }
            None => None,
        };
        cells[direction.index()] = Some(CellView {
            position: target,
            terrain: cell.terrain.tier,
            dump: cell.terrain.dump,
            waste: cell.waste.as_ref().map(|w| w.view()),
            agent: agent_view,
        });
    }

    Ok(Perception {
        agent_id: agent.id,
        tier: agent.tier,
        position,
        inventory: agent.inventory.views(),
        capacity: agent.inventory.capacity(),
        dump,
        width: grid.width(),
        height: grid.height(),
        layout: *layout,
        cells,
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Hand-built perception for knowledge and policy tests.
    pub struct PerceptionBuilder {
        perception: Perception,
    }

    impl PerceptionBuilder {
        /// A lone agent in the middle of an empty 9x9 grid with thirds zones.
        pub fn new(tier: Tier, position: Position) -> Self {
            let layout = ZoneLayout::new(9, [1.0 / 3.0; 3]).unwrap();
            let mut cells: [Option<CellView>; 5] = Default::default();
            for direction in Direction::ALL {
                let target = position.offset(direction);
                if target.x < 0 || target.y < 0 || target.x >= 9 || target.y >= 9 {
                    continue;
                }
                cells[direction.index()] = Some(CellView {
                    position: target,
                    terrain: layout.tier_at(target.x),
                    dump: false,
                    waste: None,
                    agent: None,
                });
            }
            cells[0].as_mut().unwrap().agent = Some(AgentView {
                id: AgentId(0),
                tier,
                inventory: vec![],
            });
            Self {
                perception: Perception {
                    agent_id: AgentId(0),
                    tier,
                    position,
                    inventory: vec![],
                    capacity: crate::components::waste::default_capacity(tier),
                    dump: Position::new(8, 4),
                    width: 9,
                    height: 9,
                    layout,
                    cells,
                },
            }
        }

        pub fn waste(mut self, direction: Direction, id: u64, tier: Tier) -> Self {
            if let Some(cell) = self.perception.cells[direction.index()].as_mut() {
                cell.waste = Some(WasteView {
                    id: WasteId(id),
                    tier,
                });
            }
            self
        }

        pub fn agent(mut self, direction: Direction, id: u32, tier: Tier) -> Self {
            if let Some(cell) = self.perception.cells[direction.index()].as_mut() {
                cell.agent = Some(AgentView {
                    id: AgentId(id),
                    tier,
                    inventory: vec![],
                });
            }
            self
        }

        pub fn agent_carrying(mut self, direction: Direction, id: u32, tier: Tier, inventory: &[Tier]) -> Self {
            if let Some(cell) = self.perception.cells[direction.index()].as_mut() {
                cell.agent = Some(AgentView {
                    id: AgentId(id),
                    tier,
                    inventory: inventory.to_vec(),
                });
            }
            self
        }

        pub fn carrying(mut self, id: u64, tier: Tier) -> Self {
            self.perception.inventory.push(WasteView {
                id: WasteId(id),
                tier,
            });
            self
        }

        pub fn dump(mut self, dump: Position) -> Self {
            self.perception.dump = dump;
            for cell in self.perception.cells.iter_mut().flatten() {
                if cell.position == dump {
                    cell.dump = true;
                    cell.terrain = Tier::Red;
                }
            }
            self
        }

        pub fn build(self) -> Perception {
            self.perception
        }
    }
}
