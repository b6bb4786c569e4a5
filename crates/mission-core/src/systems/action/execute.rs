//! Action Execution System
//!
//! Applies a gated action to the world and reports what happened.

use mission_events::{Event, EventKind, WasteId};

use super::can_apply;
use crate::actions::Action;
use crate::components::agent::Agent;
use crate::components::grid::Grid;
use crate::components::waste::{Waste, WasteIdAllocator};
use crate::error::{SimError, SimResult};

/// Events generated during the current step
#[derive(Debug, Default)]
pub struct TickEvents {
    pub events: Vec<Event>,
    next_event_id: u64,
}

impl TickEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generate_id(&mut self) -> String {
        self.next_event_id += 1;
        format!("evt_{:08}", self.next_event_id)
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Result of one attempted action
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    pub action: Action,
    pub applied: bool,
    pub events: Vec<EventKind>,
}

impl ActionOutcome {
    fn rejected(action: Action) -> Self {
        Self {
            action,
            applied: false,
            events: vec![EventKind::Rejected {
                action: action.to_string(),
            }],
        }
    }

    fn applied(action: Action, events: Vec<EventKind>) -> Self {
        Self {
            action,
            applied: true,
            events,
        }
    }
}

/// Runs `action` for `agent` if it is legal; otherwise nothing changes.
pub fn execute_action(
    action: Action,
    agent: &mut Agent,
    grid: &mut Grid,
    wastes: &mut WasteIdAllocator,
    disposed: &mut Vec<Waste>,
) -> SimResult<ActionOutcome> {
    if !can_apply(&action, grid, agent)? {
        tracing::trace!(agent = %agent.id, %action, "action rejected");
        return Ok(ActionOutcome::rejected(action));
    }

    let position = agent.position()?;
    let events = match action {
        Action::Wait => vec![EventKind::Waited],
        Action::Move { direction } => {
            let destination = position.offset(direction);
            grid.move_agent(position, destination)?;
            agent.set_position(destination);
            vec![EventKind::Moved {
                from: position.as_tuple(),
                to: destination.as_tuple(),
            }]
        }
        Action::Pick => {
            let waste = grid.take_waste(position)?;
            let event = EventKind::Picked {
                waste: waste.id(),
                tier: waste.tier(),
            };
            agent.inventory.add(waste)?;
            vec![event]
        }
        Action::Drop { waste } => {
            let waste = take_from_inventory(agent, waste)?;
            let terrain = grid.terrain(position)?;
            if terrain.dump && waste.tier().is_terminal() {
                let event = EventKind::Disposed {
                    waste: waste.id(),
                    tier: waste.tier(),
                };
                disposed.push(waste);
                vec![event]
            } else {
                let event = EventKind::Dropped {
                    waste: waste.id(),
                    tier: waste.tier(),
                    at: position.as_tuple(),
                };
                grid.place_waste(waste, position)?;
                vec![event]
            }
        }
        Action::Merge { first, second } => {
            let a = take_from_inventory(agent, first)?;
            let b = take_from_inventory(agent, second)?;
            let Some(tier) = a.tier().next() else {
                // The gate refuses terminal merges; reaching here means the
                // inventory changed under us.
                return Err(SimError::NotInInventory {
                    agent: agent.id,
                    waste: a.id(),
                });
            };
            let merged = wastes.create(tier);
            let event = EventKind::Merged {
                inputs: [a.id(), b.id()],
                output: merged.id(),
                tier,
            };
            agent.inventory.add(merged)?;
            vec![event]
        }
    };

    Ok(ActionOutcome::applied(action, events))
}

fn take_from_inventory(agent: &mut Agent, waste: WasteId) -> SimResult<Waste> {
    agent
        .inventory
        .remove(waste)
        .ok_or(SimError::NotInInventory {
            agent: agent.id,
            waste,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::geometry::{Direction, Position};
    use crate::components::grid::ZoneLayout;
    use crate::components::waste::{default_capacity, Inventory};
    use crate::policy::RandomPolicy;
    use crate::systems::knowledge::Knowledge;
    use mission_events::{AgentId, Tier};

    struct Bench {
        grid: Grid,
        ids: WasteIdAllocator,
        disposed: Vec<Waste>,
    }

    impl Bench {
        fn new() -> Self {
            let layout = ZoneLayout::new(9, [1.0 / 3.0; 3]).unwrap();
            let mut grid = Grid::new(5, &layout);
            grid.set_dump(Position::new(8, 2)).unwrap();
            Self {
                grid,
                ids: WasteIdAllocator::new(),
                disposed: Vec::new(),
            }
        }

        fn agent(&mut self, tier: Tier, at: Position) -> Agent {
            let mut agent = Agent::new(
                AgentId(0),
                tier,
                Inventory::new(default_capacity(tier)),
                Knowledge::mission_only(),
                None,
                Box::new(RandomPolicy),
            );
            self.grid.place_agent(agent.id, at).unwrap();
            agent.set_position(at);
            agent
        }

        fn run(&mut self, action: Action, agent: &mut Agent) -> ActionOutcome {
            execute_action(action, agent, &mut self.grid, &mut self.ids, &mut self.disposed).unwrap()
        }
    }

    #[test]
    fn test_move_updates_grid_and_agent() {
        let mut bench = Bench::new();
        let mut agent = bench.agent(Tier::Green, Position::new(1, 1));
        let outcome = bench.run(Action::moving(Direction::Up), &mut agent);

        assert!(outcome.applied);
        assert_eq!(agent.position().unwrap(), Position::new(1, 2));
        assert_eq!(bench.grid.agent_at(Position::new(1, 2)), Some(AgentId(0)));
        assert!(!bench.grid.is_occupied_by_agent(Position::new(1, 1)));
    }

    #[test]
    fn test_illegal_action_is_a_noop() {
        let mut bench = Bench::new();
        let mut agent = bench.agent(Tier::Green, Position::new(2, 1));
        let outcome = bench.run(Action::moving(Direction::Right), &mut agent);

        assert!(!outcome.applied);
        assert_eq!(outcome.events[0].label(), "rejected");
        assert_eq!(agent.position().unwrap(), Position::new(2, 1));
    }

    #[test]
    fn test_pick_then_merge_conserves_mass() {
        let mut bench = Bench::new();
        let mut agent = bench.agent(Tier::Green, Position::new(1, 1));
        let here = Position::new(1, 1);

        let first = bench.ids.create(Tier::Green);
        bench.grid.place_waste(first, here).unwrap();
        assert!(bench.run(Action::Pick, &mut agent).applied);
        assert!(!bench.grid.is_occupied_by_waste(here));

        let second = bench.ids.create(Tier::Green);
        bench.grid.place_waste(second, here).unwrap();
        assert!(bench.run(Action::Pick, &mut agent).applied);

        let ids: Vec<_> = agent.inventory.iter().map(|w| w.id()).collect();
        let outcome = bench.run(Action::merging(ids[0], ids[1]), &mut agent);
        assert!(outcome.applied);
        assert_eq!(agent.inventory.tiers(), vec![Tier::Yellow]);
        assert!(!agent.inventory.contains(ids[0]));
        assert!(matches!(
            outcome.events[0],
            EventKind::Merged { tier: Tier::Yellow, .. }
        ));
    }

    #[test]
    fn test_drop_on_dump_disposes_terminal_waste() {
        let mut bench = Bench::new();
        let dump = Position::new(8, 2);
        let mut red = bench.agent(Tier::Red, dump);
        let waste = bench.ids.create(Tier::Red);
        let waste_id = waste.id();
        red.inventory.add(waste).unwrap();

        let outcome = bench.run(Action::dropping(waste_id), &mut red);
        assert!(outcome.applied);
        assert!(red.inventory.is_empty());
        assert!(!bench.grid.is_occupied_by_waste(dump));
        assert_eq!(bench.disposed.len(), 1);
        assert_eq!(outcome.events[0].label(), "disposed");
    }

    #[test]
    fn test_drop_elsewhere_places_on_cell() {
        let mut bench = Bench::new();
        let mut agent = bench.agent(Tier::Green, Position::new(2, 3));
        let waste = bench.ids.create(Tier::Yellow);
        let waste_id = waste.id();
        agent.inventory.add(waste).unwrap();

        bench.run(Action::dropping(waste_id), &mut agent);
        assert_eq!(
            bench.grid.waste_at(Position::new(2, 3)).map(|w| w.tier()),
            Some(Tier::Yellow)
        );
        assert!(bench.disposed.is_empty());

        // A second drop on the same cell is refused.
        let outcome = bench.run(Action::dropping(waste_id), &mut agent);
        assert!(!outcome.applied);
    }
}
