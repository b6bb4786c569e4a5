//! World and Turn Engine
//!
//! The world owns the grid, the agent arena, the waste bookkeeping and the
//! RNG. One step visits every agent once in a fresh seeded order; each turn
//! is perceive, decide, act, re-perceive, then deliver mail.

use std::collections::BTreeMap;

use mission_events::{AgentId, Event, EventKind, RunExport, StepSnapshot, Tier, WasteId};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use crate::components::agent::Agent;
use crate::components::geometry::Position;
use crate::components::grid::{Grid, ZoneLayout};
use crate::components::mailbox::{Information, Message};
use crate::components::waste::{Waste, WasteIdAllocator};
use crate::error::{SimError, SimResult};
use crate::output::snapshot;
use crate::policy::{act_from_index, TurnContext};
use crate::setup::AgentSpec;
use crate::systems::action::{execute_action, ActionOutcome, TickEvents};
use crate::systems::messaging::MessageService;
use crate::systems::perception::build_perception;
use crate::SimRng;

/// What happened during one step
#[derive(Debug, Clone, Default)]
pub struct StepReport {
    pub step: u64,
    /// One outcome per agent, in turn order
    pub outcomes: Vec<(AgentId, ActionOutcome)>,
    pub events: Vec<Event>,
}

impl StepReport {
    pub fn outcome(&self, agent: AgentId) -> Option<&ActionOutcome> {
        self.outcomes
            .iter()
            .find(|(id, _)| *id == agent)
            .map(|(_, outcome)| outcome)
    }

    pub fn turn_order(&self) -> Vec<AgentId> {
        self.outcomes.iter().map(|(id, _)| *id).collect()
    }
}

pub struct World {
    grid: Grid,
    layout: ZoneLayout,
    dump: Position,
    agents: Vec<Agent>,
    waste_ids: WasteIdAllocator,
    disposed: Vec<Waste>,
    rng: SimRng,
    step: u64,
    messaging: MessageService,
    events: TickEvents,
    /// Snapshot after every step, starting with the initial layout
    history: Vec<StepSnapshot>,
}

impl World {
    /// An empty world. The dump cell takes terminal terrain.
    pub fn new(height: u32, layout: ZoneLayout, dump: Position, rng: SimRng) -> SimResult<Self> {
        let mut grid = Grid::new(height, &layout);
        grid.set_dump(dump)?;
        tracing::info!(
            width = grid.width(),
            height = grid.height(),
            dump = %dump,
            "world created"
        );
        Ok(Self {
            grid,
            layout,
            dump,
            agents: Vec::new(),
            waste_ids: WasteIdAllocator::new(),
            disposed: Vec::new(),
            rng,
            step: 0,
            messaging: MessageService::new(),
            events: TickEvents::new(),
            history: Vec::new(),
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn layout(&self) -> &ZoneLayout {
        &self.layout
    }

    pub fn dump(&self) -> Position {
        self.dump
    }

    /// Agents in arena order, which is also id order.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> SimResult<&Agent> {
        let index = self.index_of(id)?;
        Ok(&self.agents[index])
    }

    pub fn agent_mut(&mut self, id: AgentId) -> SimResult<&mut Agent> {
        let index = self.index_of(id)?;
        Ok(&mut self.agents[index])
    }

    pub fn rng_mut(&mut self) -> &mut SmallRng {
        &mut self.rng.0
    }

    /// Steps completed so far.
    pub fn step_count(&self) -> u64 {
        self.step
    }

    pub fn disposed(&self) -> &[Waste] {
        &self.disposed
    }

    pub fn wastes_created(&self) -> u64 {
        self.waste_ids.created()
    }

    pub fn history(&self) -> &[StepSnapshot] {
        &self.history
    }

    fn index_of(&self, id: AgentId) -> SimResult<usize> {
        let index = id.0 as usize;
        match self.agents.get(index) {
            Some(agent) if agent.id == id => Ok(index),
            _ => Err(SimError::UnknownAgent {
                id,
                valid: self.agents.iter().map(|a| a.id).collect(),
            }),
        }
    }

    /// Places a new agent. Ids are handed out in spawn order.
    pub fn spawn_agent(&mut self, spec: AgentSpec, position: Position) -> SimResult<AgentId> {
        let index = self.agents.len();
        let id = AgentId(index as u32);
        self.grid.place_agent(id, position)?;

        let mut agent = spec.into_agent(id);
        agent.set_position(position);
        tracing::debug!(agent = %id, tier = %agent.tier, at = %position, policy = agent.policy.name(), "agent spawned");
        self.agents.push(agent);
        self.messaging.register(id, index);
        self.refresh_perception(index)?;
        Ok(id)
    }

    /// Puts a fresh waste of `tier` on an empty cell.
    pub fn spawn_waste(&mut self, tier: Tier, position: Position) -> SimResult<WasteId> {
        if self.grid.is_occupied_by_waste(position) {
            return Err(SimError::CellOccupied {
                pos: position,
                what: "waste",
            });
        }
        let waste = self.waste_ids.create(tier);
        let id = waste.id();
        self.grid.place_waste(waste, position)?;
        Ok(id)
    }

    /// Puts a fresh waste of `tier` straight into an agent's inventory.
    pub fn give_waste(&mut self, agent: AgentId, tier: Tier) -> SimResult<WasteId> {
        let index = self.index_of(agent)?;
        let capacity = self.agents[index].inventory.capacity();
        if self.agents[index].inventory.is_full() {
            return Err(SimError::InventoryFull { capacity });
        }
        let waste = self.waste_ids.create(tier);
        let id = waste.id();
        self.agents[index].inventory.add(waste)?;
        self.refresh_perception(index)?;
        Ok(id)
    }

    fn refresh_perception(&mut self, index: usize) -> SimResult<()> {
        let perception = build_perception(&self.grid, &self.agents, index, &self.layout, self.dump)?;
        self.agents[index].perception = Some(perception);
        Ok(())
    }

    /// Re-perceives every agent from the current grid.
    pub fn refresh_perceptions(&mut self) -> SimResult<()> {
        for index in 0..self.agents.len() {
            self.refresh_perception(index)?;
        }
        Ok(())
    }

    /// No waste left on the grid or in any inventory.
    pub fn is_done(&self) -> bool {
        self.grid.wastes().next().is_none() && self.agents.iter().all(|a| a.inventory.is_empty())
    }

    pub fn snapshot(&self) -> SimResult<StepSnapshot> {
        snapshot::capture(self)
    }

    /// Roster and recorded steps.
    pub fn export(&self) -> SimResult<RunExport> {
        snapshot::export(self)
    }

    /// Forgets per-episode policy state such as recurrent memory.
    pub fn reset_policies(&mut self) {
        for agent in &mut self.agents {
            agent.policy.reset();
        }
    }

    /// Setup may have placed things after the first agents perceived, so
    /// perceptions are rebuilt and the initial layout recorded once.
    fn ensure_started(&mut self) -> SimResult<()> {
        if self.history.is_empty() {
            self.refresh_perceptions()?;
            let initial = self.snapshot()?;
            self.history.push(initial);
        }
        Ok(())
    }

    /// Runs one step with every agent deciding through its policy.
    pub fn step(&mut self) -> SimResult<StepReport> {
        self.step_with_choices(&BTreeMap::new())
    }

    /// Runs one step; agents named in `choices` take the given action index
    /// instead of consulting their policy.
    pub fn step_with_choices(&mut self, choices: &BTreeMap<AgentId, usize>) -> SimResult<StepReport> {
        for id in choices.keys() {
            self.index_of(*id)?;
        }
        self.ensure_started()?;
        self.step += 1;

        let mut order: Vec<usize> = (0..self.agents.len()).collect();
        order.shuffle(&mut self.rng.0);

        let mut outcomes = Vec::with_capacity(order.len());
        for index in order {
            let id = self.agents[index].id;
            let outcome = self.take_turn(index, choices.get(&id).copied())?;
            outcomes.push((id, outcome));
        }

        let events = self.events.drain();
        let snapshot = self.snapshot()?;
        self.history.push(snapshot);
        tracing::debug!(step = self.step, events = events.len(), "step complete");

        Ok(StepReport {
            step: self.step,
            outcomes,
            events,
        })
    }

    fn take_turn(&mut self, index: usize, choice: Option<usize>) -> SimResult<ActionOutcome> {
        let mut outbox = Vec::new();
        let agent = &mut self.agents[index];
        let id = agent.id;

        if let Some(perception) = agent.perception.as_ref() {
            agent
                .knowledge
                .update(perception, agent.comms.as_mut().map(|c| &mut c.mailbox));
        }
        let action = match choice {
            Some(action_index) => act_from_index(action_index, &agent.knowledge)?,
            None => {
                let mut ctx = TurnContext::new(&agent.knowledge, &mut self.rng.0, &mut outbox);
                agent.policy.decide(&mut ctx)?
            }
        };

        let outcome = execute_action(
            action,
            agent,
            &mut self.grid,
            &mut self.waste_ids,
            &mut self.disposed,
        )?;
        for kind in &outcome.events {
            self.record(id, kind.clone());
        }
        self.refresh_perception(index)?;

        for outgoing in &outbox {
            let receiver = self.index_of(outgoing.to)?;
            let is_target = matches!(outgoing.information, Information::Target { .. });
            if is_target && !self.agents[receiver].policy.follows_targets() {
                tracing::trace!(from = %id, to = %outgoing.to, "receiver ignores targets");
                continue;
            }
            self.messaging.dispatch(&mut self.agents, outgoing)?;
            self.record(
                id,
                EventKind::MessageSent {
                    to: outgoing.to,
                    kind: outgoing.information.kind().label().to_string(),
                },
            );
        }
        self.broadcast(index)?;

        Ok(outcome)
    }

    /// Announces a broadcasting agent's id, position and tier to every other
    /// agent with a mailbox.
    fn broadcast(&mut self, index: usize) -> SimResult<()> {
        let agent = &self.agents[index];
        if !agent.comms.as_ref().is_some_and(|c| c.broadcast) {
            return Ok(());
        }
        let message = Message::encode(&Information::PositionTier {
            agent: agent.id,
            position: agent.position()?,
            tier: agent.tier,
        })?;
        let receivers: Vec<AgentId> = self
            .agents
            .iter()
            .filter(|other| other.id != agent.id && other.comms.is_some())
            .map(|other| other.id)
            .collect();
        self.messaging.send_all(&mut self.agents, &receivers, &message)
    }

    fn record(&mut self, agent: AgentId, kind: EventKind) {
        let event_id = self.events.generate_id();
        self.events.push(Event::new(event_id, self.step, agent, kind));
    }

    /// Steps until the mission is complete or `max_steps` steps have run.
    /// Returns the number of steps taken.
    pub fn run(&mut self, max_steps: u64) -> SimResult<u64> {
        let mut taken = 0;
        while taken < max_steps && !self.is_done() {
            self.step()?;
            taken += 1;
        }
        tracing::info!(
            steps = taken,
            done = self.is_done(),
            disposed = self.disposed.len(),
            "run finished"
        );
        Ok(taken)
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("width", &self.grid.width())
            .field("height", &self.grid.height())
            .field("dump", &self.dump)
            .field("agents", &self.agents.len())
            .field("step", &self.step)
            .finish()
    }
}
