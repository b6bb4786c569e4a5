//! Agent Components
//!
//! An agent is a plain struct in the world's arena. The grid stores only its
//! id, so nothing holds a reference back into the arena.

use mission_events::{AgentId, Tier};

use super::geometry::Position;
use super::mailbox::Mailbox;
use super::waste::Inventory;
use crate::error::{SimError, SimResult};
use crate::policy::Policy;
use crate::systems::knowledge::Knowledge;
use crate::systems::perception::Perception;

/// Communication component; agents without it neither send nor receive
#[derive(Debug, Clone, Default)]
pub struct Comms {
    pub mailbox: Mailbox,
    /// Announce id, position and tier at the end of each turn
    pub broadcast: bool,
}

impl Comms {
    pub fn broadcasting() -> Self {
        Self {
            mailbox: Mailbox::new(),
            broadcast: true,
        }
    }
}

pub struct Agent {
    pub id: AgentId,
    pub tier: Tier,
    position: Option<Position>,
    pub inventory: Inventory,
    pub knowledge: Knowledge,
    pub comms: Option<Comms>,
    pub policy: Box<dyn Policy>,
    /// Perception issued after the agent's last action
    pub perception: Option<Perception>,
}

impl Agent {
    pub fn new(
        id: AgentId,
        tier: Tier,
        inventory: Inventory,
        knowledge: Knowledge,
        comms: Option<Comms>,
        policy: Box<dyn Policy>,
    ) -> Self {
        Self {
            id,
            tier,
            position: None,
            inventory,
            knowledge,
            comms,
            policy,
            perception: None,
        }
    }

    /// Current cell. Asking an agent that was never placed is an error.
    pub fn position(&self) -> SimResult<Position> {
        self.position.ok_or(SimError::AgentNotPlaced(self.id))
    }

    pub fn is_placed(&self) -> bool {
        self.position.is_some()
    }

    /// Only the grid-owning world keeps this in sync with the grid.
    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = Some(position);
    }

    pub fn mailbox(&self) -> Option<&Mailbox> {
        self.comms.as_ref().map(|c| &c.mailbox)
    }

    pub fn mailbox_mut(&mut self) -> Option<&mut Mailbox> {
        self.comms.as_mut().map(|c| &mut c.mailbox)
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("tier", &self.tier)
            .field("position", &self.position)
            .field("inventory", &self.inventory)
            .field("policy", &self.policy.name())
            .finish()
    }
}
