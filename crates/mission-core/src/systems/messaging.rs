//! Message Delivery
//!
//! Routes messages into agents' mailboxes through an id-to-arena-index
//! registry. Unknown ids are routing bugs, not dropped mail.

use std::collections::BTreeMap;

use mission_events::AgentId;

use crate::components::agent::Agent;
use crate::components::mailbox::{Information, Message};
use crate::error::{SimError, SimResult};

/// A message queued by a policy during its turn, encoded at dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outgoing {
    pub to: AgentId,
    pub information: Information,
}

#[derive(Debug, Clone, Default)]
pub struct MessageService {
    registry: BTreeMap<AgentId, usize>,
}

impl MessageService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: AgentId, index: usize) {
        self.registry.insert(id, index);
    }

    pub fn registered(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.registry.keys().copied()
    }

    fn index_of(&self, id: AgentId) -> SimResult<usize> {
        self.registry
            .get(&id)
            .copied()
            .ok_or_else(|| SimError::UnknownAgent {
                id,
                valid: self.registered().collect(),
            })
    }

    /// Delivers `message` to one agent. Agents without a mailbox silently
    /// ignore mail.
    pub fn send(&self, agents: &mut [Agent], receiver: AgentId, message: Message) -> SimResult<()> {
        let index = self.index_of(receiver)?;
        let agent = agents.get_mut(index).ok_or_else(|| SimError::UnknownAgent {
            id: receiver,
            valid: self.registered().collect(),
        })?;
        if let Some(mailbox) = agent.mailbox_mut() {
            mailbox.receive(message);
        }
        Ok(())
    }

    /// Encodes and delivers a policy's queued message.
    pub fn dispatch(&self, agents: &mut [Agent], outgoing: &Outgoing) -> SimResult<()> {
        let message = Message::encode(&outgoing.information)?;
        self.send(agents, outgoing.to, message)
    }

    pub fn send_all(
        &self,
        agents: &mut [Agent],
        receivers: &[AgentId],
        message: &Message,
    ) -> SimResult<()> {
        for receiver in receivers {
            self.send(agents, *receiver, message.clone())?;
        }
        Ok(())
    }
}
