//! Agent Spawning
//!
//! Describes an agent before it has an id or a cell.

use mission_events::{AgentId, Tier};

use crate::components::agent::{Agent, Comms};
use crate::components::waste::{default_capacity, Inventory};
use crate::config::PolicyParams;
use crate::policy::Policy;
use crate::systems::knowledge::{CommsKnowledge, History, Knowledge, MissionKnowledge, YieldKnowledge};

/// Everything needed to spawn one agent
pub struct AgentSpec {
    pub tier: Tier,
    pub capacity: usize,
    pub knowledge: Knowledge,
    pub comms: Option<Comms>,
    pub policy: Box<dyn Policy>,
}

impl AgentSpec {
    /// Default parameters: tier capacity, broadcasting comms.
    pub fn new(tier: Tier, policy: Box<dyn Policy>) -> Self {
        Self::from_params(tier, &PolicyParams::default(), policy)
    }

    pub fn from_params(tier: Tier, params: &PolicyParams, policy: Box<dyn Policy>) -> Self {
        Self {
            tier,
            capacity: params
                .inventory_capacity
                .unwrap_or_else(|| default_capacity(tier)),
            knowledge: knowledge_for(params),
            comms: params.communicate.then(Comms::broadcasting),
            policy,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_knowledge(mut self, knowledge: Knowledge) -> Self {
        self.knowledge = knowledge;
        self
    }

    /// No mailbox: the agent neither sends nor receives.
    pub fn silent(mut self) -> Self {
        self.comms = None;
        self
    }

    pub(crate) fn into_agent(self, id: AgentId) -> Agent {
        Agent::new(
            id,
            self.tier,
            Inventory::new(self.capacity),
            self.knowledge,
            self.comms,
            self.policy,
        )
    }
}

/// Facet stack selected by policy parameters. Mission rules always come
/// first; yielding, communication and history follow in that order.
pub fn knowledge_for(params: &PolicyParams) -> Knowledge {
    let mut knowledge = Knowledge::mission_only();
    if params.yield_to_agents {
        knowledge = knowledge.with(YieldKnowledge::default());
    }
    if params.communicate {
        knowledge = knowledge.with(CommsKnowledge::default());
    }
    if let Some(limit) = params.history {
        knowledge = knowledge.with(History::new(MissionKnowledge::default(), Some(limit)));
    }
    knowledge
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::RandomPolicy;

    #[test]
    fn test_facets_follow_params() {
        let params = PolicyParams {
            yield_to_agents: true,
            history: Some(4),
            ..PolicyParams::default()
        };
        assert_eq!(
            knowledge_for(&params).facet_names(),
            vec!["mission", "yield", "comms", "history"]
        );

        let quiet = PolicyParams {
            communicate: false,
            ..PolicyParams::default()
        };
        assert_eq!(knowledge_for(&quiet).facet_names(), vec!["mission"]);
    }

    #[test]
    fn test_spec_defaults() {
        let spec = AgentSpec::new(Tier::Red, Box::new(RandomPolicy));
        assert_eq!(spec.capacity, 1);
        assert!(spec.comms.is_some());

        let agent = spec.silent().with_capacity(3).into_agent(AgentId(5));
        assert_eq!(agent.id, AgentId(5));
        assert_eq!(agent.inventory.capacity(), 3);
        assert!(agent.mailbox().is_none());
        assert!(!agent.is_placed());
    }
}
