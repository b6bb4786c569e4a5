//! Knowledge System
//!
//! An agent's knowledge is an ordered list of facets over its latest
//! perception. Each query is answered by the first facet that has an
//! answer; [`MissionKnowledge`] always comes first.

use std::any::Any;
use std::fmt;

use mission_events::WasteId;

use crate::actions::Action;
use crate::components::geometry::Direction;
use crate::components::mailbox::{Mailbox, Message};
use crate::systems::perception::Perception;

pub mod comms;
pub mod history;
pub mod mission;
pub mod yield_rules;

pub use comms::CommsKnowledge;
pub use history::History;
pub use mission::MissionKnowledge;
pub use yield_rules::YieldKnowledge;

/// One composable slice of knowledge
pub trait Facet: fmt::Debug {
    fn name(&self) -> &'static str;

    /// Folds in the perception issued after the agent's last action and the
    /// mail received since. The perception is never modified.
    fn update(&mut self, perception: &Perception, mail: &[Message]);

    fn try_merge(&self) -> Option<Action> {
        None
    }

    fn try_move(&self, _direction: Direction) -> Option<Action> {
        None
    }

    fn try_pick(&self) -> Option<Action> {
        None
    }

    fn try_drop(&self, _waste: WasteId) -> Option<Action> {
        None
    }

    fn clone_box(&self) -> Box<dyn Facet>;

    fn as_any(&self) -> &dyn Any;
}

impl Clone for Box<dyn Facet> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Knowledge {
    mission: MissionKnowledge,
    extra: Vec<Box<dyn Facet>>,
}

impl Knowledge {
    pub fn mission_only() -> Self {
        Self::default()
    }

    /// Appends a facet after the existing ones.
    pub fn with(mut self, facet: impl Facet + 'static) -> Self {
        self.extra.push(Box::new(facet));
        self
    }

    /// Updates every facet. Mail is peeked once for all facets and then
    /// marked read.
    pub fn update(&mut self, perception: &Perception, mailbox: Option<&mut Mailbox>) {
        let (mail, mailbox) = match mailbox {
            Some(mailbox) => (mailbox.drain_all(true), Some(mailbox)),
            None => (Vec::new(), None),
        };

        self.mission.update(perception, &mail);
        for facet in &mut self.extra {
            facet.update(perception, &mail);
        }

        if let Some(mailbox) = mailbox {
            mailbox.drain_all(false);
        }
    }

    pub fn mission(&self) -> &MissionKnowledge {
        &self.mission
    }

    /// First facet of type `F`, if present.
    pub fn facet<F: Facet + 'static>(&self) -> Option<&F> {
        self.extra.iter().find_map(|f| f.as_any().downcast_ref::<F>())
    }

    pub fn comms(&self) -> Option<&CommsKnowledge> {
        self.facet::<CommsKnowledge>()
    }

    pub fn facet_names(&self) -> Vec<&'static str> {
        std::iter::once(self.mission.name())
            .chain(self.extra.iter().map(|f| f.name()))
            .collect()
    }

    fn facets(&self) -> impl Iterator<Item = &(dyn Facet + 'static)> {
        std::iter::once(&self.mission as &(dyn Facet + 'static))
            .chain(self.extra.iter().map(|f| f.as_ref()))
    }

    pub fn try_merge(&self) -> Option<Action> {
        self.facets().find_map(|f| f.try_merge())
    }

    pub fn try_move(&self, direction: Direction) -> Option<Action> {
        self.facets().find_map(|f| f.try_move(direction))
    }

    pub fn try_pick(&self) -> Option<Action> {
        self.facets().find_map(|f| f.try_pick())
    }

    pub fn try_drop(&self, waste: WasteId) -> Option<Action> {
        self.facets().find_map(|f| f.try_drop(waste))
    }
}
