//! Knowledge History
//!
//! Records a snapshot of a wrapped facet after every update, for offline
//! analysis. It never answers a query.

use std::any::Any;
use std::collections::VecDeque;

use super::Facet;
use crate::components::mailbox::Message;
use crate::systems::perception::Perception;

#[derive(Debug, Clone)]
pub struct History<F> {
    current: F,
    snapshots: VecDeque<F>,
    /// Oldest snapshots are discarded beyond this many
    limit: Option<usize>,
}

impl<F: Facet + Clone> History<F> {
    pub fn new(facet: F, limit: Option<usize>) -> Self {
        Self {
            current: facet,
            snapshots: VecDeque::new(),
            limit,
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Snapshots, oldest first.
    pub fn snapshots(&self) -> impl Iterator<Item = &F> {
        self.snapshots.iter()
    }

    pub fn latest(&self) -> Option<&F> {
        self.snapshots.back()
    }
}

impl<F: Facet + Clone + 'static> Facet for History<F> {
    fn name(&self) -> &'static str {
        "history"
    }

    fn update(&mut self, perception: &Perception, mail: &[Message]) {
        self.current.update(perception, mail);
        self.snapshots.push_back(self.current.clone());
        if let Some(limit) = self.limit {
            while self.snapshots.len() > limit {
                self.snapshots.pop_front();
            }
        }
    }

    fn clone_box(&self) -> Box<dyn Facet> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
