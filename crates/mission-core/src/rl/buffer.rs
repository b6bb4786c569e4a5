//! Replay memory of environment transitions.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::tensor::StateTensor;

/// One joint step of all controlled agents.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub observations: Vec<Vec<f32>>,
    pub state: StateTensor,
    pub actions: Vec<usize>,
    pub next_observations: Vec<Vec<f32>>,
    pub next_state: StateTensor,
    pub rewards: Vec<f32>,
    pub done: bool,
}

/// Sampled transitions, split by field.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub observations: Vec<Vec<Vec<f32>>>,
    pub states: Vec<StateTensor>,
    pub actions: Vec<Vec<usize>>,
    pub next_observations: Vec<Vec<Vec<f32>>>,
    pub next_states: Vec<StateTensor>,
    pub rewards: Vec<Vec<f32>>,
    pub dones: Vec<bool>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.dones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dones.is_empty()
    }
}

impl FromIterator<Transition> for Batch {
    fn from_iter<I: IntoIterator<Item = Transition>>(iter: I) -> Self {
        let mut batch = Batch::default();
        for t in iter {
            batch.observations.push(t.observations);
            batch.states.push(t.state);
            batch.actions.push(t.actions);
            batch.next_observations.push(t.next_observations);
            batch.next_states.push(t.next_state);
            batch.rewards.push(t.rewards);
            batch.dones.push(t.done);
        }
        batch
    }
}

/// Fixed-capacity ring buffer; the oldest transition is overwritten first.
#[derive(Debug)]
pub struct ReplayMemory {
    capacity: usize,
    memory: Vec<Transition>,
    position: usize,
    rng: SmallRng,
}

impl ReplayMemory {
    pub fn new(capacity: usize, seed: u64) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            memory: Vec::with_capacity(capacity),
            position: 0,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn push(&mut self, transition: Transition) {
        if self.memory.len() < self.capacity {
            self.memory.push(transition);
        } else {
            self.memory[self.position] = transition;
        }
        self.position = (self.position + 1) % self.capacity;
    }

    /// `batch_size` distinct transitions, or `None` if fewer are stored.
    pub fn sample(&mut self, batch_size: usize) -> Option<Batch> {
        if batch_size > self.memory.len() {
            return None;
        }
        Some(
            self.memory
                .choose_multiple(&mut self.rng, batch_size)
                .cloned()
                .collect(),
        )
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.memory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transition(marker: usize) -> Transition {
        Transition {
            observations: vec![vec![0.0; 3]],
            state: StateTensor::zeros(2, 2),
            actions: vec![marker],
            next_observations: vec![vec![1.0; 3]],
            next_state: StateTensor::zeros(2, 2),
            rewards: vec![marker as f32],
            done: false,
        }
    }

    #[test]
    fn test_ring_buffer_overwrites_oldest() {
        let mut memory = ReplayMemory::new(3, 0);
        for marker in 0..5 {
            memory.push(transition(marker));
        }
        assert_eq!(memory.len(), 3);

        let batch = memory.sample(3).unwrap();
        let mut markers: Vec<usize> = batch.actions.iter().map(|a| a[0]).collect();
        markers.sort_unstable();
        assert_eq!(markers, vec![2, 3, 4]);
    }

    #[test]
    fn test_sampling_is_seeded() {
        let fill = |seed| {
            let mut memory = ReplayMemory::new(10, seed);
            for marker in 0..10 {
                memory.push(transition(marker));
            }
            memory
        };
        let a = fill(7).sample(4).unwrap();
        let b = fill(7).sample(4).unwrap();
        assert_eq!(a.actions, b.actions);
        assert_eq!(a.len(), 4);
        assert!(fill(7).sample(11).is_none());
    }
}
