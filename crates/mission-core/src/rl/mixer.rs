//! Value mixers.
//!
//! Combine per-agent Q-values into one joint value for centralized training.
//! The monotonic mixer draws its weights from the joint state through
//! hypernetworks and takes their absolute value, so raising any agent's Q
//! never lowers the joint value.

use rand::rngs::SmallRng;

use super::tensor::StateTensor;
use crate::error::{SimError, SimResult};
use crate::policy::network::DenseLayer;

pub trait ValueMixer {
    fn agents(&self) -> usize;

    fn mix(&self, agent_qs: &[f32], state: &StateTensor) -> SimResult<f32>;
}

fn check_agents(expected: usize, agent_qs: &[f32]) -> SimResult<()> {
    if agent_qs.len() != expected {
        return Err(SimError::ShapeMismatch {
            expected,
            actual: agent_qs.len(),
        });
    }
    Ok(())
}

/// Additive mixing; ignores the state.
#[derive(Debug, Clone, Copy)]
pub struct SumMixer {
    agents: usize,
}

impl SumMixer {
    pub fn new(agents: usize) -> Self {
        Self { agents }
    }
}

impl ValueMixer for SumMixer {
    fn agents(&self) -> usize {
        self.agents
    }

    fn mix(&self, agent_qs: &[f32], _state: &StateTensor) -> SimResult<f32> {
        check_agents(self.agents, agent_qs)?;
        Ok(agent_qs.iter().sum())
    }
}

/// Two-layer monotonic mixing network
#[derive(Debug, Clone)]
pub struct MonotonicMixer {
    agents: usize,
    hidden: usize,
    hyper_w1: DenseLayer,
    hyper_b1: DenseLayer,
    hyper_w2: DenseLayer,
    hyper_b2: DenseLayer,
}

impl MonotonicMixer {
    pub fn random(agents: usize, hidden: usize, state_len: usize, rng: &mut SmallRng) -> Self {
        Self {
            agents,
            hidden,
            hyper_w1: DenseLayer::random(state_len, agents * hidden, rng),
            hyper_b1: DenseLayer::random(state_len, hidden, rng),
            hyper_w2: DenseLayer::random(state_len, hidden, rng),
            hyper_b2: DenseLayer::random(state_len, 1, rng),
        }
    }
}

impl ValueMixer for MonotonicMixer {
    fn agents(&self) -> usize {
        self.agents
    }

    fn mix(&self, agent_qs: &[f32], state: &StateTensor) -> SimResult<f32> {
        check_agents(self.agents, agent_qs)?;
        let s = state.as_slice();

        let w1: Vec<f32> = self.hyper_w1.forward(s)?.into_iter().map(f32::abs).collect();
        let b1 = self.hyper_b1.forward(s)?;
        let w2: Vec<f32> = self.hyper_w2.forward(s)?.into_iter().map(f32::abs).collect();
        let b2 = self.hyper_b2.forward(s)?.first().copied().unwrap_or(0.0);

        let hidden = (0..self.hidden).map(|j| {
            let pre: f32 = agent_qs
                .iter()
                .enumerate()
                .map(|(i, q)| q * w1[i * self.hidden + j])
                .sum();
            (pre + b1[j]).max(0.0)
        });
        Ok(hidden.zip(&w2).map(|(h, w)| h * w).sum::<f32>() + b2)
    }
}
