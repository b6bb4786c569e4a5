//! Reference Q-Networks
//!
//! Small dense networks mapping an observation vector to one Q-value per
//! action. Training happens elsewhere; these load trained weights from JSON
//! or start from a seeded random initialization.
//!
//! Weights file format: `{"kind": "feedforward" | "recurrent", ...layers}`,
//! each layer `{"weights": [[f32; in]; out], "bias": [f32; out]}`.

use std::fmt;
use std::fs;
use std::path::Path;

use rand::rngs::SmallRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::actions::ACTION_COUNT;
use crate::error::{SimError, SimResult};

/// Recurrent memory carried from one turn to the next
#[derive(Debug, Clone, PartialEq)]
pub struct HiddenState(pub Vec<f32>);

impl HiddenState {
    pub fn zeros(size: usize) -> Self {
        Self(vec![0.0; size])
    }
}

pub trait QNetwork: fmt::Debug {
    fn input_size(&self) -> usize;

    /// Q-values for `observation`, and the next hidden state for recurrent
    /// networks. A missing `hidden` means the start of an episode.
    fn forward(
        &self,
        observation: &[f32],
        hidden: Option<&HiddenState>,
    ) -> SimResult<(Vec<f32>, Option<HiddenState>)>;

    fn is_recurrent(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    weights: Vec<Vec<f32>>,
    bias: Vec<f32>,
}

impl DenseLayer {
    /// Uniform Glorot initialization.
    pub fn random(inputs: usize, outputs: usize, rng: &mut SmallRng) -> Self {
        let scale = (6.0 / (inputs + outputs) as f32).sqrt();
        let weights = (0..outputs)
            .map(|_| (0..inputs).map(|_| rng.gen_range(-scale..scale)).collect())
            .collect();
        Self {
            weights,
            bias: vec![0.0; outputs],
        }
    }

    pub fn inputs(&self) -> usize {
        self.weights.first().map_or(0, Vec::len)
    }

    pub fn outputs(&self) -> usize {
        self.bias.len()
    }

    fn validate(&self) -> SimResult<()> {
        if self.weights.len() != self.bias.len() {
            return Err(SimError::ShapeMismatch {
                expected: self.bias.len(),
                actual: self.weights.len(),
            });
        }
        let inputs = self.inputs();
        if let Some(row) = self.weights.iter().find(|row| row.len() != inputs) {
            return Err(SimError::ShapeMismatch {
                expected: inputs,
                actual: row.len(),
            });
        }
        Ok(())
    }

    pub fn forward(&self, input: &[f32]) -> SimResult<Vec<f32>> {
        if input.len() != self.inputs() {
            return Err(SimError::ShapeMismatch {
                expected: self.inputs(),
                actual: input.len(),
            });
        }
        Ok(self
            .weights
            .iter()
            .zip(&self.bias)
            .map(|(row, b)| row.iter().zip(input).map(|(w, x)| w * x).sum::<f32>() + b)
            .collect())
    }
}

fn relu(values: &mut [f32]) {
    for v in values {
        *v = v.max(0.0);
    }
}

/// observation -> ReLU hidden layer -> Q-values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearQNetwork {
    hidden: DenseLayer,
    output: DenseLayer,
}

impl LinearQNetwork {
    pub fn random(input_size: usize, hidden_size: usize, rng: &mut SmallRng) -> Self {
        Self {
            hidden: DenseLayer::random(input_size, hidden_size, rng),
            output: DenseLayer::random(hidden_size, ACTION_COUNT, rng),
        }
    }

    fn validate(&self) -> SimResult<()> {
        self.hidden.validate()?;
        self.output.validate()?;
        check_link(&self.hidden, &self.output)?;
        check_actions(&self.output)
    }
}

impl QNetwork for LinearQNetwork {
    fn input_size(&self) -> usize {
        self.hidden.inputs()
    }

    fn forward(
        &self,
        observation: &[f32],
        _hidden: Option<&HiddenState>,
    ) -> SimResult<(Vec<f32>, Option<HiddenState>)> {
        let mut features = self.hidden.forward(observation)?;
        relu(&mut features);
        Ok((self.output.forward(&features)?, None))
    }
}

/// Elman recurrent network:
/// `h' = tanh(W_in x + W_rec h + b)`, `q = W_out h'`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrentQNetwork {
    input: DenseLayer,
    recurrent: DenseLayer,
    output: DenseLayer,
}

impl RecurrentQNetwork {
    pub fn random(input_size: usize, hidden_size: usize, rng: &mut SmallRng) -> Self {
        let mut recurrent = DenseLayer::random(hidden_size, hidden_size, rng);
        // Bias lives on the input projection.
        recurrent.bias.iter_mut().for_each(|b| *b = 0.0);
        Self {
            input: DenseLayer::random(input_size, hidden_size, rng),
            recurrent,
            output: DenseLayer::random(hidden_size, ACTION_COUNT, rng),
        }
    }

    pub fn hidden_size(&self) -> usize {
        self.recurrent.outputs()
    }

    fn validate(&self) -> SimResult<()> {
        self.input.validate()?;
        self.recurrent.validate()?;
        self.output.validate()?;
        check_link(&self.input, &self.recurrent)?;
        check_link(&self.recurrent, &self.output)?;
        if self.recurrent.inputs() != self.recurrent.outputs() {
            return Err(SimError::ShapeMismatch {
                expected: self.recurrent.outputs(),
                actual: self.recurrent.inputs(),
            });
        }
        check_actions(&self.output)
    }
}

impl QNetwork for RecurrentQNetwork {
    fn input_size(&self) -> usize {
        self.input.inputs()
    }

    fn forward(
        &self,
        observation: &[f32],
        hidden: Option<&HiddenState>,
    ) -> SimResult<(Vec<f32>, Option<HiddenState>)> {
        let zeros;
        let previous = match hidden {
            Some(state) => state,
            None => {
                zeros = HiddenState::zeros(self.hidden_size());
                &zeros
            }
        };

        let projected = self.input.forward(observation)?;
        let carried = self.recurrent.forward(&previous.0)?;
        let next: Vec<f32> = projected
            .iter()
            .zip(&carried)
            .map(|(a, b)| (a + b).tanh())
            .collect();
        let q_values = self.output.forward(&next)?;
        Ok((q_values, Some(HiddenState(next))))
    }

    fn is_recurrent(&self) -> bool {
        true
    }
}

fn check_link(from: &DenseLayer, to: &DenseLayer) -> SimResult<()> {
    if from.outputs() != to.inputs() {
        return Err(SimError::ShapeMismatch {
            expected: from.outputs(),
            actual: to.inputs(),
        });
    }
    Ok(())
}

fn check_actions(output: &DenseLayer) -> SimResult<()> {
    if output.outputs() != ACTION_COUNT {
        return Err(SimError::ShapeMismatch {
            expected: ACTION_COUNT,
            actual: output.outputs(),
        });
    }
    Ok(())
}

/// On-disk weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NetworkWeights {
    Feedforward(LinearQNetwork),
    Recurrent(RecurrentQNetwork),
}

impl NetworkWeights {
    pub fn into_network(self, input_size: usize) -> SimResult<Box<dyn QNetwork>> {
        let network: Box<dyn QNetwork> = match self {
            NetworkWeights::Feedforward(net) => {
                net.validate()?;
                Box::new(net)
            }
            NetworkWeights::Recurrent(net) => {
                net.validate()?;
                Box::new(net)
            }
        };
        if network.input_size() != input_size {
            return Err(SimError::ShapeMismatch {
                expected: input_size,
                actual: network.input_size(),
            });
        }
        Ok(network)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> SimResult<()> {
        fs::write(path, serde_json::to_string(self)?)?;
        Ok(())
    }
}

/// Loads a network from a JSON weights file and checks its shape.
pub fn load_network(path: impl AsRef<Path>, input_size: usize) -> SimResult<Box<dyn QNetwork>> {
    let content = fs::read_to_string(path.as_ref())?;
    let weights: NetworkWeights = serde_json::from_str(&content)?;
    weights.into_network(input_size)
}
