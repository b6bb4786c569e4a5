//! Reinforcement-learning surface: environment, state tensor, replay memory
//! and value mixers. Training loops live outside this crate.

pub mod buffer;
pub mod env;
pub mod mixer;
pub mod tensor;

pub use buffer::{Batch, ReplayMemory, Transition};
pub use env::{reward, MissionEnv, StepResult};
pub use mixer::{MonotonicMixer, SumMixer, ValueMixer};
pub use tensor::{StateTensor, STATE_CHANNELS};
