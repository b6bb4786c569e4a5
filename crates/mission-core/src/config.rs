//! Configuration System
//!
//! Loads simulation parameters from a TOML file so runs can be tuned without
//! recompiling. Every field has a default; a file only needs the keys it
//! changes.

use mission_events::Tier;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "mission.toml";

/// Top-level configuration structure
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub world: WorldConfig,
    pub tiers: TiersConfig,
}

/// Grid size, seeding and run length
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: u32,
    pub height: u32,
    pub seed: u64,
    pub max_steps: u64,
    /// Pinned dump cell; drawn from the last column when absent
    pub dump: Option<(i32, i32)>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 10,
            height: 10,
            seed: 42,
            max_steps: 500,
            dump: None,
        }
    }
}

/// Per-tier population and policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TiersConfig {
    #[serde(default = "TierConfig::green")]
    pub green: TierConfig,
    #[serde(default = "TierConfig::yellow")]
    pub yellow: TierConfig,
    #[serde(default = "TierConfig::red")]
    pub red: TierConfig,
}

impl Default for TiersConfig {
    fn default() -> Self {
        Self {
            green: TierConfig::green(),
            yellow: TierConfig::yellow(),
            red: TierConfig::red(),
        }
    }
}

impl TiersConfig {
    pub fn get(&self, tier: Tier) -> &TierConfig {
        match tier {
            Tier::Green => &self.green,
            Tier::Yellow => &self.yellow,
            Tier::Red => &self.red,
        }
    }

    pub fn get_mut(&mut self, tier: Tier) -> &mut TierConfig {
        match tier {
            Tier::Green => &mut self.green,
            Tier::Yellow => &mut self.yellow,
            Tier::Red => &mut self.red,
        }
    }

    /// Zone width proportions, lowest tier first.
    pub fn proportions(&self) -> [f64; Tier::COUNT] {
        Tier::all().map(|t| self.get(t).zone)
    }
}

/// One tier's agents, initial waste and zone share
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierConfig {
    pub agents: usize,
    #[serde(default)]
    pub wastes: usize,
    pub zone: f64,
    /// Policy selector: `random`, `greedy`, `cooperative` or `learned`
    #[serde(default = "default_policy")]
    pub policy: String,
    #[serde(default)]
    pub params: PolicyParams,
}

fn default_policy() -> String {
    PolicyKind::Greedy.to_string()
}

impl TierConfig {
    fn green() -> Self {
        Self {
            agents: 3,
            wastes: 12,
            zone: 1.0 / 3.0,
            policy: default_policy(),
            params: PolicyParams::default(),
        }
    }

    fn yellow() -> Self {
        Self {
            agents: 2,
            wastes: 0,
            ..Self::green()
        }
    }

    fn red() -> Self {
        Self {
            agents: 1,
            wastes: 0,
            ..Self::green()
        }
    }

    pub fn policy_kind(&self) -> Result<PolicyKind, ConfigError> {
        self.policy.parse()
    }
}

/// Knobs read by policy construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyParams {
    /// Overrides the tier's default capacity
    pub inventory_capacity: Option<usize>,
    /// Gives the agent a mailbox and a broadcast slot
    pub communicate: bool,
    /// Answer a blocked move with Wait instead of nothing
    pub yield_to_agents: bool,
    /// Keep up to this many knowledge snapshots
    pub history: Option<usize>,
    /// Cooperative commit mode length in turns
    pub commit_turns: u32,
    /// Exploration rate for learned policies
    pub epsilon: f64,
    pub recurrent: bool,
    pub hidden_size: usize,
    /// JSON weights for learned policies; random init when absent
    pub weights: Option<PathBuf>,
}

impl Default for PolicyParams {
    fn default() -> Self {
        Self {
            inventory_capacity: None,
            communicate: true,
            yield_to_agents: false,
            history: None,
            commit_turns: 2,
            epsilon: 0.0,
            recurrent: false,
            hidden_size: 16,
            weights: None,
        }
    }
}

/// Policy selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    Random,
    Greedy,
    Cooperative,
    Learned,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 4] = [
        PolicyKind::Random,
        PolicyKind::Greedy,
        PolicyKind::Cooperative,
        PolicyKind::Learned,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PolicyKind::Random => "random",
            PolicyKind::Greedy => "greedy",
            PolicyKind::Cooperative => "cooperative",
            PolicyKind::Learned => "learned",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PolicyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        match lowered.as_str() {
            "random" | "naive" => Ok(PolicyKind::Random),
            "greedy" | "rule_based" => Ok(PolicyKind::Greedy),
            "cooperative" => Ok(PolicyKind::Cooperative),
            "learned" | "dqn" => Ok(PolicyKind::Learned),
            _ => Err(ConfigError::UnknownPolicy(s.to_string())),
        }
    }
}

impl SimulationConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml(&content)?;
        Ok(config)
    }

    /// Load configuration from `path`, or use defaults if it cannot be read
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "could not load config, using defaults");
            Self::default()
        })
    }

    /// Parse and validate a TOML document
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Sets every tier to the same policy.
    pub fn with_policy(mut self, policy: PolicyKind) -> Self {
        for tier in Tier::all() {
            self.tiers.get_mut(tier).policy = policy.to_string();
        }
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.world.seed = seed;
        self
    }

    /// Checks everything that can be checked without building a world.
    /// Zone capacity against agent and waste counts is checked at setup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let world = &self.world;
        if world.width == 0 || world.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "grid dimensions must be positive, got {}x{}",
                world.width, world.height
            )));
        }

        let total: f64 = self.tiers.proportions().iter().sum();
        for tier in Tier::all() {
            let tier_config = self.tiers.get(tier);
            tier_config.policy_kind()?;
            if !tier_config.zone.is_finite() || tier_config.zone < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{} zone proportion must be non-negative, got {}",
                    tier, tier_config.zone
                )));
            }
            if tier_config.params.inventory_capacity == Some(0) {
                return Err(ConfigError::Invalid(format!(
                    "{} inventory capacity must be positive",
                    tier
                )));
            }
            if !(0.0..=1.0).contains(&tier_config.params.epsilon) {
                return Err(ConfigError::Invalid(format!(
                    "{} epsilon must lie in [0, 1], got {}",
                    tier, tier_config.params.epsilon
                )));
            }
        }
        if (total - 1.0).abs() > 1e-6 {
            return Err(ConfigError::Invalid(format!(
                "zone proportions must sum to 1, got {:.6}",
                total
            )));
        }

        if let Some((x, y)) = world.dump {
            if x < 0 || y < 0 || x as u32 >= world.width || y as u32 >= world.height {
                return Err(ConfigError::Invalid(format!(
                    "dump ({}, {}) lies outside the {}x{} grid",
                    x, y, world.width, world.height
                )));
            }
        }
        Ok(())
    }
}

/// The default configuration rendered as TOML, for `--write-default-config`.
pub fn default_config_toml() -> Result<String, ConfigError> {
    SimulationConfig::default().to_toml()
}

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("unknown policy '{0}' (expected random, greedy, cooperative or learned)")]
    UnknownPolicy(String),
}
