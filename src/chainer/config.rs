//! Chainer configuration, loadable from TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

use super::trail::TrailRetention;

/// Which applicable rule a step fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSelection {
    /// Uniformly random among rules with at least one match.
    #[default]
    Uniform,
    /// The first applicable rule in registration order.
    FirstApplicable,
    /// The next applicable rule after the one that fired last.
    RoundRobin,
}

/// Which match of the chosen rule a step uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingSelection {
    /// The first match the matcher returns.
    #[default]
    First,
    /// Uniformly random.
    Random,
    /// The match whose input strengths have the largest product. Ties go to
    /// the earlier match.
    HighestTruth,
    /// Random, weighted by the product of input strengths. Falls back to the
    /// first match when every weight is zero.
    Weighted,
}

/// Configuration for the forward chainer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainerConfig {
    /// Stimulate matched and derived atoms through the atom space (default: false).
    pub stimulate_atoms: bool,
    /// Stimulus amount per atom when `stimulate_atoms` is set (default: 1.0).
    pub stimulus: f32,
    pub rule_selection: RuleSelection,
    pub binding_selection: BindingSelection,
    pub trail_retention: TrailRetention,
    /// RNG seed. `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Step cap for [`super::Chainer::run`] (default: 100).
    pub max_steps: usize,
}

impl Default for ChainerConfig {
    fn default() -> Self {
        Self {
            stimulate_atoms: false,
            stimulus: 1.0,
            rule_selection: RuleSelection::Uniform,
            binding_selection: BindingSelection::First,
            trail_retention: TrailRetention::Unbounded,
            seed: None,
            max_steps: 100,
        }
    }
}

impl ChainerConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content, path)
    }

    pub(crate) fn from_toml(content: &str, path: &Path) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}
