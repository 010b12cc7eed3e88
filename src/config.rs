use std::{fs, path::Path};

use machine_learning::{arch::L1L2, spec::TrainerSpec};
use serde::{Deserialize, Serialize};

use crate::Result;

/// The configuration of a single population member.
///
/// Every field is optional in the json document, missing ones take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemberConfig {
    /// The amount of optimization steps between readiness checks.
    pub steps_to_ready: usize,
    pub batch_size: usize,
    /// The initial regularization strengths.
    pub hyperparameter: L1L2,
    pub trainer: TrainerSpec,
    /// Seeds the member's exploration, and its trainer unless the trainer has its own seed.
    /// Drawn from the os when missing.
    pub seed: Option<u64>,
}

impl Default for MemberConfig {
    fn default() -> Self {
        Self {
            steps_to_ready: 5,
            batch_size: 64,
            hyperparameter: L1L2::default(),
            trainer: TrainerSpec::default(),
            seed: None,
        }
    }
}

impl MemberConfig {
    /// Parses a configuration from a json document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses the json configuration file at `path`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}
