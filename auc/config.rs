use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

use crate::passes::shuffled_passes;

/// Hyperparameters and the index sequence for a single optimizer run.
///
/// The field names follow the external harness: `eta` is the initial step size
/// and `beta` is the L1-ball radius `R`. Inside this crate the radius is always
/// called `l1_radius`, since the stage scheduler keeps its own, unrelated
/// confidence parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Flattened index sequence; the run consumes a prefix of it in order.
    pub ids: Vec<usize>,
    /// Initial step size.
    pub eta: f64,
    /// Radius `R` of the L1 ball for the weights and the box for both offsets.
    #[serde(rename = "beta")]
    pub l1_radius: f64,
    /// Number of passes `ids` was built from. Informational only.
    pub n_pass: usize,
    /// Recording interval of the harness. Carried, never read by the optimizer.
    #[serde(default)]
    pub rec: f64,
}

/// Custom error type for configuration loading, saving, and validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read or write config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML config file: {0}")]
    TomlParseError(#[from] toml::de::Error),
    #[error("Failed to serialize config to TOML format: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),
    #[error("Step size eta must be finite and positive, got {0}.")]
    InvalidStepSize(f64),
    #[error("L1 radius (beta) must be finite and positive, got {0}.")]
    InvalidRadius(f64),
    #[error("The index sequence `ids` is empty.")]
    EmptyIndexSequence,
}

impl OptimizerConfig {
    pub fn new(ids: Vec<usize>, eta: f64, l1_radius: f64, n_pass: usize) -> Self {
        Self {
            ids,
            eta,
            l1_radius,
            n_pass,
            rec: 0.0,
        }
    }

    /// Builds a config whose index sequence is `n_pass` seeded shuffles of the data.
    pub fn with_shuffled_passes(
        n_examples: usize,
        n_pass: usize,
        seed: u64,
        eta: f64,
        l1_radius: f64,
    ) -> Self {
        Self::new(shuffled_passes(n_examples, n_pass, seed), eta, l1_radius, n_pass)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.eta.is_finite() && self.eta > 0.0) {
            return Err(ConfigError::InvalidStepSize(self.eta));
        }
        if !(self.l1_radius.is_finite() && self.l1_radius > 0.0) {
            return Err(ConfigError::InvalidRadius(self.l1_radius));
        }
        if self.ids.is_empty() {
            return Err(ConfigError::EmptyIndexSequence);
        }
        Ok(())
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Loads and validates a config from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Saves the config in a human-readable TOML format.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let text = self.to_toml_string()?;
        let mut file = BufWriter::new(fs::File::create(path)?);
        file.write_all(text.as_bytes())?;
        file.flush()?;
        Ok(())
    }
}
