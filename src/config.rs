//! Training parameters and the on-disk config the CLI loads them from.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{BrlError, Result};
use crate::rule::MAX_CARDINALITY;

/// Structural and likelihood hyperparameters for a training run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Params {
    /// Prior mean list length.
    pub lambda: f64,
    /// Prior mean rule cardinality.
    pub eta: f64,
    /// Beta prior pseudo-counts `(alpha0, alpha1)`.
    pub alpha: (f64, f64),
    /// Prediction cutoff on theta.
    pub threshold: f64,
    /// Number of proposal iterations per MCMC chain.
    pub iters: u64,
    /// Size of the randomly seeded initial rule list.
    pub init_size: usize,
    /// Number of independent chains to run.
    pub nchain: u32,
    /// RNG seed; required for reproducible runs.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Largest representable rule cardinality.
    #[serde(default = "default_max_cardinality")]
    pub max_cardinality: u8,
    /// Number of SA proposals run at each cooling-schedule time point.
    #[serde(default = "default_sa_iters_per_step")]
    pub sa_iters_per_step: u32,
    /// Number of plateaus in the SA cooling schedule.
    #[serde(default = "default_cooling_steps")]
    pub cooling_steps: usize,
}

fn default_seed() -> u64 {
    0
}

fn default_max_cardinality() -> u8 {
    MAX_CARDINALITY
}

fn default_sa_iters_per_step() -> u32 {
    200
}

fn default_cooling_steps() -> usize {
    28
}

impl Params {
    /// Validates parameters before any chain starts (spec section 7:
    /// invalid params are rejected up front, not discovered mid-run).
    pub fn validate(&self, nrules: usize) -> Result<()> {
        if self.nchain < 1 {
            return Err(BrlError::InvalidParams("nchain must be >= 1".into()));
        }
        if self.init_size < 1 {
            return Err(BrlError::InvalidParams("init_size must be >= 1".into()));
        }
        if nrules == 0 || self.init_size > nrules.saturating_sub(1) {
            return Err(BrlError::InvalidParams(
                "init_size must be <= nrules - 1".into(),
            ));
        }
        if self.alpha.0 <= 0.0 || self.alpha.1 <= 0.0 {
            return Err(BrlError::InvalidParams("alpha entries must be > 0".into()));
        }
        if self.lambda <= 0.0 {
            return Err(BrlError::InvalidParams("lambda must be > 0".into()));
        }
        if self.eta <= 0.0 {
            return Err(BrlError::InvalidParams("eta must be > 0".into()));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(BrlError::InvalidParams(
                "threshold must be in [0, 1]".into(),
            ));
        }
        if self.max_cardinality == 0 {
            return Err(BrlError::InvalidParams(
                "max_cardinality must be >= 1".into(),
            ));
        }
        Ok(())
    }
}

/// Top-level config file loaded by the CLI binary; wraps `Params` plus the
/// path to a toy dataset file, in the same spirit as the teacher's
/// `Config { data_file, sample_num, particle_num, .. }`.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub data_file: std::path::PathBuf,
    pub params: Params,
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            BrlError::InvalidParams(format!("could not read config file: {e}"))
        })?;
        serde_json::from_str(&text)
            .map_err(|e| BrlError::InvalidParams(format!("could not parse config file: {e}")))
    }
}
