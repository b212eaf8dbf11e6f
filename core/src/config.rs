//! Model configuration and its defaults.
//!
//! Runtime overrides come from the runner's CLI flags and environment
//! variables; the constants here are the fallbacks.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TermsetError};
use crate::vectorizer::WeightingMode;

/// Minimum number of documents a termset must occur in to be kept.
pub const DEFAULT_MIN_FREQ: usize = 10;

/// Decimal places kept for weights, vector cells and per-query scores.
pub const SCORE_DECIMALS: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_min_freq")]
    pub min_freq: usize,
    #[serde(default)]
    pub mode: WeightingMode,
}

fn default_min_freq() -> usize { DEFAULT_MIN_FREQ }

impl Default for ModelConfig {
    fn default() -> Self {
        Self { min_freq: DEFAULT_MIN_FREQ, mode: WeightingMode::default() }
    }
}

impl ModelConfig {
    pub fn new(min_freq: usize, mode: WeightingMode) -> Self {
        Self { min_freq, mode }
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_freq == 0 {
            return Err(TermsetError::InvalidMinFrequency);
        }
        Ok(())
    }
}

/// Round half away from zero to `SCORE_DECIMALS` places.
#[inline]
pub fn round_score(x: f64) -> f64 {
    let scale = 10f64.powi(SCORE_DECIMALS);
    (x * scale).round() / scale
}
