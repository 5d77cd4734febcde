//! Weighted fusion of phonetic and semantic similarity

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Weight pair applied as `phonetic * wp + semantic * ws`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionWeights {
    pub phonetic: f64,
    pub semantic: f64,
}

impl FusionWeights {
    /// 85% phonetic, 15% semantic
    pub const STANDARD: FusionWeights = FusionWeights {
        phonetic: 0.85,
        semantic: 0.15,
    };

    /// 90% phonetic, 10% semantic
    pub const STRICT: FusionWeights = FusionWeights {
        phonetic: 0.90,
        semantic: 0.10,
    };

    pub fn new(phonetic: f64, semantic: f64) -> Result<Self, ConfigError> {
        let weights = Self { phonetic, semantic };
        weights.validate()?;
        Ok(weights)
    }

    /// Look up a named profile (`standard` or `strict`)
    pub fn profile(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "standard" => Some(Self::STANDARD),
            "strict" => Some(Self::STRICT),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ok = |w: f64| w.is_finite() && w >= 0.0;
        if !ok(self.phonetic) || !ok(self.semantic) {
            return Err(ConfigError::InvalidWeights {
                phonetic: self.phonetic,
                semantic: self.semantic,
            });
        }
        Ok(())
    }

    pub fn sums_to_one(&self) -> bool {
        ((self.phonetic + self.semantic) - 1.0).abs() < 1e-9
    }
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Linear combination, not clamped
pub fn fuse(phonetic: f64, semantic: f64, weights: FusionWeights) -> f64 {
    phonetic * weights.phonetic + semantic * weights.semantic
}

/// Scale a fused score to 0-100 with two decimals, clamped into range.
///
/// Rounding is applied to the exact binary value of `fused * 100`, ties to
/// even, so half-cent cases match Python's `round(x, 2)`.
///
/// A slightly negative cosine similarity can push the fused score below zero.
pub fn to_percent(fused: f64) -> f64 {
    if fused.is_nan() {
        return 0.0;
    }
    let percent = fused * 100.0;
    let rounded = format!("{:.2}", percent)
        .parse::<f64>()
        .unwrap_or(percent);
    rounded.clamp(0.0, 100.0)
}
