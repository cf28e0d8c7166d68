//! Range normalization: raw sensor value → `[0, 1]`.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Physiological `[min, max]` for one input field. Always `min < max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRange")]
pub struct Range {
    min: f64,
    max: f64,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRange {
    min: f64,
    max: f64,
}

impl TryFrom<RawRange> for Range {
    type Error = EngineError;

    fn try_from(raw: RawRange) -> Result<Self, Self::Error> {
        Range::new(raw.min, raw.max)
    }
}

impl Range {
    pub fn new(min: f64, max: f64) -> Result<Self, EngineError> {
        if !min.is_finite() || !max.is_finite() {
            return Err(EngineError::config(format!(
                "range bounds must be finite (min {min}, max {max})"
            )));
        }
        if min >= max {
            return Err(EngineError::config(format!(
                "range min must be below max (min {min}, max {max})"
            )));
        }
        if !(max - min).is_finite() {
            return Err(EngineError::config(format!(
                "range span overflows (min {min}, max {max})"
            )));
        }
        Ok(Self { min, max })
    }

    /// Only for the built-in constant tables, which are known to be valid.
    pub(crate) const fn from_const(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// `(value - min) / (max - min)`, clamped to `[0, 1]`.
    pub fn normalize(&self, value: f64) -> f64 {
        ((value - self.min) / self.span()).clamp(0.0, 1.0)
    }
}

/// Free-standing form of [`Range::normalize`]. Fails fast on a degenerate
/// range instead of dividing by zero.
pub fn normalize(value: f64, min: f64, max: f64) -> Result<f64, EngineError> {
    Ok(Range::new(min, max)?.normalize(value))
}
