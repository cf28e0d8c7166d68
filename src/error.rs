//! Error taxonomy for the scoring engine.
//!
//! The engine itself cannot fail on a well-formed `Reading`; the only error
//! surfaces are the configuration tables (checked once at startup) and the
//! reading boundary, where non-finite sensor values are rejected.

use thiserror::Error;

use crate::reading::Field;

#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// A range with `min >= max`, a negative/non-finite weight, a weight row
    /// that does not sum to 1.0, or an incomplete config file. Fatal.
    #[error("configuration error: {reason}")]
    Configuration { reason: String },

    /// A sensor value that is NaN or infinite.
    #[error("invalid input: {field} must be a finite number, got {value}")]
    InvalidInput { field: Field, value: f64 },
}

impl EngineError {
    pub(crate) fn config(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }
}
