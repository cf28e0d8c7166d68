//! Mock reading generator for demos and property tests.
//!
//! Each field is drawn uniformly from its configured range, so the output
//! domain is exactly the engine's expected input domain.

use chrono::Utc;
use rand::Rng;

use crate::config::EngineConfig;
use crate::reading::{Field, Reading};

/// Random reading over the given ranges, stamped now.
pub fn generate_with<R: Rng + ?Sized>(rng: &mut R, config: &EngineConfig) -> Reading {
    let values = Field::ALL.map(|field| {
        let r = config.range(field);
        rng.random_range(r.min()..r.max())
    });
    Reading::from_finite(values, Utc::now())
}

/// Random reading over the built-in ranges, using the thread-local RNG.
pub fn generate_mock_reading() -> Reading {
    generate_with(&mut rand::rng(), &EngineConfig::builtin())
}
