//! # Scoring Engine
//! Pure, testable logic that maps a `Reading` → seven `ChannelResult`s.
//! No I/O, no hidden state; safe to call from any number of threads.
//!
//! Per channel: normalize each field into `[0,1]`, weight-sum, scale by 100
//! (the raw BES), classify the raw BES, then round half away from zero and
//! clamp into `0..=100` for the reported score.

use std::sync::Arc;

use crate::channel::{Channel, ChannelResult, Status};
use crate::config::{ChannelWeights, EngineConfig, Thresholds};
use crate::reading::{Field, Reading};

#[derive(Debug, Clone)]
pub struct ScoringEngine {
    config: Arc<EngineConfig>,
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(Arc::new(EngineConfig::builtin()))
    }
}

impl ScoringEngine {
    pub fn new(config: Arc<EngineConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Raw BES for one channel; not rounded.
    pub fn aggregate(&self, reading: &Reading, channel: Channel) -> f64 {
        aggregate(reading, &self.config, self.config.weights(channel))
    }

    pub fn classify(&self, score: f64) -> Status {
        classify(score, self.config.thresholds())
    }

    /// All seven channels, in declaration order.
    pub fn score(&self, reading: &Reading) -> Vec<ChannelResult> {
        Channel::ALL
            .iter()
            .map(|&channel| {
                let raw = self.aggregate(reading, channel);
                ChannelResult::new(channel, to_reported_score(raw), self.classify(raw))
            })
            .collect()
    }
}

/// Weighted sum of normalized fields, times 100.
pub fn aggregate(reading: &Reading, config: &EngineConfig, weights: &ChannelWeights) -> f64 {
    let sum = Field::ALL.iter().fold(0.0, |acc, &field| {
        acc + config.range(field).normalize(reading.value(field)) * weights.weight(field)
    });
    sum * 100.0
}

/// `< underactive_below` → Underactive, `> overactive_above` → Overactive,
/// otherwise Balanced (both boundaries inclusive).
pub fn classify(score: f64, thresholds: &Thresholds) -> Status {
    if score < thresholds.underactive_below {
        Status::Underactive
    } else if score > thresholds.overactive_above {
        Status::Overactive
    } else {
        Status::Balanced
    }
}

/// Round half away from zero, then clamp to `0..=100`.
pub fn to_reported_score(raw: f64) -> u8 {
    raw.round().clamp(0.0, 100.0) as u8
}
