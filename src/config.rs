// src/config.rs
//! Engine configuration: input ranges, channel weight table, status thresholds.
//!
//! Built once at startup and shared (`Arc<EngineConfig>`); never mutated.
//! The TOML shape mirrors `config/engine.toml`:
//!
//! ```toml
//! [thresholds]          # optional, defaults 40 / 70
//! underactive_below = 40.0
//! overactive_above = 70.0
//!
//! [ranges.HRV]
//! min = 10.0
//! max = 100.0
//! # ... all six fields
//!
//! [weights.Root]
//! HRV = 0.3
//! GSR = 0.4
//! # ... all six fields, all seven channels
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::channel::Channel;
use crate::error::EngineError;
use crate::normalize::Range;
use crate::reading::Field;

pub const DEFAULT_ENGINE_CONFIG_PATH: &str = "config/engine.toml";
pub const ENV_ENGINE_CONFIG_PATH: &str = "CHAKRA_ENGINE_CONFIG";

/// Allowed drift of a weight row from exactly 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

const BUILTIN_RANGES: [Range; Field::COUNT] = [
    Range::from_const(10.0, 100.0), // HRV
    Range::from_const(0.1, 10.0),   // GSR
    Range::from_const(95.0, 102.0), // TEMP
    Range::from_const(8.0, 13.0),   // EEG_ALPHA
    Range::from_const(13.0, 30.0),  // EEG_BETA
    Range::from_const(4.0, 8.0),    // EEG_THETA
];

// Columns: HRV, GSR, TEMP, EEG_ALPHA, EEG_BETA, EEG_THETA
const BUILTIN_WEIGHTS: [ChannelWeights; Channel::COUNT] = [
    ChannelWeights([0.3, 0.4, 0.3, 0.0, 0.0, 0.0]),         // Root
    ChannelWeights([0.2, 0.3, 0.2, 0.1, 0.1, 0.1]),         // Sacral
    ChannelWeights([0.25, 0.35, 0.15, 0.1, 0.1, 0.05]),     // SolarPlexus
    ChannelWeights([0.5, 0.2, 0.1, 0.1, 0.05, 0.05]),       // Heart
    ChannelWeights([0.1, 0.1, 0.1, 0.3, 0.3, 0.1]),         // Throat
    ChannelWeights([0.05, 0.05, 0.05, 0.35, 0.25, 0.25]),   // ThirdEye
    ChannelWeights([0.05, 0.05, 0.05, 0.25, 0.15, 0.45]),   // Crown
];

/// Weight vector of one output channel over the six input fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChannelWeights(pub [f64; Field::COUNT]);

impl ChannelWeights {
    pub fn weight(&self, field: Field) -> f64 {
        self.0[field.index()]
    }

    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }
}

/// Score thresholds. Boundaries are closed toward Balanced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Thresholds {
    #[serde(default = "default_underactive_below")]
    pub underactive_below: f64,
    #[serde(default = "default_overactive_above")]
    pub overactive_above: f64,
}

fn default_underactive_below() -> f64 {
    40.0
}
fn default_overactive_above() -> f64 {
    70.0
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            underactive_below: default_underactive_below(),
            overactive_above: default_overactive_above(),
        }
    }
}

/// Validated, immutable engine tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineConfig {
    ranges: [Range; Field::COUNT],
    weights: [ChannelWeights; Channel::COUNT],
    thresholds: Thresholds,
}

/// Where the active configuration came from (logged at startup).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Builtin,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::builtin()
    }
}

impl EngineConfig {
    /// Reference tables compiled into the binary.
    pub fn builtin() -> Self {
        Self {
            ranges: BUILTIN_RANGES,
            weights: BUILTIN_WEIGHTS,
            thresholds: Thresholds::default(),
        }
    }

    /// Assemble and validate a config from parts.
    pub fn new(
        ranges: [Range; Field::COUNT],
        weights: [ChannelWeights; Channel::COUNT],
        thresholds: Thresholds,
    ) -> Result<Self, EngineError> {
        let cfg = Self {
            ranges,
            weights,
            thresholds,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn range(&self, field: Field) -> &Range {
        &self.ranges[field.index()]
    }

    pub fn ranges(&self) -> &[Range; Field::COUNT] {
        &self.ranges
    }

    pub fn weights(&self, channel: Channel) -> &ChannelWeights {
        &self.weights[channel.index()]
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Check every invariant of the tables.
    pub fn validate(&self) -> Result<(), EngineError> {
        let t = &self.thresholds;
        if !t.underactive_below.is_finite() || !t.overactive_above.is_finite() {
            return Err(EngineError::config("thresholds must be finite"));
        }
        if !(0.0 <= t.underactive_below
            && t.underactive_below <= t.overactive_above
            && t.overactive_above <= 100.0)
        {
            return Err(EngineError::config(format!(
                "thresholds must satisfy 0 <= underactive_below ({}) <= overactive_above ({}) <= 100",
                t.underactive_below, t.overactive_above
            )));
        }

        for field in Field::ALL {
            let r = self.range(field);
            if r.min() >= r.max() {
                return Err(EngineError::config(format!(
                    "range {field}: min {} must be below max {}",
                    r.min(),
                    r.max()
                )));
            }
        }

        for channel in Channel::ALL {
            let w = self.weights(channel);
            for field in Field::ALL {
                let x = w.weight(field);
                if !x.is_finite() || x < 0.0 {
                    return Err(EngineError::config(format!(
                        "weight {channel}.{field} must be finite and non-negative, got {x}"
                    )));
                }
            }
            let sum = w.sum();
            if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
                return Err(EngineError::config(format!(
                    "weights of {channel} must sum to 1.0, got {sum}"
                )));
            }
        }
        Ok(())
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(s: &str) -> Result<Self, EngineError> {
        let file: EngineFile =
            toml::from_str(s).map_err(|e| EngineError::config(e.to_string()))?;
        file.into_config()
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading engine config from {}", path.display()))?;
        let cfg = Self::from_toml_str(&content)
            .with_context(|| format!("parsing engine config {}", path.display()))?;
        Ok(cfg)
    }

    /// Load using env var + fallbacks:
    /// 1) $CHAKRA_ENGINE_CONFIG (must exist)
    /// 2) config/engine.toml
    /// 3) built-in tables
    pub fn load_default() -> Result<(Self, ConfigSource)> {
        let (cfg, source) = if let Ok(p) = std::env::var(ENV_ENGINE_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!(
                    "{ENV_ENGINE_CONFIG_PATH} points to non-existent path {}",
                    pb.display()
                ));
            }
            (Self::load_from(&pb)?, ConfigSource::File(pb))
        } else {
            let default_p = PathBuf::from(DEFAULT_ENGINE_CONFIG_PATH);
            if default_p.exists() {
                (Self::load_from(&default_p)?, ConfigSource::File(default_p))
            } else {
                (Self::builtin(), ConfigSource::Builtin)
            }
        };

        match &source {
            ConfigSource::File(p) => {
                info!(target: "config", path = %p.display(), "engine config loaded from file")
            }
            ConfigSource::Builtin => info!(target: "config", "engine config: built-in tables"),
        }
        Ok((cfg, source))
    }
}

/* ----------------------------
File schema (TOML)
---------------------------- */

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EngineFile {
    #[serde(default)]
    thresholds: Thresholds,
    ranges: RangesFile,
    weights: WeightsFile,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", deny_unknown_fields)]
struct RangesFile {
    hrv: Range,
    gsr: Range,
    temp: Range,
    eeg_alpha: Range,
    eeg_beta: Range,
    eeg_theta: Range,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
struct WeightsFile {
    root: WeightRow,
    sacral: WeightRow,
    solar_plexus: WeightRow,
    heart: WeightRow,
    throat: WeightRow,
    third_eye: WeightRow,
    crown: WeightRow,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", deny_unknown_fields)]
struct WeightRow {
    hrv: f64,
    gsr: f64,
    temp: f64,
    eeg_alpha: f64,
    eeg_beta: f64,
    eeg_theta: f64,
}

impl From<WeightRow> for ChannelWeights {
    fn from(w: WeightRow) -> Self {
        ChannelWeights([w.hrv, w.gsr, w.temp, w.eeg_alpha, w.eeg_beta, w.eeg_theta])
    }
}

impl EngineFile {
    fn into_config(self) -> Result<EngineConfig, EngineError> {
        let r = self.ranges;
        let w = self.weights;
        EngineConfig::new(
            [r.hrv, r.gsr, r.temp, r.eeg_alpha, r.eeg_beta, r.eeg_theta],
            [
                w.root.into(),
                w.sacral.into(),
                w.solar_plexus.into(),
                w.heart.into(),
                w.throat.into(),
                w.third_eye.into(),
                w.crown.into(),
            ],
            self.thresholds,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHIPPED: &str = include_str!("../config/engine.toml");

    #[test]
    fn builtin_tables_are_valid() {
        EngineConfig::builtin().validate().unwrap();
    }

    #[test]
    fn shipped_file_matches_builtin() {
        let cfg = EngineConfig::from_toml_str(SHIPPED).unwrap();
        assert_eq!(cfg, EngineConfig::builtin());
    }

    #[test]
    fn missing_weight_field_is_configuration_error() {
        let broken = SHIPPED.replacen("EEG_THETA = 0.45", "", 1);
        assert_ne!(broken, SHIPPED, "fixture should contain Crown theta weight");
        let err = EngineConfig::from_toml_str(&broken).unwrap_err();
        assert!(matches!(err, EngineError::Configuration { .. }), "{err}");
    }

    #[test]
    fn weight_row_not_summing_to_one_is_rejected() {
        let mut weights = BUILTIN_WEIGHTS;
        weights[Channel::Heart.index()].0[0] = 0.6;
        let err = EngineConfig::new(BUILTIN_RANGES, weights, Thresholds::default()).unwrap_err();
        assert!(err.to_string().contains("Heart"), "{err}");
    }

    #[test]
    fn negative_weight_is_rejected() {
        let mut weights = BUILTIN_WEIGHTS;
        weights[Channel::Root.index()] = ChannelWeights([0.5, 0.6, -0.1, 0.0, 0.0, 0.0]);
        let err = EngineConfig::new(BUILTIN_RANGES, weights, Thresholds::default()).unwrap_err();
        assert!(err.to_string().contains("non-negative"), "{err}");
    }

    #[test]
    fn inverted_range_in_file_is_rejected() {
        let broken = SHIPPED.replacen("min = 4.0\nmax = 8.0", "min = 8.0\nmax = 4.0", 1);
        assert_ne!(broken, SHIPPED);
        assert!(EngineConfig::from_toml_str(&broken).is_err());
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let t = Thresholds {
            underactive_below: 75.0,
            overactive_above: 60.0,
        };
        assert!(EngineConfig::new(BUILTIN_RANGES, BUILTIN_WEIGHTS, t).is_err());
    }
}
