//! # Readings
//! A single timestamped capture of the six biosensor channels.
//!
//! Values are not range-checked here (the normalizer clamps them later),
//! but every value must be finite. Construction is the only way in, and
//! JSON deserialisation goes through the same validation.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Input sensor channel, in the fixed order used by every table in the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "HRV")]
    Hrv,
    #[serde(rename = "GSR")]
    Gsr,
    #[serde(rename = "TEMP")]
    Temp,
    #[serde(rename = "EEG_ALPHA")]
    EegAlpha,
    #[serde(rename = "EEG_BETA")]
    EegBeta,
    #[serde(rename = "EEG_THETA")]
    EegTheta,
}

impl Field {
    pub const COUNT: usize = 6;

    pub const ALL: [Field; Field::COUNT] = [
        Field::Hrv,
        Field::Gsr,
        Field::Temp,
        Field::EegAlpha,
        Field::EegBeta,
        Field::EegTheta,
    ];

    /// Position of this field in every `[_; Field::COUNT]` table.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Wire/config key, e.g. `"EEG_ALPHA"`.
    pub const fn key(self) -> &'static str {
        match self {
            Field::Hrv => "HRV",
            Field::Gsr => "GSR",
            Field::Temp => "TEMP",
            Field::EegAlpha => "EEG_ALPHA",
            Field::EegBeta => "EEG_BETA",
            Field::EegTheta => "EEG_THETA",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Immutable sensor capture. Values are indexed by [`Field::index`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawReading", into = "RawReading")]
pub struct Reading {
    values: [f64; Field::COUNT],
    timestamp: DateTime<Utc>,
}

impl Reading {
    /// Build a reading from values in `Field::ALL` order.
    pub fn new(values: [f64; Field::COUNT], timestamp: DateTime<Utc>) -> Result<Self, EngineError> {
        for field in Field::ALL {
            let value = values[field.index()];
            if !value.is_finite() {
                return Err(EngineError::InvalidInput { field, value });
            }
        }
        Ok(Self { values, timestamp })
    }

    /// For values already known to be finite (e.g. sampled from a validated range).
    pub(crate) fn from_finite(values: [f64; Field::COUNT], timestamp: DateTime<Utc>) -> Self {
        debug_assert!(values.iter().all(|v| v.is_finite()));
        Self { values, timestamp }
    }

    /// Same as [`Reading::new`], stamped with the current time.
    pub fn now(values: [f64; Field::COUNT]) -> Result<Self, EngineError> {
        Self::new(values, Utc::now())
    }

    pub fn value(&self, field: Field) -> f64 {
        self.values[field.index()]
    }

    pub fn values(&self) -> &[f64; Field::COUNT] {
        &self.values
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn hrv(&self) -> f64 {
        self.value(Field::Hrv)
    }
    pub fn gsr(&self) -> f64 {
        self.value(Field::Gsr)
    }
    pub fn temp(&self) -> f64 {
        self.value(Field::Temp)
    }
    pub fn eeg_alpha(&self) -> f64 {
        self.value(Field::EegAlpha)
    }
    pub fn eeg_beta(&self) -> f64 {
        self.value(Field::EegBeta)
    }
    pub fn eeg_theta(&self) -> f64 {
        self.value(Field::EegTheta)
    }
}

/// Wire shape: `{"HRV": .., "GSR": .., ..., "timestamp": "2025-..Z"}`.
/// A missing timestamp means "captured now".
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawReading {
    #[serde(rename = "HRV")]
    hrv: f64,
    #[serde(rename = "GSR")]
    gsr: f64,
    #[serde(rename = "TEMP")]
    temp: f64,
    #[serde(rename = "EEG_ALPHA")]
    eeg_alpha: f64,
    #[serde(rename = "EEG_BETA")]
    eeg_beta: f64,
    #[serde(rename = "EEG_THETA")]
    eeg_theta: f64,
    #[serde(default = "Utc::now")]
    timestamp: DateTime<Utc>,
}

impl TryFrom<RawReading> for Reading {
    type Error = EngineError;

    fn try_from(raw: RawReading) -> Result<Self, Self::Error> {
        Reading::new(
            [
                raw.hrv,
                raw.gsr,
                raw.temp,
                raw.eeg_alpha,
                raw.eeg_beta,
                raw.eeg_theta,
            ],
            raw.timestamp,
        )
    }
}

impl From<Reading> for RawReading {
    fn from(r: Reading) -> Self {
        Self {
            hrv: r.hrv(),
            gsr: r.gsr(),
            temp: r.temp(),
            eeg_alpha: r.eeg_alpha(),
            eeg_beta: r.eeg_beta(),
            eeg_theta: r.eeg_theta(),
            timestamp: r.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_finite_values() {
        let err = Reading::now([55.0, f64::NAN, 98.5, 10.5, 21.5, 6.0]).unwrap_err();
        match err {
            EngineError::InvalidInput { field, .. } => assert_eq!(field, Field::Gsr),
            other => panic!("unexpected error: {other}"),
        }

        let err = Reading::now([55.0, 5.0, 98.5, 10.5, 21.5, f64::INFINITY]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidInput {
                field: Field::EegTheta,
                ..
            }
        ));
    }

    #[test]
    fn out_of_range_values_are_accepted() {
        let r = Reading::now([-5.0, 50.0, 120.0, 0.0, 99.0, -1.0]).unwrap();
        assert_eq!(r.hrv(), -5.0);
        assert_eq!(r.temp(), 120.0);
    }

    #[test]
    fn json_uses_sensor_keys_and_validates() {
        let json = r#"{"HRV":55,"GSR":5.05,"TEMP":98.5,"EEG_ALPHA":10.5,"EEG_BETA":21.5,"EEG_THETA":6,"timestamp":"2025-08-16T10:00:00Z"}"#;
        let r: Reading = serde_json::from_str(json).unwrap();
        assert_eq!(r.value(Field::EegBeta), 21.5);
        assert_eq!(r.timestamp().to_rfc3339(), "2025-08-16T10:00:00+00:00");

        let v = serde_json::to_value(r).unwrap();
        assert_eq!(v["EEG_ALPHA"], serde_json::json!(10.5));
        assert!(v["timestamp"].is_string());
    }

    #[test]
    fn json_without_timestamp_defaults_to_now() {
        let before = Utc::now();
        let json = r#"{"HRV":55,"GSR":5.05,"TEMP":98.5,"EEG_ALPHA":10.5,"EEG_BETA":21.5,"EEG_THETA":6}"#;
        let r: Reading = serde_json::from_str(json).unwrap();
        assert!(r.timestamp() >= before);
    }

    #[test]
    fn json_missing_field_is_an_error() {
        let json = r#"{"HRV":55,"GSR":5.05,"TEMP":98.5,"EEG_ALPHA":10.5,"EEG_BETA":21.5}"#;
        assert!(serde_json::from_str::<Reading>(json).is_err());
    }
}
