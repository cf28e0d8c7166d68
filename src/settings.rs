// src/settings.rs
//! Service settings from the environment (`.env` is loaded by `main`).

use std::net::SocketAddr;
use std::time::Duration;

use tracing::warn;

pub const ENV_BIND_ADDR: &str = "CHAKRA_BIND_ADDR";
pub const ENV_LIVE_INTERVAL_MS: &str = "CHAKRA_LIVE_INTERVAL_MS";
pub const ENV_HISTORY_CAP: &str = "CHAKRA_HISTORY_CAP";
pub const ENV_METRICS: &str = "CHAKRA_METRICS";

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
/// Same cadence as the dashboard's live mode.
pub const DEFAULT_LIVE_INTERVAL_MS: u64 = 2000;
pub const DEFAULT_HISTORY_CAP: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    /// `None` disables live sampling.
    pub live_interval: Option<Duration>,
    pub history_cap: usize,
    pub metrics_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            live_interval: Some(Duration::from_millis(DEFAULT_LIVE_INTERVAL_MS)),
            history_cap: DEFAULT_HISTORY_CAP,
            metrics_enabled: false,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind_addr = parse_env(ENV_BIND_ADDR).unwrap_or(defaults.bind_addr);

        let live_interval = match parse_env::<u64>(ENV_LIVE_INTERVAL_MS) {
            Some(0) => None,
            Some(ms) => Some(Duration::from_millis(ms)),
            None => defaults.live_interval,
        };

        let history_cap = parse_env::<usize>(ENV_HISTORY_CAP)
            .filter(|&n| n > 0)
            .unwrap_or(defaults.history_cap);

        let metrics_enabled = std::env::var(ENV_METRICS)
            .ok()
            .is_some_and(|v| v.trim() == "1");

        Self {
            bind_addr,
            live_interval,
            history_cap,
            metrics_enabled,
        }
    }
}

/// Parse an env var; unset → `None`, unparseable → `None` with a warning.
fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(target: "config", var = name, value = %raw, "ignoring unparseable setting");
            None
        }
    }
}
