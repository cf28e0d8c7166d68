use axum::{routing::get, Router};
use metrics::{counter, describe_counter, describe_gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::channel::ChannelResult;
use crate::engine::ScoringEngine;
use crate::reading::Reading;

/// Score a reading and count it, plus one `channel_status_total` per channel.
/// Every scoring path in the service goes through here.
pub fn score_recorded(engine: &ScoringEngine, reading: &Reading) -> Vec<ChannelResult> {
    let channels = engine.score(reading);
    counter!("readings_scored_total").increment(1);
    for c in &channels {
        counter!(
            "channel_status_total",
            "channel" => c.name.name(),
            "status" => c.status.as_str()
        )
        .increment(1);
    }
    channels
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder. Fails if one is already installed.
    pub fn init() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new().install_recorder()?;

        describe_counter!("readings_scored_total", "Readings run through the scoring engine");
        describe_counter!(
            "channel_status_total",
            "Scored channels by channel and status"
        );
        describe_counter!("sessions_started_total", "Therapy sessions opened");
        describe_counter!("sessions_completed_total", "Therapy sessions completed");
        describe_counter!(
            "sessions_evicted_total",
            "Open sessions dropped at the active-session limit"
        );
        describe_gauge!(
            "live_sampler_last_tick_ts",
            "Unix time of the last live sample"
        );
        describe_gauge!("session_history_len", "Completed sessions held in memory");

        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
