// src/sampler.rs
//! Live sampling: a periodic task that feeds mock readings through the
//! engine and publishes the latest result for polling clients.

use std::sync::Arc;
use std::time::Duration;

use metrics::gauge;
use parking_lot::RwLock;
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::channel::ChannelResult;
use crate::engine::ScoringEngine;
use crate::metrics::score_recorded;
use crate::mock::generate_with;
use crate::reading::Reading;
use crate::recommend::recommend;

#[derive(Debug, Clone, Serialize)]
pub struct LiveSample {
    pub tick: u64,
    pub reading: Reading,
    pub channels: Vec<ChannelResult>,
    pub recommendations: Vec<String>,
}

/// Latest published sample. Each publish replaces the previous one.
#[derive(Debug, Default)]
pub struct LiveFeed {
    latest: RwLock<Option<LiveSample>>,
}

impl LiveFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<LiveSample> {
        self.latest.read().clone()
    }

    fn publish(&self, sample: LiveSample) {
        *self.latest.write() = Some(sample);
    }

    fn next_tick(&self) -> u64 {
        self.latest.read().as_ref().map_or(1, |s| s.tick + 1)
    }
}

/// Generate, score and publish one sample.
pub fn sample_once(engine: &ScoringEngine, feed: &LiveFeed) -> LiveSample {
    let reading = generate_with(&mut rand::rng(), engine.config());
    let channels = score_recorded(engine, &reading);
    let recommendations = recommend(&channels);
    let sample = LiveSample {
        tick: feed.next_tick(),
        reading,
        channels,
        recommendations,
    };
    feed.publish(sample.clone());
    sample
}

/// Spawn the sampling loop. The first sample is published immediately;
/// abort the handle to stop sampling.
pub fn spawn_live_sampler(
    engine: Arc<ScoringEngine>,
    feed: Arc<LiveFeed>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let sample = sample_once(&engine, &feed);

            gauge!("live_sampler_last_tick_ts").set(chrono::Utc::now().timestamp() as f64);

            tracing::debug!(
                target: "sampler",
                tick = sample.tick,
                unbalanced = sample.channels.iter().filter(|c| !c.status.is_balanced()).count(),
                "live sample published"
            );
        }
    })
}
