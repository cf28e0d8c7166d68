//! session.rs: before/after therapy sessions and their in-memory history.
//!
//! A session is scored at start, completed exactly once with the after
//! reading, then pushed to the front of the history (most recent first).

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use metrics::{counter, gauge};
use parking_lot::Mutex;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::channel::{balanced_count, Channel, ChannelResult};
use crate::engine::ScoringEngine;
use crate::metrics::score_recorded;
use crate::reading::{Field, Reading};
use crate::recommend::recommend;
use crate::telemetry::anon_hash;

/// Hard upper bound on the history capacity.
pub const MAX_HISTORY_CAP: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("session {0} not found")]
    NotFound(String),
    #[error("user already has an active session ({session_id})")]
    AlreadyActive { session_id: String },
    #[error("session {0} has not been completed yet")]
    NotCompleted(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub before: Reading,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<Reading>,
    pub channels_before: Vec<ChannelResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels_after: Option<Vec<ChannelResult>>,
    pub start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub recommendations: Vec<String>,
}

impl Session {
    /// Score the before-reading and open a new session.
    pub fn start(user_id: impl Into<String>, before: Reading, engine: &ScoringEngine) -> Self {
        let channels_before = score_recorded(engine, &before);
        let recommendations = recommend(&channels_before);
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            before,
            after: None,
            channels_before,
            channels_after: None,
            start_time: Utc::now(),
            end_time: None,
            recommendations,
        }
    }

    /// Attach the after-reading and its scores. Consumes the open session.
    pub fn complete(self, after: Reading, engine: &ScoringEngine) -> Self {
        let channels_after = score_recorded(engine, &after);
        Self {
            after: Some(after),
            channels_after: Some(channels_after),
            end_time: Some(Utc::now()),
            ..self
        }
    }

    pub fn is_completed(&self) -> bool {
        self.after.is_some() && self.channels_after.is_some()
    }
}

/// Before/after value of one sensor field, rounded to one decimal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricDelta {
    pub metric: Field,
    pub before: f64,
    pub after: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelDelta {
    pub channel: Channel,
    pub before: u8,
    pub after: u8,
    pub delta: i16,
}

/// Session progress: how many channels moved into balance.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionComparison {
    pub session_id: String,
    pub balanced_before: usize,
    pub balanced_after: usize,
    /// `balanced_after - balanced_before`; negative when balance got worse.
    pub improvement: i32,
    pub metrics: Vec<MetricDelta>,
    pub channels: Vec<ChannelDelta>,
}

const COMPARED_METRICS: [Field; 3] = [Field::Hrv, Field::Gsr, Field::Temp];

impl SessionComparison {
    pub fn of(session: &Session) -> Result<Self, SessionError> {
        let (Some(after), Some(channels_after)) = (&session.after, &session.channels_after) else {
            return Err(SessionError::NotCompleted(session.id.clone()));
        };

        let balanced_before = balanced_count(&session.channels_before);
        let balanced_after = balanced_count(channels_after);

        let metrics = COMPARED_METRICS
            .iter()
            .map(|&metric| MetricDelta {
                metric,
                before: round1(session.before.value(metric)),
                after: round1(after.value(metric)),
            })
            .collect();

        let channels = session
            .channels_before
            .iter()
            .zip(channels_after.iter())
            .map(|(b, a)| ChannelDelta {
                channel: b.name,
                before: b.score,
                after: a.score,
                delta: i16::from(a.score) - i16::from(b.score),
            })
            .collect();

        Ok(Self {
            session_id: session.id.clone(),
            balanced_before,
            balanced_after,
            improvement: balanced_after as i32 - balanced_before as i32,
            metrics,
            channels,
        })
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Thread-safe store: open sessions by id + completed history, both bounded
/// by the same capacity.
#[derive(Debug)]
pub struct SessionStore {
    inner: Mutex<Inner>,
    cap: usize,
}

#[derive(Debug, Default)]
struct Inner {
    active: HashMap<String, Session>,
    /// Active ids in start order. Front = oldest.
    started: VecDeque<String>,
    /// Front = most recent.
    history: VecDeque<Session>,
}

impl SessionStore {
    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.clamp(1, MAX_HISTORY_CAP);
        Self {
            inner: Mutex::new(Inner {
                active: HashMap::new(),
                started: VecDeque::new(),
                history: VecDeque::with_capacity(cap),
            }),
            cap,
        }
    }

    /// Open a session for `user_id`. One active session per user. At capacity
    /// the oldest open session is dropped.
    pub fn start(
        &self,
        user_id: &str,
        before: Reading,
        engine: &ScoringEngine,
    ) -> Result<Session, SessionError> {
        let mut inner = self.inner.lock();
        if let Some(open) = inner.active.values().find(|s| s.user_id == user_id) {
            return Err(SessionError::AlreadyActive {
                session_id: open.id.clone(),
            });
        }

        while inner.active.len() >= self.cap {
            let Some(oldest) = inner.started.pop_front() else {
                break;
            };
            if let Some(dropped) = inner.active.remove(&oldest) {
                counter!("sessions_evicted_total").increment(1);
                warn!(
                    target: "sessions",
                    user = %anon_hash(&dropped.user_id),
                    session = %dropped.id,
                    "active session limit reached, dropping oldest"
                );
            }
        }

        let session = Session::start(user_id, before, engine);
        inner.started.push_back(session.id.clone());
        inner.active.insert(session.id.clone(), session.clone());

        counter!("sessions_started_total").increment(1);
        info!(
            target: "sessions",
            user = %anon_hash(user_id),
            session = %session.id,
            recommendations = session.recommendations.len(),
            "session started"
        );
        Ok(session)
    }

    /// Complete an open session and move it into history.
    pub fn end(
        &self,
        session_id: &str,
        after: Reading,
        engine: &ScoringEngine,
    ) -> Result<Session, SessionError> {
        let mut inner = self.inner.lock();
        let open = inner
            .active
            .remove(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;
        inner.started.retain(|id| id != session_id);

        let done = open.complete(after, engine);
        inner.history.push_front(done.clone());
        inner.history.truncate(self.cap);

        counter!("sessions_completed_total").increment(1);
        gauge!("session_history_len").set(inner.history.len() as f64);
        info!(
            target: "sessions",
            user = %anon_hash(&done.user_id),
            session = %done.id,
            balanced_before = balanced_count(&done.channels_before),
            balanced_after = done.channels_after.as_deref().map(balanced_count).unwrap_or(0),
            "session completed"
        );
        Ok(done)
    }

    /// Open or completed session by id.
    pub fn get(&self, session_id: &str) -> Option<Session> {
        let inner = self.inner.lock();
        inner
            .active
            .get(session_id)
            .or_else(|| inner.history.iter().find(|s| s.id == session_id))
            .cloned()
    }

    /// The user's open session, if any.
    pub fn active_for(&self, user_id: &str) -> Option<Session> {
        let inner = self.inner.lock();
        inner
            .active
            .values()
            .find(|s| s.user_id == user_id)
            .cloned()
    }

    /// Completed sessions of `user_id`, most recent first.
    pub fn history(&self, user_id: &str, limit: usize) -> Vec<Session> {
        let inner = self.inner.lock();
        inner
            .history
            .iter()
            .filter(|s| s.user_id == user_id)
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn comparison(&self, session_id: &str) -> Result<SessionComparison, SessionError> {
        let session = self
            .get(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;
        SessionComparison::of(&session)
    }
}
