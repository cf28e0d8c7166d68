//! HTTP surface for the dashboard: scoring, mock/live readings, therapy
//! plans and session lifecycle. Handlers stay thin; all logic lives in the
//! library modules.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::channel::{Channel, ChannelResult};
use crate::config::EngineConfig;
use crate::engine::ScoringEngine;
use crate::metrics::score_recorded;
use crate::mock::generate_with;
use crate::reading::Reading;
use crate::recommend::recommend;
use crate::sampler::{LiveFeed, LiveSample};
use crate::session::{Session, SessionComparison, SessionError, SessionStore};
use crate::settings::DEFAULT_HISTORY_CAP;
use crate::therapy::{format_clock, TherapyPlan};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ScoringEngine>,
    pub sessions: Arc<SessionStore>,
    pub live: Arc<LiveFeed>,
}

impl AppState {
    pub fn new(config: Arc<EngineConfig>, history_cap: usize) -> Self {
        Self {
            engine: Arc::new(ScoringEngine::new(config)),
            sessions: Arc::new(SessionStore::with_capacity(history_cap)),
            live: Arc::new(LiveFeed::new()),
        }
    }

    /// Built-in tables, default history size.
    pub fn builtin() -> Self {
        Self::new(Arc::new(EngineConfig::builtin()), DEFAULT_HISTORY_CAP)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/score", post(score))
        .route("/readings/mock", get(mock_reading))
        .route("/live", get(live))
        .route("/therapy/plan", post(therapy_plan))
        .route("/sessions", post(start_session).get(list_sessions))
        .route("/sessions/active", get(active_session))
        .route("/sessions/{id}", get(get_session))
        .route("/sessions/{id}/end", post(end_session))
        .route("/sessions/{id}/comparison", get(session_comparison))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/* ----------------------------
Errors
---------------------------- */

pub enum ApiError {
    Session(SessionError),
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        Self::Session(e)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Session(e) => {
                let status = match e {
                    SessionError::NotFound(_) => StatusCode::NOT_FOUND,
                    SessionError::AlreadyActive { .. } | SessionError::NotCompleted(_) => {
                        StatusCode::CONFLICT
                    }
                };
                (status, e.to_string())
            }
        };
        warn!(target: "api", %status, error = %message, "request failed");
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/* ----------------------------
Scoring
---------------------------- */

#[derive(Serialize)]
struct ScoreResp {
    channels: Vec<ChannelResult>,
    recommendations: Vec<String>,
}

#[derive(Serialize)]
struct MockResp {
    reading: Reading,
    channels: Vec<ChannelResult>,
    recommendations: Vec<String>,
}

async fn score(State(state): State<AppState>, Json(reading): Json<Reading>) -> Json<ScoreResp> {
    let channels = score_recorded(&state.engine, &reading);
    let recommendations = recommend(&channels);
    Json(ScoreResp {
        channels,
        recommendations,
    })
}

async fn mock_reading(State(state): State<AppState>) -> Json<MockResp> {
    let reading = generate_with(&mut rand::rng(), state.engine.config());
    let channels = score_recorded(&state.engine, &reading);
    let recommendations = recommend(&channels);
    Json(MockResp {
        reading,
        channels,
        recommendations,
    })
}

async fn live(State(state): State<AppState>) -> Json<Option<LiveSample>> {
    Json(state.live.latest())
}

/* ----------------------------
Therapy
---------------------------- */

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanStep {
    channel: Channel,
    frequency_hz: u32,
    title: &'static str,
    healing_secs: u32,
    clock: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanResp {
    steps: Vec<PlanStep>,
    total_secs: u32,
    total_clock: String,
}

async fn therapy_plan(
    State(state): State<AppState>,
    Json(reading): Json<Reading>,
) -> Json<PlanResp> {
    let channels = score_recorded(&state.engine, &reading);
    let plan = TherapyPlan::from_results(&channels);
    let steps = plan
        .steps()
        .iter()
        .map(|s| PlanStep {
            channel: s.channel,
            frequency_hz: s.frequency_hz,
            title: s.title,
            healing_secs: s.healing_secs,
            clock: format_clock(s.healing_secs),
        })
        .collect();
    Json(PlanResp {
        steps,
        total_secs: plan.total_secs(),
        total_clock: format_clock(plan.total_secs()),
    })
}

/* ----------------------------
Sessions
---------------------------- */

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartReq {
    user_id: String,
    reading: Reading,
}

#[derive(Deserialize)]
struct EndReq {
    reading: Reading,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserQuery {
    user_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryQuery {
    user_id: String,
    #[serde(default = "default_history_limit")]
    limit: usize,
}

fn default_history_limit() -> usize {
    10
}

async fn start_session(
    State(state): State<AppState>,
    Json(body): Json<StartReq>,
) -> Result<(StatusCode, Json<Session>), ApiError> {
    let session = state
        .sessions
        .start(&body.user_id, body.reading, &state.engine)?;
    Ok((StatusCode::CREATED, Json(session)))
}

async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<EndReq>,
) -> Result<Json<Session>, ApiError> {
    let session = state.sessions.end(&id, body.reading, &state.engine)?;
    Ok(Json(session))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Session>, ApiError> {
    state
        .sessions
        .get(&id)
        .map(Json)
        .ok_or_else(|| SessionError::NotFound(id).into())
}

async fn active_session(
    State(state): State<AppState>,
    Query(q): Query<UserQuery>,
) -> Json<Option<Session>> {
    Json(state.sessions.active_for(&q.user_id))
}

async fn list_sessions(
    State(state): State<AppState>,
    Query(q): Query<HistoryQuery>,
) -> Json<Vec<Session>> {
    Json(state.sessions.history(&q.user_id, q.limit))
}

async fn session_comparison(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionComparison>, ApiError> {
    Ok(Json(state.sessions.comparison(&id)?))
}
