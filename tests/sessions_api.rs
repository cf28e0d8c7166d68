// tests/sessions_api.rs
//
// Session lifecycle over HTTP: start → end → history → comparison.

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value as Json};
use tower::ServiceExt as _;

use chakra_balance::api::{self, AppState};

const BODY_LIMIT: usize = 1024 * 1024;

fn all_min() -> Json {
    json!({"HRV": 10, "GSR": 0.1, "TEMP": 95, "EEG_ALPHA": 8, "EEG_BETA": 13, "EEG_THETA": 4})
}

fn midpoint() -> Json {
    json!({"HRV": 55, "GSR": 5.05, "TEMP": 98.5, "EEG_ALPHA": 10.5, "EEG_BETA": 21.5, "EEG_THETA": 6})
}

async fn call(app: &Router, req: Request<Body>) -> (StatusCode, Json) {
    let resp = app.clone().oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    let v = if bytes.is_empty() {
        Json::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Json::Null)
    };
    (status, v)
}

fn post(uri: &str, payload: Json) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn full_session_lifecycle() {
    let app = api::router(AppState::builtin());

    // Start
    let (st, s) = call(
        &app,
        post("/sessions", json!({"userId": "user-1", "reading": all_min()})),
    )
    .await;
    assert_eq!(st, StatusCode::CREATED);
    let id = s["id"].as_str().expect("session id").to_string();
    assert_eq!(s["userId"], json!("user-1"));
    assert_eq!(s["channelsBefore"].as_array().unwrap().len(), 7);
    assert_eq!(s["recommendations"].as_array().unwrap().len(), 14);
    assert!(s.get("after").is_none());
    assert!(s.get("endTime").is_none());

    // Second start for the same user conflicts
    let (st, err) = call(
        &app,
        post("/sessions", json!({"userId": "user-1", "reading": midpoint()})),
    )
    .await;
    assert_eq!(st, StatusCode::CONFLICT);
    assert!(err["error"].as_str().unwrap().contains(&id));

    // Comparison before completion conflicts
    let (st, _) = call(&app, get(&format!("/sessions/{id}/comparison"))).await;
    assert_eq!(st, StatusCode::CONFLICT);

    // End
    let (st, done) = call(
        &app,
        post(&format!("/sessions/{id}/end"), json!({"reading": midpoint()})),
    )
    .await;
    assert_eq!(st, StatusCode::OK);
    assert_eq!(done["channelsAfter"].as_array().unwrap().len(), 7);
    assert!(done["endTime"].is_string());

    // Ending twice → not found (no longer active)
    let (st, _) = call(
        &app,
        post(&format!("/sessions/{id}/end"), json!({"reading": midpoint()})),
    )
    .await;
    assert_eq!(st, StatusCode::NOT_FOUND);

    // Fetch by id
    let (st, fetched) = call(&app, get(&format!("/sessions/{id}"))).await;
    assert_eq!(st, StatusCode::OK);
    assert_eq!(fetched["id"], json!(id));

    // Comparison
    let (st, cmp) = call(&app, get(&format!("/sessions/{id}/comparison"))).await;
    assert_eq!(st, StatusCode::OK);
    assert_eq!(cmp["balancedBefore"], json!(0));
    assert_eq!(cmp["balancedAfter"], json!(7));
    assert_eq!(cmp["improvement"], json!(7));
    assert_eq!(cmp["metrics"][0]["metric"], json!("HRV"));
    assert_eq!(cmp["metrics"][1]["after"], json!(5.1));
    assert_eq!(cmp["channels"][3]["channel"], json!("Heart"));
    assert_eq!(cmp["channels"][3]["delta"], json!(50));
}

#[tokio::test]
async fn history_is_per_user_and_most_recent_first() {
    let app = api::router(AppState::builtin());

    let mut ids = Vec::new();
    for user in ["alice", "bob", "alice"] {
        let (_, s) = call(
            &app,
            post("/sessions", json!({"userId": user, "reading": all_min()})),
        )
        .await;
        let id = s["id"].as_str().unwrap().to_string();
        let (st, _) = call(
            &app,
            post(&format!("/sessions/{id}/end"), json!({"reading": midpoint()})),
        )
        .await;
        assert_eq!(st, StatusCode::OK);
        ids.push(id);
    }

    let (st, hist) = call(&app, get("/sessions?userId=alice")).await;
    assert_eq!(st, StatusCode::OK);
    let hist = hist.as_array().unwrap();
    assert_eq!(hist.len(), 2);
    assert_eq!(hist[0]["id"], json!(ids[2]));
    assert_eq!(hist[1]["id"], json!(ids[0]));

    let (_, limited) = call(&app, get("/sessions?userId=alice&limit=1")).await;
    assert_eq!(limited.as_array().unwrap().len(), 1);

    let (_, none) = call(&app, get("/sessions?userId=carol")).await;
    assert_eq!(none, json!([]));
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let app = api::router(AppState::builtin());
    let (st, err) = call(&app, get("/sessions/does-not-exist")).await;
    assert_eq!(st, StatusCode::NOT_FOUND);
    assert!(err["error"].is_string());
}

#[tokio::test]
async fn active_session_is_visible_until_ended() {
    let app = api::router(AppState::builtin());

    let (st, none) = call(&app, get("/sessions/active?userId=dana")).await;
    assert_eq!(st, StatusCode::OK);
    assert_eq!(none, Json::Null);

    let (_, s) = call(
        &app,
        post("/sessions", json!({"userId": "dana", "reading": all_min()})),
    )
    .await;
    let id = s["id"].as_str().unwrap().to_string();
    assert_eq!(s["channelsBefore"][0]["statusColor"], json!("#DC2626"));

    let (_, open) = call(&app, get("/sessions/active?userId=dana")).await;
    assert_eq!(open["id"], json!(id));
    let (_, other) = call(&app, get("/sessions/active?userId=erin")).await;
    assert_eq!(other, Json::Null);

    call(
        &app,
        post(&format!("/sessions/{id}/end"), json!({"reading": midpoint()})),
    )
    .await;
    let (_, after) = call(&app, get("/sessions/active?userId=dana")).await;
    assert_eq!(after, Json::Null);
}

#[tokio::test]
async fn open_sessions_beyond_capacity_drop_the_oldest() {
    let app = api::router(AppState::new(
        std::sync::Arc::new(chakra_balance::EngineConfig::builtin()),
        2,
    ));

    let mut ids = Vec::new();
    for user in ["u1", "u2", "u3"] {
        let (st, s) = call(
            &app,
            post("/sessions", json!({"userId": user, "reading": all_min()})),
        )
        .await;
        assert_eq!(st, StatusCode::CREATED);
        ids.push(s["id"].as_str().unwrap().to_string());
    }

    let (st, _) = call(&app, get(&format!("/sessions/{}", ids[0]))).await;
    assert_eq!(st, StatusCode::NOT_FOUND);
    for id in &ids[1..] {
        let (st, _) = call(&app, get(&format!("/sessions/{id}"))).await;
        assert_eq!(st, StatusCode::OK);
    }
}
