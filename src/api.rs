// src/api.rs
//! Operator command surface. These routes only call into the relay
//! contracts; invalid input is rejected here and never touches core state.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;

use crate::notify::TargetSink;
use crate::relay::{CycleReport, Relay, RelayStatus};
use crate::sources::types::SeriesInfo;
use crate::watchlist::SeriesKind;

#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/status", get(status))
        .route("/setup", post(setup))
        .route("/check", post(force_check))
        .route("/series/follow", post(follow_series))
        .route("/series/lookup", get(lookup_series))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

type Rejection = (StatusCode, String);

fn bad_request(msg: &str) -> Rejection {
    (StatusCode::BAD_REQUEST, msg.to_string())
}

async fn status(State(state): State<AppState>) -> Json<RelayStatus> {
    Json(state.relay.status())
}

#[derive(serde::Deserialize)]
struct SetupReq {
    webhook_url: String,
    #[serde(default)]
    mention_role: Option<String>,
}

#[derive(serde::Serialize)]
struct SetupResp {
    configured: bool,
}

async fn setup(
    State(state): State<AppState>,
    Json(body): Json<SetupReq>,
) -> Result<Json<SetupResp>, Rejection> {
    let webhook_url = body.webhook_url.trim().to_string();
    if webhook_url.is_empty() {
        return Err(bad_request("webhook_url must not be empty"));
    }
    state.relay.configure_sink(TargetSink {
        webhook_url,
        mention_role: body
            .mention_role
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty()),
    });
    Ok(Json(SetupResp { configured: true }))
}

/// Force an immediate cycle; queues behind any in-flight cycle and returns
/// its report.
async fn force_check(State(state): State<AppState>) -> Json<CycleReport> {
    Json(state.relay.run_cycle().await)
}

#[derive(serde::Deserialize)]
struct FollowReq {
    kind: String,
    name: String,
}

#[derive(serde::Serialize)]
struct FollowResp {
    followed: bool,
}

async fn follow_series(
    State(state): State<AppState>,
    Json(body): Json<FollowReq>,
) -> Result<Json<FollowResp>, Rejection> {
    let Some(kind) = SeriesKind::parse(&body.kind) else {
        return Err(bad_request("kind must be 'manga' or 'anime'"));
    };
    if body.name.trim().is_empty() {
        return Err(bad_request("name must not be empty"));
    }
    let followed = state.relay.follow_series(kind, &body.name);
    Ok(Json(FollowResp { followed }))
}

#[derive(serde::Deserialize)]
struct LookupParams {
    name: String,
    #[serde(default)]
    kind: Option<String>,
}

async fn lookup_series(
    State(state): State<AppState>,
    Query(params): Query<LookupParams>,
) -> Result<Json<SeriesInfo>, Rejection> {
    let kind = match params.kind.as_deref() {
        None => SeriesKind::Anime,
        Some(raw) => SeriesKind::parse(raw)
            .ok_or_else(|| bad_request("kind must be 'manga' or 'anime'"))?,
    };
    if params.name.trim().is_empty() {
        return Err(bad_request("name must not be empty"));
    }
    match state.relay.lookup_series(params.name.trim(), kind).await {
        Some(info) => Ok(Json(info)),
        None => Err((StatusCode::NOT_FOUND, "series not found".to_string())),
    }
}
