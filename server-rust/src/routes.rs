use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::beacons;
use crate::error::ApiError;
use crate::models::*;
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/beacons", post(create_beacon))
        .route("/api/beacons/{token}", get(resolve_beacon))
        .route("/api/beacons/{token}/join", post(join_beacon))
        .route("/api/beacons/{token}/midpoint", post(midpoint))
        .with_state(state)
}

/// `{ data, error }` envelope the web client expects
fn envelope<T: Serialize>(data: T) -> Json<Value> {
    Json(json!({ "data": data, "error": null }))
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(req)| req)
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}

async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now(),
        "uptime_secs": (Utc::now() - state.start_time).num_seconds(),
        "beacons": state.store.count().await,
    }))
}

async fn create_beacon(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateBeaconRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let beacon = beacons::create_beacon(&state.store, body(payload)?).await?;
    Ok((StatusCode::CREATED, envelope(beacon)))
}

async fn resolve_beacon(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let beacon = beacons::resolve_beacon(&state.store, &token).await?;
    Ok(envelope(beacon))
}

async fn join_beacon(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    payload: Result<Json<JoinRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let joined = beacons::join_beacon(&state.store, &state.resolver, &token, body(payload)?).await?;
    Ok(envelope(joined))
}

async fn midpoint(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let resolution = beacons::beacon_midpoint(&state.store, &state.resolver, &token).await?;
    Ok(envelope(resolution))
}
