use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::ax_state::AppState;
use crate::models::request::LoginRequest;

pub const SESSION_HEADER: &str = "x-session-token";

/// Exchange the shared secret for a session token. Nothing else is
/// reachable until this succeeds.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    if payload.password == state.config.app_password {
        let token = Uuid::new_v4();
        state.sessions.insert(token, Utc::now());
        info!(%token, "session opened");
        Json(json!({ "token": token })).into_response()
    } else {
        warn!("login rejected: wrong password");
        (
            StatusCode::UNAUTHORIZED,
            "Incorrect password. Please try again.",
        )
            .into_response()
    }
}

/// Middleware guarding every database-touching route.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v).ok());

    match token {
        Some(token) if state.sessions.contains_key(&token) => next.run(req).await,
        Some(_) => (StatusCode::UNAUTHORIZED, "Unknown session token").into_response(),
        None => (StatusCode::UNAUTHORIZED, "Missing session token").into_response(),
    }
}
