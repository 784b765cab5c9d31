//! # REST API for Sessions
//!
//! Login, logout and the current session. Logging in is what unlocks every
//! other endpoint.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::info;

use super::error::ApiError;
use crate::AppState;
use shared::LoginRequest;

/// Log in with a username and password
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> impl IntoResponse {
    info!("POST /api/session/login - user: {}", request.username);

    match state.auth_service.login(&request.username, &request.password).await {
        Ok(_) => (StatusCode::OK, Json(state.auth_service.session())).into_response(),
        Err(e) => ApiError::new("Failed to log in", e).into_response(),
    }
}

pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    info!("POST /api/session/logout");

    match state.auth_service.logout() {
        Ok(()) => (StatusCode::NO_CONTENT, "").into_response(),
        Err(e) => ApiError::new("Failed to log out", e).into_response(),
    }
}

/// Who is logged in and whether they may edit
pub async fn get_session(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/session");
    (StatusCode::OK, Json(state.auth_service.session())).into_response()
}
