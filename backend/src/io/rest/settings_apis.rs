//! # REST API for Display Settings

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::error::ApiError;
use crate::AppState;
use shared::UpdateLocaleRequest;

pub async fn get_locale(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/settings/locale");

    match state.settings_service.locale_settings().await {
        Ok(settings) => (StatusCode::OK, Json(settings)).into_response(),
        Err(e) => ApiError::new("Error reading locale", e).into_response(),
    }
}

/// Switch the display language. Any logged-in role may do this.
pub async fn set_locale(
    State(state): State<AppState>,
    Json(request): Json<UpdateLocaleRequest>,
) -> impl IntoResponse {
    info!("PUT /api/settings/locale - {}", request.locale.code());

    match state.settings_service.set_locale(request.locale).await {
        Ok(settings) => (StatusCode::OK, Json(settings)).into_response(),
        Err(e) => ApiError::new("Failed to set locale", e).into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct AmountQuery {
    pub amount: f64,
}

/// Format an amount the way the current locale displays money
pub async fn format_currency(
    State(state): State<AppState>,
    Query(query): Query<AmountQuery>,
) -> impl IntoResponse {
    info!("GET /api/settings/currency?amount={}", query.amount);

    match state.settings_service.format_currency(query.amount).await {
        Ok(formatted) => (StatusCode::OK, Json(json!({ "formatted": formatted }))).into_response(),
        Err(e) => ApiError::new("Error formatting amount", e).into_response(),
    }
}
