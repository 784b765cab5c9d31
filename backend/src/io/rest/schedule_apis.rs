//! # REST API for the Weekly Schedule

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::Local;
use tracing::info;

use super::error::ApiError;
use crate::domain::schedule_service::grid_table;
use crate::AppState;
use shared::{AddSessionRequest, ScheduleGrid};

pub async fn get_schedule(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/schedule");

    match state.schedule_service.load().await {
        Ok(grid) => (StatusCode::OK, Json(grid)).into_response(),
        Err(e) => ApiError::new("Error loading schedule", e).into_response(),
    }
}

/// Replace the whole grid
pub async fn save_schedule(
    State(state): State<AppState>,
    Json(grid): Json<ScheduleGrid>,
) -> impl IntoResponse {
    info!("PUT /api/schedule");

    match state.schedule_service.save(grid).await {
        Ok(grid) => (StatusCode::OK, Json(grid)).into_response(),
        Err(e) => ApiError::new("Failed to save schedule", e).into_response(),
    }
}

pub async fn add_schedule_session(
    State(state): State<AppState>,
    Json(request): Json<AddSessionRequest>,
) -> impl IntoResponse {
    info!("POST /api/schedule/sessions - {} {}", request.day, request.hour);

    match state.schedule_service.add_session(request).await {
        Ok(grid) => (StatusCode::CREATED, Json(grid)).into_response(),
        Err(e) => ApiError::new("Failed to add session", e).into_response(),
    }
}

pub async fn remove_schedule_session(
    State(state): State<AppState>,
    Path((day, hour, index)): Path<(String, String, usize)>,
) -> impl IntoResponse {
    info!("DELETE /api/schedule/sessions/{}/{}/{}", day, hour, index);

    match state.schedule_service.remove_session(&day, &hour, index).await {
        Ok(grid) => (StatusCode::OK, Json(grid)).into_response(),
        Err(e) => ApiError::new("Failed to remove session", e).into_response(),
    }
}

pub async fn set_schedule_hours(
    State(state): State<AppState>,
    Json(hours): Json<Vec<String>>,
) -> impl IntoResponse {
    info!("PUT /api/schedule/hours - {} slots", hours.len());

    match state.schedule_service.set_hours(hours).await {
        Ok(grid) => (StatusCode::OK, Json(grid)).into_response(),
        Err(e) => ApiError::new("Failed to set time slots", e).into_response(),
    }
}

/// The grid as a printable table
pub async fn get_schedule_table(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/schedule/table");

    match state.schedule_service.load().await {
        Ok(grid) => {
            let today = Local::now().format("%Y-%m-%d").to_string();
            (StatusCode::OK, Json(grid_table(&grid, &today))).into_response()
        }
        Err(e) => ApiError::new("Error loading schedule", e).into_response(),
    }
}
