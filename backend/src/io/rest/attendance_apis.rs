//! # REST API for Attendance
//!
//! Daily presence marks. Endpoints taking `?date=` default to today.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::Local;
use serde::Deserialize;
use tracing::info;

use super::error::ApiError;
use crate::AppState;
use shared::MarkAttendanceRequest;

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

impl DateQuery {
    fn date_or_today(self) -> String {
        self.date
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| Local::now().format("%Y-%m-%d").to_string())
    }
}

pub async fn list_attendance(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> impl IntoResponse {
    let date = query.date_or_today();
    info!("GET /api/attendance?date={}", date);

    match state.attendance_service.for_date(&date).await {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(e) => ApiError::new("Error listing attendance", e).into_response(),
    }
}

/// Mark a student or teacher present or absent. Marking again the same day
/// replaces the earlier mark.
pub async fn mark_attendance(
    State(state): State<AppState>,
    Json(request): Json<MarkAttendanceRequest>,
) -> impl IntoResponse {
    info!("POST /api/attendance - request: {:?}", request);

    match state.attendance_service.mark(request).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => ApiError::new("Failed to mark attendance", e).into_response(),
    }
}

pub async fn get_attendance_summary(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> impl IntoResponse {
    let date = query.date_or_today();
    info!("GET /api/attendance/summary?date={}", date);

    match state.attendance_service.summary(&date).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => ApiError::new("Error summarizing attendance", e).into_response(),
    }
}
