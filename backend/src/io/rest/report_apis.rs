//! # REST API for Reports
//!
//! `:kind` is one of `students`, `teachers`, `students_per_teacher`,
//! `payments` or `finance`.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use chrono::Local;
use tracing::info;

use super::error::{unknown_report, ApiError};
use crate::AppState;
use shared::ReportKind;

pub async fn get_report(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/reports/{}", kind);

    let Some(report_kind) = ReportKind::from_slug(&kind) else {
        return unknown_report(&kind).into_response();
    };
    match state.report_service.report(report_kind).await {
        Ok(table) => (StatusCode::OK, Json(table)).into_response(),
        Err(e) => ApiError::new("Failed to generate report", e).into_response(),
    }
}

/// The same table as CSV, served as a download
pub async fn get_report_csv(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/reports/{}/csv", kind);

    let Some(report_kind) = ReportKind::from_slug(&kind) else {
        return unknown_report(&kind).into_response();
    };
    match state.report_service.report_csv(report_kind).await {
        Ok(csv) => {
            let disposition = format!(
                "attachment; filename=\"tcc-{}-{}.csv\"",
                report_kind.slug(),
                Local::now().format("%Y-%m-%d")
            );
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                csv,
            )
                .into_response()
        }
        Err(e) => ApiError::new("Failed to generate CSV report", e).into_response(),
    }
}
