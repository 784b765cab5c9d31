//! # REST API for Backups
//!
//! Export only. The response carries the suggested filename and the JSON
//! document as text, ready to be saved by the client.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::info;

use super::error::ApiError;
use crate::AppState;

pub async fn export_backup(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/backup");

    match state.backup_service.export().await {
        Ok(backup) => {
            info!("Exported backup {}", backup.filename);
            (StatusCode::OK, Json(backup)).into_response()
        }
        Err(e) => ApiError::new("Failed to export backup", e).into_response(),
    }
}
