//! Translation of domain errors into HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{error, warn};

use crate::domain::DomainError;
use crate::storage::StoreError;
use shared::ReportKind;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, String>>,
}

/// Handler error: a domain failure plus what the caller was doing
#[derive(Debug)]
pub struct ApiError {
    context: &'static str,
    source: DomainError,
}

impl ApiError {
    pub fn new(context: &'static str, source: DomainError) -> Self {
        Self { context, source }
    }

    pub fn status(&self) -> StatusCode {
        match &self.source {
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::NotFound { .. } | DomainError::UnknownReport { .. } => StatusCode::NOT_FOUND,
            DomainError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            DomainError::Store(StoreError::NotAuthenticated) => StatusCode::UNAUTHORIZED,
            DomainError::Store(StoreError::PermissionDenied { .. }) => StatusCode::FORBIDDEN,
            DomainError::Store(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            DomainError::Store(StoreError::DuplicateKey { .. }) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Build an error for a record that was looked up and not there
pub fn not_found(context: &'static str, table: crate::storage::Table, id: &str) -> ApiError {
    ApiError::new(
        context,
        DomainError::NotFound {
            table,
            id: id.to_string(),
        },
    )
}

/// Build an error for a report slug that names no report
pub fn unknown_report(kind: &str) -> ApiError {
    let known: Vec<&str> = ReportKind::ALL.iter().map(|k| k.slug()).collect();
    ApiError::new(
        "Unknown report",
        DomainError::UnknownReport {
            kind: kind.to_string(),
            known: known.join(", "),
        },
    )
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{}: {}", self.context, self.source);
        } else {
            warn!("{}: {}", self.context, self.source);
        }

        let fields = match &self.source {
            DomainError::Validation(errors) => Some(errors.fields().clone()),
            _ => None,
        };
        let message = if status.is_server_error() {
            self.context.to_string()
        } else {
            self.source.to_string()
        };

        (status, Json(ErrorBody { error: message, fields })).into_response()
    }
}
