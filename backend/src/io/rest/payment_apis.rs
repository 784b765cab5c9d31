//! # REST API for the Payment Ledger

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::info;

use super::error::ApiError;
use crate::AppState;
use shared::Payment;

pub async fn list_payments(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/payments");

    match state.payment_service.list_payments().await {
        Ok(payments) => (StatusCode::OK, Json(payments)).into_response(),
        Err(e) => ApiError::new("Error listing payments", e).into_response(),
    }
}

/// Record a payment. Shares left at zero are split 70/30.
pub async fn record_payment(
    State(state): State<AppState>,
    Json(payment): Json<Payment>,
) -> impl IntoResponse {
    info!("POST /api/payments - student: {}, amount: {}", payment.student_id, payment.amount);

    match state.payment_service.record_payment(payment).await {
        Ok(payment) => (StatusCode::CREATED, Json(payment)).into_response(),
        Err(e) => ApiError::new("Failed to record payment", e).into_response(),
    }
}
