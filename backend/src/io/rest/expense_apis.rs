//! # REST API for Expenses

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::info;

use super::error::ApiError;
use crate::AppState;
use shared::Expense;

pub async fn list_expenses(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/expenses");

    match state.expense_service.list_expenses().await {
        Ok(expenses) => (StatusCode::OK, Json(expenses)).into_response(),
        Err(e) => ApiError::new("Error listing expenses", e).into_response(),
    }
}

pub async fn create_expense(
    State(state): State<AppState>,
    Json(expense): Json<Expense>,
) -> impl IntoResponse {
    info!("POST /api/expenses - type: {}, amount: {}", expense.expense_type, expense.amount);

    match state.expense_service.create_expense(expense).await {
        Ok(expense) => (StatusCode::CREATED, Json(expense)).into_response(),
        Err(e) => ApiError::new("Failed to create expense", e).into_response(),
    }
}

pub async fn update_expense(
    State(state): State<AppState>,
    Path(expense_id): Path<String>,
    Json(expense): Json<Expense>,
) -> impl IntoResponse {
    info!("PUT /api/expenses/{}", expense_id);

    match state.expense_service.update_expense(&expense_id, expense).await {
        Ok(expense) => (StatusCode::OK, Json(expense)).into_response(),
        Err(e) => ApiError::new("Failed to update expense", e).into_response(),
    }
}

pub async fn delete_expense(
    State(state): State<AppState>,
    Path(expense_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/expenses/{}", expense_id);

    match state.expense_service.delete_expense(&expense_id).await {
        Ok(()) => (StatusCode::NO_CONTENT, "").into_response(),
        Err(e) => ApiError::new("Failed to delete expense", e).into_response(),
    }
}
