//! # REST API for Student Management
//!
//! Endpoints for the student roster, fee status and balances.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::info;

use super::error::{not_found, ApiError};
use crate::storage::Table;
use crate::AppState;
use shared::{Student, StudentListQuery};

/// List students, optionally filtered
pub async fn list_students(
    State(state): State<AppState>,
    Query(query): Query<StudentListQuery>,
) -> impl IntoResponse {
    info!("GET /api/students - filters: {:?}", query);

    match state.student_service.list_students(&query).await {
        Ok(students) => (StatusCode::OK, Json(students)).into_response(),
        Err(e) => ApiError::new("Error listing students", e).into_response(),
    }
}

pub async fn create_student(
    State(state): State<AppState>,
    Json(student): Json<Student>,
) -> impl IntoResponse {
    info!("POST /api/students - name: {}", student.full_name);

    match state.student_service.create_student(student).await {
        Ok(student) => (StatusCode::CREATED, Json(student)).into_response(),
        Err(e) => ApiError::new("Failed to create student", e).into_response(),
    }
}

/// Get a student by ID
pub async fn get_student(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/students/{}", student_id);

    match state.student_service.get_student(&student_id).await {
        Ok(Some(student)) => (StatusCode::OK, Json(student)).into_response(),
        Ok(None) => not_found("Student not found", Table::Students, &student_id).into_response(),
        Err(e) => ApiError::new("Error retrieving student", e).into_response(),
    }
}

pub async fn update_student(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    Json(student): Json<Student>,
) -> impl IntoResponse {
    info!("PUT /api/students/{}", student_id);

    match state.student_service.update_student(&student_id, student).await {
        Ok(student) => (StatusCode::OK, Json(student)).into_response(),
        Err(e) => ApiError::new("Failed to update student", e).into_response(),
    }
}

pub async fn delete_student(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/students/{}", student_id);

    match state.student_service.delete_student(&student_id).await {
        Ok(()) => (StatusCode::NO_CONTENT, "").into_response(),
        Err(e) => ApiError::new("Failed to delete student", e).into_response(),
    }
}

/// Record a period's fee for the student and mark them paid
pub async fn mark_student_paid(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> impl IntoResponse {
    info!("POST /api/students/{}/mark-paid", student_id);

    match state.student_service.mark_as_paid(&student_id).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => ApiError::new("Failed to mark student as paid", e).into_response(),
    }
}

pub async fn list_unpaid_students(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/students/unpaid");

    match state.student_service.unpaid_students().await {
        Ok(students) => (StatusCode::OK, Json(students)).into_response(),
        Err(e) => ApiError::new("Error listing unpaid students", e).into_response(),
    }
}

/// Expected fees to date minus payments, floored at zero
pub async fn get_student_balance(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/students/{}/balance", student_id);

    match state.student_service.projected_balance(&student_id).await {
        Ok(balance) => (StatusCode::OK, Json(balance)).into_response(),
        Err(e) => ApiError::new("Error computing balance", e).into_response(),
    }
}

pub async fn list_student_payments(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/students/{}/payments", student_id);

    match state.payment_service.payments_for_student(&student_id).await {
        Ok(payments) => (StatusCode::OK, Json(payments)).into_response(),
        Err(e) => ApiError::new("Error listing student payments", e).into_response(),
    }
}
