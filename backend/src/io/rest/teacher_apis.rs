//! # REST API for Teacher Management

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::info;

use super::error::{not_found, ApiError};
use crate::storage::Table;
use crate::AppState;
use shared::Teacher;

pub async fn list_teachers(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/teachers");

    match state.teacher_service.list_teachers().await {
        Ok(teachers) => (StatusCode::OK, Json(teachers)).into_response(),
        Err(e) => ApiError::new("Error listing teachers", e).into_response(),
    }
}

pub async fn create_teacher(
    State(state): State<AppState>,
    Json(teacher): Json<Teacher>,
) -> impl IntoResponse {
    info!("POST /api/teachers - name: {}", teacher.full_name);

    match state.teacher_service.create_teacher(teacher).await {
        Ok(teacher) => (StatusCode::CREATED, Json(teacher)).into_response(),
        Err(e) => ApiError::new("Failed to create teacher", e).into_response(),
    }
}

pub async fn get_teacher(
    State(state): State<AppState>,
    Path(teacher_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/teachers/{}", teacher_id);

    match state.teacher_service.get_teacher(&teacher_id).await {
        Ok(Some(teacher)) => (StatusCode::OK, Json(teacher)).into_response(),
        Ok(None) => not_found("Teacher not found", Table::Teachers, &teacher_id).into_response(),
        Err(e) => ApiError::new("Error retrieving teacher", e).into_response(),
    }
}

pub async fn update_teacher(
    State(state): State<AppState>,
    Path(teacher_id): Path<String>,
    Json(teacher): Json<Teacher>,
) -> impl IntoResponse {
    info!("PUT /api/teachers/{}", teacher_id);

    match state.teacher_service.update_teacher(&teacher_id, teacher).await {
        Ok(teacher) => (StatusCode::OK, Json(teacher)).into_response(),
        Err(e) => ApiError::new("Failed to update teacher", e).into_response(),
    }
}

/// Delete a teacher and detach them from every student's subjects
pub async fn delete_teacher(
    State(state): State<AppState>,
    Path(teacher_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/teachers/{}", teacher_id);

    match state.teacher_service.delete_teacher(&teacher_id).await {
        Ok(()) => (StatusCode::NO_CONTENT, "").into_response(),
        Err(e) => ApiError::new("Failed to delete teacher", e).into_response(),
    }
}

/// Pay the teacher's salary and book it as an expense
pub async fn mark_teacher_salary_paid(
    State(state): State<AppState>,
    Path(teacher_id): Path<String>,
) -> impl IntoResponse {
    info!("POST /api/teachers/{}/mark-salary-paid", teacher_id);

    match state.teacher_service.mark_salary_paid(&teacher_id).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => ApiError::new("Failed to pay salary", e).into_response(),
    }
}

/// Students linked to the teacher through any of their subjects
pub async fn list_teacher_students(
    State(state): State<AppState>,
    Path(teacher_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/teachers/{}/students", teacher_id);

    match state.teacher_service.students_of(&teacher_id).await {
        Ok(students) => (StatusCode::OK, Json(students)).into_response(),
        Err(e) => ApiError::new("Error listing teacher students", e).into_response(),
    }
}
