//! # REST API Interface Layer
//!
//! Routes, CORS and the handler modules, one per resource.

pub mod attendance_apis;
pub mod backup_apis;
pub mod dashboard_apis;
pub mod error;
pub mod expense_apis;
pub mod payment_apis;
pub mod report_apis;
pub mod schedule_apis;
pub mod session_apis;
pub mod settings_apis;
pub mod student_apis;
pub mod teacher_apis;

use axum::{
    http::{HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::AppState;

pub use error::ApiError;

const FRONTEND_ORIGIN: &str = "http://localhost:8080";

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router {
    // CORS setup to allow frontend to make requests
    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_static(FRONTEND_ORIGIN))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/session", get(session_apis::get_session))
        .route("/session/login", post(session_apis::login))
        .route("/session/logout", post(session_apis::logout))
        .route(
            "/students",
            get(student_apis::list_students).post(student_apis::create_student),
        )
        .route("/students/unpaid", get(student_apis::list_unpaid_students))
        .route(
            "/students/:id",
            get(student_apis::get_student)
                .put(student_apis::update_student)
                .delete(student_apis::delete_student),
        )
        .route("/students/:id/mark-paid", post(student_apis::mark_student_paid))
        .route("/students/:id/balance", get(student_apis::get_student_balance))
        .route("/students/:id/payments", get(student_apis::list_student_payments))
        .route(
            "/teachers",
            get(teacher_apis::list_teachers).post(teacher_apis::create_teacher),
        )
        .route(
            "/teachers/:id",
            get(teacher_apis::get_teacher)
                .put(teacher_apis::update_teacher)
                .delete(teacher_apis::delete_teacher),
        )
        .route("/teachers/:id/students", get(teacher_apis::list_teacher_students))
        .route(
            "/teachers/:id/mark-salary-paid",
            post(teacher_apis::mark_teacher_salary_paid),
        )
        .route(
            "/payments",
            get(payment_apis::list_payments).post(payment_apis::record_payment),
        )
        .route(
            "/expenses",
            get(expense_apis::list_expenses).post(expense_apis::create_expense),
        )
        .route(
            "/expenses/:id",
            put(expense_apis::update_expense).delete(expense_apis::delete_expense),
        )
        .route(
            "/attendance",
            get(attendance_apis::list_attendance).post(attendance_apis::mark_attendance),
        )
        .route("/attendance/summary", get(attendance_apis::get_attendance_summary))
        .route("/dashboard", get(dashboard_apis::get_dashboard))
        .route("/backup", get(backup_apis::export_backup))
        .route("/reports/:kind", get(report_apis::get_report))
        .route("/reports/:kind/csv", get(report_apis::get_report_csv))
        .route(
            "/schedule",
            get(schedule_apis::get_schedule).put(schedule_apis::save_schedule),
        )
        .route("/schedule/table", get(schedule_apis::get_schedule_table))
        .route("/schedule/hours", put(schedule_apis::set_schedule_hours))
        .route("/schedule/sessions", post(schedule_apis::add_schedule_session))
        .route(
            "/schedule/sessions/:day/:hour/:index",
            delete(schedule_apis::remove_schedule_session),
        )
        .route(
            "/settings/locale",
            get(settings_apis::get_locale).put(settings_apis::set_locale),
        )
        .route("/settings/currency", get(settings_apis::format_currency));

    Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(app_state)
}
