//! # Domain Module
//!
//! Business logic for the school records backend.
//!
//! Services take an `Arc<dyn RecordStore>` and work through typed
//! repositories, so the same code runs against the guarded SQLite store in
//! production and an in-memory store in tests.
//!
//! ## Module Organization
//!
//! - **aggregation**: pure revenue, salary, profit and balance calculations
//! - **rollover**: startup sweep that flips stale payment statuses
//! - **ids**: record identifier generation
//! - **validation**: field checks run before anything is stored
//! - **\*_service**: one service per entity or feature
//! - **sample_data**: demo records for a fresh install
//!
//! ## Business Rules
//!
//! - Student payments are split 70/30 between teacher and school
//! - A teacher's salary is fixed, or a rate times their assigned students
//! - Daily students owe again every day, monthly students every calendar month
//! - Only the secretary may change records; the director reads

pub mod aggregation;
pub mod attendance_service;
pub mod auth_service;
pub mod backup_service;
pub mod dashboard_service;
pub mod error;
pub mod expense_service;
pub mod ids;
pub mod payment_service;
pub mod report_service;
pub mod rollover;
pub mod sample_data;
pub mod schedule_service;
pub mod settings_service;
pub mod student_service;
pub mod teacher_service;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_support;

pub use attendance_service::AttendanceService;
pub use auth_service::AuthService;
pub use backup_service::BackupService;
pub use dashboard_service::DashboardService;
pub use error::{DomainError, DomainResult, ValidationErrors};
pub use expense_service::ExpenseService;
pub use payment_service::PaymentService;
pub use report_service::ReportService;
pub use rollover::RolloverService;
pub use schedule_service::ScheduleService;
pub use settings_service::SettingsService;
pub use student_service::StudentService;
pub use teacher_service::TeacherService;
