//! # TCC Backend
//!
//! Record keeping for the TCC training center: students, teachers, fees,
//! salaries, expenses, attendance and the weekly schedule.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (REST API, handlers)
//!     ↓
//! Domain Layer (services, aggregation, validation)
//!     ↓
//! Storage Layer (role-guarded record store over SQLite)
//! ```
//!
//! Everything a handler needs is reachable from [`AppState`], which is built
//! once at startup by [`initialize_backend`].

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::{Context, Result};
use shared::Locale;
use std::fs;
use std::sync::Arc;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::{
    sample_data::seed_sample_data, AttendanceService, AuthService, BackupService, DashboardService,
    ExpenseService, PaymentService, ReportService, RolloverService, ScheduleService,
    SettingsService, StudentService, TeacherService,
};
use crate::storage::{GuardedStore, RecordStore, SessionHandle, SqliteRecordStore};

pub use io::create_router;

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub student_service: StudentService,
    pub teacher_service: TeacherService,
    pub payment_service: PaymentService,
    pub expense_service: ExpenseService,
    pub attendance_service: AttendanceService,
    pub dashboard_service: DashboardService,
    pub backup_service: BackupService,
    pub report_service: ReportService,
    pub schedule_service: ScheduleService,
    pub settings_service: SettingsService,
}

impl AppState {
    /// Wire every service over `raw_store`. Record services see it through the
    /// role guard; login works on the raw store.
    pub fn with_store(raw_store: Arc<dyn RecordStore>, default_locale: Locale) -> Self {
        let session = SessionHandle::new();
        let guarded: Arc<dyn RecordStore> =
            Arc::new(GuardedStore::new(raw_store.clone(), session.clone()));

        Self {
            auth_service: AuthService::new(raw_store, session),
            student_service: StudentService::new(guarded.clone()),
            teacher_service: TeacherService::new(guarded.clone()),
            payment_service: PaymentService::new(guarded.clone()),
            expense_service: ExpenseService::new(guarded.clone()),
            attendance_service: AttendanceService::new(guarded.clone()),
            dashboard_service: DashboardService::new(guarded.clone()),
            backup_service: BackupService::new(guarded.clone()),
            report_service: ReportService::new(guarded.clone()),
            schedule_service: ScheduleService::new(guarded.clone()),
            settings_service: SettingsService::new(guarded, default_locale),
        }
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    info!("Setting up database in {:?}", config.data_dir);
    fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("Failed to create data directory {:?}", config.data_dir))?;
    let raw_store: Arc<dyn RecordStore> = Arc::new(
        SqliteRecordStore::open_in(&config.data_dir)
            .await
            .context("Failed to open database")?,
    );

    info!("Setting up domain model");
    let state = AppState::with_store(raw_store.clone(), config.default_locale);

    let seeded = state.auth_service.seed_default_users().await?;
    if seeded > 0 {
        info!("Created {} default users", seeded);
    }
    if config.seed_sample_data {
        seed_sample_data(raw_store.clone()).await?;
    }

    let report = RolloverService::new(raw_store).run().await?;
    info!(
        "Payment status check: {} students examined, {} now unpaid",
        report.examined,
        report.flipped.len()
    );

    info!("Setting up application state");
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{PaymentStatus, StudentListQuery};
    use tempfile::TempDir;

    fn config_in(dir: &TempDir, seed: bool) -> AppConfig {
        AppConfig {
            data_dir: dir.path().join("data"),
            seed_sample_data: seed,
            ..AppConfig::default()
        }
    }

    #[tokio::test]
    async fn test_initialize_creates_database_and_users() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_in(&temp_dir, false);

        let state = initialize_backend(&config).await.unwrap();
        assert!(config.data_dir.join(storage::DATABASE_FILE).exists());

        state.auth_service.login("director", "director123").await.unwrap();
        assert!(!state.auth_service.can_write());
        let students = state.student_service.list_students(&StudentListQuery::default()).await.unwrap();
        assert!(students.is_empty());
    }

    #[tokio::test]
    async fn test_initialize_seeds_and_rolls_over_sample_data() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_in(&temp_dir, true);

        let state = initialize_backend(&config).await.unwrap();
        state.auth_service.login("secretary", "secretary123").await.unwrap();

        let students = state.student_service.list_students(&StudentListQuery::default()).await.unwrap();
        assert_eq!(students.len(), 3);
        // Sample payment dates are in 2024, long past their period
        assert!(students.iter().all(|s| s.payment_status == PaymentStatus::Unpaid));

        // Reopening the same data directory does not seed twice
        let state = initialize_backend(&config).await.unwrap();
        state.auth_service.login("secretary", "secretary123").await.unwrap();
        let students = state.student_service.list_students(&StudentListQuery::default()).await.unwrap();
        assert_eq!(students.len(), 3);
    }
}
