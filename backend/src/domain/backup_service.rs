//! Write-only JSON backup of the four core tables.

use chrono::{Local, NaiveDate};
use shared::{BackupDocument, BackupResponse, Expense, Payment, Student, Teacher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{error, info};

use super::error::DomainResult;
use crate::storage::{RecordStore, Repository};

pub fn backup_filename(date: NaiveDate) -> String {
    format!("school-backup-{}.json", date.format("%Y-%m-%d"))
}

#[derive(Clone)]
pub struct BackupService {
    students: Repository<Student>,
    teachers: Repository<Teacher>,
    payments: Repository<Payment>,
    expenses: Repository<Expense>,
}

impl BackupService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            students: Repository::new(store.clone()),
            teachers: Repository::new(store.clone()),
            payments: Repository::new(store.clone()),
            expenses: Repository::new(store),
        }
    }

    /// Snapshot of students, teachers, payments and expenses
    pub async fn snapshot(&self) -> DomainResult<BackupDocument> {
        Ok(BackupDocument {
            students: self.students.all().await?,
            teachers: self.teachers.all().await?,
            payments: self.payments.all().await?,
            expenses: self.expenses.all().await?,
        })
    }

    pub async fn export(&self) -> DomainResult<BackupResponse> {
        self.export_at(Local::now().date_naive()).await
    }

    /// Pretty-printed backup document and the file name it should be saved under
    pub async fn export_at(&self, date: NaiveDate) -> DomainResult<BackupResponse> {
        info!("Exporting backup for {}", date);

        let document = self.snapshot().await?;
        let content = serde_json::to_string_pretty(&document)?;

        info!(
            "Backup holds {} students, {} teachers, {} payments, {} expenses",
            document.students.len(),
            document.teachers.len(),
            document.payments.len(),
            document.expenses.len()
        );
        Ok(BackupResponse {
            filename: backup_filename(date),
            content,
        })
    }

    /// Write today's backup into `dir` and return the file path
    pub async fn write_to(&self, dir: &Path) -> DomainResult<PathBuf> {
        let backup = self.export().await?;
        let path = dir.join(&backup.filename);

        fs::create_dir_all(dir).await?;
        if let Err(e) = fs::write(&path, backup.content.as_bytes()).await {
            error!("Failed to write backup to {}: {}", path.display(), e);
            return Err(e.into());
        }

        info!("Backup written to {}", path.display());
        Ok(path)
    }
}
