use shared::{DashboardSummary, Expense, Payment, Student, Teacher};
use std::sync::Arc;
use tracing::info;

use super::aggregation::{financial_summary, unpaid_students};
use super::error::DomainResult;
use crate::storage::{RecordStore, Repository};

/// Headline figures for the home screen, recomputed from full snapshots on every call
#[derive(Clone)]
pub struct DashboardService {
    students: Repository<Student>,
    teachers: Repository<Teacher>,
    payments: Repository<Payment>,
    expenses: Repository<Expense>,
}

impl DashboardService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            students: Repository::new(store.clone()),
            teachers: Repository::new(store.clone()),
            payments: Repository::new(store.clone()),
            expenses: Repository::new(store),
        }
    }

    pub async fn summary(&self) -> DomainResult<DashboardSummary> {
        info!("Building dashboard summary");

        let students = self.students.all().await?;
        let teachers = self.teachers.all().await?;
        let payments = self.payments.all().await?;
        let expenses = self.expenses.all().await?;

        let unpaid = unpaid_students(&students);
        Ok(DashboardSummary {
            total_students: students.len(),
            total_teachers: teachers.len(),
            paid_students: students.len() - unpaid.len(),
            unpaid_students: unpaid,
            finance: financial_summary(&payments, &teachers, &expenses),
        })
    }
}
