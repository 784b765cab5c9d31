//! Startup sweep that flips stale payment statuses to unpaid.

use chrono::{Local, NaiveDate};
use shared::{parse_calendar_date, PaymentStatus, PaymentType, RolloverReport, Student};
use std::sync::Arc;
use tracing::{debug, info};

use super::aggregation::months_between;
use super::error::DomainResult;
use crate::storage::{RecordStore, Repository};

/// True if the student's last payment no longer covers `today`.
///
/// Daily students must have paid today; monthly students are stale once the
/// calendar month changes. A last payment date that cannot be read is stale.
pub fn is_stale(student: &Student, today: NaiveDate) -> bool {
    let Some(last_paid) = parse_calendar_date(&student.last_payment_date) else {
        return true;
    };
    match student.payment_type {
        PaymentType::Daily => last_paid != today,
        PaymentType::Monthly => months_between(last_paid, today) >= 1,
    }
}

/// Runs against the raw store: the sweep is a system task, not a user action
#[derive(Clone)]
pub struct RolloverService {
    students: Repository<Student>,
}

impl RolloverService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            students: Repository::new(store),
        }
    }

    pub async fn run(&self) -> DomainResult<RolloverReport> {
        self.run_at(Local::now().date_naive()).await
    }

    /// Mark every paid student whose period has lapsed as unpaid.
    /// Students that are already unpaid are not rewritten.
    pub async fn run_at(&self, today: NaiveDate) -> DomainResult<RolloverReport> {
        info!("Running payment status rollover for {}", today);

        let students = self.students.all().await?;
        let mut report = RolloverReport {
            examined: students.len(),
            flipped: Vec::new(),
        };

        for mut student in students {
            if student.payment_status != PaymentStatus::Paid || !is_stale(&student, today) {
                continue;
            }
            debug!("Student {} last paid on {}, marking unpaid", student.id, student.last_payment_date);
            student.payment_status = PaymentStatus::Unpaid;
            self.students.upsert(&student).await?;
            report.flipped.push(student.id);
        }

        info!(
            "Rollover examined {} students, marked {} unpaid",
            report.examined,
            report.flipped.len()
        );
        Ok(report)
    }
}
