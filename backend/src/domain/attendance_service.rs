use shared::{parse_calendar_date, AttendanceRecord, AttendanceSummary, MarkAttendanceRequest, PersonKind};
use std::sync::Arc;
use tracing::{debug, info};

use super::aggregation::attendance_summary;
use super::error::{DomainResult, ValidationErrors};
use super::ids::generate_id;
use super::validation::REQUIRED;
use crate::storage::{RecordStore, Repository};

/// Calendar-date form of `date`, or `date` unchanged when it does not parse
fn day_key(date: &str) -> String {
    parse_calendar_date(date)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| date.to_string())
}

/// Daily presence of students and teachers, one record per (person, date)
#[derive(Clone)]
pub struct AttendanceService {
    records: Repository<AttendanceRecord>,
}

impl AttendanceService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            records: Repository::new(store),
        }
    }

    /// Record presence for a person on a date, replacing any earlier mark for that day
    pub async fn mark(&self, request: MarkAttendanceRequest) -> DomainResult<AttendanceRecord> {
        info!(
            "Marking {:?} {} as {:?} on {}",
            request.kind, request.person_id, request.status, request.date
        );

        let mut errors = ValidationErrors::new();
        if request.person_id.trim().is_empty() {
            errors.add("personId", REQUIRED);
        }
        // Stored dates are plain calendar dates so the date index matches
        let date = match parse_calendar_date(&request.date) {
            Some(day) => day.format("%Y-%m-%d").to_string(),
            None => {
                errors.add("date", "expected YYYY-MM-DD");
                String::new()
            }
        };
        errors.into_result()?;

        let existing = self
            .records
            .find("date", &date)
            .await?
            .into_iter()
            .find(|r| r.kind == request.kind && r.person_id() == Some(request.person_id.as_str()));

        let record = match existing {
            Some(mut record) => {
                debug!("Updating attendance record {}", record.id);
                record.status = request.status;
                self.records.upsert(&record).await?;
                record
            }
            None => {
                let (student_id, teacher_id) = match request.kind {
                    PersonKind::Student => (Some(request.person_id.clone()), None),
                    PersonKind::Teacher => (None, Some(request.person_id.clone())),
                };
                let record = AttendanceRecord {
                    id: generate_id(),
                    student_id,
                    teacher_id,
                    date,
                    status: request.status,
                    kind: request.kind,
                };
                self.records.add(&record).await?;
                record
            }
        };

        Ok(record)
    }

    pub async fn for_date(&self, date: &str) -> DomainResult<Vec<AttendanceRecord>> {
        info!("Listing attendance for {}", date);
        Ok(self.records.find("date", &day_key(date)).await?)
    }

    pub async fn summary(&self, date: &str) -> DomainResult<AttendanceSummary> {
        let records = self.for_date(date).await?;
        Ok(attendance_summary(&records, &day_key(date)))
    }
}
