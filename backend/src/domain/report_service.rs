//! Titled report tables and their CSV rendering.
//!
//! Page layout (PDF) is left to the caller; this module only decides what
//! goes in each table.

use chrono::{Local, NaiveDate};
use shared::{
    parse_calendar_date, Expense, Payment, PaymentStatus, PaymentType, ReportKind, ReportTable,
    SalaryType, Student, Teacher,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use super::aggregation::{financial_summary, students_of_teacher};
use super::error::{DomainError, DomainResult};
use crate::storage::{RecordStore, Repository};

fn amount(value: f64) -> String {
    format!("{:.2}", value)
}

fn payment_type_label(payment_type: PaymentType) -> &'static str {
    match payment_type {
        PaymentType::Monthly => "monthly",
        PaymentType::Daily => "daily",
    }
}

fn salary_type_label(salary_type: SalaryType) -> &'static str {
    match salary_type {
        SalaryType::Fixed => "fixed",
        SalaryType::PerStudent => "per_student",
    }
}

fn display_date(value: &str) -> String {
    parse_calendar_date(value)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| value.to_string())
}

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|h| h.to_string()).collect()
}

/// Render a report table as CSV, header row first
pub fn to_csv(table: &ReportTable) -> DomainResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| DomainError::Io(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[derive(Clone)]
pub struct ReportService {
    students: Repository<Student>,
    teachers: Repository<Teacher>,
    payments: Repository<Payment>,
    expenses: Repository<Expense>,
}

impl ReportService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            students: Repository::new(store.clone()),
            teachers: Repository::new(store.clone()),
            payments: Repository::new(store.clone()),
            expenses: Repository::new(store),
        }
    }

    pub async fn report(&self, kind: ReportKind) -> DomainResult<ReportTable> {
        self.report_at(kind, Local::now().date_naive()).await
    }

    pub async fn report_at(&self, kind: ReportKind, generated_on: NaiveDate) -> DomainResult<ReportTable> {
        info!("Generating {} report", kind.slug());

        let generated_on = generated_on.format("%Y-%m-%d").to_string();
        let table = match kind {
            ReportKind::Students => {
                let students = self.students.all().await?;
                ReportTable {
                    title: "TCC - Student Report".to_string(),
                    generated_on,
                    headers: headers(&["Name", "Class", "Payment Type", "Status", "Phone"]),
                    rows: students
                        .iter()
                        .map(|s| {
                            vec![
                                s.full_name.clone(),
                                s.class_name.clone(),
                                payment_type_label(s.payment_type).to_string(),
                                match s.payment_status {
                                    PaymentStatus::Paid => "paid".to_string(),
                                    PaymentStatus::Unpaid => "unpaid".to_string(),
                                },
                                s.phone_number.clone().unwrap_or_else(|| "-".to_string()),
                            ]
                        })
                        .collect(),
                }
            }
            ReportKind::Teachers => {
                let teachers = self.teachers.all().await?;
                ReportTable {
                    title: "TCC - Teacher Report".to_string(),
                    generated_on,
                    headers: headers(&["Name", "Subject", "Salary Type", "Amount (DA)", "Email"]),
                    rows: teachers
                        .iter()
                        .map(|t| {
                            vec![
                                t.full_name.clone(),
                                t.subject.clone(),
                                salary_type_label(t.salary_type).to_string(),
                                amount(t.salary_amount),
                                t.email.clone().unwrap_or_else(|| "-".to_string()),
                            ]
                        })
                        .collect(),
                }
            }
            ReportKind::StudentsPerTeacher => {
                let teachers = self.teachers.all().await?;
                let students = self.students.all().await?;
                let rows = teachers
                    .iter()
                    .map(|teacher| {
                        let taught = students_of_teacher(&students, &teacher.id);
                        let listing: Vec<String> = taught
                            .iter()
                            .map(|student| {
                                let subjects: Vec<&str> = student
                                    .subjects
                                    .iter()
                                    .filter(|sub| sub.teacher_ids.contains(&teacher.id))
                                    .map(|sub| sub.subject_name.as_str())
                                    .collect();
                                format!("{} ({})", student.full_name, subjects.join(", "))
                            })
                            .collect();
                        let languages = if teacher.languages.is_empty() {
                            "-".to_string()
                        } else {
                            teacher.languages.join(", ")
                        };
                        vec![
                            teacher.full_name.clone(),
                            teacher.subject.clone(),
                            languages,
                            taught.len().to_string(),
                            listing.join("; "),
                        ]
                    })
                    .collect();
                ReportTable {
                    title: "Students per Teacher Report".to_string(),
                    generated_on,
                    headers: headers(&["Teacher", "Subject", "Languages", "Number of Students", "Students"]),
                    rows,
                }
            }
            ReportKind::Payments => {
                let payments = self.payments.all().await?;
                let names: HashMap<String, String> = self
                    .students
                    .all()
                    .await?
                    .into_iter()
                    .map(|s| (s.id, s.full_name))
                    .collect();
                ReportTable {
                    title: "TCC - Payment Report".to_string(),
                    generated_on,
                    headers: headers(&[
                        "Date",
                        "Student",
                        "Amount (DA)",
                        "Type",
                        "Teacher Share",
                        "School Share",
                        "Notes",
                    ]),
                    rows: payments
                        .iter()
                        .map(|p| {
                            vec![
                                display_date(&p.date),
                                names.get(&p.student_id).cloned().unwrap_or_else(|| p.student_id.clone()),
                                amount(p.amount),
                                payment_type_label(p.payment_type).to_string(),
                                amount(p.teacher_share),
                                amount(p.school_share),
                                p.notes.clone().unwrap_or_default(),
                            ]
                        })
                        .collect(),
                }
            }
            ReportKind::Finance => {
                let summary = financial_summary(
                    &self.payments.all().await?,
                    &self.teachers.all().await?,
                    &self.expenses.all().await?,
                );
                let line = |label: &str, value: f64| vec![label.to_string(), amount(value)];
                ReportTable {
                    title: "TCC - Financial Report".to_string(),
                    generated_on,
                    headers: headers(&["Summary", "Amount (DA)"]),
                    rows: vec![
                        line("Total Revenue", summary.total_revenue),
                        line("Salary Expenses", summary.salary_expenses),
                        line("Other Expenses", summary.other_expenses),
                        line("Teacher Share", summary.total_teacher_share),
                        line("School Share", summary.total_school_share),
                        line("Net Profit", summary.profit),
                    ],
                }
            }
        };

        info!("Report has {} rows", table.rows.len());
        Ok(table)
    }

    pub async fn report_csv(&self, kind: ReportKind) -> DomainResult<String> {
        let table = self.report(kind).await?;
        to_csv(&table)
    }
}
