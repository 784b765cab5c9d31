use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// How a student is billed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    Monthly,
    Daily,
}

/// Paid/unpaid flag used for both student fees and teacher salaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "paid",
            PaymentStatus::Unpaid => "unpaid",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalaryType {
    /// Flat amount per period
    Fixed,
    /// `salaryAmount` is multiplied by the number of assigned students
    PerStudent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

/// Whether an attendance record refers to a student or a teacher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonKind {
    Student,
    Teacher,
}

/// User role. Only the secretary may create, edit or delete records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Secretary,
    Director,
}

impl Role {
    pub fn can_write(&self) -> bool {
        matches!(self, Role::Secretary)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Secretary => write!(f, "secretary"),
            Role::Director => write!(f, "director"),
        }
    }
}

/// A subject a student follows and the teachers who give it.
///
/// This is an embedded many-to-many link to `Teacher` by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSubject {
    pub subject_name: String,
    #[serde(default)]
    pub teacher_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    /// Generated on create when empty
    #[serde(default)]
    pub id: String,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(rename = "class")]
    pub class_name: String,
    /// RFC 3339 timestamp or YYYY-MM-DD
    #[serde(default)]
    pub registration_date: String,
    pub payment_type: PaymentType,
    /// RFC 3339 timestamp or YYYY-MM-DD
    #[serde(default)]
    pub last_payment_date: String,
    /// Fee charged per billing period
    pub amount_paid: f64,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub balance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_phone: Option<String>,
    #[serde(default)]
    pub subjects: Vec<StudentSubject>,
}

impl Student {
    /// True if any of the student's subjects is taught by `teacher_id`
    pub fn is_taught_by(&self, teacher_id: &str) -> bool {
        self.subjects
            .iter()
            .any(|s| s.teacher_ids.iter().any(|t| t == teacher_id))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    #[serde(default)]
    pub id: String,
    pub full_name: String,
    pub subject: String,
    pub salary_type: SalaryType,
    pub salary_amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_salary_date: Option<String>,
    #[serde(default)]
    pub assigned_students: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_class: Option<String>,
    pub salary_status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Append-only record of money received from a student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(default)]
    pub id: String,
    /// References `Student.id`; not enforced
    pub student_id: String,
    pub amount: f64,
    #[serde(default)]
    pub date: String,
    pub payment_type: PaymentType,
    #[serde(default)]
    pub teacher_share: f64,
    #[serde(default)]
    pub school_share: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Append-only record of money spent by the center
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub expense_type: String,
    #[serde(default)]
    pub date: String,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Presence of one person on one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<String>,
    /// YYYY-MM-DD
    pub date: String,
    pub status: AttendanceStatus,
    #[serde(rename = "type")]
    pub kind: PersonKind,
}

impl AttendanceRecord {
    /// The id of the student or teacher this record is about
    pub fn person_id(&self) -> Option<&str> {
        match self.kind {
            PersonKind::Student => self.student_id.as_deref(),
            PersonKind::Teacher => self.teacher_id.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub role: Role,
    pub name: String,
}

/// Parse a stored date into a local calendar date.
///
/// Accepts RFC 3339 timestamps (converted to local time) and plain
/// `YYYY-MM-DD` dates.
pub fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Local).date_naive());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

// ---------------------------------------------------------------------------
// Requests and responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: Option<User>,
    pub can_write: bool,
}

/// Filters applied to the student list. All filters are optional and combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentListQuery {
    /// Case-insensitive match on full name or class
    pub search: Option<String>,
    #[serde(rename = "class")]
    pub class_name: Option<String>,
    pub teacher_id: Option<String>,
    pub payment_status: Option<PaymentStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkPaidResponse {
    pub student: Student,
    pub payment: Payment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkSalaryPaidResponse {
    pub teacher: Teacher,
    pub expense: Expense,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentBalanceResponse {
    pub student_id: String,
    pub projected_balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAttendanceRequest {
    pub person_id: String,
    pub kind: PersonKind,
    /// YYYY-MM-DD
    pub date: String,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
    pub date: String,
    pub present_students: usize,
    pub absent_students: usize,
    pub present_teachers: usize,
    pub absent_teachers: usize,
}

/// One row of the explicit student/teacher/subject relation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub student_id: String,
    pub teacher_id: String,
    pub subject_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub total_revenue: f64,
    pub salary_expenses: f64,
    pub other_expenses: f64,
    pub profit: f64,
    pub total_teacher_share: f64,
    pub total_school_share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_students: usize,
    pub total_teachers: usize,
    pub paid_students: usize,
    pub unpaid_students: Vec<Student>,
    pub finance: FinancialSummary,
}

/// Write-only JSON backup of the four core tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupDocument {
    pub students: Vec<Student>,
    pub teachers: Vec<Teacher>,
    pub payments: Vec<Payment>,
    pub expenses: Vec<Expense>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupResponse {
    pub filename: String,
    pub content: String,
}

/// Titled table ready to be laid out by a document renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportTable {
    pub title: String,
    pub generated_on: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Students,
    Teachers,
    /// Each teacher with the students linked through their subjects
    StudentsPerTeacher,
    Payments,
    Finance,
}

impl ReportKind {
    pub const ALL: [ReportKind; 5] = [
        ReportKind::Students,
        ReportKind::Teachers,
        ReportKind::StudentsPerTeacher,
        ReportKind::Payments,
        ReportKind::Finance,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            ReportKind::Students => "students",
            ReportKind::Teachers => "teachers",
            ReportKind::StudentsPerTeacher => "students_per_teacher",
            ReportKind::Payments => "payments",
            ReportKind::Finance => "finance",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.slug() == slug)
    }
}

/// One class session in the weekly schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSession {
    pub teacher: String,
    #[serde(rename = "class")]
    pub class_name: String,
    pub room: String,
}

/// Weekly schedule grid: `sessions[day][hour]` holds the sessions of a cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleGrid {
    pub days: Vec<String>,
    pub hours: Vec<String>,
    #[serde(default)]
    pub sessions: BTreeMap<String, BTreeMap<String, Vec<ScheduleSession>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddSessionRequest {
    pub day: String,
    pub hour: String,
    pub session: ScheduleSession,
}

/// Supported UI locales
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Ar,
    Fr,
}

impl Locale {
    pub fn code(&self) -> &'static str {
        match self {
            Locale::Ar => "ar",
            Locale::Fr => "fr",
        }
    }

    /// Text direction, `rtl` for Arabic
    pub fn direction(&self) -> &'static str {
        match self {
            Locale::Ar => "rtl",
            Locale::Fr => "ltr",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "ar" => Some(Locale::Ar),
            "fr" => Some(Locale::Fr),
            _ => None,
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale::Fr
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocaleSettings {
    pub locale: Locale,
    pub direction: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateLocaleRequest {
    pub locale: Locale,
}

/// Outcome of the startup payment-status sweep
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RolloverReport {
    pub examined: usize,
    pub flipped: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_student_wire_field_names() {
        let value = json!({
            "id": "student1",
            "fullName": "Ahmed Benali",
            "class": "Terminal S",
            "registrationDate": "2024-09-01",
            "paymentType": "monthly",
            "lastPaymentDate": "2024-12-01",
            "amountPaid": 5000.0,
            "paymentStatus": "paid",
            "balance": 0.0,
            "phoneNumber": "0555123456",
            "subjects": [
                { "subjectName": "Mathematics", "teacherIds": ["teacher1"] }
            ]
        });

        let student: Student = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(student.class_name, "Terminal S");
        assert_eq!(student.payment_type, PaymentType::Monthly);
        assert!(student.is_taught_by("teacher1"));
        assert!(!student.is_taught_by("teacher2"));

        // Absent optional fields stay absent when written back
        assert_eq!(serde_json::to_value(&student).unwrap(), value);
    }

    #[test]
    fn test_teacher_salary_type_wire_names() {
        let value = json!({
            "id": "teacher2",
            "fullName": "Prof. Karim Meziane",
            "subject": "Physics",
            "salaryType": "per_student",
            "salaryAmount": 1500.0,
            "assignedStudents": 20,
            "salaryStatus": "unpaid"
        });
        let teacher: Teacher = serde_json::from_value(value).unwrap();
        assert_eq!(teacher.salary_type, SalaryType::PerStudent);
        assert!(teacher.languages.is_empty());
    }

    #[test]
    fn test_attendance_person_id() {
        let record = AttendanceRecord {
            id: "a1".to_string(),
            student_id: None,
            teacher_id: Some("teacher1".to_string()),
            date: "2024-12-01".to_string(),
            status: AttendanceStatus::Present,
            kind: PersonKind::Teacher,
        };
        assert_eq!(record.person_id(), Some("teacher1"));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "teacher");
        assert!(json.get("studentId").is_none());
    }

    #[test]
    fn test_role_can_write() {
        assert!(Role::Secretary.can_write());
        assert!(!Role::Director.can_write());
        assert_eq!(Role::Director.to_string(), "director");
    }

    #[test]
    fn test_parse_calendar_date() {
        assert_eq!(
            parse_calendar_date("2024-12-01"),
            NaiveDate::from_ymd_opt(2024, 12, 1)
        );
        assert!(parse_calendar_date("2024-12-01T12:00:00+00:00").is_some());
        assert!(parse_calendar_date("not a date").is_none());
    }

    #[test]
    fn test_locale_codes() {
        assert_eq!(Locale::from_code("ar"), Some(Locale::Ar));
        assert_eq!(Locale::Ar.direction(), "rtl");
        assert_eq!(Locale::default(), Locale::Fr);
        assert_eq!(Locale::from_code("en"), None);
    }
}
