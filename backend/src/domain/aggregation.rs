//! # Derived Aggregation
//!
//! Pure functions over in-memory snapshots of the record store. Nothing here
//! touches storage or caches a result; callers fetch the tables they need and
//! recompute on every request.

use chrono::{Datelike, NaiveDate};
use shared::{
    parse_calendar_date, AttendanceRecord, AttendanceStatus, AttendanceSummary, Enrollment, Expense,
    FinancialSummary, Payment, PaymentStatus, PaymentType, PersonKind, SalaryType, Student, Teacher,
};

/// Portion of each student payment owed to the teacher
pub const TEACHER_SHARE_RATE: f64 = 0.7;

pub fn total_revenue(payments: &[Payment]) -> f64 {
    payments.iter().map(|p| p.amount).sum()
}

/// Salary owed to one teacher for a period
pub fn teacher_salary(teacher: &Teacher) -> f64 {
    match teacher.salary_type {
        SalaryType::Fixed => teacher.salary_amount,
        SalaryType::PerStudent => teacher.salary_amount * f64::from(teacher.assigned_students),
    }
}

pub fn salary_expenses(teachers: &[Teacher]) -> f64 {
    teachers.iter().map(teacher_salary).sum()
}

pub fn other_expenses(expenses: &[Expense]) -> f64 {
    expenses.iter().map(|e| e.amount).sum()
}

pub fn profit(revenue: f64, salary_expenses: f64, other_expenses: f64) -> f64 {
    revenue - salary_expenses - other_expenses
}

/// Students whose status is unpaid, in input order
pub fn unpaid_students(students: &[Student]) -> Vec<Student> {
    students
        .iter()
        .filter(|s| s.payment_status == PaymentStatus::Unpaid)
        .cloned()
        .collect()
}

/// Calendar months from `from` to `to`, ignoring the day of month
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    let index = |d: NaiveDate| i64::from(d.year()) * 12 + i64::from(d.month0());
    index(to) - index(from)
}

/// Amount a student still owes as of `today`, floored at zero.
///
/// The expected total is the number of elapsed billing periods since
/// registration times `amountPaid`, which here stands for the fee rate.
/// A registration date that cannot be parsed yields no expected amount.
pub fn projected_balance(student: &Student, payments: &[Payment], today: NaiveDate) -> f64 {
    let paid_to_date: f64 = payments
        .iter()
        .filter(|p| p.student_id == student.id)
        .map(|p| p.amount)
        .sum();

    let periods = match parse_calendar_date(&student.registration_date) {
        Some(registered) => match student.payment_type {
            PaymentType::Monthly => months_between(registered, today),
            PaymentType::Daily => (today - registered).num_days(),
        },
        None => 0,
    };

    let expected = periods as f64 * student.amount_paid;
    (expected - paid_to_date).max(0.0)
}

pub fn round_currency(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Split a payment into (teacher share, school share) at 70/30.
/// The school share takes the rounding remainder so both add up to `amount`.
pub fn split_payment(amount: f64) -> (f64, f64) {
    let teacher_share = round_currency(amount * TEACHER_SHARE_RATE);
    let school_share = round_currency(amount - teacher_share);
    (teacher_share, school_share)
}

/// Sum of (teacher share, school share) over all payments
pub fn share_totals(payments: &[Payment]) -> (f64, f64) {
    payments.iter().fold((0.0, 0.0), |(teacher, school), p| {
        (teacher + p.teacher_share, school + p.school_share)
    })
}

/// Flatten embedded subjects into explicit (student, teacher, subject) rows
pub fn enrollments(students: &[Student]) -> Vec<Enrollment> {
    students
        .iter()
        .flat_map(|student| {
            student.subjects.iter().flat_map(move |subject| {
                subject.teacher_ids.iter().map(move |teacher_id| Enrollment {
                    student_id: student.id.clone(),
                    teacher_id: teacher_id.clone(),
                    subject_name: subject.subject_name.clone(),
                })
            })
        })
        .collect()
}

pub fn students_of_teacher<'a>(students: &'a [Student], teacher_id: &str) -> Vec<&'a Student> {
    students.iter().filter(|s| s.is_taught_by(teacher_id)).collect()
}

pub fn attendance_summary(records: &[AttendanceRecord], date: &str) -> AttendanceSummary {
    let mut summary = AttendanceSummary {
        date: date.to_string(),
        present_students: 0,
        absent_students: 0,
        present_teachers: 0,
        absent_teachers: 0,
    };
    for record in records.iter().filter(|r| r.date == date) {
        let slot = match (record.kind, record.status) {
            (PersonKind::Student, AttendanceStatus::Present) => &mut summary.present_students,
            (PersonKind::Student, AttendanceStatus::Absent) => &mut summary.absent_students,
            (PersonKind::Teacher, AttendanceStatus::Present) => &mut summary.present_teachers,
            (PersonKind::Teacher, AttendanceStatus::Absent) => &mut summary.absent_teachers,
        };
        *slot += 1;
    }
    summary
}

pub fn financial_summary(payments: &[Payment], teachers: &[Teacher], expenses: &[Expense]) -> FinancialSummary {
    let revenue = total_revenue(payments);
    let salaries = salary_expenses(teachers);
    let other = other_expenses(expenses);
    let (total_teacher_share, total_school_share) = share_totals(payments);

    FinancialSummary {
        total_revenue: revenue,
        salary_expenses: salaries,
        other_expenses: other,
        profit: profit(revenue, salaries, other),
        total_teacher_share,
        total_school_share,
    }
}
