//! Field checks run before any record reaches the store.

use once_cell::sync::Lazy;
use regex::Regex;
use shared::{Expense, Payment, SalaryType, Student, Teacher};

use super::error::{DomainResult, ValidationErrors};

pub const REQUIRED: &str = "required";
pub const INVALID_AMOUNT: &str = "must be greater than zero";
pub const INVALID_EMAIL: &str = "invalid email";

fn require_text(errors: &mut ValidationErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, REQUIRED);
    }
}

fn require_positive(errors: &mut ValidationErrors, field: &str, value: f64) {
    if value.is_nan() || value <= 0.0 {
        errors.add(field, INVALID_AMOUNT);
    }
}

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\S+@\S+\.\S+$").expect("email pattern is valid")
});

/// Loose `something@something.something` check
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

pub fn validate_student(student: &Student) -> DomainResult<()> {
    let mut errors = ValidationErrors::new();
    require_text(&mut errors, "fullName", &student.full_name);
    require_text(&mut errors, "class", &student.class_name);
    require_positive(&mut errors, "amountPaid", student.amount_paid);
    errors.into_result()
}

pub fn validate_teacher(teacher: &Teacher) -> DomainResult<()> {
    let mut errors = ValidationErrors::new();
    require_text(&mut errors, "fullName", &teacher.full_name);
    require_text(&mut errors, "subject", &teacher.subject);
    require_positive(&mut errors, "salaryAmount", teacher.salary_amount);
    if teacher.salary_type == SalaryType::PerStudent && teacher.assigned_students == 0 {
        errors.add("assignedStudents", INVALID_AMOUNT);
    }
    if let Some(email) = teacher.email.as_deref() {
        if !email.trim().is_empty() && !is_valid_email(email.trim()) {
            errors.add("email", INVALID_EMAIL);
        }
    }
    errors.into_result()
}

pub fn validate_expense(expense: &Expense) -> DomainResult<()> {
    let mut errors = ValidationErrors::new();
    require_text(&mut errors, "type", &expense.expense_type);
    require_text(&mut errors, "date", &expense.date);
    require_positive(&mut errors, "amount", expense.amount);
    errors.into_result()
}

pub fn validate_payment(payment: &Payment) -> DomainResult<()> {
    let mut errors = ValidationErrors::new();
    require_text(&mut errors, "studentId", &payment.student_id);
    require_positive(&mut errors, "amount", payment.amount);
    errors.into_result()
}
