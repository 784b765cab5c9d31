//! Builders and store setups shared by the domain tests.

use shared::{Expense, Payment, PaymentStatus, PaymentType, Role, SalaryType, Student, Teacher, User};
use std::sync::Arc;

use crate::storage::{GuardedStore, MemoryRecordStore, RecordStore, SessionHandle};

pub fn sample_student(id: &str) -> Student {
    Student {
        id: id.to_string(),
        full_name: format!("Student {}", id),
        birth_date: None,
        class_name: "Terminal S".to_string(),
        registration_date: "2024-09-01".to_string(),
        payment_type: PaymentType::Monthly,
        last_payment_date: "2024-12-01".to_string(),
        amount_paid: 5000.0,
        payment_status: PaymentStatus::Paid,
        balance: 0.0,
        phone_number: None,
        parent_phone: None,
        subjects: Vec::new(),
    }
}

pub fn sample_teacher(id: &str) -> Teacher {
    Teacher {
        id: id.to_string(),
        full_name: format!("Teacher {}", id),
        subject: "Mathematics".to_string(),
        salary_type: SalaryType::Fixed,
        salary_amount: 45000.0,
        last_salary_date: None,
        assigned_students: 0,
        assigned_class: None,
        salary_status: PaymentStatus::Unpaid,
        phone_number: None,
        languages: Vec::new(),
        email: None,
    }
}

pub fn sample_payment(id: &str, student_id: &str, amount: f64) -> Payment {
    Payment {
        id: id.to_string(),
        student_id: student_id.to_string(),
        amount,
        date: "2024-12-01".to_string(),
        payment_type: PaymentType::Monthly,
        teacher_share: 0.0,
        school_share: 0.0,
        notes: None,
    }
}

pub fn sample_expense(id: &str, amount: f64) -> Expense {
    Expense {
        id: id.to_string(),
        expense_type: "Rent".to_string(),
        date: "2024-12-01".to_string(),
        amount,
        notes: None,
    }
}

pub fn user(role: Role) -> User {
    User {
        id: role.to_string(),
        username: role.to_string(),
        role,
        name: format!("{} user", role),
    }
}

/// A guarded in-memory store with `role` already logged in, plus the raw store behind it
pub fn store_as(role: Role) -> (Arc<dyn RecordStore>, Arc<dyn RecordStore>, SessionHandle) {
    let raw: Arc<dyn RecordStore> = Arc::new(MemoryRecordStore::new());
    let session = SessionHandle::new();
    session
        .set_user(Some(user(role)))
        .expect("session lock");
    let guarded: Arc<dyn RecordStore> = Arc::new(GuardedStore::new(raw.clone(), session.clone()));
    (guarded, raw, session)
}

/// A guarded in-memory store with the secretary logged in
pub fn secretary_store() -> Arc<dyn RecordStore> {
    store_as(Role::Secretary).0
}
