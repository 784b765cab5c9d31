use chrono::{DateTime, Local};
use shared::{Expense, MarkSalaryPaidResponse, PaymentStatus, Student, Teacher};
use std::sync::Arc;
use tracing::{info, warn};

use super::aggregation::{enrollments, students_of_teacher, teacher_salary};
use super::error::DomainResult;
use super::ids::generate_id;
use super::validation::validate_teacher;
use crate::storage::{RecordStore, Repository};

pub const SALARY_EXPENSE_TYPE: &str = "Salary";

/// Service for managing teachers, their salaries and their links to students
#[derive(Clone)]
pub struct TeacherService {
    teachers: Repository<Teacher>,
    students: Repository<Student>,
    expenses: Repository<Expense>,
}

impl TeacherService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            teachers: Repository::new(store.clone()),
            students: Repository::new(store.clone()),
            expenses: Repository::new(store),
        }
    }

    pub async fn list_teachers(&self) -> DomainResult<Vec<Teacher>> {
        info!("Listing all teachers");
        let teachers = self.teachers.all().await?;
        info!("Found {} teachers", teachers.len());
        Ok(teachers)
    }

    pub async fn get_teacher(&self, teacher_id: &str) -> DomainResult<Option<Teacher>> {
        info!("Getting teacher: {}", teacher_id);

        let teacher = self.teachers.get(teacher_id).await?;
        if teacher.is_none() {
            warn!("Teacher not found: {}", teacher_id);
        }
        Ok(teacher)
    }

    pub async fn create_teacher(&self, mut teacher: Teacher) -> DomainResult<Teacher> {
        info!("Creating teacher: {}", teacher.full_name);

        normalize(&mut teacher);
        validate_teacher(&teacher)?;
        if teacher.id.trim().is_empty() {
            teacher.id = generate_id();
        }

        self.teachers.upsert(&teacher).await?;

        info!("Created teacher: {} with ID: {}", teacher.full_name, teacher.id);
        Ok(teacher)
    }

    pub async fn update_teacher(&self, teacher_id: &str, mut teacher: Teacher) -> DomainResult<Teacher> {
        info!("Updating teacher: {}", teacher_id);

        self.teachers.require(teacher_id).await?;
        teacher.id = teacher_id.to_string();
        normalize(&mut teacher);
        validate_teacher(&teacher)?;

        self.teachers.upsert(&teacher).await?;

        info!("Updated teacher: {} with ID: {}", teacher.full_name, teacher.id);
        Ok(teacher)
    }

    /// Delete a teacher and detach them from every student.
    ///
    /// The teacher id is removed from each subject; subjects left without a
    /// teacher are dropped. Payments and expenses are left alone.
    pub async fn delete_teacher(&self, teacher_id: &str) -> DomainResult<()> {
        info!("Deleting teacher: {}", teacher_id);

        let students = self.students.all().await?;
        let mut detached = 0;
        for mut student in students.into_iter().filter(|s| s.is_taught_by(teacher_id)) {
            for subject in student.subjects.iter_mut() {
                subject.teacher_ids.retain(|t| t != teacher_id);
            }
            student.subjects.retain(|s| !s.teacher_ids.is_empty());
            self.students.upsert(&student).await?;
            detached += 1;
        }

        self.teachers.delete(teacher_id).await?;

        info!("Deleted teacher {} and detached {} students", teacher_id, detached);
        Ok(())
    }

    pub async fn mark_salary_paid(&self, teacher_id: &str) -> DomainResult<MarkSalaryPaidResponse> {
        self.mark_salary_paid_at(teacher_id, Local::now()).await
    }

    /// Mark the salary paid as of `now` and log it as a "Salary" expense
    pub async fn mark_salary_paid_at(&self, teacher_id: &str, now: DateTime<Local>) -> DomainResult<MarkSalaryPaidResponse> {
        info!("Marking salary of teacher {} as paid", teacher_id);

        let mut teacher = self.teachers.require(teacher_id).await?;
        let timestamp = now.to_rfc3339();

        teacher.salary_status = PaymentStatus::Paid;
        teacher.last_salary_date = Some(timestamp.clone());
        self.teachers.upsert(&teacher).await?;

        let expense = Expense {
            id: generate_id(),
            expense_type: SALARY_EXPENSE_TYPE.to_string(),
            date: timestamp,
            amount: teacher_salary(&teacher),
            notes: Some(format!("Salary payment for {}", teacher.full_name)),
        };
        self.expenses.add(&expense).await?;

        info!("Recorded salary expense {} of {} for {}", expense.id, expense.amount, teacher.full_name);
        Ok(MarkSalaryPaidResponse { teacher, expense })
    }

    /// Students linked to the teacher through any subject
    pub async fn students_of(&self, teacher_id: &str) -> DomainResult<Vec<Student>> {
        info!("Listing students of teacher {}", teacher_id);
        let students = self.students.all().await?;
        Ok(students_of_teacher(&students, teacher_id).into_iter().cloned().collect())
    }

    /// Number of distinct students linked to the teacher
    pub async fn student_count(&self, teacher_id: &str) -> DomainResult<usize> {
        let students = self.students.all().await?;
        let mut ids: Vec<String> = enrollments(&students)
            .into_iter()
            .filter(|e| e.teacher_id == teacher_id)
            .map(|e| e.student_id)
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids.len())
    }
}

fn normalize(teacher: &mut Teacher) {
    teacher.full_name = teacher.full_name.trim().to_string();
    teacher.subject = teacher.subject.trim().to_string();
    teacher.email = teacher
        .email
        .take()
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty());
    teacher.languages.retain(|l| !l.trim().is_empty());
}
