use chrono::{DateTime, Local, NaiveDate};
use shared::{
    MarkPaidResponse, Payment, PaymentStatus, Student, StudentBalanceResponse, StudentListQuery,
};
use std::sync::Arc;
use tracing::{info, warn};

use super::aggregation::{projected_balance, split_payment, unpaid_students};
use super::error::DomainResult;
use super::ids::generate_id;
use super::validation::validate_student;
use crate::storage::{RecordStore, Repository};

pub const MARK_PAID_NOTE: &str = "Payment marked as paid";

/// Service for managing students and their fee status
#[derive(Clone)]
pub struct StudentService {
    students: Repository<Student>,
    payments: Repository<Payment>,
}

impl StudentService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            students: Repository::new(store.clone()),
            payments: Repository::new(store),
        }
    }

    /// List students matching every filter in `query`
    pub async fn list_students(&self, query: &StudentListQuery) -> DomainResult<Vec<Student>> {
        info!("Listing students with filters: {:?}", query);

        // Narrow through an index when one applies, then filter the rest in memory
        let candidates = match (&query.payment_status, &query.class_name) {
            (Some(status), _) => self.students.find("paymentStatus", status.as_str()).await?,
            (None, Some(class_name)) => self.students.find("class", class_name).await?,
            (None, None) => self.students.all().await?,
        };

        let search = query
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let students: Vec<Student> = candidates
            .into_iter()
            .filter(|s| query.payment_status.map_or(true, |status| s.payment_status == status))
            .filter(|s| query.class_name.as_ref().map_or(true, |c| &s.class_name == c))
            .filter(|s| query.teacher_id.as_deref().map_or(true, |t| s.is_taught_by(t)))
            .filter(|s| {
                search.as_ref().map_or(true, |needle| {
                    s.full_name.to_lowercase().contains(needle)
                        || s.class_name.to_lowercase().contains(needle)
                })
            })
            .collect();

        info!("Found {} students", students.len());
        Ok(students)
    }

    pub async fn get_student(&self, student_id: &str) -> DomainResult<Option<Student>> {
        info!("Getting student: {}", student_id);

        let student = self.students.get(student_id).await?;
        if student.is_none() {
            warn!("Student not found: {}", student_id);
        }
        Ok(student)
    }

    /// Create a student. A missing id or missing dates are filled in.
    pub async fn create_student(&self, mut student: Student) -> DomainResult<Student> {
        info!("Creating student: {}", student.full_name);

        normalize(&mut student);
        validate_student(&student)?;

        let now = Local::now().to_rfc3339();
        if student.id.trim().is_empty() {
            student.id = generate_id();
        }
        if student.registration_date.trim().is_empty() {
            student.registration_date = now.clone();
        }
        if student.last_payment_date.trim().is_empty() {
            student.last_payment_date = now;
        }

        self.students.upsert(&student).await?;

        info!("Created student: {} with ID: {}", student.full_name, student.id);
        Ok(student)
    }

    /// Replace an existing student record
    pub async fn update_student(&self, student_id: &str, mut student: Student) -> DomainResult<Student> {
        info!("Updating student: {}", student_id);

        self.students.require(student_id).await?;
        student.id = student_id.to_string();
        normalize(&mut student);
        validate_student(&student)?;

        self.students.upsert(&student).await?;

        info!("Updated student: {} with ID: {}", student.full_name, student.id);
        Ok(student)
    }

    /// Delete a student. Their payments stay in the ledger.
    pub async fn delete_student(&self, student_id: &str) -> DomainResult<()> {
        info!("Deleting student: {}", student_id);
        self.students.delete(student_id).await?;
        Ok(())
    }

    pub async fn mark_as_paid(&self, student_id: &str) -> DomainResult<MarkPaidResponse> {
        self.mark_as_paid_at(student_id, Local::now()).await
    }

    /// Mark the student paid as of `now` and log a payment of one period's fee,
    /// split 70/30 between teacher and school
    pub async fn mark_as_paid_at(&self, student_id: &str, now: DateTime<Local>) -> DomainResult<MarkPaidResponse> {
        info!("Marking student {} as paid", student_id);

        let mut student = self.students.require(student_id).await?;
        let timestamp = now.to_rfc3339();

        student.payment_status = PaymentStatus::Paid;
        student.last_payment_date = timestamp.clone();
        self.students.upsert(&student).await?;

        let (teacher_share, school_share) = split_payment(student.amount_paid);
        let payment = Payment {
            id: generate_id(),
            student_id: student.id.clone(),
            amount: student.amount_paid,
            date: timestamp,
            payment_type: student.payment_type,
            teacher_share,
            school_share,
            notes: Some(MARK_PAID_NOTE.to_string()),
        };
        self.payments.add(&payment).await?;

        info!("Recorded payment {} of {} for student {}", payment.id, payment.amount, student.id);
        Ok(MarkPaidResponse { student, payment })
    }

    pub async fn unpaid_students(&self) -> DomainResult<Vec<Student>> {
        info!("Listing unpaid students");
        let students = self.students.all().await?;
        Ok(unpaid_students(&students))
    }

    pub async fn projected_balance(&self, student_id: &str) -> DomainResult<StudentBalanceResponse> {
        self.projected_balance_at(student_id, Local::now().date_naive()).await
    }

    pub async fn projected_balance_at(&self, student_id: &str, today: NaiveDate) -> DomainResult<StudentBalanceResponse> {
        info!("Projecting balance for student {}", student_id);

        let student = self.students.require(student_id).await?;
        let payments = self.payments.find("studentId", student_id).await?;

        Ok(StudentBalanceResponse {
            student_id: student.id.clone(),
            projected_balance: projected_balance(&student, &payments, today),
        })
    }
}

/// Trim text fields and drop subjects without a name or without teachers
fn normalize(student: &mut Student) {
    student.full_name = student.full_name.trim().to_string();
    student.class_name = student.class_name.trim().to_string();
    student.phone_number = student
        .phone_number
        .take()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty());
    student
        .subjects
        .retain(|s| !s.subject_name.trim().is_empty() && !s.teacher_ids.is_empty());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::DomainError;
    use crate::domain::test_support::{sample_payment, sample_student, secretary_store, store_as};
    use crate::storage::StoreError;
    use chrono::TimeZone;
    use shared::{PaymentType, Role, StudentSubject};

    fn service() -> StudentService {
        StudentService::new(secretary_store())
    }

    fn subject(name: &str, teachers: &[&str]) -> StudentSubject {
        StudentSubject {
            subject_name: name.to_string(),
            teacher_ids: teachers.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_create_fills_id_and_dates() {
        let service = service();
        let mut student = sample_student("");
        student.registration_date = String::new();
        student.last_payment_date = String::new();
        student.full_name = "  Ahmed Benali ".to_string();
        student.subjects = vec![subject("Mathematics", &["t1"]), subject("", &["t2"]), subject("Physics", &[])];

        let created = service.create_student(student).await.unwrap();
        assert!(!created.id.is_empty());
        assert_eq!(created.full_name, "Ahmed Benali");
        assert!(!created.registration_date.is_empty());
        assert_eq!(created.subjects, vec![subject("Mathematics", &["t1"])]);

        let fetched = service.get_student(&created.id).await.unwrap();
        assert_eq!(fetched, Some(created));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_student() {
        let service = service();
        let mut student = sample_student("s1");
        student.amount_paid = 0.0;

        let result = service.create_student(student).await;
        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert_eq!(service.get_student("s1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_missing_student_is_not_found() {
        let service = service();
        let result = service.update_student("ghost", sample_student("ghost")).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_list_filters_combine() {
        let service = service();
        let mut a = sample_student("a");
        a.full_name = "Ahmed Benali".to_string();
        a.subjects = vec![subject("Mathematics", &["t1"])];
        let mut b = sample_student("b");
        b.full_name = "Fatima Khelifi".to_string();
        b.class_name = "1ère AS".to_string();
        b.payment_status = PaymentStatus::Unpaid;
        let mut c = sample_student("c");
        c.full_name = "Mohamed Saidi".to_string();
        c.payment_status = PaymentStatus::Unpaid;
        c.subjects = vec![subject("Physics", &["t1"])];
        for s in [a, b, c] {
            service.create_student(s).await.unwrap();
        }

        let all = service.list_students(&StudentListQuery::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let query = StudentListQuery {
            payment_status: Some(PaymentStatus::Unpaid),
            teacher_id: Some("t1".to_string()),
            ..Default::default()
        };
        let found = service.list_students(&query).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "c");

        let query = StudentListQuery {
            search: Some("terminal".to_string()),
            ..Default::default()
        };
        assert_eq!(service.list_students(&query).await.unwrap().len(), 2);

        let query = StudentListQuery {
            class_name: Some("1ère AS".to_string()),
            ..Default::default()
        };
        assert_eq!(service.list_students(&query).await.unwrap()[0].id, "b");
    }

    #[tokio::test]
    async fn test_mark_as_paid_records_split_payment() {
        let service = service();
        let mut student = sample_student("s1");
        student.payment_status = PaymentStatus::Unpaid;
        student.payment_type = PaymentType::Daily;
        student.amount_paid = 4500.0;
        service.create_student(student).await.unwrap();

        let now = Local.with_ymd_and_hms(2024, 12, 20, 9, 30, 0).unwrap();
        let response = service.mark_as_paid_at("s1", now).await.unwrap();

        assert_eq!(response.student.payment_status, PaymentStatus::Paid);
        assert_eq!(response.student.last_payment_date, now.to_rfc3339());
        assert_eq!(response.payment.amount, 4500.0);
        assert_eq!(response.payment.teacher_share, 3150.0);
        assert_eq!(response.payment.school_share, 1350.0);
        assert_eq!(response.payment.payment_type, PaymentType::Daily);
        assert_eq!(response.payment.notes.as_deref(), Some(MARK_PAID_NOTE));

        let stored = service.get_student("s1").await.unwrap().unwrap();
        assert_eq!(stored.payment_status, PaymentStatus::Paid);
        assert!(service.unpaid_students().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_projected_balance_uses_student_payments() {
        let store = secretary_store();
        let service = StudentService::new(store.clone());
        service.create_student(sample_student("s1")).await.unwrap();
        let payments: Repository<Payment> = Repository::new(store);
        payments.add(&sample_payment("p1", "s1", 5000.0)).await.unwrap();

        let today = NaiveDate::from_ymd_opt(2024, 11, 5).unwrap();
        let balance = service.projected_balance_at("s1", today).await.unwrap();
        assert_eq!(balance.projected_balance, 5000.0);

        // Paying ahead never produces a credit
        payments.add(&sample_payment("p2", "s1", 20000.0)).await.unwrap();
        let balance = service.projected_balance_at("s1", today).await.unwrap();
        assert_eq!(balance.projected_balance, 0.0);
    }

    #[tokio::test]
    async fn test_director_cannot_create() {
        let (store, _raw, _session) = store_as(Role::Director);
        let service = StudentService::new(store);
        let result = service.create_student(sample_student("s1")).await;
        assert!(matches!(
            result,
            Err(DomainError::Store(StoreError::PermissionDenied { .. }))
        ));
        assert!(service.list_students(&StudentListQuery::default()).await.unwrap().is_empty());
    }
}
