//! Demo records for a fresh install, loaded only when enabled in the config.

use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use super::error::DomainResult;
use crate::storage::{RecordStore, Table};

fn sample_records() -> Vec<(Table, Value)> {
    let students = [
        json!({
            "id": "student1", "fullName": "Ahmed Benali", "class": "Terminal S",
            "registrationDate": "2024-09-01T00:00:00.000Z", "paymentType": "monthly",
            "lastPaymentDate": "2024-12-01T00:00:00.000Z", "amountPaid": 5000.0,
            "paymentStatus": "paid", "balance": 0.0, "phoneNumber": "0555123456",
            "subjects": [
                { "subjectName": "Mathematics", "teacherIds": ["teacher1"] },
                { "subjectName": "Physics", "teacherIds": ["teacher2"] }
            ]
        }),
        json!({
            "id": "student2", "fullName": "Fatima Khelifi", "class": "1ère AS",
            "registrationDate": "2024-09-01T00:00:00.000Z", "paymentType": "monthly",
            "lastPaymentDate": "2024-11-01T00:00:00.000Z", "amountPaid": 4500.0,
            "paymentStatus": "unpaid", "balance": 4500.0, "phoneNumber": "0666789012",
            "subjects": [{ "subjectName": "French", "teacherIds": ["teacher1"] }]
        }),
        json!({
            "id": "student3", "fullName": "Mohamed Saidi", "class": "2ème AS",
            "registrationDate": "2024-09-15T00:00:00.000Z", "paymentType": "daily",
            "lastPaymentDate": "2024-12-01T00:00:00.000Z", "amountPaid": 200.0,
            "paymentStatus": "paid", "balance": 0.0, "phoneNumber": "0777345678",
            "subjects": [
                { "subjectName": "Mathematics", "teacherIds": ["teacher1"] },
                { "subjectName": "Physics", "teacherIds": ["teacher2"] }
            ]
        }),
    ];
    let teachers = [
        json!({
            "id": "teacher1", "fullName": "Dr. Amina Boudjema", "subject": "Mathematics",
            "salaryType": "fixed", "salaryAmount": 45000.0, "assignedStudents": 25,
            "lastSalaryDate": "2024-12-01T00:00:00.000Z", "assignedClass": "Terminal S",
            "salaryStatus": "paid"
        }),
        json!({
            "id": "teacher2", "fullName": "Prof. Karim Meziane", "subject": "Physics",
            "salaryType": "per_student", "salaryAmount": 1500.0, "assignedStudents": 20,
            "lastSalaryDate": "2024-12-01T00:00:00.000Z", "assignedClass": "1ère AS",
            "salaryStatus": "unpaid"
        }),
    ];
    let payment = |id: &str, student: &str, amount: f64, date: &str, kind: &str, notes: &str| {
        json!({
            "id": id, "studentId": student, "amount": amount, "date": date,
            "paymentType": kind, "notes": notes, "teacherShare": 0.0, "schoolShare": 0.0
        })
    };
    let payments = [
        payment("payment1", "student1", 5000.0, "2024-12-01T00:00:00.000Z", "monthly", "December payment"),
        payment("payment2", "student2", 4500.0, "2024-11-01T00:00:00.000Z", "monthly", "November payment"),
        payment("payment3", "student3", 6000.0, "2024-12-01T00:00:00.000Z", "daily", "Daily payments for December"),
        payment("payment4", "student2", 4500.0, "2024-11-01T00:00:00.000Z", "monthly", "November payment"),
    ];
    let expense = |id: &str, kind: &str, date: &str, amount: f64, notes: &str| {
        json!({ "id": id, "type": kind, "date": date, "amount": amount, "notes": notes })
    };
    let expenses = [
        expense("expense1", "Rent", "2024-12-01T00:00:00.000Z", 15000.0, "Monthly rent for December"),
        expense("expense2", "Electricity", "2024-12-01T00:00:00.000Z", 3500.0, "Electricity bill"),
        expense("expense3", "Office Supplies", "2024-11-15T00:00:00.000Z", 2000.0, "Books and stationery"),
        expense("expense4", "Internet", "2024-12-01T00:00:00.000Z", 1500.0, "Monthly internet subscription"),
    ];

    students
        .into_iter()
        .map(|v| (Table::Students, v))
        .chain(teachers.into_iter().map(|v| (Table::Teachers, v)))
        .chain(payments.into_iter().map(|v| (Table::Payments, v)))
        .chain(expenses.into_iter().map(|v| (Table::Expenses, v)))
        .collect()
}

/// Load the demo students, teachers, payments and expenses into an empty
/// store. Returns the number of records added, zero if students already exist.
pub async fn seed_sample_data(raw_store: Arc<dyn RecordStore>) -> DomainResult<usize> {
    if !raw_store.get_all(Table::Students).await?.is_empty() {
        return Ok(0);
    }

    info!("Loading sample data");
    let records = sample_records();
    for (table, record) in &records {
        let id = record["id"].as_str().unwrap_or_default();
        raw_store.add(*table, id, record.clone()).await?;
    }
    info!("Loaded {} sample records", records.len());
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryRecordStore, Repository};
    use shared::{Student, Teacher};

    #[tokio::test]
    async fn test_sample_data_parses_and_loads_once() {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryRecordStore::new());
        assert_eq!(seed_sample_data(store.clone()).await.unwrap(), 13);
        assert_eq!(seed_sample_data(store.clone()).await.unwrap(), 0);

        let students: Repository<Student> = Repository::new(store.clone());
        let teachers: Repository<Teacher> = Repository::new(store);
        assert_eq!(students.all().await.unwrap().len(), 3);
        assert_eq!(teachers.require("teacher2").await.unwrap().assigned_students, 20);
    }
}
