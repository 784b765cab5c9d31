use chrono::Local;
use shared::Payment;
use std::sync::Arc;
use tracing::info;

use super::aggregation::split_payment;
use super::error::DomainResult;
use super::ids::generate_id;
use super::validation::validate_payment;
use crate::storage::{RecordStore, Repository};

/// Service over the append-only payment ledger
#[derive(Clone)]
pub struct PaymentService {
    payments: Repository<Payment>,
}

impl PaymentService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            payments: Repository::new(store),
        }
    }

    pub async fn list_payments(&self) -> DomainResult<Vec<Payment>> {
        info!("Listing all payments");
        let payments = self.payments.all().await?;
        info!("Found {} payments", payments.len());
        Ok(payments)
    }

    pub async fn payments_for_student(&self, student_id: &str) -> DomainResult<Vec<Payment>> {
        info!("Listing payments for student {}", student_id);
        Ok(self.payments.find("studentId", student_id).await?)
    }

    /// Append a payment to the ledger.
    ///
    /// Missing id and date are filled in. When neither share is set the
    /// amount is split 70/30 between teacher and school.
    pub async fn record_payment(&self, mut payment: Payment) -> DomainResult<Payment> {
        info!("Recording payment of {} for student {}", payment.amount, payment.student_id);

        payment.student_id = payment.student_id.trim().to_string();
        validate_payment(&payment)?;

        if payment.id.trim().is_empty() {
            payment.id = generate_id();
        }
        if payment.date.trim().is_empty() {
            payment.date = Local::now().to_rfc3339();
        }
        if payment.teacher_share == 0.0 && payment.school_share == 0.0 {
            let (teacher_share, school_share) = split_payment(payment.amount);
            payment.teacher_share = teacher_share;
            payment.school_share = school_share;
        }

        self.payments.add(&payment).await?;

        info!("Recorded payment {}", payment.id);
        Ok(payment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::DomainError;
    use crate::domain::test_support::{sample_payment, secretary_store};
    use crate::storage::StoreError;

    #[tokio::test]
    async fn test_record_fills_shares_and_id() {
        let service = PaymentService::new(secretary_store());
        let mut payment = sample_payment("", "s1", 1000.0);
        payment.date = String::new();

        let recorded = service.record_payment(payment).await.unwrap();
        assert!(!recorded.id.is_empty());
        assert!(!recorded.date.is_empty());
        assert_eq!((recorded.teacher_share, recorded.school_share), (700.0, 300.0));

        // Explicit shares are kept
        let mut custom = sample_payment("p2", "s2", 1000.0);
        custom.teacher_share = 500.0;
        custom.school_share = 500.0;
        service.record_payment(custom.clone()).await.unwrap();

        assert_eq!(service.list_payments().await.unwrap().len(), 2);
        assert_eq!(service.payments_for_student("s2").await.unwrap(), vec![custom]);
    }

    #[tokio::test]
    async fn test_record_rejects_duplicates_and_bad_amounts() {
        let service = PaymentService::new(secretary_store());
        service.record_payment(sample_payment("p1", "s1", 10.0)).await.unwrap();

        let result = service.record_payment(sample_payment("p1", "s1", 10.0)).await;
        assert!(matches!(result, Err(DomainError::Store(StoreError::DuplicateKey { .. }))));

        let result = service.record_payment(sample_payment("p2", "", -1.0)).await;
        match result {
            Err(DomainError::Validation(errors)) => {
                assert!(errors.get("studentId").is_some());
                assert!(errors.get("amount").is_some());
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
