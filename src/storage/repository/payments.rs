// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 StyleDecor

//! Payment record repository.
//!
//! Payments are keyed by the processor's transaction id, and insertion goes
//! through [`DocumentStorage::create_json`] (O_EXCL). Two concurrent
//! reconciliations of the same checkout session race on the same file name;
//! exactly one insert wins and the loser observes `AlreadyExists`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::{DocumentStorage, StorageError, StorageResult};

/// Payment record stored in the document store.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct StoredPayment {
    /// Processor transaction id (payment intent). Unique per payment.
    pub transaction_id: String,
    /// Booking the payment settles
    pub booking_id: String,
    /// Service name at checkout time
    pub service_name: String,
    /// Amount paid in major currency units
    pub amount: f64,
    /// ISO currency code reported by the processor
    pub currency: String,
    /// Paying customer's email
    pub customer_email: String,
    /// Processor payment status (always "paid" for stored records)
    pub payment_status: String,
    /// Tracking id issued alongside this payment
    pub tracking_id: String,
    /// When the payment was recorded
    pub paid_at: DateTime<Utc>,
}

/// Repository for payment operations.
pub struct PaymentRepository<'a> {
    storage: &'a DocumentStorage,
}

impl<'a> PaymentRepository<'a> {
    pub fn new(storage: &'a DocumentStorage) -> Self {
        Self { storage }
    }

    /// Get a payment by transaction id.
    pub fn get(&self, transaction_id: &str) -> StorageResult<StoredPayment> {
        let path = self.storage.paths().payment(transaction_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!(
                "Payment {transaction_id}"
            )));
        }
        self.storage.read_json(path)
    }

    /// Insert a payment record, at most once per transaction id.
    ///
    /// Fails with [`StorageError::AlreadyExists`] when the transaction was
    /// already recorded; callers treat that as "another reconciliation won".
    pub fn create(&self, payment: &StoredPayment) -> StorageResult<()> {
        self.storage.create_json(
            self.storage.paths().payment(&payment.transaction_id),
            payment,
        )
    }

    /// A customer's payment history, most recent first.
    pub fn list_by_customer(&self, customer_email: &str) -> StorageResult<Vec<StoredPayment>> {
        let mut payments = self.list_all()?;
        payments.retain(|payment| payment.customer_email.eq_ignore_ascii_case(customer_email));
        Ok(payments)
    }

    /// All payments, most recent first (admin view).
    pub fn list_all(&self) -> StorageResult<Vec<StoredPayment>> {
        let ids = self
            .storage
            .list_files(self.storage.paths().payments_dir(), "json")?;

        let mut payments = Vec::new();
        for id in ids {
            if let Ok(payment) = self.get(&id) {
                payments.push(payment);
            }
        }

        payments.sort_by(|a, b| b.paid_at.cmp(&a.paid_at));
        Ok(payments)
    }

    /// Sum of all recorded payment amounts (admin analytics).
    pub fn total_revenue(&self) -> StorageResult<f64> {
        Ok(self.list_all()?.iter().map(|payment| payment.amount).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoragePaths;
    use chrono::Duration;
    use tempfile::TempDir;

    fn test_storage() -> (DocumentStorage, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let paths = StoragePaths::new(temp_dir.path());
        let mut storage = DocumentStorage::new(paths);
        storage.initialize().expect("Failed to initialize");
        (storage, temp_dir)
    }

    fn test_payment(transaction_id: &str, email: &str) -> StoredPayment {
        StoredPayment {
            transaction_id: transaction_id.to_string(),
            booking_id: "b-1".to_string(),
            service_name: "Fairy Lights".to_string(),
            amount: 150.0,
            currency: "usd".to_string(),
            customer_email: email.to_string(),
            payment_status: "paid".to_string(),
            tracking_id: "STYL-20260915-A1B2C3".to_string(),
            paid_at: Utc::now(),
        }
    }

    #[test]
    fn second_insert_for_same_transaction_fails() {
        let (storage, _dir) = test_storage();
        let repo = PaymentRepository::new(&storage);

        let payment = test_payment("pi_123", "alice@example.com");
        repo.create(&payment).unwrap();

        let result = repo.create(&payment);
        assert!(matches!(result, Err(StorageError::AlreadyExists(_))));

        // the stored record is untouched by the losing insert
        let stored = repo.get("pi_123").unwrap();
        assert_eq!(stored, payment);
    }

    #[test]
    fn list_by_customer_most_recent_first() {
        let (storage, _dir) = test_storage();
        let repo = PaymentRepository::new(&storage);

        let base = Utc::now();
        let mut older = test_payment("pi_1", "alice@example.com");
        older.paid_at = base;
        let mut newer = test_payment("pi_2", "alice@example.com");
        newer.paid_at = base + Duration::seconds(5);
        let other = test_payment("pi_3", "bob@example.com");
        for payment in [&older, &newer, &other] {
            repo.create(payment).unwrap();
        }

        let alices = repo.list_by_customer("alice@example.com").unwrap();
        assert_eq!(alices.len(), 2);
        assert_eq!(alices[0].transaction_id, "pi_2");
    }

    #[test]
    fn total_revenue_sums_all_payments() {
        let (storage, _dir) = test_storage();
        let repo = PaymentRepository::new(&storage);

        let mut a = test_payment("pi_1", "alice@example.com");
        a.amount = 150.0;
        let mut b = test_payment("pi_2", "bob@example.com");
        b.amount = 80.5;
        repo.create(&a).unwrap();
        repo.create(&b).unwrap();

        let total = repo.total_revenue().unwrap();
        assert!((total - 230.5).abs() < f64::EPSILON);
    }
}
