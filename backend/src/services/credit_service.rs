//! # Credit Service
//!
//! The CreditService is the central service for the credit lifecycle.
//! It coordinates the credit store with the customer and account services.
//!
//! ## Responsibilities
//!
//! - Create credits (customer check, one personal credit per customer)
//! - Update limits and balances (card balances pushed to accounts first)
//! - Point lookups, listings, deletes
//! - Active-card and overdue-debt checks
//! - Creation-time reports
//!
//! ## Flow Example: Update of a credit card
//!
//! ```text
//! 1. Look up credit by id          -> NotFound if absent
//!                ↓
//! 2. Validate new balance >= 0     -> InvalidBalance
//!                ↓
//! 3. Overwrite limit/balance, bump updated_at
//!                ↓
//! 4. PUT balance to account service -> SynchronizationFailed (store untouched)
//!                ↓
//! 5. Persist and return
//! ```
//!
//! ## Error policy
//!
//! `find_all` and `has_overdue_debts` are fail-soft: store errors are logged
//! and replaced by an empty list / `false`. Every other operation returns
//! the error to the caller.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::db::{Credit, CreditStore, CreditType, DatabaseError, NewCredit};
use crate::models::{CreditRequest, UpdateCreditRequest};
use crate::utils::{now_timestamp, parse_timestamp};

use super::{BalanceSynchronizer, CustomerVerifier};

/// Errors that can occur in credit operations.
#[derive(Debug, thiserror::Error)]
pub enum CreditError {
    /// The customer does not exist or could not be confirmed.
    #[error("Invalid customer: {0}")]
    InvalidCustomer(String),

    /// The customer already owns a personal credit.
    #[error("Customer {0} already has a personal credit")]
    DuplicatePersonalCredit(String),

    /// No credit with the given id.
    #[error("Credit not found with id: {0}")]
    NotFound(String),

    /// Balance is negative (or not a number).
    #[error("Balance cannot be negative: {0}")]
    InvalidBalance(f64),

    /// The account service did not accept the new card balance.
    #[error("Account balance synchronization failed: {0}")]
    SynchronizationFailed(String),

    /// A report boundary is not an ISO local date-time.
    #[error("Invalid date format: {0}")]
    InvalidDateFormat(String),

    /// The credit store failed.
    #[error("Persistence error: {0}")]
    Persistence(#[from] DatabaseError),
}

/// Orchestrates credit operations over a store and two collaborators.
///
/// Holds no mutable state; clone it freely.
///
/// ## Usage
///
/// ```rust,ignore
/// let service = CreditService::new(store, verifier, synchronizer, Duration::from_secs(5));
///
/// let credit = service.create_credit(request).await?;
/// let overdue = service.has_overdue_debts(&credit.customer_id).await;
/// ```
#[derive(Clone)]
pub struct CreditService {
    store: Arc<dyn CreditStore>,
    verifier: Arc<dyn CustomerVerifier>,
    synchronizer: Arc<dyn BalanceSynchronizer>,
    /// Deadline for each verifier/synchronizer call.
    call_timeout: Duration,
}

impl CreditService {
    pub fn new(
        store: Arc<dyn CreditStore>,
        verifier: Arc<dyn CustomerVerifier>,
        synchronizer: Arc<dyn BalanceSynchronizer>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            store,
            verifier,
            synchronizer,
            call_timeout,
        }
    }

    // ==========================================
    // CREATE / UPDATE / DELETE
    // ==========================================

    /// Create a credit.
    ///
    /// ## Returns
    ///
    /// * `Ok(Credit)` - Stored credit with its new id
    /// * `Err(CreditError::InvalidBalance)` - Negative opening balance
    /// * `Err(CreditError::InvalidCustomer)` - Customer unknown, or the check failed
    /// * `Err(CreditError::DuplicatePersonalCredit)` - Second `PERSONAL` credit
    pub async fn create_credit(&self, request: CreditRequest) -> Result<Credit, CreditError> {
        debug!(
            "Create credit request: customer={} type={}",
            request.customer_id, request.credit_type
        );

        validate_balance(request.balance)?;

        if !self.verify_customer(&request.customer_id).await {
            return Err(CreditError::InvalidCustomer(request.customer_id));
        }

        let is_personal = CreditType::Personal.is(&request.credit_type);
        if is_personal
            && self
                .store
                .exists_by_customer_id_and_type(&request.customer_id, CreditType::Personal.as_str())
                .await?
        {
            return Err(CreditError::DuplicatePersonalCredit(request.customer_id));
        }

        if request.credit_type.parse::<CreditType>().is_err() {
            warn!("Storing credit with unrecognised type '{}'", request.credit_type);
        }

        let customer_id = request.customer_id.clone();
        let new = new_credit(request);

        match self.store.insert(new).await {
            Ok(credit) => {
                info!("Created {} credit {} for customer {}", credit.credit_type, credit.id, credit.customer_id);
                Ok(credit)
            }
            // Lost the race against a concurrent create.
            Err(DatabaseError::UniqueViolation(_)) if is_personal => {
                Err(CreditError::DuplicatePersonalCredit(customer_id))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Overwrite the limit and balance of an existing credit.
    ///
    /// For `CREDIT_CARD` credits the new balance is pushed to the account
    /// service first; if that fails nothing is written.
    pub async fn update_credit(
        &self,
        id: &str,
        request: UpdateCreditRequest,
    ) -> Result<Credit, CreditError> {
        let mut credit = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| CreditError::NotFound(id.to_string()))?;

        validate_balance(request.balance)?;

        credit.credit_limit = request.credit_limit;
        credit.balance = request.balance;
        credit.updated_at = now_timestamp().max(credit.created_at);

        if CreditType::CreditCard.is(&credit.credit_type) {
            self.synchronize_balance(&credit.id, credit.balance).await?;
        }

        let saved = match self.store.save(&credit).await {
            Ok(saved) => saved,
            // Deleted while the update was in flight.
            Err(DatabaseError::NotFound(_)) => return Err(CreditError::NotFound(id.to_string())),
            Err(e) => return Err(e.into()),
        };
        info!("Updated credit {} (balance {})", saved.id, saved.balance);
        Ok(saved)
    }

    /// Delete a credit.
    ///
    /// Returns `NotFound` when there is nothing to delete.
    pub async fn delete_by_id(&self, id: &str) -> Result<(), CreditError> {
        let credit = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| CreditError::NotFound(id.to_string()))?;

        self.store.delete(&credit).await?;
        info!("Deleted credit {}", id);
        Ok(())
    }

    // ==========================================
    // QUERIES
    // ==========================================

    /// Point lookup. Absence is `Ok(None)`, distinct from a store failure.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Credit>, CreditError> {
        Ok(self.store.find_by_id(id).await?)
    }

    /// Every stored credit. A store failure yields an empty list.
    pub async fn find_all(&self) -> Vec<Credit> {
        match self.store.find_all().await {
            Ok(credits) => credits,
            Err(e) => {
                error!("Failed to list credits: {}", e);
                Vec::new()
            }
        }
    }

    /// Every credit owned by a customer.
    pub async fn find_by_customer_id(&self, customer_id: &str) -> Result<Vec<Credit>, CreditError> {
        Ok(self.store.find_by_customer_id(customer_id).await?)
    }

    /// Whether the customer holds at least one active credit card.
    pub async fn has_active_credit_card(&self, customer_id: &str) -> Result<bool, CreditError> {
        let credits = self.store.find_by_customer_id(customer_id).await?;
        Ok(credits.iter().any(Credit::is_active_credit_card))
    }

    /// Whether any of the customer's credits is past due with a positive
    /// balance. Any failure resolves to `false`.
    pub async fn has_overdue_debts(&self, customer_id: &str) -> bool {
        match self.store.find_by_customer_id(customer_id).await {
            Ok(credits) => {
                let now = now_timestamp();
                let overdue = credits.iter().any(|c| c.is_overdue_at(now));
                if overdue {
                    info!("Customer {} has overdue debts", customer_id);
                } else {
                    info!("Customer {} has no overdue debts", customer_id);
                }
                overdue
            }
            Err(e) => {
                error!("Failed to check overdue debts for customer {}: {}", customer_id, e);
                false
            }
        }
    }

    /// Credits created within `[start_date, end_date]`, both ends included.
    ///
    /// Dates are ISO local date-times such as `2024-01-31T23:59:59`.
    pub async fn generate_report(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<Credit>, CreditError> {
        let start = parse_timestamp(start_date).map_err(CreditError::InvalidDateFormat)?;
        let end = parse_timestamp(end_date).map_err(CreditError::InvalidDateFormat)?;

        let credits = self.store.find_all_by_created_at_between(start, end).await?;
        debug!("Report {}..{} matched {} credits", start, end, credits.len());
        Ok(credits)
    }

    // ==========================================
    // COLLABORATORS
    // ==========================================

    /// Fail-closed: "no", an error and a timeout all mean the customer is invalid.
    async fn verify_customer(&self, customer_id: &str) -> bool {
        match self.bounded(self.verifier.exists(customer_id)).await {
            Some(Ok(exists)) => exists,
            Some(Err(e)) => {
                warn!("Customer verification failed for {}: {}", customer_id, e);
                false
            }
            None => {
                warn!(
                    "Customer verification for {} timed out after {:?}",
                    customer_id, self.call_timeout
                );
                false
            }
        }
    }

    async fn synchronize_balance(&self, account_id: &str, balance: f64) -> Result<(), CreditError> {
        match self.bounded(self.synchronizer.set_balance(account_id, balance)).await {
            Some(Ok(())) => Ok(()),
            Some(Err(e)) => {
                error!("Balance synchronization failed for {}: {}", account_id, e);
                Err(CreditError::SynchronizationFailed(e.to_string()))
            }
            None => {
                error!("Balance synchronization for {} timed out", account_id);
                Err(CreditError::SynchronizationFailed(format!(
                    "timed out after {:?}",
                    self.call_timeout
                )))
            }
        }
    }

    /// Run a collaborator call under the configured deadline.
    async fn bounded<F: Future>(&self, call: F) -> Option<F::Output> {
        tokio::time::timeout(self.call_timeout, call).await.ok()
    }
}

/// Rejects negative and NaN balances.
fn validate_balance(balance: f64) -> Result<(), CreditError> {
    if balance >= 0.0 {
        Ok(())
    } else {
        Err(CreditError::InvalidBalance(balance))
    }
}

fn new_credit(request: CreditRequest) -> NewCredit {
    let now = now_timestamp();
    NewCredit {
        customer_id: request.customer_id,
        credit_type: request.credit_type,
        credit_limit: request.credit_limit,
        balance: request.balance,
        active: request.active,
        due_date: request.due_date,
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryCreditStore;
    use crate::services::{SyncError, VerifierError};
    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, NaiveDateTime};
    use std::sync::Mutex;

    // ------------------------------------------
    // Fakes
    // ------------------------------------------

    enum VerifierMode {
        Exists,
        Missing,
        Fails,
        Slow,
    }

    struct FakeVerifier(VerifierMode);

    #[async_trait]
    impl CustomerVerifier for FakeVerifier {
        async fn exists(&self, _customer_id: &str) -> Result<bool, VerifierError> {
            match self.0 {
                VerifierMode::Exists => Ok(true),
                VerifierMode::Missing => Ok(false),
                VerifierMode::Fails => Err(VerifierError::UnexpectedStatus(500)),
                VerifierMode::Slow => {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(true)
                }
            }
        }
    }

    #[derive(Default)]
    struct RecordingSynchronizer {
        fail: bool,
        calls: Mutex<Vec<(String, f64)>>,
    }

    impl RecordingSynchronizer {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<(String, f64)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BalanceSynchronizer for RecordingSynchronizer {
        async fn set_balance(&self, account_id: &str, new_balance: f64) -> Result<(), SyncError> {
            self.calls.lock().unwrap().push((account_id.to_string(), new_balance));
            if self.fail {
                Err(SyncError::Rejected(503))
            } else {
                Ok(())
            }
        }
    }

    /// Store whose every operation fails.
    struct BrokenStore;

    fn broken() -> DatabaseError {
        DatabaseError::ConnectionError("store offline".to_string())
    }

    #[async_trait]
    impl CreditStore for BrokenStore {
        async fn insert(&self, _new: NewCredit) -> Result<Credit, DatabaseError> {
            Err(broken())
        }
        async fn save(&self, _credit: &Credit) -> Result<Credit, DatabaseError> {
            Err(broken())
        }
        async fn find_by_id(&self, _id: &str) -> Result<Option<Credit>, DatabaseError> {
            Err(broken())
        }
        async fn find_all(&self) -> Result<Vec<Credit>, DatabaseError> {
            Err(broken())
        }
        async fn delete(&self, _credit: &Credit) -> Result<(), DatabaseError> {
            Err(broken())
        }
        async fn exists_by_customer_id_and_type(&self, _c: &str, _t: &str) -> Result<bool, DatabaseError> {
            Err(broken())
        }
        async fn find_by_customer_id(&self, _c: &str) -> Result<Vec<Credit>, DatabaseError> {
            Err(broken())
        }
        async fn find_all_by_created_at_between(
            &self,
            _start: NaiveDateTime,
            _end: NaiveDateTime,
        ) -> Result<Vec<Credit>, DatabaseError> {
            Err(broken())
        }
        async fn health_check(&self) -> bool {
            false
        }
    }

    // ------------------------------------------
    // Helpers
    // ------------------------------------------

    struct Harness {
        service: CreditService,
        store: InMemoryCreditStore,
        synchronizer: Arc<RecordingSynchronizer>,
    }

    fn harness_with(mode: VerifierMode, synchronizer: RecordingSynchronizer) -> Harness {
        let store = InMemoryCreditStore::new();
        let synchronizer = Arc::new(synchronizer);
        let service = CreditService::new(
            Arc::new(store.clone()),
            Arc::new(FakeVerifier(mode)),
            synchronizer.clone(),
            Duration::from_millis(200),
        );
        Harness {
            service,
            store,
            synchronizer,
        }
    }

    fn harness() -> Harness {
        harness_with(VerifierMode::Exists, RecordingSynchronizer::default())
    }

    fn broken_service() -> CreditService {
        CreditService::new(
            Arc::new(BrokenStore),
            Arc::new(FakeVerifier(VerifierMode::Exists)),
            Arc::new(RecordingSynchronizer::default()),
            Duration::from_millis(200),
        )
    }

    fn request(customer_id: &str, credit_type: &str, balance: f64) -> CreditRequest {
        CreditRequest {
            customer_id: customer_id.to_string(),
            credit_type: credit_type.to_string(),
            credit_limit: 1000.0,
            balance,
            active: false,
            due_date: None,
        }
    }

    fn update(credit_limit: f64, balance: f64) -> UpdateCreditRequest {
        UpdateCreditRequest { credit_limit, balance }
    }

    // ------------------------------------------
    // create_credit
    // ------------------------------------------

    #[tokio::test]
    async fn test_create_personal_then_duplicate_is_rejected() {
        let h = harness();

        let credit = h.service.create_credit(request("C1", "PERSONAL", 0.0)).await.unwrap();
        assert!(!credit.id.is_empty());
        assert_eq!(credit.credit_type, "PERSONAL");
        assert_eq!(credit.balance, 0.0);
        assert_eq!(credit.created_at, credit.updated_at);
        assert!(!credit.active);

        let second = h.service.create_credit(request("C1", "PERSONAL", 0.0)).await;
        assert!(matches!(second, Err(CreditError::DuplicatePersonalCredit(ref c)) if c == "C1"));
        assert_eq!(h.store.count_for_customer("C1", "PERSONAL").await, 1);
    }

    #[tokio::test]
    async fn test_non_personal_credits_are_not_capped() {
        let h = harness();
        h.service.create_credit(request("C1", "BUSINESS", 0.0)).await.unwrap();
        h.service.create_credit(request("C1", "BUSINESS", 10.0)).await.unwrap();
        h.service.create_credit(request("C1", "CREDIT_CARD", 0.0)).await.unwrap();
        assert_eq!(h.store.count().await, 3);
    }

    #[tokio::test]
    async fn test_personal_check_is_case_sensitive() {
        let h = harness();
        h.service.create_credit(request("C1", "PERSONAL", 0.0)).await.unwrap();
        // Lower-case type is not the PERSONAL kind, so it is not capped.
        h.service.create_credit(request("C1", "personal", 0.0)).await.unwrap();
        assert_eq!(h.store.count().await, 2);
    }

    #[tokio::test]
    async fn test_create_copies_active_and_due_date() {
        let h = harness();
        let due = now_timestamp() + ChronoDuration::days(30);
        let mut req = request("C1", "CREDIT_CARD", 5.0);
        req.active = true;
        req.due_date = Some(due);

        let credit = h.service.create_credit(req).await.unwrap();
        assert!(credit.active);
        assert_eq!(credit.due_date, Some(due));
        assert_eq!(h.service.find_by_id(&credit.id).await.unwrap(), Some(credit));
    }

    #[tokio::test]
    async fn test_unknown_customer_is_rejected_and_nothing_stored() {
        for mode in [VerifierMode::Missing, VerifierMode::Fails, VerifierMode::Slow] {
            let h = harness_with(mode, RecordingSynchronizer::default());
            let result = h.service.create_credit(request("C9", "BUSINESS", 0.0)).await;
            assert!(matches!(result, Err(CreditError::InvalidCustomer(ref c)) if c == "C9"));
            assert_eq!(h.store.count().await, 0);
        }
    }

    #[tokio::test]
    async fn test_create_rejects_negative_opening_balance() {
        let h = harness();
        let result = h.service.create_credit(request("C1", "BUSINESS", -1.0)).await;
        assert!(matches!(result, Err(CreditError::InvalidBalance(b)) if b == -1.0));
        assert_eq!(h.store.count().await, 0);
    }

    #[tokio::test]
    async fn test_create_propagates_store_failure() {
        let result = broken_service().create_credit(request("C1", "BUSINESS", 0.0)).await;
        assert!(matches!(result, Err(CreditError::Persistence(_))));
    }

    #[tokio::test]
    async fn test_concurrent_personal_creates_leave_one_record() {
        let h = harness();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = h.service.clone();
                tokio::spawn(async move { service.create_credit(request("C1", "PERSONAL", 0.0)).await })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(CreditError::DuplicatePersonalCredit(_)) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(h.store.count_for_customer("C1", "PERSONAL").await, 1);
    }

    // ------------------------------------------
    // update_credit
    // ------------------------------------------

    #[tokio::test]
    async fn test_update_overwrites_limit_and_balance_only() {
        let h = harness();
        let mut req = request("C1", "BUSINESS", 100.0);
        req.active = true;
        let created = h.service.create_credit(req).await.unwrap();

        let updated = h.service.update_credit(&created.id, update(5000.0, 250.0)).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.credit_limit, 5000.0);
        assert_eq!(updated.balance, 250.0);
        assert_eq!(updated.customer_id, created.customer_id);
        assert_eq!(updated.credit_type, created.credit_type);
        assert_eq!(updated.active, created.active);
        assert_eq!(updated.due_date, created.due_date);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= updated.created_at);
        assert!(h.synchronizer.calls().is_empty());

        assert_eq!(h.service.find_by_id(&created.id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn test_update_missing_credit_is_not_found() {
        let h = harness();
        let result = h.service.update_credit("nope", update(1.0, 1.0)).await;
        assert!(matches!(result, Err(CreditError::NotFound(ref id)) if id == "nope"));
    }

    #[tokio::test]
    async fn test_update_negative_balance_leaves_record_unchanged() {
        let h = harness();
        let created = h.service.create_credit(request("C1", "CREDIT_CARD", 10.0)).await.unwrap();

        let result = h.service.update_credit(&created.id, update(1000.0, -5.0)).await;

        assert!(matches!(result, Err(CreditError::InvalidBalance(b)) if b == -5.0));
        assert_eq!(h.service.find_by_id(&created.id).await.unwrap(), Some(created));
        assert!(h.synchronizer.calls().is_empty());
    }

    #[tokio::test]
    async fn test_update_rejects_nan_balance() {
        let h = harness();
        let created = h.service.create_credit(request("C1", "BUSINESS", 10.0)).await.unwrap();
        let result = h.service.update_credit(&created.id, update(1000.0, f64::NAN)).await;
        assert!(matches!(result, Err(CreditError::InvalidBalance(_))));
    }

    #[tokio::test]
    async fn test_credit_card_update_synchronizes_before_saving() {
        let h = harness();
        let created = h.service.create_credit(request("C1", "CREDIT_CARD", 10.0)).await.unwrap();

        let updated = h.service.update_credit(&created.id, update(2000.0, 150.0)).await.unwrap();

        assert_eq!(h.synchronizer.calls(), vec![(created.id.clone(), 150.0)]);
        assert_eq!(updated.balance, 150.0);
    }

    #[tokio::test]
    async fn test_failed_synchronization_rejects_update_without_writing() {
        let h = harness_with(VerifierMode::Exists, RecordingSynchronizer::failing());
        let created = h.service.create_credit(request("C1", "CREDIT_CARD", 10.0)).await.unwrap();

        let result = h.service.update_credit(&created.id, update(2000.0, 150.0)).await;

        assert!(matches!(result, Err(CreditError::SynchronizationFailed(_))));
        assert_eq!(h.synchronizer.calls().len(), 1);
        assert_eq!(h.service.find_by_id(&created.id).await.unwrap(), Some(created));
    }

    /// Deletes the credit while its balance is being pushed.
    struct DeletingSynchronizer(InMemoryCreditStore);

    #[async_trait]
    impl BalanceSynchronizer for DeletingSynchronizer {
        async fn set_balance(&self, account_id: &str, _new_balance: f64) -> Result<(), SyncError> {
            if let Ok(Some(credit)) = self.0.find_by_id(account_id).await {
                let _ = self.0.delete(&credit).await;
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_update_of_credit_deleted_during_sync_is_not_found() {
        let store = InMemoryCreditStore::new();
        let service = CreditService::new(
            Arc::new(store.clone()),
            Arc::new(FakeVerifier(VerifierMode::Exists)),
            Arc::new(DeletingSynchronizer(store.clone())),
            Duration::from_millis(200),
        );
        let created = service.create_credit(request("C1", "CREDIT_CARD", 10.0)).await.unwrap();

        let result = service.update_credit(&created.id, update(2000.0, 5.0)).await;

        assert!(matches!(result, Err(CreditError::NotFound(ref id)) if *id == created.id));
        assert_eq!(store.find_by_id(&created.id).await.unwrap(), None);
    }

    // ------------------------------------------
    // delete / lookups
    // ------------------------------------------

    #[tokio::test]
    async fn test_delete_existing_and_missing() {
        let h = harness();
        let created = h.service.create_credit(request("C1", "BUSINESS", 0.0)).await.unwrap();

        h.service.delete_by_id(&created.id).await.unwrap();
        assert_eq!(h.service.find_by_id(&created.id).await.unwrap(), None);

        let again = h.service.delete_by_id(&created.id).await;
        assert!(matches!(again, Err(CreditError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_find_by_id_is_repeatable() {
        let h = harness();
        let created = h.service.create_credit(request("C1", "BUSINESS", 0.0)).await.unwrap();

        let first = h.service.find_by_id(&created.id).await.unwrap();
        let second = h.service.find_by_id(&created.id).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_find_by_id_surfaces_store_failure() {
        let result = broken_service().find_by_id("x").await;
        assert!(matches!(result, Err(CreditError::Persistence(_))));
    }

    #[tokio::test]
    async fn test_find_all_lists_and_fails_soft() {
        let h = harness();
        h.service.create_credit(request("C1", "BUSINESS", 0.0)).await.unwrap();
        h.service.create_credit(request("C2", "BUSINESS", 0.0)).await.unwrap();
        assert_eq!(h.service.find_all().await.len(), 2);

        assert!(broken_service().find_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_find_by_customer_id() {
        let h = harness();
        h.service.create_credit(request("C1", "BUSINESS", 0.0)).await.unwrap();
        h.service.create_credit(request("C1", "PERSONAL", 0.0)).await.unwrap();
        h.service.create_credit(request("C2", "BUSINESS", 0.0)).await.unwrap();

        let credits = h.service.find_by_customer_id("C1").await.unwrap();
        assert_eq!(credits.len(), 2);
        assert!(credits.iter().all(|c| c.customer_id == "C1"));
        assert!(h.service.find_by_customer_id("C3").await.unwrap().is_empty());

        assert!(broken_service().find_by_customer_id("C1").await.is_err());
    }

    // ------------------------------------------
    // has_active_credit_card / has_overdue_debts
    // ------------------------------------------

    #[tokio::test]
    async fn test_has_active_credit_card() {
        let h = harness();
        h.service.create_credit(request("C1", "CREDIT_CARD", 0.0)).await.unwrap();
        assert!(!h.service.has_active_credit_card("C1").await.unwrap());

        let mut active_card = request("C1", "credit_card", 0.0);
        active_card.active = true;
        h.service.create_credit(active_card).await.unwrap();
        assert!(h.service.has_active_credit_card("C1").await.unwrap());

        let mut active_loan = request("C2", "BUSINESS", 0.0);
        active_loan.active = true;
        h.service.create_credit(active_loan).await.unwrap();
        assert!(!h.service.has_active_credit_card("C2").await.unwrap());
    }

    #[tokio::test]
    async fn test_has_active_credit_card_propagates_store_failure() {
        let result = broken_service().has_active_credit_card("C1").await;
        assert!(matches!(result, Err(CreditError::Persistence(_))));
    }

    #[tokio::test]
    async fn test_has_overdue_debts() {
        let h = harness();
        let now = now_timestamp();

        let mut no_due_date = request("C1", "BUSINESS", 100.0);
        no_due_date.due_date = None;
        h.service.create_credit(no_due_date).await.unwrap();

        let mut future_due = request("C1", "BUSINESS", 100.0);
        future_due.due_date = Some(now + ChronoDuration::days(10));
        h.service.create_credit(future_due).await.unwrap();

        let mut paid_off = request("C1", "BUSINESS", 0.0);
        paid_off.due_date = Some(now - ChronoDuration::days(10));
        h.service.create_credit(paid_off).await.unwrap();

        assert!(!h.service.has_overdue_debts("C1").await);

        let mut overdue = request("C1", "BUSINESS", 1.0);
        overdue.due_date = Some(now - ChronoDuration::days(1));
        h.service.create_credit(overdue).await.unwrap();

        assert!(h.service.has_overdue_debts("C1").await);
        assert!(!h.service.has_overdue_debts("unknown").await);
    }

    #[tokio::test]
    async fn test_has_overdue_debts_fails_soft() {
        assert!(!broken_service().has_overdue_debts("C1").await);
    }

    // ------------------------------------------
    // generate_report
    // ------------------------------------------

    #[tokio::test]
    async fn test_report_is_inclusive_at_both_ends() {
        let h = harness();
        let credit = h.service.create_credit(request("C1", "BUSINESS", 0.0)).await.unwrap();
        let exact = credit.created_at.format("%Y-%m-%dT%H:%M:%S%.f").to_string();

        let report = h.service.generate_report(&exact, &exact).await.unwrap();
        assert_eq!(report, vec![credit.clone()]);

        let earlier = (credit.created_at - ChronoDuration::hours(2))
            .format("%Y-%m-%dT%H:%M:%S")
            .to_string();
        let before_creation = (credit.created_at - ChronoDuration::hours(1))
            .format("%Y-%m-%dT%H:%M:%S")
            .to_string();
        assert!(h.service.generate_report(&earlier, &before_creation).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_report_rejects_bad_dates() {
        let h = harness();
        let result = h.service.generate_report("yesterday", "2024-01-01T00:00:00").await;
        assert!(matches!(result, Err(CreditError::InvalidDateFormat(_))));

        let result = h.service.generate_report("2024-01-01T00:00:00", "2024-13-01T00:00:00").await;
        assert!(matches!(result, Err(CreditError::InvalidDateFormat(_))));
    }

    #[tokio::test]
    async fn test_report_propagates_store_failure() {
        let result = broken_service()
            .generate_report("2024-01-01T00:00:00", "2024-12-31T23:59:59")
            .await;
        assert!(matches!(result, Err(CreditError::Persistence(_))));
    }
}
