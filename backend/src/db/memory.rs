//! In-memory credit store.
//!
//! Keeps every credit in a `HashMap` behind a tokio `RwLock`. The
//! personal-credit uniqueness check runs under the same write lock as the
//! insert, so concurrent creates cannot both succeed.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::models::{Credit, CreditType, NewCredit};
use super::{CreditStore, DatabaseError};

/// Process-local [`CreditStore`].
#[derive(Clone, Default)]
pub struct InMemoryCreditStore {
    credits: Arc<RwLock<HashMap<String, Credit>>>,
}

impl InMemoryCreditStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored credits.
    #[cfg(test)]
    pub async fn count(&self) -> usize {
        self.credits.read().await.len()
    }

    /// Number of stored credits for a customer with an exact type.
    #[cfg(test)]
    pub async fn count_for_customer(&self, customer_id: &str, credit_type: &str) -> usize {
        self.credits
            .read()
            .await
            .values()
            .filter(|c| c.customer_id == customer_id && c.credit_type == credit_type)
            .count()
    }

    /// Oldest first, ties broken by id, to match the Postgres ordering.
    fn sorted(mut credits: Vec<Credit>) -> Vec<Credit> {
        credits.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        credits
    }
}

#[async_trait]
impl CreditStore for InMemoryCreditStore {
    async fn insert(&self, new: NewCredit) -> Result<Credit, DatabaseError> {
        let mut credits = self.credits.write().await;

        if CreditType::Personal.is(&new.credit_type)
            && credits
                .values()
                .any(|c| c.customer_id == new.customer_id && CreditType::Personal.is(&c.credit_type))
        {
            return Err(DatabaseError::UniqueViolation(format!(
                "customer {} already has a PERSONAL credit",
                new.customer_id
            )));
        }

        let credit = Credit::from_new(Uuid::new_v4().to_string(), new);
        debug!("Stored credit {} in memory", credit.id);
        credits.insert(credit.id.clone(), credit.clone());
        Ok(credit)
    }

    async fn save(&self, credit: &Credit) -> Result<Credit, DatabaseError> {
        let mut credits = self.credits.write().await;
        match credits.get_mut(&credit.id) {
            Some(stored) => {
                *stored = credit.clone();
                Ok(credit.clone())
            }
            None => Err(DatabaseError::NotFound(credit.id.clone())),
        }
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Credit>, DatabaseError> {
        Ok(self.credits.read().await.get(id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Credit>, DatabaseError> {
        let credits = self.credits.read().await.values().cloned().collect();
        Ok(Self::sorted(credits))
    }

    async fn delete(&self, credit: &Credit) -> Result<(), DatabaseError> {
        self.credits.write().await.remove(&credit.id);
        Ok(())
    }

    async fn exists_by_customer_id_and_type(
        &self,
        customer_id: &str,
        credit_type: &str,
    ) -> Result<bool, DatabaseError> {
        Ok(self
            .credits
            .read()
            .await
            .values()
            .any(|c| c.customer_id == customer_id && c.credit_type == credit_type))
    }

    async fn find_by_customer_id(&self, customer_id: &str) -> Result<Vec<Credit>, DatabaseError> {
        let credits = self
            .credits
            .read()
            .await
            .values()
            .filter(|c| c.customer_id == customer_id)
            .cloned()
            .collect();
        Ok(Self::sorted(credits))
    }

    async fn find_all_by_created_at_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Credit>, DatabaseError> {
        let credits = self
            .credits
            .read()
            .await
            .values()
            .filter(|c| c.created_at >= start && c.created_at <= end)
            .cloned()
            .collect();
        Ok(Self::sorted(credits))
    }

    async fn health_check(&self) -> bool {
        true
    }
}
