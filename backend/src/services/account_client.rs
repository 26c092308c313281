//! # Account Balance Synchronizer
//!
//! Pushes a credit card's new balance to the matching account record in
//! the account service:
//!
//! ```text
//! PUT {ACCOUNT_SERVICE_URL}/accounts/{id}
//! { "newBalance": 150.0 }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::Serialize;
use tracing::{debug, warn};

/// Errors from the account service call.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The request never produced a response (connect, timeout, TLS).
    #[error("Account service request failed: {0}")]
    Transport(String),

    /// The account service rejected the update.
    #[error("Account service returned status {0}")]
    Rejected(u16),

    /// The base URL or the account id cannot form an account URL.
    #[error("Invalid account URL: {0}")]
    InvalidUrl(String),
}

/// Body of the balance update sent to the account service.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountBalanceUpdateRequest {
    pub new_balance: f64,
}

/// Capability to set the balance of an external account record.
#[async_trait]
pub trait BalanceSynchronizer: Send + Sync {
    async fn set_balance(&self, account_id: &str, new_balance: f64) -> Result<(), SyncError>;
}

/// [`BalanceSynchronizer`] backed by the account service REST API.
#[derive(Clone)]
pub struct HttpBalanceSynchronizer {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpBalanceSynchronizer {
    /// Create a synchronizer for `base_url` (e.g. `http://localhost:8081`).
    ///
    /// Every request is bounded by `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::Transport(e.to_string()))?;

        Self::with_client(base_url, client)
    }

    /// Create a synchronizer around an existing client.
    pub fn with_client(base_url: &str, client: reqwest::Client) -> Result<Self, SyncError> {
        let base_url = Url::parse(base_url).map_err(|e| SyncError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(SyncError::InvalidUrl(base_url.to_string()));
        }

        Ok(Self { client, base_url })
    }

    /// `{base}/accounts/{account_id}` with the id as one percent-encoded segment.
    fn account_url(&self, account_id: &str) -> Result<Url, SyncError> {
        if matches!(account_id, "" | "." | "..") {
            return Err(SyncError::InvalidUrl(format!("unaddressable account id {:?}", account_id)));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SyncError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push("accounts")
            .push(account_id);
        Ok(url)
    }
}

#[async_trait]
impl BalanceSynchronizer for HttpBalanceSynchronizer {
    async fn set_balance(&self, account_id: &str, new_balance: f64) -> Result<(), SyncError> {
        let url = self.account_url(account_id)?;
        debug!("Pushing balance {} to {}", new_balance, url);

        let response = self
            .client
            .put(url)
            .json(&AccountBalanceUpdateRequest { new_balance })
            .send()
            .await
            .map_err(|e| SyncError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            warn!("Account service rejected balance update for {}: {}", account_id, status);
            Err(SyncError::Rejected(status.as_u16()))
        }
    }
}
