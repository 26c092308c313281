//! # Customer Verifier
//!
//! Answers "does this customer exist?" against the customer service.
//!
//! ```text
//! GET {CUSTOMER_SERVICE_URL}/{customerId}
//!   2xx  -> exists
//!   404  -> does not exist
//!   else -> VerifierError
//! ```
//!
//! The orchestrator treats an error the same as "does not exist".

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use tracing::{debug, warn};

/// Errors from the customer service call.
#[derive(Debug, thiserror::Error)]
pub enum VerifierError {
    /// The request never produced a response (connect, timeout, TLS).
    #[error("Customer service request failed: {0}")]
    Transport(String),

    /// The customer service answered with an unexpected status.
    #[error("Customer service returned status {0}")]
    UnexpectedStatus(u16),

    /// The configured base URL cannot carry a customer id.
    #[error("Invalid customer service URL: {0}")]
    InvalidUrl(String),
}

/// Capability to check that a customer exists.
#[async_trait]
pub trait CustomerVerifier: Send + Sync {
    async fn exists(&self, customer_id: &str) -> Result<bool, VerifierError>;
}

/// [`CustomerVerifier`] backed by the customer service REST API.
#[derive(Clone)]
pub struct HttpCustomerVerifier {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpCustomerVerifier {
    /// Create a verifier for `base_url` (e.g. `http://localhost:8082/customers`).
    ///
    /// Every request is bounded by `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, VerifierError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VerifierError::Transport(e.to_string()))?;

        Self::with_client(base_url, client)
    }

    /// Create a verifier around an existing client.
    pub fn with_client(base_url: &str, client: reqwest::Client) -> Result<Self, VerifierError> {
        let base_url = Url::parse(base_url).map_err(|e| VerifierError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(VerifierError::InvalidUrl(base_url.to_string()));
        }

        Ok(Self { client, base_url })
    }

    /// `{base}/{customer_id}` with the id as one percent-encoded segment.
    fn customer_url(&self, customer_id: &str) -> Result<Url, VerifierError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| VerifierError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(customer_id);
        Ok(url)
    }
}

/// Ids that would address the collection rather than one customer.
fn is_addressable(customer_id: &str) -> bool {
    !matches!(customer_id, "" | "." | "..")
}

#[async_trait]
impl CustomerVerifier for HttpCustomerVerifier {
    async fn exists(&self, customer_id: &str) -> Result<bool, VerifierError> {
        if !is_addressable(customer_id) {
            warn!("Rejecting unaddressable customer id {:?}", customer_id);
            return Ok(false);
        }

        let url = self.customer_url(customer_id)?;
        debug!("Verifying customer via {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| VerifierError::Transport(e.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => {
                warn!("Customer service answered {} for {}", status, customer_id);
                Err(VerifierError::UnexpectedStatus(status.as_u16()))
            }
        }
    }
}
