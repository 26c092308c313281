//! # API Request Models
//!
//! Structures for incoming API request bodies.
//! Each struct represents the expected JSON body for an endpoint.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Request to create a credit.
///
/// ## Example JSON
///
/// ```json
/// {
///     "customerId": "C1",
///     "type": "PERSONAL",
///     "creditLimit": 1000.0,
///     "balance": 0.0,
///     "active": false,
///     "dueDate": "2025-01-31T00:00:00"
/// }
/// ```
///
/// `type` is one of `PERSONAL`, `BUSINESS`, `CREDIT_CARD`.
/// `active` defaults to `false`; `dueDate` is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditRequest {
    /// Owning customer; must exist in the customer service.
    pub customer_id: String,

    /// Product kind.
    #[serde(rename = "type")]
    pub credit_type: String,

    /// Maximum extendable credit.
    pub credit_limit: f64,

    /// Opening balance. Must not be negative.
    pub balance: f64,

    /// Whether the product starts out usable.
    #[serde(default)]
    pub active: bool,

    /// When the balance falls due.
    #[serde(default)]
    pub due_date: Option<NaiveDateTime>,
}

/// Request to update a credit.
///
/// Only the limit and the balance change. Any other fields in the body
/// (for instance a full `CreditRequest`) are ignored.
///
/// ## Example JSON
///
/// ```json
/// {
///     "creditLimit": 2000.0,
///     "balance": 150.0
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCreditRequest {
    pub credit_limit: f64,
    pub balance: f64,
}

/// Query parameters for the creation-time report.
///
/// ## Example URL
///
/// ```text
/// GET /api/credits/report?startDate=2024-01-01T00:00:00&endDate=2024-01-31T23:59:59
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    /// Start of the window (inclusive), ISO local date-time.
    pub start_date: String,

    /// End of the window (inclusive), ISO local date-time.
    pub end_date: String,
}
