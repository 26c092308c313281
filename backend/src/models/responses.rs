//! # API Response Models
//!
//! Structures for outgoing API response bodies.
//! Most responses are wrapped in a standard envelope.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::Credit;

/// Standard API response wrapper.
///
/// ## Success Response
///
/// ```json
/// {
///     "success": true,
///     "message": "Credit created successfully",
///     "data": { ... },
///     "error": null
/// }
/// ```
///
/// ## Error Response
///
/// ```json
/// {
///     "success": false,
///     "message": "Credit not found",
///     "data": null,
///     "error": {
///         "code": "CREDIT_NOT_FOUND",
///         "message": "Credit not found with id: 42"
///     }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// Whether the request was successful.
    pub success: bool,

    /// Human-readable summary.
    pub message: String,

    /// Response data (null on error and for payload-less successes).
    pub data: Option<T>,

    /// Error information (null on success).
    pub error: Option<ApiError>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response with data.
    pub fn success(data: T, message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            data: Some(data),
            error: None,
        }
    }

    /// Create a successful response with no payload.
    pub fn empty(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            data: None,
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(code: &str, message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            data: None,
            error: Some(ApiError {
                code: code.to_string(),
                message: message.to_string(),
            }),
        }
    }
}

/// API error information.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Error code (e.g., "CREDIT_NOT_FOUND").
    pub code: String,

    /// Human-readable error message.
    pub message: String,
}

/// A credit as returned by the API.
///
/// ## Example Response
///
/// ```json
/// {
///     "id": "6f9d5c1e-...",
///     "customerId": "C1",
///     "type": "CREDIT_CARD",
///     "creditLimit": 2000.0,
///     "balance": 150.0,
///     "active": true,
///     "dueDate": null,
///     "createdAt": "2024-05-01T10:00:00",
///     "updatedAt": "2024-05-02T08:30:00"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditResponse {
    pub id: String,
    pub customer_id: String,
    #[serde(rename = "type")]
    pub credit_type: String,
    pub credit_limit: f64,
    pub balance: f64,
    pub active: bool,
    pub due_date: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<Credit> for CreditResponse {
    fn from(credit: Credit) -> Self {
        Self {
            id: credit.id,
            customer_id: credit.customer_id,
            credit_type: credit.credit_type,
            credit_limit: credit.credit_limit,
            balance: credit.balance,
            active: credit.active,
            due_date: credit.due_date,
            created_at: credit.created_at,
            updated_at: credit.updated_at,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// "healthy" or "unhealthy".
    pub status: String,

    /// Whether the credit store answered.
    pub store: bool,

    /// Service version.
    pub version: String,

    /// Current server time.
    pub timestamp: DateTime<Utc>,
}
