//! # REST API Module
//!
//! This module defines all HTTP endpoints for the credit service.
//!
//! ## Endpoint Overview
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | POST | `/api/credits` | Create credit |
//! | GET | `/api/credits` | List all credits |
//! | GET | `/api/credits/{id}` | Get credit |
//! | PUT | `/api/credits/{id}` | Update limit and balance |
//! | DELETE | `/api/credits/{id}` | Delete credit |
//! | GET | `/api/credits/customer/{customerId}` | Credits of a customer |
//! | GET | `/api/credits/customer/{customerId}/has-active-card` | Active card check |
//! | GET | `/api/credits/customer/{customerId}/has-overdue-debts` | Overdue check |
//! | GET | `/api/credits/report?startDate=&endDate=` | Creation-time report |
//! | GET | `/health` | Health check |
//!
//! ## Request/Response Format
//!
//! All requests and responses use JSON. Apart from the two boolean checks,
//! responses are wrapped in an envelope:
//!
//! ```json
//! // Success response
//! {
//!     "success": true,
//!     "message": "Credit found",
//!     "data": { ... }
//! }
//!
//! // Error response
//! {
//!     "success": false,
//!     "message": "Credit not found",
//!     "error": {
//!         "code": "CREDIT_NOT_FOUND",
//!         "message": "Credit not found"
//!     }
//! }
//! ```

pub mod handlers;
pub mod routes;

pub use routes::configure_routes;
