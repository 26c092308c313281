//! # Services Module
//!
//! This module contains the business logic of the credit backend and the
//! clients for the systems it depends on.
//!
//! ## Services Overview
//!
//! | Service | Responsibility |
//! |---------|---------------|
//! | `CreditService` | Credit lifecycle, checks and reports |
//! | `HttpCustomerVerifier` | "Does this customer exist?" |
//! | `HttpBalanceSynchronizer` | Push card balances to accounts |
//!
//! ## Service Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        SERVICES LAYER                            │
//! │                                                                  │
//! │  ┌──────────────────────────────────────────────────────────┐   │
//! │  │                    CreditService                          │   │
//! │  │  • create_credit()   • update_credit()   • delete_by_id() │   │
//! │  │  • has_active_credit_card()  • has_overdue_debts()        │   │
//! │  │  • generate_report()                                      │   │
//! │  └──────────────────────────────────────────────────────────┘   │
//! │                              │                                   │
//! │         ┌────────────────────┼────────────────────┐             │
//! │         ▼                    ▼                    ▼             │
//! │  ┌────────────┐      ┌────────────┐       ┌────────────┐       │
//! │  │CreditStore │      │ Customer   │       │  Balance   │       │
//! │  │            │      │ Verifier   │       │Synchronizer│       │
//! │  │ Postgres / │      │            │       │            │       │
//! │  │ memory     │      │ GET /{id}  │       │ PUT        │       │
//! │  └────────────┘      └────────────┘       └────────────┘       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod account_client;
pub mod credit_service;
pub mod customer_client;

#[cfg(test)]
pub(crate) mod test_http;

pub use account_client::{BalanceSynchronizer, HttpBalanceSynchronizer, SyncError};
pub use credit_service::{CreditError, CreditService};
pub use customer_client::{CustomerVerifier, HttpCustomerVerifier, VerifierError};
