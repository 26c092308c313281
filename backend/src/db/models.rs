//! # Database Models
//!
//! This module defines the data structures that map to the `credits` table.
//!
//! ## Table Overview
//!
//! | Column | Type | Notes |
//! |--------|------|-------|
//! | `id` | TEXT | Primary key, UUID v4 assigned on insert |
//! | `customer_id` | TEXT | Owning customer |
//! | `credit_type` | TEXT | `PERSONAL`, `BUSINESS`, `CREDIT_CARD` |
//! | `credit_limit` | DOUBLE PRECISION | Maximum extendable credit |
//! | `balance` | DOUBLE PRECISION | Amount currently owed |
//! | `active` | BOOLEAN | Whether the product is usable |
//! | `due_date` | TIMESTAMP NULL | Payment due date |
//! | `created_at` | TIMESTAMP | Set once on insert |
//! | `updated_at` | TIMESTAMP | Refreshed on every write |
//!
//! A partial unique index on `customer_id WHERE credit_type = 'PERSONAL'`
//! keeps personal credits at one per customer.

use chrono::NaiveDateTime;

/// The kinds of credit product the service knows about.
///
/// Stored as an open string (`Credit::credit_type`) so unknown kinds
/// written by other systems still load; these are the ones with
/// special behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreditType {
    /// Personal loan. At most one per customer.
    Personal,
    /// Business loan.
    Business,
    /// Credit card. Balance changes are pushed to the account service.
    CreditCard,
}

impl CreditType {
    /// The stored string for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            CreditType::Personal => "PERSONAL",
            CreditType::Business => "BUSINESS",
            CreditType::CreditCard => "CREDIT_CARD",
        }
    }

    /// Exact, case-sensitive match against a stored type string.
    pub fn is(&self, value: &str) -> bool {
        value == self.as_str()
    }

    /// Case-insensitive match against a stored type string.
    pub fn is_ignore_case(&self, value: &str) -> bool {
        value.eq_ignore_ascii_case(self.as_str())
    }
}

impl std::fmt::Display for CreditType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CreditType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PERSONAL" => Ok(CreditType::Personal),
            "BUSINESS" => Ok(CreditType::Business),
            "CREDIT_CARD" => Ok(CreditType::CreditCard),
            other => Err(format!("Unknown credit type: {}", other)),
        }
    }
}

/// A stored credit record.
///
/// `id` and `created_at` never change after insert. Updates overwrite
/// `credit_limit`, `balance` and `updated_at` in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Credit {
    /// Store-assigned identifier.
    pub id: String,

    /// The owning customer.
    pub customer_id: String,

    /// Product kind, see [`CreditType`].
    pub credit_type: String,

    /// Maximum extendable credit.
    pub credit_limit: f64,

    /// Amount currently owed.
    pub balance: f64,

    /// Whether the credit (usually a card) is usable.
    pub active: bool,

    /// When the balance falls due, if a schedule exists.
    pub due_date: Option<NaiveDateTime>,

    pub created_at: NaiveDateTime,

    pub updated_at: NaiveDateTime,
}

impl Credit {
    /// Build the stored record for an insert with the given id.
    pub fn from_new(id: String, new: NewCredit) -> Self {
        Self {
            id,
            customer_id: new.customer_id,
            credit_type: new.credit_type,
            credit_limit: new.credit_limit,
            balance: new.balance,
            active: new.active,
            due_date: new.due_date,
            created_at: new.created_at,
            updated_at: new.updated_at,
        }
    }

    /// True when a due date exists, lies strictly before `now`, and a
    /// positive balance remains. A credit without a due date is never overdue.
    pub fn is_overdue_at(&self, now: NaiveDateTime) -> bool {
        match self.due_date {
            Some(due) => due < now && self.balance > 0.0,
            None => false,
        }
    }

    /// True for an active credit card (type compared case-insensitively).
    pub fn is_active_credit_card(&self) -> bool {
        self.active && CreditType::CreditCard.is_ignore_case(&self.credit_type)
    }
}

/// A credit that has not been stored yet (no id).
#[derive(Debug, Clone, PartialEq)]
pub struct NewCredit {
    pub customer_id: String,
    pub credit_type: String,
    pub credit_limit: f64,
    pub balance: f64,
    pub active: bool,
    pub due_date: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
