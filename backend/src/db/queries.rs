//! # Database Queries
//!
//! This module contains all the SQL for the `credits` table.
//! Each function performs one database operation against a pooled client.
//!
//! ## Error Handling
//!
//! All queries return `Result<T, DatabaseError>`. Common errors:
//! - `ConnectionError` - No client could be taken from the pool
//! - `UniqueViolation` - Second `PERSONAL` credit for a customer
//! - `QueryError` - SQL execution failed

use chrono::NaiveDateTime;
use deadpool_postgres::{Client, Pool};
use tokio_postgres::error::SqlState;
use tokio_postgres::Row;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::models::*;
use super::DatabaseError;

const CREDIT_COLUMNS: &str = "id, customer_id, credit_type, credit_limit, balance, \
                              active, due_date, created_at, updated_at";

// ============================================
// HELPER FUNCTIONS
// ============================================

/// Helper to convert a database row to Credit
fn row_to_credit(row: &Row) -> Result<Credit, DatabaseError> {
    Ok(Credit {
        id: row.try_get("id")?,
        customer_id: row.try_get("customer_id")?,
        credit_type: row.try_get("credit_type")?,
        credit_limit: row.try_get("credit_limit")?,
        balance: row.try_get("balance")?,
        active: row.try_get("active")?,
        due_date: row.try_get("due_date")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn rows_to_credits(rows: Vec<Row>) -> Result<Vec<Credit>, DatabaseError> {
    rows.iter().map(row_to_credit).collect()
}

async fn client(pool: &Pool) -> Result<Client, DatabaseError> {
    pool.get()
        .await
        .map_err(|e| DatabaseError::ConnectionError(e.to_string()))
}

// ============================================
// WRITES
// ============================================

/// Insert a new credit with a freshly generated id.
pub async fn insert_credit(pool: &Pool, new: NewCredit) -> Result<Credit, DatabaseError> {
    let credit = Credit::from_new(Uuid::new_v4().to_string(), new);
    debug!("Inserting credit {} for customer {}", credit.id, credit.customer_id);

    let client = client(pool).await?;

    let result = client
        .execute(
            r#"
            INSERT INTO credits (
                id, customer_id, credit_type, credit_limit, balance,
                active, due_date, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
            &[
                &credit.id,
                &credit.customer_id,
                &credit.credit_type,
                &credit.credit_limit,
                &credit.balance,
                &credit.active,
                &credit.due_date,
                &credit.created_at,
                &credit.updated_at,
            ],
        )
        .await;

    match result {
        Ok(_) => {
            info!("Credit {} inserted", credit.id);
            Ok(credit)
        }
        Err(e) if e.code() == Some(&SqlState::UNIQUE_VIOLATION) => {
            warn!(
                "Insert rejected by unique index for customer {} ({})",
                credit.customer_id, credit.credit_type
            );
            Err(DatabaseError::UniqueViolation(format!(
                "customer {} already has a {} credit",
                credit.customer_id, credit.credit_type
            )))
        }
        Err(e) => Err(e.into()),
    }
}

/// Overwrite the mutable fields of an existing credit.
pub async fn update_credit(pool: &Pool, credit: &Credit) -> Result<Credit, DatabaseError> {
    debug!("Updating credit {}", credit.id);

    let client = client(pool).await?;

    let rows_affected = client
        .execute(
            r#"
            UPDATE credits SET
                customer_id = $2,
                credit_type = $3,
                credit_limit = $4,
                balance = $5,
                active = $6,
                due_date = $7,
                updated_at = $8
            WHERE id = $1
            "#,
            &[
                &credit.id,
                &credit.customer_id,
                &credit.credit_type,
                &credit.credit_limit,
                &credit.balance,
                &credit.active,
                &credit.due_date,
                &credit.updated_at,
            ],
        )
        .await?;

    if rows_affected == 0 {
        // Deleted between lookup and write.
        warn!("Credit {} vanished before update", credit.id);
        return Err(DatabaseError::NotFound(credit.id.clone()));
    }

    Ok(credit.clone())
}

/// Delete a credit by id.
pub async fn delete_credit(pool: &Pool, id: &str) -> Result<(), DatabaseError> {
    debug!("Deleting credit {}", id);

    let client = client(pool).await?;
    client.execute("DELETE FROM credits WHERE id = $1", &[&id]).await?;

    info!("Credit {} deleted", id);
    Ok(())
}

// ============================================
// READS
// ============================================

/// Get a credit by id.
pub async fn get_credit_by_id(pool: &Pool, id: &str) -> Result<Option<Credit>, DatabaseError> {
    debug!("Fetching credit {}", id);

    let client = client(pool).await?;
    let row = client
        .query_opt(
            &format!("SELECT {} FROM credits WHERE id = $1", CREDIT_COLUMNS),
            &[&id],
        )
        .await?;

    row.as_ref().map(row_to_credit).transpose()
}

/// Get every stored credit, oldest first.
pub async fn get_all_credits(pool: &Pool) -> Result<Vec<Credit>, DatabaseError> {
    debug!("Fetching all credits");

    let client = client(pool).await?;
    let rows = client
        .query(
            &format!("SELECT {} FROM credits ORDER BY created_at", CREDIT_COLUMNS),
            &[],
        )
        .await?;

    rows_to_credits(rows)
}

/// Get every credit owned by a customer.
pub async fn get_credits_by_customer(
    pool: &Pool,
    customer_id: &str,
) -> Result<Vec<Credit>, DatabaseError> {
    debug!("Fetching credits for customer {}", customer_id);

    let client = client(pool).await?;
    let rows = client
        .query(
            &format!(
                "SELECT {} FROM credits WHERE customer_id = $1 ORDER BY created_at",
                CREDIT_COLUMNS
            ),
            &[&customer_id],
        )
        .await?;

    rows_to_credits(rows)
}

/// Whether the customer owns a credit of the given type (exact match).
pub async fn credit_exists_for_customer(
    pool: &Pool,
    customer_id: &str,
    credit_type: &str,
) -> Result<bool, DatabaseError> {
    let client = client(pool).await?;
    let row = client
        .query_one(
            "SELECT EXISTS (SELECT 1 FROM credits WHERE customer_id = $1 AND credit_type = $2)",
            &[&customer_id, &credit_type],
        )
        .await?;

    Ok(row.try_get(0)?)
}

/// Get credits created within `[start, end]`, both ends included.
pub async fn get_credits_created_between(
    pool: &Pool,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<Vec<Credit>, DatabaseError> {
    debug!("Fetching credits created between {} and {}", start, end);

    let client = client(pool).await?;
    let rows = client
        .query(
            &format!(
                "SELECT {} FROM credits WHERE created_at BETWEEN $1 AND $2 ORDER BY created_at",
                CREDIT_COLUMNS
            ),
            &[&start, &end],
        )
        .await?;

    rows_to_credits(rows)
}
