//! # API Request Handlers
//!
//! This module contains the handler functions for each API endpoint.
//! Each handler:
//! 1. Extracts request data
//! 2. Calls the credit service
//! 3. Returns a formatted response
//!
//! ## Error Handling
//!
//! Service errors are returned as JSON envelopes with a status code that
//! matches the error kind:
//!
//! | Error | Status | Code |
//! |-------|--------|------|
//! | `NotFound` | 404 | `CREDIT_NOT_FOUND` |
//! | `InvalidCustomer` | 400 | `INVALID_CUSTOMER` |
//! | `DuplicatePersonalCredit` | 409 | `DUPLICATE_PERSONAL_CREDIT` |
//! | `InvalidBalance` | 400 | `INVALID_BALANCE` |
//! | `InvalidDateFormat` | 400 | `INVALID_DATE_FORMAT` |
//! | `SynchronizationFailed` | 502 | `SYNCHRONIZATION_FAILED` |
//! | `Persistence` | 500 | `PERSISTENCE_ERROR` |

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use tracing::{error, info, warn};

use crate::models::{
    ApiResponse, CreditRequest, CreditResponse, HealthResponse, ReportQuery, UpdateCreditRequest,
};
use crate::services::CreditError;
use crate::AppState;

/// Status and envelope code for a service error.
fn classify(e: &CreditError) -> (StatusCode, &'static str) {
    match e {
        CreditError::NotFound(_) => (StatusCode::NOT_FOUND, "CREDIT_NOT_FOUND"),
        CreditError::InvalidCustomer(_) => (StatusCode::BAD_REQUEST, "INVALID_CUSTOMER"),
        CreditError::DuplicatePersonalCredit(_) => (StatusCode::CONFLICT, "DUPLICATE_PERSONAL_CREDIT"),
        CreditError::InvalidBalance(_) => (StatusCode::BAD_REQUEST, "INVALID_BALANCE"),
        CreditError::InvalidDateFormat(_) => (StatusCode::BAD_REQUEST, "INVALID_DATE_FORMAT"),
        CreditError::SynchronizationFailed(_) => (StatusCode::BAD_GATEWAY, "SYNCHRONIZATION_FAILED"),
        CreditError::Persistence(_) => (StatusCode::INTERNAL_SERVER_ERROR, "PERSISTENCE_ERROR"),
    }
}

fn error_response(e: &CreditError, message: &str) -> HttpResponse {
    let (status, code) = classify(e);
    HttpResponse::build(status).json(ApiResponse::<()>::error(code, message))
}

fn not_found(message: &str) -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::<()>::error("CREDIT_NOT_FOUND", message))
}

fn to_responses(credits: Vec<crate::db::Credit>) -> Vec<CreditResponse> {
    credits.into_iter().map(CreditResponse::from).collect()
}

/// Health check endpoint.
///
/// ## Endpoint
///
/// `GET /health`
///
/// ## Response
///
/// ```json
/// {
///     "success": true,
///     "message": "Service is healthy",
///     "data": {
///         "status": "healthy",
///         "store": true,
///         "version": "0.1.0",
///         "timestamp": "2025-12-08T12:00:00Z"
///     }
/// }
/// ```
pub async fn health_check(state: web::Data<Arc<AppState>>) -> HttpResponse {
    let store_healthy = state.store.health_check().await;

    let response = HealthResponse {
        status: if store_healthy { "healthy" } else { "unhealthy" }.to_string(),
        store: store_healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    };

    let (status_code, message) = if store_healthy {
        (StatusCode::OK, "Service is healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Credit store unavailable")
    };

    HttpResponse::build(status_code).json(ApiResponse::success(response, message))
}

/// Create a credit.
///
/// ## Endpoint
///
/// `POST /api/credits`
///
/// ## Example
///
/// ```bash
/// curl -X POST http://127.0.0.1:8080/api/credits \
///   -H "Content-Type: application/json" \
///   -d '{"customerId":"C1","type":"PERSONAL","creditLimit":1000,"balance":0}'
/// ```
pub async fn create_credit(
    state: web::Data<Arc<AppState>>,
    body: web::Json<CreditRequest>,
) -> HttpResponse {
    let request = body.into_inner();
    info!("Create credit request for customer: {}", request.customer_id);

    match state.credit_service.create_credit(request).await {
        Ok(credit) => HttpResponse::Ok().json(ApiResponse::success(
            CreditResponse::from(credit),
            "Credit created successfully",
        )),
        Err(e) => {
            error!("Create credit failed: {}", e);
            error_response(&e, &format!("Error creating credit: {}", e))
        }
    }
}

/// Get a credit by id.
///
/// ## Endpoint
///
/// `GET /api/credits/{id}`
pub async fn get_credit_by_id(
    state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
) -> HttpResponse {
    let id = path.into_inner();

    match state.credit_service.find_by_id(&id).await {
        Ok(Some(credit)) => HttpResponse::Ok().json(ApiResponse::success(
            CreditResponse::from(credit),
            "Credit found",
        )),
        Ok(None) => not_found("Credit not found"),
        Err(e) => {
            error!("Get credit {} failed: {}", id, e);
            error_response(&e, &e.to_string())
        }
    }
}

/// List every credit.
///
/// Never fails: a store error yields an empty list.
///
/// ## Endpoint
///
/// `GET /api/credits`
pub async fn get_all_credits(state: web::Data<Arc<AppState>>) -> HttpResponse {
    let credits = state.credit_service.find_all().await;

    HttpResponse::Ok().json(ApiResponse::success(
        to_responses(credits),
        "Credit list retrieved successfully",
    ))
}

/// Update the limit and balance of a credit.
///
/// ## Endpoint
///
/// `PUT /api/credits/{id}`
///
/// ## Example
///
/// ```bash
/// curl -X PUT http://127.0.0.1:8080/api/credits/6f9d5c1e-... \
///   -H "Content-Type: application/json" \
///   -d '{"creditLimit":2000,"balance":150}'
/// ```
pub async fn update_credit(
    state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    body: web::Json<UpdateCreditRequest>,
) -> HttpResponse {
    let id = path.into_inner();
    info!("Update credit request for: {}", id);

    match state.credit_service.update_credit(&id, body.into_inner()).await {
        Ok(credit) => HttpResponse::Ok().json(ApiResponse::success(
            CreditResponse::from(credit),
            "Credit updated successfully",
        )),
        Err(CreditError::NotFound(_)) => not_found("Credit not found"),
        Err(e) => {
            error!("Update credit {} failed: {}", id, e);
            error_response(&e, &e.to_string())
        }
    }
}

/// Delete a credit.
///
/// ## Endpoint
///
/// `DELETE /api/credits/{id}`
pub async fn delete_credit(
    state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
) -> HttpResponse {
    let id = path.into_inner();
    info!("Delete credit request for: {}", id);

    match state.credit_service.delete_by_id(&id).await {
        Ok(()) => HttpResponse::Ok().json(ApiResponse::<()>::empty("Credit deleted successfully")),
        Err(CreditError::NotFound(_)) => not_found("Credit not found"),
        Err(e) => {
            error!("Delete credit {} failed: {}", id, e);
            error_response(&e, &e.to_string())
        }
    }
}

/// Whether a customer holds an active credit card.
///
/// Returns a bare JSON boolean.
///
/// ## Endpoint
///
/// `GET /api/credits/customer/{customerId}/has-active-card`
pub async fn has_active_credit_card(
    state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
) -> HttpResponse {
    let customer_id = path.into_inner();

    match state.credit_service.has_active_credit_card(&customer_id).await {
        Ok(has_card) => HttpResponse::Ok().json(has_card),
        Err(e) => {
            error!("Active card check for {} failed: {}", customer_id, e);
            error_response(&e, &e.to_string())
        }
    }
}

/// Whether a customer has overdue debts.
///
/// Returns a bare JSON boolean; errors resolve to `false`.
///
/// ## Endpoint
///
/// `GET /api/credits/customer/{customerId}/has-overdue-debts`
pub async fn has_overdue_debts(
    state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
) -> HttpResponse {
    let customer_id = path.into_inner();
    let overdue = state.credit_service.has_overdue_debts(&customer_id).await;
    HttpResponse::Ok().json(overdue)
}

/// Credits created within a time window (both ends included).
///
/// ## Endpoint
///
/// `GET /api/credits/report?startDate=2024-01-01T00:00:00&endDate=2024-01-31T23:59:59`
pub async fn get_credit_report(
    state: web::Data<Arc<AppState>>,
    query: web::Query<ReportQuery>,
) -> HttpResponse {
    let query = query.into_inner();
    info!("Report request: {} .. {}", query.start_date, query.end_date);

    match state
        .credit_service
        .generate_report(&query.start_date, &query.end_date)
        .await
    {
        Ok(credits) => HttpResponse::Ok().json(ApiResponse::success(
            to_responses(credits),
            "Report generated successfully",
        )),
        Err(e) => {
            warn!("Report failed: {}", e);
            error_response(&e, &e.to_string())
        }
    }
}

/// Every credit owned by a customer.
///
/// An empty result is reported as `404 NO_CREDITS_FOUND`.
///
/// ## Endpoint
///
/// `GET /api/credits/customer/{customerId}`
pub async fn get_credits_by_customer(
    state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
) -> HttpResponse {
    let customer_id = path.into_inner();

    match state.credit_service.find_by_customer_id(&customer_id).await {
        Ok(credits) if credits.is_empty() => HttpResponse::NotFound().json(ApiResponse::<()>::error(
            "NO_CREDITS_FOUND",
            "No credits found for this customer",
        )),
        Ok(credits) => HttpResponse::Ok().json(ApiResponse::success(
            to_responses(credits),
            "Credits found",
        )),
        Err(e) => {
            error!("Credits for customer {} failed: {}", customer_id, e);
            error_response(&e, &e.to_string())
        }
    }
}
