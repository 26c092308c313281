//! # API Route Configuration
//!
//! This module sets up all the HTTP routes for the API.

use actix_web::{error::InternalError, web, HttpResponse};

use super::handlers;
use crate::models::ApiResponse;

/// Configure all API routes.
///
/// This function is called from main.rs to set up
/// all the endpoint routes.
///
/// ## Route Structure
///
/// ```text
/// /
/// ├── /health                                   GET    - Health check
/// └── /api/credits
///     ├── /                                     POST   - Create credit
///     ├── /                                     GET    - List credits
///     ├── /report?startDate=&endDate=           GET    - Creation-time report
///     ├── /customer/{customerId}/has-active-card   GET - Active card check
///     ├── /customer/{customerId}/has-overdue-debts GET - Overdue check
///     ├── /customer/{customerId}                GET    - Credits of a customer
///     └── /{id}                                 GET/PUT/DELETE
/// ```
///
/// Static segments are registered before `/{id}` so they are not
/// swallowed by it.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Health check endpoint
        .route("/health", web::get().to(handlers::health_check))
        // Credit endpoints
        .service(
            web::scope("/api/credits")
                .app_data(json_config())
                // Collection, with and without trailing slash
                .route("", web::post().to(handlers::create_credit))
                .route("/", web::post().to(handlers::create_credit))
                .route("", web::get().to(handlers::get_all_credits))
                .route("/", web::get().to(handlers::get_all_credits))
                // Reports
                .route("/report", web::get().to(handlers::get_credit_report))
                // Per-customer checks and listing
                .route(
                    "/customer/{customer_id}/has-active-card",
                    web::get().to(handlers::has_active_credit_card),
                )
                .route(
                    "/customer/{customer_id}/has-overdue-debts",
                    web::get().to(handlers::has_overdue_debts),
                )
                .route(
                    "/customer/{customer_id}",
                    web::get().to(handlers::get_credits_by_customer),
                )
                // Single credit
                .route("/{id}", web::get().to(handlers::get_credit_by_id))
                .route("/{id}", web::put().to(handlers::update_credit))
                .route("/{id}", web::delete().to(handlers::delete_credit)),
        );
}

/// Malformed JSON bodies get the standard error envelope.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let body = ApiResponse::<()>::error("INVALID_REQUEST", &err.to_string());
        InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    })
}
