//! # Credit Service Backend
//!
//! This is the main entry point for the service that manages customer
//! credit products (personal loans, business credit, credit cards).
//! It provides:
//!
//! - REST API for creating, updating, deleting and querying credits
//! - Customer verification against the customer service
//! - Balance synchronization with the account service for credit cards
//! - Creation-time reports and overdue/active-card checks
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      CREDIT SERVICE                          │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │                 REST API (Actix)                       │  │
//! │  │  /api/credits  /api/credits/{id}  /api/credits/report  │  │
//! │  │  /api/credits/customer/{customerId}[/has-...]          │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! │                           │                                  │
//! │  ┌────────────────────────┴───────────────────────────────┐  │
//! │  │                  CreditService                         │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! │        │                     │                    │          │
//! │  ┌─────┴──────┐   ┌──────────┴────────┐  ┌────────┴───────┐  │
//! │  │ CreditStore│   │ CustomerVerifier  │  │BalanceSynchro- │  │
//! │  │ PG / memory│   │ (customer svc)    │  │nizer (accounts)│  │
//! │  └────────────┘   └───────────────────┘  └────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! 1. Set up PostgreSQL and create the database
//!    (or set `CREDIT_STORE=memory` to skip it)
//! 2. Configure the environment, or a `.env` file
//! 3. Start the server: `cargo run`
//!
//! The schema is applied on startup.
//!
//! ## Environment Variables
//!
//! See [`config::AppConfig`] for the full list.

use std::sync::Arc;

use actix_web::{middleware, web, App, HttpServer};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod db;
mod models;
mod services;
mod utils;

use config::{AppConfig, StoreBackend};
use db::{CreditStore, Database, InMemoryCreditStore};
use services::{CreditService, HttpBalanceSynchronizer, HttpCustomerVerifier};

/// Application state shared across all handlers.
///
/// Shared between actix workers through an `Arc`.
pub struct AppState {
    /// Credit business operations.
    pub credit_service: CreditService,

    /// Store handle, used directly by the health check.
    pub store: Arc<dyn CreditStore>,
}

/// Main entry point for the backend service.
///
/// This function:
/// 1. Loads configuration from environment
/// 2. Opens the configured credit store
/// 3. Builds the collaborator clients and the credit service
/// 4. Launches the HTTP server
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // =========================================
    // STEP 1: Initialize Logging
    // =========================================
    // .env first, so a RUST_LOG set there is honored
    dotenvy::dotenv().ok(); // It's okay if .env doesn't exist

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    info!("🚀 Starting Credit Service Backend");

    // =========================================
    // STEP 2: Load Configuration
    // =========================================
    let config = AppConfig::from_env().expect("Failed to load configuration");

    info!("📋 Configuration loaded");
    info!("   Store: {:?}", config.store_backend);
    info!("   Customer service: {}", config.customer_service_url);
    info!("   Account service: {}", config.account_service_url);
    info!("   External call timeout: {:?}", config.external_call_timeout);

    // =========================================
    // STEP 3: Initialize Credit Store
    // =========================================
    let store: Arc<dyn CreditStore> = match config.store_backend {
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .expect("DATABASE_URL is required for the postgres store");

            let db = Database::connect(url, config.database_pool_size)
                .await
                .expect("Failed to connect to database");

            info!("🗄️  Database connected");

            // Apply the schema, including the one-personal-credit index
            db.run_migrations()
                .await
                .expect("Failed to run migrations");

            info!("📦 Database migrations complete");
            Arc::new(db)
        }
        StoreBackend::Memory => {
            info!("🧠 Using in-memory credit store");
            Arc::new(InMemoryCreditStore::new())
        }
    };

    // =========================================
    // STEP 4: Initialize Services
    // =========================================
    let verifier = HttpCustomerVerifier::new(
        &config.customer_service_url,
        config.external_call_timeout,
    )
    .expect("Failed to create customer service client");

    let synchronizer = HttpBalanceSynchronizer::new(
        &config.account_service_url,
        config.external_call_timeout,
    )
    .expect("Failed to create account service client");

    let credit_service = CreditService::new(
        store.clone(),
        Arc::new(verifier),
        Arc::new(synchronizer),
        config.external_call_timeout,
    );

    info!("🔧 Services initialized");

    // =========================================
    // STEP 5: Create Application State
    // =========================================
    let app_state = Arc::new(AppState {
        credit_service,
        store,
    });

    // =========================================
    // STEP 6: Start HTTP Server
    // =========================================
    let server_host = config.server_host.clone();
    let server_port = config.server_port;

    info!("🌐 Starting HTTP server on {}:{}", server_host, server_port);

    HttpServer::new(move || {
        App::new()
            // Attach shared application state
            .app_data(web::Data::new(app_state.clone()))
            // Add logging middleware
            .wrap(middleware::Logger::default())
            // Configure API routes
            .configure(api::configure_routes)
    })
    .bind(format!("{}:{}", server_host, server_port))?
    .run()
    .await
}
