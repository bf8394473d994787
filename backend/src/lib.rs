//! # Artisan Backend
//!
//! Business backend for independent tradespeople: quotes with a full
//! lifecycle, jobs scheduled against client-negotiated dates, deposit
//! and final invoices, clients, inventory and per-account pricing
//! configuration.
//!
//! ## Architecture
//!
//! The backend follows a layered architecture:
//! ```text
//! IO Layer (REST API, handlers, mappers)
//!     |
//! Domain Layer (pure lifecycle engines, services)
//!     |
//! Storage Layer (CSV files, one directory per account)
//! ```
//!
//! State changes flow through the pure engines in
//! [`domain::lifecycle`], [`domain::reminder`] and
//! [`domain::scheduling`]; services persist the results and dispatch
//! side effects such as emails and job creation.

pub mod domain;
pub mod io;
pub mod storage;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    http::{HeaderValue, Method},
    Router,
};
use log::info;
use tower_http::cors::{Any, CorsLayer};

use crate::domain::{
    AccountService, ClientService, DashboardService, EmailConfig, EmailService, InventoryService,
    InvoiceService, JobService, QuoteService, SchedulerService,
};
use crate::storage::csv::CsvConnection;

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub quote_service: QuoteService,
    pub job_service: JobService,
    pub invoice_service: InvoiceService,
    pub client_service: ClientService,
    pub inventory_service: InventoryService,
    pub account_service: AccountService,
    pub dashboard_service: DashboardService,
    pub scheduler_service: SchedulerService,
}

/// Initialize the backend with all required services.
///
/// `data_directory` is created if missing; each account gets its own
/// subdirectory under it.
pub fn initialize_backend<P: AsRef<Path>>(data_directory: P) -> Result<AppState> {
    info!("Setting up storage");
    let csv_conn = Arc::new(CsvConnection::new(data_directory)?);

    info!("Setting up email transport");
    let mut email_service = EmailService::new(EmailConfig::default());
    email_service.initialize()?;
    let email_service = Arc::new(email_service);

    info!("Setting up domain services");
    let quote_service = QuoteService::new(csv_conn.clone(), email_service);
    let job_service = JobService::new(csv_conn.clone());
    let invoice_service = InvoiceService::new(csv_conn.clone());
    let client_service = ClientService::new(csv_conn.clone());
    let inventory_service = InventoryService::new(csv_conn.clone());
    let account_service = AccountService::new(csv_conn.clone(), quote_service.clone());
    let dashboard_service = DashboardService::new(csv_conn.clone());
    let scheduler_service = SchedulerService::new(csv_conn, quote_service.clone());

    Ok(AppState {
        quote_service,
        job_service,
        invoice_service,
        client_service,
        inventory_service,
        account_service,
        dashboard_service,
        scheduler_service,
    })
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router {
    // CORS setup to allow a local frontend to make requests
    let cors = CorsLayer::new()
        .allow_origin("http://localhost:8080".parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let account_scoped = Router::new()
        .nest("/quotes", io::rest::quote_apis::router())
        .nest("/jobs", io::rest::job_apis::router())
        .nest("/invoices", io::rest::invoice_apis::router())
        .nest("/clients", io::rest::client_apis::router())
        .nest("/inventory", io::rest::inventory_apis::router())
        .nest("/dashboard", io::rest::dashboard_apis::router())
        .nest("/scheduler", io::rest::scheduler_apis::router());

    let api_routes = Router::new()
        .nest("/accounts/:account_id", account_scoped)
        .nest("/accounts", io::rest::account_apis::router());

    Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(app_state)
}
