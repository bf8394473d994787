//! Domain layer: pure engines, models and stateful services.

pub mod account_service;
pub mod client_service;
pub mod commands;
pub mod dashboard_service;
pub mod email_service;
pub mod inventory_service;
pub mod invoice_service;
pub mod job_service;
pub mod lifecycle;
pub mod models;
pub mod quote_service;
pub mod reminder;
pub mod scheduler_service;
pub mod scheduling;

pub use account_service::AccountService;
pub use client_service::ClientService;
pub use dashboard_service::DashboardService;
pub use email_service::{EmailConfig, EmailService};
pub use inventory_service::InventoryService;
pub use invoice_service::InvoiceService;
pub use job_service::JobService;
pub use quote_service::QuoteService;
pub use scheduler_service::SchedulerService;
