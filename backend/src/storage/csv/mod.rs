//! CSV-backed storage implementations.

pub mod account_repository;
pub mod client_repository;
pub mod connection;
pub mod inventory_repository;
pub mod invoice_repository;
pub mod job_repository;
pub mod quote_repository;

pub use account_repository::AccountRepository;
pub use client_repository::ClientRepository;
pub use connection::CsvConnection;
pub use inventory_repository::InventoryRepository;
pub use invoice_repository::InvoiceRepository;
pub use job_repository::JobRepository;
pub use quote_repository::QuoteRepository;
