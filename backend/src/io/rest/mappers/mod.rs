//! DTO/domain conversions for the REST layer.

pub mod account_mapper;
pub mod client_mapper;
pub mod inventory_mapper;
pub mod invoice_mapper;
pub mod job_mapper;
pub mod quote_mapper;

pub use account_mapper::AccountMapper;
pub use client_mapper::ClientMapper;
pub use inventory_mapper::InventoryMapper;
pub use invoice_mapper::InvoiceMapper;
pub use job_mapper::JobMapper;
pub use quote_mapper::QuoteMapper;
