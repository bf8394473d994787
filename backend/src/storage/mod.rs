//! Storage layer: abstraction traits and the CSV implementations.

pub mod csv;
pub mod traits;

pub use traits::{
    AccountStorage, ClientStorage, InventoryStorage, InvoiceStorage, JobStorage, QuoteStorage,
};
