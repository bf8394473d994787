//! # Storage Traits
//!
//! Storage abstraction traits that let the domain layer work against
//! different backends without modification. All operations are
//! synchronous; the REST layer calls them from its handlers.

use anyhow::Result;

use crate::domain::models::account::{AccountConfig, DomainAccount};
use crate::domain::models::client::DomainClient;
use crate::domain::models::inventory::DomainInventoryItem;
use crate::domain::models::invoice::DomainInvoice;
use crate::domain::models::job::DomainJob;
use crate::domain::models::quote::DomainQuote;

/// Interface for quote storage operations.
///
/// `update_quote` enforces optimistic locking: the stored row must
/// carry `expected_version` or the call fails with a version conflict,
/// and the persisted quote has its version bumped by one.
pub trait QuoteStorage: Send + Sync {
    /// Store a new quote
    fn store_quote(&self, quote: &DomainQuote) -> Result<()>;

    /// Retrieve a specific quote by ID
    fn get_quote(&self, account_id: &str, quote_id: &str) -> Result<Option<DomainQuote>>;

    /// List all quotes for an account, most recently created first
    fn list_quotes(&self, account_id: &str) -> Result<Vec<DomainQuote>>;

    /// Replace a quote, checking the caller's expected version
    fn update_quote(&self, quote: &DomainQuote, expected_version: u64) -> Result<DomainQuote>;
}

/// Interface for job storage operations. Versioned like quotes.
pub trait JobStorage: Send + Sync {
    /// Store a new job
    fn store_job(&self, job: &DomainJob) -> Result<()>;

    /// Retrieve a specific job by ID
    fn get_job(&self, account_id: &str, job_id: &str) -> Result<Option<DomainJob>>;

    /// Find the job created for a given quote
    fn get_job_for_quote(&self, account_id: &str, quote_id: &str) -> Result<Option<DomainJob>>;

    /// List all jobs for an account, most recently created first
    fn list_jobs(&self, account_id: &str) -> Result<Vec<DomainJob>>;

    /// Replace a job, checking the caller's expected version
    fn update_job(&self, job: &DomainJob, expected_version: u64) -> Result<DomainJob>;
}

/// Interface for invoice storage operations.
pub trait InvoiceStorage: Send + Sync {
    /// Store a new invoice
    fn store_invoice(&self, invoice: &DomainInvoice) -> Result<()>;

    /// Retrieve a specific invoice by ID
    fn get_invoice(&self, account_id: &str, invoice_id: &str) -> Result<Option<DomainInvoice>>;

    /// List all invoices for an account, most recently issued first
    fn list_invoices(&self, account_id: &str) -> Result<Vec<DomainInvoice>>;

    /// List invoices issued against a specific quote
    fn list_invoices_for_quote(&self, account_id: &str, quote_id: &str)
        -> Result<Vec<DomainInvoice>>;

    /// Replace an invoice
    fn update_invoice(&self, invoice: &DomainInvoice) -> Result<()>;
}

/// Interface for client record storage operations.
pub trait ClientStorage: Send + Sync {
    /// Store a new client
    fn store_client(&self, client: &DomainClient) -> Result<()>;

    /// Retrieve a specific client by ID
    fn get_client(&self, account_id: &str, client_id: &str) -> Result<Option<DomainClient>>;

    /// List all clients for an account ordered by name
    fn list_clients(&self, account_id: &str) -> Result<Vec<DomainClient>>;

    /// Replace a client record
    fn update_client(&self, client: &DomainClient) -> Result<()>;

    /// Delete a client record. Returns true if it existed.
    fn delete_client(&self, account_id: &str, client_id: &str) -> Result<bool>;
}

/// Interface for inventory storage operations.
pub trait InventoryStorage: Send + Sync {
    /// Store a new inventory item
    fn store_item(&self, item: &DomainInventoryItem) -> Result<()>;

    /// Retrieve a specific item by ID
    fn get_item(&self, account_id: &str, item_id: &str) -> Result<Option<DomainInventoryItem>>;

    /// List all items for an account ordered by name
    fn list_items(&self, account_id: &str) -> Result<Vec<DomainInventoryItem>>;

    /// Replace an inventory item
    fn update_item(&self, item: &DomainInventoryItem) -> Result<()>;

    /// Delete an inventory item. Returns true if it existed.
    fn delete_item(&self, account_id: &str, item_id: &str) -> Result<bool>;
}

/// Interface for artisan account and per-account configuration storage.
pub trait AccountStorage: Send + Sync {
    /// Register a new account and create its data directory
    fn store_account(&self, account: &DomainAccount) -> Result<()>;

    /// Retrieve a specific account by ID
    fn get_account(&self, account_id: &str) -> Result<Option<DomainAccount>>;

    /// List all accounts ordered by company name
    fn list_accounts(&self) -> Result<Vec<DomainAccount>>;

    /// Read the account's configuration, falling back to defaults when
    /// none has been saved yet
    fn get_config(&self, account_id: &str) -> Result<AccountConfig>;

    /// Persist the account's configuration
    fn save_config(&self, account_id: &str, config: &AccountConfig) -> Result<()>;
}
