//! Domain-level command and result types.
//! These structs are used by services inside the domain layer and are **not**
//! exposed over the public API. The REST layer maps the public DTOs defined
//! in the `shared` crate to these internal types.

pub mod quotes {
    use crate::domain::lifecycle::QuoteEvent;
    use crate::domain::models::quote::{DomainQuote, QuoteItem};

    /// Input for creating a new draft quote.
    #[derive(Debug, Clone)]
    pub struct CreateQuoteCommand {
        pub account_id: String,
        pub client_ref: String,
        pub description: String,
        pub items: Vec<QuoteItem>,
    }

    /// Input for replacing the line items of a draft quote.
    #[derive(Debug, Clone)]
    pub struct UpdateQuoteItemsCommand {
        pub account_id: String,
        pub quote_id: String,
        pub items: Vec<QuoteItem>,
        pub expected_version: u64,
    }

    /// Input for applying a lifecycle event to a quote.
    #[derive(Debug, Clone)]
    pub struct QuoteEventCommand {
        pub account_id: String,
        pub quote_id: String,
        pub event: QuoteEvent,
        pub expected_version: u64,
    }

    /// Result of applying a lifecycle event.
    #[derive(Debug, Clone)]
    pub struct QuoteEventResult {
        pub quote: DomainQuote,
        /// Id of the job created by this event, when one was.
        pub created_job_id: Option<String>,
    }

    /// Query for listing an account's quotes.
    #[derive(Debug, Clone, Default)]
    pub struct QuoteListQuery {
        pub status: Option<String>,
    }
}

pub mod jobs {
    use crate::domain::models::job::{ClientDateResponse, DateRange};

    /// Artisan proposes a date range for a job.
    #[derive(Debug, Clone)]
    pub struct ProposeDatesCommand {
        pub account_id: String,
        pub job_id: String,
        pub range: DateRange,
        pub expected_version: u64,
    }

    /// Record the client's answer to the proposed dates.
    #[derive(Debug, Clone)]
    pub struct ClientDateResponseCommand {
        pub account_id: String,
        pub job_id: String,
        pub response: ClientDateResponse,
        pub expected_version: u64,
    }

    /// Artisan confirms the dates, planning the job.
    #[derive(Debug, Clone)]
    pub struct ConfirmDatesCommand {
        pub account_id: String,
        pub job_id: String,
        pub expected_version: u64,
    }

    /// Artisan marks a job finished.
    #[derive(Debug, Clone)]
    pub struct CompleteJobCommand {
        pub account_id: String,
        pub job_id: String,
        pub expected_version: u64,
    }

    /// Sweep planned jobs whose start date has arrived.
    #[derive(Debug, Clone)]
    pub struct AdvanceJobsCommand {
        pub account_id: String,
        pub today: chrono::NaiveDate,
    }

    /// Result of an advance sweep.
    #[derive(Debug, Clone)]
    pub struct AdvanceJobsResult {
        pub started_job_ids: Vec<String>,
    }
}

pub mod invoices {
    use crate::domain::models::invoice::{InvoiceKind, InvoiceStatus};
    use crate::domain::models::quote::QuoteItem;

    /// Input for issuing an invoice, standalone or against a quote.
    #[derive(Debug, Clone)]
    pub struct CreateInvoiceCommand {
        pub account_id: String,
        pub quote_id: Option<String>,
        pub kind: InvoiceKind,
        pub client_ref: String,
        pub description: String,
        pub items: Vec<QuoteItem>,
    }

    /// Input for a manual invoice status change.
    #[derive(Debug, Clone)]
    pub struct UpdateInvoiceStatusCommand {
        pub account_id: String,
        pub invoice_id: String,
        pub status: InvoiceStatus,
    }

    /// Optional filter for invoice listings.
    #[derive(Debug, Clone, Default)]
    pub struct InvoiceListQuery {
        pub quote_id: Option<String>,
    }
}

pub mod clients {
    /// Input for creating a client record.
    #[derive(Debug, Clone)]
    pub struct CreateClientCommand {
        pub account_id: String,
        pub name: String,
        pub email: String,
        pub phone: String,
        pub address: String,
    }

    /// Input for updating a client record. `None` fields are left as-is.
    #[derive(Debug, Clone)]
    pub struct UpdateClientCommand {
        pub account_id: String,
        pub client_id: String,
        pub name: Option<String>,
        pub email: Option<String>,
        pub phone: Option<String>,
        pub address: Option<String>,
    }
}

pub mod inventory {
    /// Input for adding an inventory item.
    #[derive(Debug, Clone)]
    pub struct CreateInventoryItemCommand {
        pub account_id: String,
        pub name: String,
        pub reference: String,
        pub quantity: i64,
        pub unit_price: f64,
        pub min_stock: Option<i64>,
        pub category: Option<String>,
    }

    /// Input for restocking or consuming an item.
    #[derive(Debug, Clone)]
    pub struct UpdateInventoryQuantityCommand {
        pub account_id: String,
        pub item_id: String,
        pub quantity: i64,
    }
}

pub mod accounts {
    use crate::domain::models::account::AccountConfig;

    /// Input for registering an artisan account.
    #[derive(Debug, Clone)]
    pub struct CreateAccountCommand {
        pub company_name: String,
    }

    /// Input for replacing an account's configuration.
    #[derive(Debug, Clone)]
    pub struct UpdateAccountConfigCommand {
        pub account_id: String,
        pub config: AccountConfig,
    }

    /// Result of a config update.
    #[derive(Debug, Clone)]
    pub struct UpdateAccountConfigResult {
        pub config: AccountConfig,
        /// Draft quotes whose amounts were recomputed under the new
        /// percentages.
        pub recomputed_quote_ids: Vec<String>,
    }
}

pub mod dashboard {
    /// Aggregates over one account's quote, invoice and inventory books.
    #[derive(Debug, Clone, PartialEq)]
    pub struct DashboardStats {
        pub total_revenue: f64,
        pub pending_invoices: usize,
        pub pending_quotes: usize,
        pub low_stock_items: usize,
        pub total_quotes: usize,
        pub total_invoices: usize,
        pub total_inventory_items: usize,
    }
}

pub mod scheduler {
    use chrono::{DateTime, Utc};

    /// Input for one scheduler pass over an account.
    #[derive(Debug, Clone)]
    pub struct RunSchedulerCommand {
        pub account_id: String,
        pub now: DateTime<Utc>,
    }

    /// One action the scheduler applied, for reporting.
    #[derive(Debug, Clone)]
    pub struct AppliedAction {
        pub entity_id: String,
        pub action: String,
    }

    /// Result of a scheduler pass.
    #[derive(Debug, Clone)]
    pub struct RunSchedulerResult {
        pub actions: Vec<AppliedAction>,
    }
}
