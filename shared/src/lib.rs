use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a quote ("devis").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Draft,
    Sent,
    Stale,
    Accepted,
    RefusedManual,
    RefusedAuto,
    Archived,
}

/// Scheduling status of a job ("chantier").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    AwaitingClientResponse,
    ClientAcceptedDates,
    ClientProposedAlternate,
    Planned,
    InProgress,
    Completed,
}

/// Payment status of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Pending,
    Paid,
    Overdue,
    Cancelled,
}

/// Kind of invoice: the automatic deposit invoice or the final one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceKind {
    Deposit,
    Final,
}

/// A single line on a quote or invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteItem {
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
}

/// A proposed start/end range for a job, ISO 8601 dates (YYYY-MM-DD).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

/// Quote ID in format: "quote::epoch_millis"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: String,
    /// ID of the account (artisan) this quote belongs to
    pub account_id: String,
    /// ID of the client the quote was issued to
    pub client_ref: String,
    pub description: String,
    pub items: Vec<QuoteItem>,
    /// Total excluding VAT
    pub total_ht: f64,
    /// Total including VAT
    pub total_ttc: f64,
    /// Deposit percentage applied when the deposit was last computed
    pub deposit_percentage: f64,
    /// Always equals round2(total_ttc * deposit_percentage / 100)
    pub deposit_amount: f64,
    pub deposit_paid: bool,
    pub status: QuoteStatus,
    /// RFC 3339 timestamps; None until the corresponding event happened
    pub sent_at: Option<String>,
    pub last_reminder_at: Option<String>,
    pub responded_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    /// Optimistic-locking counter, incremented on every persisted mutation
    pub version: u64,
}

/// Job ID in format: "job::epoch_millis"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    /// The accepted quote this job was created from
    pub quote_id: String,
    pub account_id: String,
    pub proposed_range: Option<DateRange>,
    /// Alternate range proposed by the client, pending artisan confirmation
    pub counter_range: Option<DateRange>,
    pub status: JobStatus,
    pub created_at: String,
    pub updated_at: String,
    pub version: u64,
}

/// Invoice ID in format: "invoice::epoch_millis"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub account_id: String,
    pub quote_id: Option<String>,
    pub kind: InvoiceKind,
    pub client_ref: String,
    pub description: String,
    pub items: Vec<QuoteItem>,
    pub total_ht: f64,
    pub total_ttc: f64,
    pub status: InvoiceStatus,
    pub created_at: String,
    pub paid_at: Option<String>,
}

/// A client of the artisan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub account_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A stock item tracked by the artisan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: String,
    pub account_id: String,
    pub name: String,
    pub reference: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub min_stock: i64,
    pub category: String,
    pub created_at: String,
}

/// An artisan account (tenant).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub company_name: String,
    pub created_at: String,
}

/// Per-account business configuration, held server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountConfig {
    pub company_name: String,
    pub hourly_rate: f64,
    pub margin_percentage: f64,
    /// Percentage of the TTC total requested as a deposit
    pub deposit_percentage: f64,
    pub vat_rate: f64,
    pub iban: String,
    pub bic: String,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            company_name: String::new(),
            hourly_rate: 0.0,
            margin_percentage: 0.0,
            deposit_percentage: 30.0,
            vat_rate: 20.0,
            iban: String::new(),
            bic: String::new(),
        }
    }
}

/// Lifecycle event applied to a quote over the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuoteEventDto {
    ArtisanSent,
    ClientAccepted,
    ClientProposedAlternate { range: DateRange },
    ArtisanConfirmedDates,
    ArtisanMarkedRefused,
    ArtisanSentReminder,
    PaymentReceived,
}

/// Client answer to a proposed date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientDateResponseDto {
    Accept,
    Counter { range: DateRange },
}

// ---------------------------------------------------------------------------
// Requests / responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAccountRequest {
    pub company_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountResponse {
    pub account: Account,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountListResponse {
    pub accounts: Vec<Account>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateQuoteRequest {
    pub client_ref: String,
    pub description: String,
    pub items: Vec<QuoteItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateQuoteItemsRequest {
    pub items: Vec<QuoteItem>,
    /// Version the caller read; mismatches are rejected
    pub version: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteEventRequest {
    pub event: QuoteEventDto,
    pub version: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub quote: Quote,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteListResponse {
    pub quotes: Vec<Quote>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposeDatesRequest {
    pub range: DateRange,
    pub version: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientDateResponseRequest {
    pub response: ClientDateResponseDto,
    pub version: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmDatesRequest {
    pub version: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteJobRequest {
    pub version: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvanceJobsRequest {
    /// ISO 8601 date used as "today"; defaults to the current date
    pub today: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvanceJobsResponse {
    pub started_job_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResponse {
    pub job: Job,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobListResponse {
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateInvoiceRequest {
    pub quote_id: Option<String>,
    pub kind: InvoiceKind,
    pub client_ref: String,
    pub description: String,
    pub items: Vec<QuoteItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateInvoiceStatusRequest {
    pub status: InvoiceStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceResponse {
    pub invoice: Invoice,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceListResponse {
    pub invoices: Vec<Invoice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateClientRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateClientRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientResponse {
    pub client: Client,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientListResponse {
    pub clients: Vec<Client>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateInventoryItemRequest {
    pub name: String,
    pub reference: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub min_stock: Option<i64>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateInventoryQuantityRequest {
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItemResponse {
    pub item: InventoryItem,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryListResponse {
    pub items: Vec<InventoryItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateAccountConfigRequest {
    pub company_name: Option<String>,
    pub hourly_rate: Option<f64>,
    pub margin_percentage: Option<f64>,
    pub deposit_percentage: Option<f64>,
    pub vat_rate: Option<f64>,
    pub iban: Option<String>,
    pub bic: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountConfigResponse {
    pub config: AccountConfig,
    pub success_message: String,
}

/// Aggregate counters shown on the dashboard home screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStatsResponse {
    /// Sum of `total_ttc` over paid invoices
    pub total_revenue: f64,
    /// Invoices still awaiting payment (pending or overdue)
    pub pending_invoices: usize,
    /// Quotes still in draft
    pub pending_quotes: usize,
    /// Items at or below their minimum stock level
    pub low_stock_items: usize,
    pub total_quotes: usize,
    pub total_invoices: usize,
    pub total_inventory_items: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSchedulerRequest {
    /// RFC 3339 instant used as "now"; defaults to the current time
    pub now: Option<String>,
}

/// Result of one scheduler pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerRunResponse {
    pub actions_applied: usize,
    pub details: Vec<String>,
}

// ---------------------------------------------------------------------------
// Entity IDs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum EntityIdError {
    InvalidFormat,
    InvalidTimestamp,
}

impl fmt::Display for EntityIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityIdError::InvalidFormat => write!(f, "Invalid entity ID format"),
            EntityIdError::InvalidTimestamp => write!(f, "Invalid timestamp in entity ID"),
        }
    }
}

impl std::error::Error for EntityIdError {}

fn generate_entity_id(prefix: &str, epoch_millis: u64) -> String {
    format!("{}::{}", prefix, epoch_millis)
}

fn parse_entity_id(prefix: &str, id: &str) -> Result<u64, EntityIdError> {
    let parts: Vec<&str> = id.split("::").collect();
    if parts.len() != 2 || parts[0] != prefix {
        return Err(EntityIdError::InvalidFormat);
    }
    parts[1]
        .parse::<u64>()
        .map_err(|_| EntityIdError::InvalidTimestamp)
}

impl Quote {
    /// Generate a quote ID based on timestamp
    pub fn generate_id(epoch_millis: u64) -> String {
        generate_entity_id("quote", epoch_millis)
    }

    /// Parse a quote ID to extract the timestamp
    pub fn parse_id(id: &str) -> Result<u64, EntityIdError> {
        parse_entity_id("quote", id)
    }
}

impl Job {
    /// Generate a job ID based on timestamp
    pub fn generate_id(epoch_millis: u64) -> String {
        generate_entity_id("job", epoch_millis)
    }

    /// Parse a job ID to extract the timestamp
    pub fn parse_id(id: &str) -> Result<u64, EntityIdError> {
        parse_entity_id("job", id)
    }
}

impl Invoice {
    /// Generate an invoice ID based on timestamp
    pub fn generate_id(epoch_millis: u64) -> String {
        generate_entity_id("invoice", epoch_millis)
    }

    /// Parse an invoice ID to extract the timestamp
    pub fn parse_id(id: &str) -> Result<u64, EntityIdError> {
        parse_entity_id("invoice", id)
    }
}

impl Client {
    /// Generate a client ID based on timestamp
    pub fn generate_id(epoch_millis: u64) -> String {
        generate_entity_id("client", epoch_millis)
    }
}

impl InventoryItem {
    /// Generate an inventory item ID based on timestamp
    pub fn generate_id(epoch_millis: u64) -> String {
        generate_entity_id("item", epoch_millis)
    }
}

impl Account {
    /// Generate an account ID based on timestamp
    pub fn generate_id(epoch_millis: u64) -> String {
        generate_entity_id("account", epoch_millis)
    }

    /// Parse an account ID to extract the timestamp
    pub fn parse_id(id: &str) -> Result<u64, EntityIdError> {
        parse_entity_id("account", id)
    }
}
