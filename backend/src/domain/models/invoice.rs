use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::quote::QuoteItem;

/// Payment status of an invoice.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum InvoiceStatus {
    Pending,
    Paid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    /// Convert to string for CSV storage
    pub fn to_string(&self) -> String {
        match self {
            InvoiceStatus::Pending => "pending".to_string(),
            InvoiceStatus::Paid => "paid".to_string(),
            InvoiceStatus::Overdue => "overdue".to_string(),
            InvoiceStatus::Cancelled => "cancelled".to_string(),
        }
    }

    /// Parse from string for CSV loading
    pub fn from_string(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(InvoiceStatus::Pending),
            "paid" => Ok(InvoiceStatus::Paid),
            "overdue" => Ok(InvoiceStatus::Overdue),
            "cancelled" => Ok(InvoiceStatus::Cancelled),
            _ => Err(format!("Invalid invoice status: {}", s)),
        }
    }
}

/// Deposit invoice (sent with the accepted quote) or final invoice
/// (generated at end of job).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum InvoiceKind {
    Deposit,
    Final,
}

impl InvoiceKind {
    pub fn to_string(&self) -> String {
        match self {
            InvoiceKind::Deposit => "deposit".to_string(),
            InvoiceKind::Final => "final".to_string(),
        }
    }

    pub fn from_string(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "deposit" => Ok(InvoiceKind::Deposit),
            "final" => Ok(InvoiceKind::Final),
            _ => Err(format!("Invalid invoice kind: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DomainInvoice {
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
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl DomainInvoice {
    pub fn generate_id(now_millis: u64) -> String {
        format!("invoice::{}", now_millis)
    }
}

/// Business-rule violations that must be enforced server-side, not only
/// by disabled controls in a UI.
#[derive(Debug, thiserror::Error)]
pub enum PolicyViolation {
    #[error("Policy violation: final invoice requires the deposit for quote {0} to be paid")]
    DepositNotPaid(String),
    #[error("Policy violation: invoice status cannot change once paid")]
    AlreadyPaid,
}
