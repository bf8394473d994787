use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Round a monetary amount to two decimal places.
pub fn round2(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Lifecycle status of a quote.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum QuoteStatus {
    Draft,
    Sent,
    Stale,
    Accepted,
    RefusedManual,
    RefusedAuto,
    Archived,
}

impl QuoteStatus {
    /// Convert to string for CSV storage
    pub fn to_string(&self) -> String {
        match self {
            QuoteStatus::Draft => "draft".to_string(),
            QuoteStatus::Sent => "sent".to_string(),
            QuoteStatus::Stale => "stale".to_string(),
            QuoteStatus::Accepted => "accepted".to_string(),
            QuoteStatus::RefusedManual => "refused_manual".to_string(),
            QuoteStatus::RefusedAuto => "refused_auto".to_string(),
            QuoteStatus::Archived => "archived".to_string(),
        }
    }

    /// Parse from string for CSV loading
    pub fn from_string(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(QuoteStatus::Draft),
            "sent" => Ok(QuoteStatus::Sent),
            "stale" => Ok(QuoteStatus::Stale),
            "accepted" => Ok(QuoteStatus::Accepted),
            "refused_manual" => Ok(QuoteStatus::RefusedManual),
            "refused_auto" => Ok(QuoteStatus::RefusedAuto),
            "archived" => Ok(QuoteStatus::Archived),
            _ => Err(format!("Invalid quote status: {}", s)),
        }
    }

    /// True while the quote is out with the client: totals have been
    /// communicated but no answer recorded yet.
    pub fn is_pre_terminal(&self) -> bool {
        matches!(self, QuoteStatus::Sent | QuoteStatus::Stale)
    }

    /// True once the quote was turned down, manually or by timeout.
    pub fn is_refused(&self) -> bool {
        matches!(self, QuoteStatus::RefusedManual | QuoteStatus::RefusedAuto)
    }
}

/// A single line item on a quote.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuoteItem {
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
}

impl QuoteItem {
    pub fn line_total(&self) -> f64 {
        self.quantity * self.unit_price
    }
}

/// The quote root entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DomainQuote {
    pub id: String,
    pub account_id: String,
    pub client_ref: String,
    pub description: String,
    pub items: Vec<QuoteItem>,
    pub total_ht: f64,
    pub total_ttc: f64,
    pub deposit_percentage: f64,
    pub deposit_amount: f64,
    pub deposit_paid: bool,
    pub status: QuoteStatus,
    pub sent_at: Option<DateTime<Utc>>,
    pub last_reminder_at: Option<DateTime<Utc>>,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: u64,
}

impl DomainQuote {
    pub fn generate_id(now_millis: u64) -> String {
        format!("quote::{}", now_millis)
    }

    /// Recompute totals and the derived deposit from the item lines.
    ///
    /// `deposit_amount` is never stored independently of this formula:
    /// every mutation of the items or of the account's percentage goes
    /// through here.
    pub fn recompute_amounts(&mut self, vat_rate: f64, deposit_percentage: f64) {
        let total_ht: f64 = self.items.iter().map(|i| i.line_total()).sum();
        self.total_ht = round2(total_ht);
        self.total_ttc = round2(total_ht * (1.0 + vat_rate / 100.0));
        self.deposit_percentage = deposit_percentage;
        self.deposit_amount = round2(self.total_ttc * deposit_percentage / 100.0);
    }
}

/// Validation failures for quote input, reported before any state change.
#[derive(Debug, thiserror::Error)]
pub enum QuoteValidationError {
    #[error("Client reference cannot be empty")]
    EmptyClientRef,
    #[error("Description is too long")]
    DescriptionTooLong,
    #[error("A quote needs at least one item")]
    NoItems,
    #[error("Item quantity must be positive")]
    NonPositiveQuantity,
    #[error("Item unit price cannot be negative")]
    NegativeUnitPrice,
    #[error("Quote items can no longer be edited in status {0}")]
    ItemsLocked(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote_with_items(items: Vec<QuoteItem>) -> DomainQuote {
        DomainQuote {
            id: DomainQuote::generate_id(1702516122000),
            account_id: "account::1".to_string(),
            client_ref: "client::1".to_string(),
            description: "Salle de bain".to_string(),
            items,
            total_ht: 0.0,
            total_ttc: 0.0,
            deposit_percentage: 0.0,
            deposit_amount: 0.0,
            deposit_paid: false,
            status: QuoteStatus::Draft,
            sent_at: None,
            last_reminder_at: None,
            responded_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            version: 0,
        }
    }

    #[test]
    fn test_recompute_amounts_deposit_invariant() {
        let mut quote = quote_with_items(vec![
            QuoteItem {
                description: "Labour".to_string(),
                quantity: 10.0,
                unit_price: 45.0,
            },
            QuoteItem {
                description: "Tiles".to_string(),
                quantity: 20.0,
                unit_price: 12.5,
            },
        ]);

        quote.recompute_amounts(20.0, 30.0);

        assert_eq!(quote.total_ht, 700.0);
        assert_eq!(quote.total_ttc, 840.0);
        assert_eq!(quote.deposit_amount, 252.0);
        assert_eq!(
            quote.deposit_amount,
            round2(quote.total_ttc * quote.deposit_percentage / 100.0)
        );
    }

    #[test]
    fn test_recompute_amounts_rounds_to_cents() {
        let mut quote = quote_with_items(vec![QuoteItem {
            description: "Odd pricing".to_string(),
            quantity: 3.0,
            unit_price: 33.33,
        }]);

        quote.recompute_amounts(20.0, 30.0);

        assert_eq!(quote.total_ht, 99.99);
        assert_eq!(quote.total_ttc, 119.99);
        assert_eq!(quote.deposit_amount, 36.0);
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            QuoteStatus::Draft,
            QuoteStatus::Sent,
            QuoteStatus::Stale,
            QuoteStatus::Accepted,
            QuoteStatus::RefusedManual,
            QuoteStatus::RefusedAuto,
            QuoteStatus::Archived,
        ] {
            let parsed = QuoteStatus::from_string(&status.to_string()).unwrap();
            assert_eq!(parsed, status);
        }
        assert!(QuoteStatus::from_string("refused").is_err());
    }
}
