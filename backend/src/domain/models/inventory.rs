use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stock item tracked by the artisan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DomainInventoryItem {
    pub id: String,
    pub account_id: String,
    pub name: String,
    pub reference: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub min_stock: i64,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

impl DomainInventoryItem {
    pub fn generate_id(now_millis: u64) -> String {
        format!("item::{}", now_millis)
    }

    /// True when the stock level has reached the reorder threshold.
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_stock
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InventoryValidationError {
    #[error("Item name cannot be empty")]
    EmptyName,
    #[error("Item reference cannot be empty")]
    EmptyReference,
    #[error("Quantity cannot be negative")]
    NegativeQuantity,
    #[error("Unit price cannot be negative")]
    NegativeUnitPrice,
}
