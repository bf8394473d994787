use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An artisan account: the tenant every other entity is scoped under.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DomainAccount {
    pub id: String,
    pub company_name: String,
    pub created_at: DateTime<Utc>,
}

impl DomainAccount {
    pub fn generate_id(now_millis: u64) -> String {
        format!("account::{}", now_millis)
    }
}

/// Per-account business configuration, held server-side.
///
/// The deposit percentage drives the derived `deposit_amount` on every
/// open quote; updating it triggers a recomputation pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountConfig {
    pub company_name: String,
    pub hourly_rate: f64,
    pub margin_percentage: f64,
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

#[derive(Debug, thiserror::Error)]
pub enum AccountValidationError {
    #[error("Company name cannot be empty")]
    EmptyCompanyName,
    #[error("Deposit percentage must be between 0 and 100")]
    InvalidDepositPercentage,
    #[error("VAT rate must be between 0 and 100")]
    InvalidVatRate,
    #[error("Hourly rate cannot be negative")]
    NegativeHourlyRate,
}
