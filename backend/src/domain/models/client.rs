use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A client of the artisan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DomainClient {
    pub id: String,
    pub account_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DomainClient {
    pub fn generate_id(now_millis: u64) -> String {
        format!("client::{}", now_millis)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientValidationError {
    #[error("Client name cannot be empty")]
    EmptyName,
    #[error("Client email cannot be empty")]
    EmptyEmail,
}
