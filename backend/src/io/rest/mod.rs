//! # REST API Interface Layer
//!
//! HTTP endpoints for the artisan backend. This layer handles:
//! - JSON request/response serialization
//! - Translation from domain errors to HTTP status codes
//! - Request logging
//!
//! All business rules live in the domain layer; handlers build a
//! command, call a service, and map the outcome.

// Module declarations
pub mod account_apis;
pub mod client_apis;
pub mod dashboard_apis;
pub mod inventory_apis;
pub mod invoice_apis;
pub mod job_apis;
pub mod quote_apis;
pub mod scheduler_apis;

pub mod mappers;

use axum::http::StatusCode;

/// Map a domain error to an HTTP status code.
///
/// Services return anyhow errors whose leaf is a typed domain error;
/// the mapping keys off the rendered message so every service shares
/// one translation.
pub fn error_status(e: &anyhow::Error) -> StatusCode {
    let message = e.to_string();

    if message.contains("not found") {
        return StatusCode::NOT_FOUND;
    }
    if message.contains("Version conflict") {
        return StatusCode::CONFLICT;
    }

    let bad_request_markers = [
        "Invalid transition",
        "Invalid job transition",
        "Policy violation",
        "cannot be empty",
        "cannot be negative",
        "must be positive",
        "must be between 0 and 100",
        "no longer be edited",
        "at least one item",
        "is too long",
        "no proposed date range",
        "no counter-proposal",
        "before its start date",
        "Invalid date",
    ];
    if bad_request_markers
        .iter()
        .any(|marker| message.contains(marker))
    {
        return StatusCode::BAD_REQUEST;
    }

    StatusCode::INTERNAL_SERVER_ERROR
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(
            error_status(&anyhow!("Quote quote::1 not found")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_status(&anyhow!("Version conflict: expected version 2, found 3")),
            StatusCode::CONFLICT
        );
        assert_eq!(
            error_status(&anyhow!(
                "Invalid transition: event 'client_accepted' is not allowed in status 'draft'"
            )),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_status(&anyhow!("Policy violation: invoice status cannot change once paid")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_status(&anyhow!("disk on fire")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
