use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// An inclusive start/end range of working days.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting end-before-start input.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, JobValidationError> {
        if end < start {
            return Err(JobValidationError::EndBeforeStart);
        }
        Ok(Self { start, end })
    }
}

/// Scheduling status of a job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum JobStatus {
    AwaitingClientResponse,
    ClientAcceptedDates,
    ClientProposedAlternate,
    Planned,
    InProgress,
    Completed,
}

impl JobStatus {
    /// Convert to string for CSV storage
    pub fn to_string(&self) -> String {
        match self {
            JobStatus::AwaitingClientResponse => "awaiting_client_response".to_string(),
            JobStatus::ClientAcceptedDates => "client_accepted_dates".to_string(),
            JobStatus::ClientProposedAlternate => "client_proposed_alternate".to_string(),
            JobStatus::Planned => "planned".to_string(),
            JobStatus::InProgress => "in_progress".to_string(),
            JobStatus::Completed => "completed".to_string(),
        }
    }

    /// Parse from string for CSV loading
    pub fn from_string(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "awaiting_client_response" => Ok(JobStatus::AwaitingClientResponse),
            "client_accepted_dates" => Ok(JobStatus::ClientAcceptedDates),
            "client_proposed_alternate" => Ok(JobStatus::ClientProposedAlternate),
            "planned" => Ok(JobStatus::Planned),
            "in_progress" => Ok(JobStatus::InProgress),
            "completed" => Ok(JobStatus::Completed),
            _ => Err(format!("Invalid job status: {}", s)),
        }
    }
}

/// Client answer to a proposed date range.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientDateResponse {
    Accept,
    Counter(DateRange),
}

/// A job ("chantier"), created once its parent quote is accepted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DomainJob {
    pub id: String,
    pub quote_id: String,
    pub account_id: String,
    pub proposed_range: Option<DateRange>,
    pub counter_range: Option<DateRange>,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: u64,
}

impl DomainJob {
    pub fn generate_id(now_millis: u64) -> String {
        format!("job::{}", now_millis)
    }

    /// A fresh job for an accepted quote, waiting for the artisan to
    /// propose a first date range.
    pub fn for_quote(id: String, quote_id: String, account_id: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            quote_id,
            account_id,
            proposed_range: None,
            counter_range: None,
            status: JobStatus::AwaitingClientResponse,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }
}

/// Validation failures for job scheduling input.
#[derive(Debug, thiserror::Error)]
pub enum JobValidationError {
    #[error("Range end date cannot be before its start date")]
    EndBeforeStart,
    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_range_rejects_end_before_start() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        assert!(DateRange::new(start, end).is_err());
        assert!(DateRange::new(end, start).is_ok());
        // Single-day jobs are allowed
        assert!(DateRange::new(start, start).is_ok());
    }

    #[test]
    fn test_job_status_round_trip() {
        for status in [
            JobStatus::AwaitingClientResponse,
            JobStatus::ClientAcceptedDates,
            JobStatus::ClientProposedAlternate,
            JobStatus::Planned,
            JobStatus::InProgress,
            JobStatus::Completed,
        ] {
            let parsed = JobStatus::from_string(&status.to_string()).unwrap();
            assert_eq!(parsed, status);
        }
        assert!(JobStatus::from_string("cancelled").is_err());
    }
}
