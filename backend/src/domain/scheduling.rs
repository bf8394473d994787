//! Pure job scheduling sub-lifecycle.
//!
//! Quote acceptance creates a job in `AwaitingClientResponse`. The
//! artisan proposes a date range, the client accepts or counters, and
//! only an explicit artisan confirmation moves the job to `Planned`.
//! Like the quote engine these functions never touch storage; the
//! service layer persists the returned job.

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::models::job::{ClientDateResponse, DateRange, DomainJob, JobStatus};

/// Typed failure of a scheduling operation.
#[derive(Debug, thiserror::Error)]
pub enum SchedulingError {
    #[error("Invalid job transition: '{action}' is not allowed in status '{status}'")]
    InvalidJobTransition { status: String, action: String },
    #[error("Job has no proposed date range to respond to")]
    NoProposedRange,
    #[error("Job has no counter-proposal to adopt")]
    NoCounterRange,
}

fn invalid(job: &DomainJob, action: &str) -> SchedulingError {
    SchedulingError::InvalidJobTransition {
        status: job.status.to_string(),
        action: action.to_string(),
    }
}

/// Artisan proposes (or re-proposes) a date range. Editing dates on a
/// planned or accepted job releases the held range and puts the job
/// back in front of the client; only a started or finished job is
/// locked.
pub fn propose_dates(
    job: &DomainJob,
    range: DateRange,
    now: DateTime<Utc>,
) -> Result<DomainJob, SchedulingError> {
    match job.status {
        JobStatus::InProgress | JobStatus::Completed => Err(invalid(job, "propose_dates")),
        _ => {
            let mut next = job.clone();
            next.proposed_range = Some(range);
            next.counter_range = None;
            next.status = JobStatus::AwaitingClientResponse;
            next.updated_at = now;
            Ok(next)
        }
    }
}

/// Record the client's answer to the proposed range.
pub fn record_client_response(
    job: &DomainJob,
    response: &ClientDateResponse,
    now: DateTime<Utc>,
) -> Result<DomainJob, SchedulingError> {
    if job.status != JobStatus::AwaitingClientResponse {
        return Err(invalid(job, "record_client_response"));
    }
    if job.proposed_range.is_none() {
        return Err(SchedulingError::NoProposedRange);
    }

    let mut next = job.clone();
    next.updated_at = now;
    match response {
        ClientDateResponse::Accept => {
            next.status = JobStatus::ClientAcceptedDates;
        }
        ClientDateResponse::Counter(range) => {
            next.status = JobStatus::ClientProposedAlternate;
            next.counter_range = Some(*range);
        }
    }
    Ok(next)
}

/// Artisan confirms the dates. This is the only way a job becomes
/// `Planned`. Confirming a counter-proposal adopts the client's range
/// as the planned one.
pub fn confirm_dates(job: &DomainJob, now: DateTime<Utc>) -> Result<DomainJob, SchedulingError> {
    let mut next = job.clone();
    next.updated_at = now;

    match job.status {
        JobStatus::ClientAcceptedDates => {
            if job.proposed_range.is_none() {
                return Err(SchedulingError::NoProposedRange);
            }
        }
        JobStatus::ClientProposedAlternate => {
            let counter = job.counter_range.ok_or(SchedulingError::NoCounterRange)?;
            next.proposed_range = Some(counter);
            next.counter_range = None;
        }
        _ => return Err(invalid(job, "confirm_dates")),
    }

    next.status = JobStatus::Planned;
    Ok(next)
}

/// Move a planned job to `InProgress` once its start date arrives.
/// Returns `None` when the job is not due, so callers can skip the
/// write. Completion stays manual.
pub fn advance_if_due(job: &DomainJob, today: NaiveDate, now: DateTime<Utc>) -> Option<DomainJob> {
    if job.status != JobStatus::Planned {
        return None;
    }
    let range = job.proposed_range?;
    if today < range.start {
        return None;
    }

    let mut next = job.clone();
    next.status = JobStatus::InProgress;
    next.updated_at = now;
    Some(next)
}

/// Artisan marks the job finished.
pub fn mark_completed(job: &DomainJob, now: DateTime<Utc>) -> Result<DomainJob, SchedulingError> {
    if job.status != JobStatus::InProgress {
        return Err(invalid(job, "mark_completed"));
    }
    let mut next = job.clone();
    next.status = JobStatus::Completed;
    next.updated_at = now;
    Ok(next)
}
