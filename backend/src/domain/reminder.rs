//! Pure reminder scheduling over the quote book.
//!
//! `due_reminders` scans quotes and decides which time-driven actions
//! are due at `now`. It is a pure function of its inputs and is
//! idempotent: once the returned actions have been applied through the
//! lifecycle engine, re-running at the same instant yields nothing.

use chrono::{DateTime, Duration, Utc};

use crate::domain::models::quote::{DomainQuote, QuoteStatus};

/// Timing windows for the scheduler, in days. Counted from `sent_at`
/// for the staleness window, from `last_reminder_at` for auto-refusal
/// and from `responded_at` for archiving.
#[derive(Debug, Clone, Copy)]
pub struct ReminderPolicy {
    pub stale_after_days: i64,
    pub auto_refuse_after_days: i64,
    pub archive_after_days: i64,
}

impl Default for ReminderPolicy {
    fn default() -> Self {
        ReminderPolicy {
            stale_after_days: 7,
            auto_refuse_after_days: 10,
            archive_after_days: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderAction {
    /// Quote went unanswered past the staleness window: mark it stale
    /// and send the client a reminder email.
    MarkStaleAndNotify,
    /// Stale quote went unanswered past the auto-refusal window.
    AutoRefuse,
    /// Refused quote past its retention window.
    Archive,
}

/// One due action for one quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueReminder {
    pub quote_id: String,
    pub action: ReminderAction,
}

fn elapsed(since: DateTime<Utc>, now: DateTime<Utc>, days: i64) -> bool {
    now - since >= Duration::days(days)
}

/// Decide which reminder actions are due at `now`. Quotes missing the
/// timestamp an action keys on are skipped rather than guessed at.
pub fn due_reminders(
    quotes: &[DomainQuote],
    now: DateTime<Utc>,
    policy: &ReminderPolicy,
) -> Vec<DueReminder> {
    let mut due = Vec::new();

    for quote in quotes {
        let action = match quote.status {
            QuoteStatus::Sent => match quote.sent_at {
                Some(sent_at) if elapsed(sent_at, now, policy.stale_after_days) => {
                    Some(ReminderAction::MarkStaleAndNotify)
                }
                _ => None,
            },
            QuoteStatus::Stale => match quote.last_reminder_at {
                Some(reminded_at)
                    if elapsed(reminded_at, now, policy.auto_refuse_after_days) =>
                {
                    Some(ReminderAction::AutoRefuse)
                }
                _ => None,
            },
            status if status.is_refused() => match quote.responded_at {
                Some(responded_at) if elapsed(responded_at, now, policy.archive_after_days) => {
                    Some(ReminderAction::Archive)
                }
                _ => None,
            },
            _ => None,
        };

        if let Some(action) = action {
            due.push(DueReminder {
                quote_id: quote.id.clone(),
                action,
            });
        }
    }

    due
}
