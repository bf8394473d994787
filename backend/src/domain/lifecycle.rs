//! Pure state-transition engine for the quote lifecycle.
//!
//! `apply_transition` validates and applies a single event against a
//! quote. It performs no side effects: emails, job creation and
//! archiving are returned as [`Effect`] values for the dispatcher in
//! `QuoteService` to execute. The transition table is total: every
//! (status, event) pair either yields a new quote or an explicit
//! [`TransitionError::InvalidTransition`]; no event silently no-ops.

use chrono::{DateTime, Utc};

use crate::domain::models::job::DateRange;
use crate::domain::models::quote::{DomainQuote, QuoteStatus};

/// An event moving a quote through its lifecycle. Artisan- and
/// client-driven events come in over the API; the `*Elapsed` events are
/// emitted by the reminder scheduler.
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteEvent {
    ArtisanSent,
    ClientAccepted,
    ClientProposedAlternate(DateRange),
    ArtisanConfirmedDates,
    ArtisanMarkedRefused,
    ArtisanSentReminder,
    PaymentReceived,
    ReminderWindowElapsed,
    AutoRefuseWindowElapsed,
    RetentionElapsed,
}

impl QuoteEvent {
    pub fn name(&self) -> &'static str {
        match self {
            QuoteEvent::ArtisanSent => "artisan_sent",
            QuoteEvent::ClientAccepted => "client_accepted",
            QuoteEvent::ClientProposedAlternate(_) => "client_proposed_alternate",
            QuoteEvent::ArtisanConfirmedDates => "artisan_confirmed_dates",
            QuoteEvent::ArtisanMarkedRefused => "artisan_marked_refused",
            QuoteEvent::ArtisanSentReminder => "artisan_sent_reminder",
            QuoteEvent::PaymentReceived => "payment_received",
            QuoteEvent::ReminderWindowElapsed => "reminder_window_elapsed",
            QuoteEvent::AutoRefuseWindowElapsed => "auto_refuse_window_elapsed",
            QuoteEvent::RetentionElapsed => "retention_elapsed",
        }
    }
}

/// Email the dispatcher should send on behalf of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailKind {
    QuoteToClient,
    ReminderToClient,
    AcceptanceNotice,
    DepositReceipt,
    AutoRefusalNotice,
}

/// Side effect requested by the engine, executed externally.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ScheduleEmail(EmailKind),
    /// The quote was accepted: create its job.
    CreateJob,
    /// Relay a client counter-proposal to the job sub-lifecycle.
    ForwardCounterProposal(DateRange),
    /// Relay the artisan's date confirmation to the job sub-lifecycle.
    ForwardDateConfirmation,
    ArchiveQuote,
}

/// Typed failure of a lifecycle transition. Reported to callers, never
/// panicked across the API boundary.
#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    #[error("Invalid transition: event '{event}' is not allowed in status '{status}'")]
    InvalidTransition { status: String, event: String },
    #[error("Version conflict: expected version {expected}, found {actual}")]
    VersionConflict { expected: u64, actual: u64 },
}

fn invalid(quote: &DomainQuote, event: &QuoteEvent) -> TransitionError {
    TransitionError::InvalidTransition {
        status: quote.status.to_string(),
        event: event.name().to_string(),
    }
}

/// Validate and apply one event. Returns the updated quote and the
/// effects to execute, or a typed error; the input quote is never
/// mutated.
pub fn apply_transition(
    quote: &DomainQuote,
    event: &QuoteEvent,
    now: DateTime<Utc>,
) -> Result<(DomainQuote, Vec<Effect>), TransitionError> {
    let mut next = quote.clone();
    next.updated_at = now;

    let effects = match (quote.status, event) {
        // Draft: the quote exists but the client has not seen it.
        (QuoteStatus::Draft, QuoteEvent::ArtisanSent) => {
            next.status = QuoteStatus::Sent;
            next.sent_at = Some(now);
            vec![Effect::ScheduleEmail(EmailKind::QuoteToClient)]
        }

        // Manual refusal is allowed at any point prior to acceptance.
        (
            QuoteStatus::Draft | QuoteStatus::Sent | QuoteStatus::Stale,
            QuoteEvent::ArtisanMarkedRefused,
        ) => {
            next.status = QuoteStatus::RefusedManual;
            next.responded_at = Some(now);
            vec![]
        }

        (QuoteStatus::Sent | QuoteStatus::Stale, QuoteEvent::ClientAccepted) => {
            next.status = QuoteStatus::Accepted;
            next.responded_at = Some(now);
            vec![
                Effect::CreateJob,
                Effect::ScheduleEmail(EmailKind::AcceptanceNotice),
            ]
        }

        // Paying the deposit implies accepting the quote.
        (QuoteStatus::Sent | QuoteStatus::Stale, QuoteEvent::PaymentReceived) => {
            next.status = QuoteStatus::Accepted;
            next.deposit_paid = true;
            next.responded_at = Some(now);
            vec![
                Effect::CreateJob,
                Effect::ScheduleEmail(EmailKind::DepositReceipt),
            ]
        }

        (QuoteStatus::Sent | QuoteStatus::Stale, QuoteEvent::ArtisanSentReminder) => {
            next.status = QuoteStatus::Stale;
            next.last_reminder_at = Some(now);
            vec![Effect::ScheduleEmail(EmailKind::ReminderToClient)]
        }

        // Scheduler-driven: the 7-day window elapsed without a reminder.
        (QuoteStatus::Sent, QuoteEvent::ReminderWindowElapsed) => {
            next.status = QuoteStatus::Stale;
            next.last_reminder_at = Some(now);
            vec![Effect::ScheduleEmail(EmailKind::ReminderToClient)]
        }

        // Scheduler-driven: 10 days after the last reminder, still no
        // payment and no manual action.
        (QuoteStatus::Stale, QuoteEvent::AutoRefuseWindowElapsed) => {
            next.status = QuoteStatus::RefusedAuto;
            next.responded_at = Some(now);
            vec![Effect::ScheduleEmail(EmailKind::AutoRefusalNotice)]
        }

        // Deposit payment arriving after acceptance.
        (QuoteStatus::Accepted, QuoteEvent::PaymentReceived) if !quote.deposit_paid => {
            next.deposit_paid = true;
            vec![Effect::ScheduleEmail(EmailKind::DepositReceipt)]
        }

        // Date negotiation on an accepted quote is delegated to the job
        // sub-lifecycle.
        (QuoteStatus::Accepted, QuoteEvent::ClientProposedAlternate(range)) => {
            vec![Effect::ForwardCounterProposal(*range)]
        }
        (QuoteStatus::Accepted, QuoteEvent::ArtisanConfirmedDates) => {
            vec![Effect::ForwardDateConfirmation]
        }

        (
            QuoteStatus::RefusedManual | QuoteStatus::RefusedAuto,
            QuoteEvent::RetentionElapsed,
        ) => {
            next.status = QuoteStatus::Archived;
            vec![Effect::ArchiveQuote]
        }

        _ => return Err(invalid(quote, event)),
    };

    Ok((next, effects))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::quote::QuoteItem;
    use chrono::NaiveDate;

    fn quote_in(status: QuoteStatus) -> DomainQuote {
        let now = Utc::now();
        let mut quote = DomainQuote {
            id: DomainQuote::generate_id(1702516122000),
            account_id: "account::1".to_string(),
            client_ref: "client::1".to_string(),
            description: "Rénovation cuisine".to_string(),
            items: vec![QuoteItem {
                description: "Labour".to_string(),
                quantity: 8.0,
                unit_price: 50.0,
            }],
            total_ht: 0.0,
            total_ttc: 0.0,
            deposit_percentage: 0.0,
            deposit_amount: 0.0,
            deposit_paid: false,
            status,
            sent_at: None,
            last_reminder_at: None,
            responded_at: None,
            created_at: now,
            updated_at: now,
            version: 0,
        };
        quote.recompute_amounts(20.0, 30.0);
        if status != QuoteStatus::Draft {
            quote.sent_at = Some(now);
        }
        quote
    }

    fn all_statuses() -> [QuoteStatus; 7] {
        [
            QuoteStatus::Draft,
            QuoteStatus::Sent,
            QuoteStatus::Stale,
            QuoteStatus::Accepted,
            QuoteStatus::RefusedManual,
            QuoteStatus::RefusedAuto,
            QuoteStatus::Archived,
        ]
    }

    fn all_events() -> Vec<QuoteEvent> {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2025, 1, 12).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 17).unwrap(),
        )
        .unwrap();
        vec![
            QuoteEvent::ArtisanSent,
            QuoteEvent::ClientAccepted,
            QuoteEvent::ClientProposedAlternate(range),
            QuoteEvent::ArtisanConfirmedDates,
            QuoteEvent::ArtisanMarkedRefused,
            QuoteEvent::ArtisanSentReminder,
            QuoteEvent::PaymentReceived,
            QuoteEvent::ReminderWindowElapsed,
            QuoteEvent::AutoRefuseWindowElapsed,
            QuoteEvent::RetentionElapsed,
        ]
    }

    #[test]
    fn test_transition_table_is_total() {
        // Every (status, event) pair must resolve to either a new quote
        // or a typed InvalidTransition error.
        let now = Utc::now();
        for status in all_statuses() {
            let quote = quote_in(status);
            for event in all_events() {
                match apply_transition(&quote, &event, now) {
                    Ok((next, _)) => {
                        assert_ne!(next.status, QuoteStatus::Draft, "no event returns to draft")
                    }
                    Err(TransitionError::InvalidTransition { .. }) => {}
                    Err(other) => panic!("unexpected error kind: {other}"),
                }
            }
        }
    }

    #[test]
    fn test_send_sets_sent_at_and_schedules_email() {
        let quote = quote_in(QuoteStatus::Draft);
        let now = Utc::now();
        let (next, effects) = apply_transition(&quote, &QuoteEvent::ArtisanSent, now).unwrap();

        assert_eq!(next.status, QuoteStatus::Sent);
        assert_eq!(next.sent_at, Some(now));
        assert_eq!(effects, vec![Effect::ScheduleEmail(EmailKind::QuoteToClient)]);
    }

    #[test]
    fn test_acceptance_creates_job() {
        let quote = quote_in(QuoteStatus::Sent);
        let (next, effects) =
            apply_transition(&quote, &QuoteEvent::ClientAccepted, Utc::now()).unwrap();

        assert_eq!(next.status, QuoteStatus::Accepted);
        assert!(next.responded_at.is_some());
        assert!(effects.contains(&Effect::CreateJob));
    }

    #[test]
    fn test_payment_on_sent_quote_accepts_and_marks_deposit_paid() {
        let quote = quote_in(QuoteStatus::Stale);
        let (next, effects) =
            apply_transition(&quote, &QuoteEvent::PaymentReceived, Utc::now()).unwrap();

        assert_eq!(next.status, QuoteStatus::Accepted);
        assert!(next.deposit_paid);
        assert!(effects.contains(&Effect::CreateJob));
    }

    #[test]
    fn test_double_deposit_payment_rejected() {
        let mut quote = quote_in(QuoteStatus::Accepted);
        quote.deposit_paid = true;

        let result = apply_transition(&quote, &QuoteEvent::PaymentReceived, Utc::now());
        assert!(matches!(
            result,
            Err(TransitionError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_reminder_window_marks_stale_and_records_reminder() {
        let quote = quote_in(QuoteStatus::Sent);
        let now = Utc::now();
        let (next, effects) =
            apply_transition(&quote, &QuoteEvent::ReminderWindowElapsed, now).unwrap();

        assert_eq!(next.status, QuoteStatus::Stale);
        assert_eq!(next.last_reminder_at, Some(now));
        assert_eq!(
            effects,
            vec![Effect::ScheduleEmail(EmailKind::ReminderToClient)]
        );
    }

    #[test]
    fn test_auto_refusal_only_from_stale() {
        let stale = quote_in(QuoteStatus::Stale);
        let (next, _) =
            apply_transition(&stale, &QuoteEvent::AutoRefuseWindowElapsed, Utc::now()).unwrap();
        assert_eq!(next.status, QuoteStatus::RefusedAuto);

        for status in [QuoteStatus::Draft, QuoteStatus::Sent, QuoteStatus::Accepted] {
            let quote = quote_in(status);
            assert!(
                apply_transition(&quote, &QuoteEvent::AutoRefuseWindowElapsed, Utc::now()).is_err()
            );
        }
    }

    #[test]
    fn test_manual_refusal_allowed_before_acceptance_only() {
        for status in [QuoteStatus::Draft, QuoteStatus::Sent, QuoteStatus::Stale] {
            let quote = quote_in(status);
            let (next, _) =
                apply_transition(&quote, &QuoteEvent::ArtisanMarkedRefused, Utc::now()).unwrap();
            assert_eq!(next.status, QuoteStatus::RefusedManual);
        }

        let accepted = quote_in(QuoteStatus::Accepted);
        assert!(apply_transition(&accepted, &QuoteEvent::ArtisanMarkedRefused, Utc::now()).is_err());
    }

    #[test]
    fn test_refused_quotes_archive_after_retention() {
        for status in [QuoteStatus::RefusedManual, QuoteStatus::RefusedAuto] {
            let quote = quote_in(status);
            let (next, effects) =
                apply_transition(&quote, &QuoteEvent::RetentionElapsed, Utc::now()).unwrap();
            assert_eq!(next.status, QuoteStatus::Archived);
            assert_eq!(effects, vec![Effect::ArchiveQuote]);
        }
    }

    #[test]
    fn test_payment_on_archived_quote_is_typed_error() {
        let quote = quote_in(QuoteStatus::Archived);
        let err = apply_transition(&quote, &QuoteEvent::PaymentReceived, Utc::now()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("payment_received"));
        assert!(message.contains("archived"));
    }

    #[test]
    fn test_counter_proposal_forwarded_to_job() {
        let quote = quote_in(QuoteStatus::Accepted);
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2025, 1, 12).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 17).unwrap(),
        )
        .unwrap();

        let (next, effects) = apply_transition(
            &quote,
            &QuoteEvent::ClientProposedAlternate(range),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(next.status, QuoteStatus::Accepted);
        assert_eq!(effects, vec![Effect::ForwardCounterProposal(range)]);
    }
}
