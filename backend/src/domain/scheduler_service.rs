//! Time-driven pass over an account's quote and invoice books.
//!
//! The scheduler is meant to be run from a cron-like caller (or the
//! admin endpoint) with an explicit `now`. A failure on one entity is
//! logged and the pass continues; a re-run at the same instant applies
//! nothing new.

use anyhow::Result;
use chrono::Duration;
use log::{info, warn};
use std::sync::Arc;

use crate::domain::commands::quotes::QuoteEventCommand;
use crate::domain::commands::scheduler::{AppliedAction, RunSchedulerCommand, RunSchedulerResult};
use crate::domain::lifecycle::QuoteEvent;
use crate::domain::models::invoice::InvoiceStatus;
use crate::domain::quote_service::QuoteService;
use crate::domain::reminder::{due_reminders, ReminderAction, ReminderPolicy};
use crate::storage::csv::{CsvConnection, InvoiceRepository, QuoteRepository};
use crate::storage::{InvoiceStorage, QuoteStorage};

/// Pending invoices older than this are flagged overdue.
const INVOICE_OVERDUE_AFTER_DAYS: i64 = 7;

#[derive(Clone)]
pub struct SchedulerService {
    quote_service: QuoteService,
    quote_repository: QuoteRepository,
    invoice_repository: InvoiceRepository,
    policy: ReminderPolicy,
}

impl SchedulerService {
    pub fn new(csv_conn: Arc<CsvConnection>, quote_service: QuoteService) -> Self {
        Self {
            quote_service,
            quote_repository: QuoteRepository::new((*csv_conn).clone()),
            invoice_repository: InvoiceRepository::new((*csv_conn).clone()),
            policy: ReminderPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ReminderPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run one pass for an account: quote reminders, then overdue
    /// invoices.
    pub fn run(&self, command: RunSchedulerCommand) -> Result<RunSchedulerResult> {
        info!(
            "Running scheduler for account {} at {}",
            command.account_id, command.now
        );
        let mut actions = Vec::new();

        let quotes = self.quote_repository.list_quotes(&command.account_id)?;
        for due in due_reminders(&quotes, command.now, &self.policy) {
            let quote = match quotes.iter().find(|q| q.id == due.quote_id) {
                Some(quote) => quote,
                None => continue,
            };
            let event = match due.action {
                ReminderAction::MarkStaleAndNotify => QuoteEvent::ReminderWindowElapsed,
                ReminderAction::AutoRefuse => QuoteEvent::AutoRefuseWindowElapsed,
                ReminderAction::Archive => QuoteEvent::RetentionElapsed,
            };
            let action_name = event.name().to_string();

            match self.quote_service.apply_event(QuoteEventCommand {
                account_id: command.account_id.clone(),
                quote_id: due.quote_id.clone(),
                event,
                expected_version: quote.version,
            }) {
                Ok(_) => actions.push(AppliedAction {
                    entity_id: due.quote_id,
                    action: action_name,
                }),
                Err(e) => {
                    warn!("Scheduler skipped quote {}: {}", due.quote_id, e);
                }
            }
        }

        for action in self.mark_overdue_invoices(&command)? {
            actions.push(action);
        }

        info!(
            "Scheduler applied {} actions for account {}",
            actions.len(),
            command.account_id
        );
        Ok(RunSchedulerResult { actions })
    }

    fn mark_overdue_invoices(&self, command: &RunSchedulerCommand) -> Result<Vec<AppliedAction>> {
        let mut actions = Vec::new();
        let invoices = self.invoice_repository.list_invoices(&command.account_id)?;

        for invoice in invoices {
            if invoice.status != InvoiceStatus::Pending {
                continue;
            }
            if command.now - invoice.created_at < Duration::days(INVOICE_OVERDUE_AFTER_DAYS) {
                continue;
            }

            let mut overdue = invoice.clone();
            overdue.status = InvoiceStatus::Overdue;
            match self.invoice_repository.update_invoice(&overdue) {
                Ok(()) => actions.push(AppliedAction {
                    entity_id: invoice.id,
                    action: "invoice_overdue".to_string(),
                }),
                Err(e) => warn!("Scheduler skipped invoice {}: {}", invoice.id, e),
            }
        }

        Ok(actions)
    }
}
