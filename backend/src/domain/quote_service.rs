//! Quote service domain logic.
//!
//! Wraps the pure lifecycle engine with validation, persistence and
//! effect execution. Lifecycle events come in with the caller's
//! expected version; a mismatch is rejected before the engine runs.
//!
//! ## Business Rules
//!
//! - Quotes are created as drafts with amounts derived from the
//!   account's VAT and deposit percentages
//! - Line items can only be edited while a quote is a draft
//! - `deposit_amount` always equals the rounded percentage of the TTC
//!   total, including after a config change
//! - Emails that fail to send are logged, never block a transition

use anyhow::Result;
use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;

use crate::domain::commands::quotes::{
    CreateQuoteCommand, QuoteEventCommand, QuoteEventResult, QuoteListQuery,
    UpdateQuoteItemsCommand,
};
use crate::domain::email_service::EmailService;
use crate::domain::lifecycle::{apply_transition, Effect, EmailKind, TransitionError};
use crate::domain::models::client::DomainClient;
use crate::domain::models::job::DomainJob;
use crate::domain::models::quote::{DomainQuote, QuoteItem, QuoteStatus, QuoteValidationError};
use crate::domain::scheduling;
use crate::storage::csv::{
    ClientRepository, CsvConnection, JobRepository, QuoteRepository,
};
use crate::storage::{AccountStorage, ClientStorage, JobStorage, QuoteStorage};

const MAX_DESCRIPTION_LENGTH: usize = 512;

/// Service for managing quotes and their lifecycle
#[derive(Clone)]
pub struct QuoteService {
    quote_repository: QuoteRepository,
    job_repository: JobRepository,
    client_repository: ClientRepository,
    account_repository: crate::storage::csv::AccountRepository,
    email_service: Arc<EmailService>,
}

impl QuoteService {
    pub fn new(csv_conn: Arc<CsvConnection>, email_service: Arc<EmailService>) -> Self {
        Self {
            quote_repository: QuoteRepository::new((*csv_conn).clone()),
            job_repository: JobRepository::new((*csv_conn).clone()),
            client_repository: ClientRepository::new((*csv_conn).clone()),
            account_repository: crate::storage::csv::AccountRepository::new((*csv_conn).clone()),
            email_service,
        }
    }

    fn validate_items(items: &[QuoteItem]) -> Result<()> {
        if items.is_empty() {
            return Err(QuoteValidationError::NoItems.into());
        }
        for item in items {
            if item.quantity <= 0.0 {
                return Err(QuoteValidationError::NonPositiveQuantity.into());
            }
            if item.unit_price < 0.0 {
                return Err(QuoteValidationError::NegativeUnitPrice.into());
            }
        }
        Ok(())
    }

    /// Create a new draft quote
    pub fn create_quote(&self, command: CreateQuoteCommand) -> Result<DomainQuote> {
        info!("Creating quote for account {}", command.account_id);

        if command.client_ref.trim().is_empty() {
            return Err(QuoteValidationError::EmptyClientRef.into());
        }
        if command.description.len() > MAX_DESCRIPTION_LENGTH {
            return Err(QuoteValidationError::DescriptionTooLong.into());
        }
        Self::validate_items(&command.items)?;

        let config = self.account_repository.get_config(&command.account_id)?;
        let now = Utc::now();

        // Ids are epoch millis; creations in the same millisecond must
        // not collide.
        let mut millis = now.timestamp_millis() as u64;
        while self
            .quote_repository
            .get_quote(&command.account_id, &DomainQuote::generate_id(millis))?
            .is_some()
        {
            millis += 1;
        }

        let mut quote = DomainQuote {
            id: DomainQuote::generate_id(millis),
            account_id: command.account_id,
            client_ref: command.client_ref,
            description: command.description,
            items: command.items,
            total_ht: 0.0,
            total_ttc: 0.0,
            deposit_percentage: 0.0,
            deposit_amount: 0.0,
            deposit_paid: false,
            status: QuoteStatus::Draft,
            sent_at: None,
            last_reminder_at: None,
            responded_at: None,
            created_at: now,
            updated_at: now,
            version: 0,
        };
        quote.recompute_amounts(config.vat_rate, config.deposit_percentage);

        self.quote_repository.store_quote(&quote)?;
        info!("Created quote: {}", quote.id);
        Ok(quote)
    }

    pub fn get_quote(&self, account_id: &str, quote_id: &str) -> Result<DomainQuote> {
        self.quote_repository
            .get_quote(account_id, quote_id)?
            .ok_or_else(|| anyhow::anyhow!("Quote not found: {}", quote_id))
    }

    pub fn list_quotes(&self, account_id: &str, query: QuoteListQuery) -> Result<Vec<DomainQuote>> {
        let quotes = self.quote_repository.list_quotes(account_id)?;
        match query.status {
            Some(status) => {
                let status = QuoteStatus::from_string(&status)
                    .map_err(|e| anyhow::anyhow!("Invalid status filter: {}", e))?;
                Ok(quotes.into_iter().filter(|q| q.status == status).collect())
            }
            None => Ok(quotes),
        }
    }

    /// Replace the line items of a draft quote
    pub fn update_items(&self, command: UpdateQuoteItemsCommand) -> Result<DomainQuote> {
        let quote = self.get_quote(&command.account_id, &command.quote_id)?;

        if quote.status != QuoteStatus::Draft {
            return Err(QuoteValidationError::ItemsLocked(quote.status.to_string()).into());
        }
        Self::validate_items(&command.items)?;

        let config = self.account_repository.get_config(&command.account_id)?;
        let mut updated = quote;
        updated.items = command.items;
        updated.updated_at = Utc::now();
        updated.recompute_amounts(config.vat_rate, config.deposit_percentage);

        self.quote_repository
            .update_quote(&updated, command.expected_version)
    }

    /// Apply a lifecycle event to a quote and execute its effects
    pub fn apply_event(&self, command: QuoteEventCommand) -> Result<QuoteEventResult> {
        info!(
            "Applying event {} to quote {}",
            command.event.name(),
            command.quote_id
        );

        let quote = self.get_quote(&command.account_id, &command.quote_id)?;
        if quote.version != command.expected_version {
            return Err(TransitionError::VersionConflict {
                expected: command.expected_version,
                actual: quote.version,
            }
            .into());
        }

        let now = Utc::now();
        let (next, effects) = apply_transition(&quote, &command.event, now)?;
        let persisted = self
            .quote_repository
            .update_quote(&next, command.expected_version)?;

        let mut created_job_id = None;
        for effect in effects {
            match effect {
                Effect::ScheduleEmail(kind) => self.send_email(&persisted, kind),
                Effect::CreateJob => {
                    created_job_id = Some(self.create_job_for_quote(&persisted)?);
                }
                Effect::ForwardCounterProposal(range) => {
                    let job = self.job_for_quote(&persisted)?;
                    let updated = scheduling::record_client_response(
                        &job,
                        &crate::domain::models::job::ClientDateResponse::Counter(range),
                        now,
                    )?;
                    self.job_repository.update_job(&updated, job.version)?;
                }
                Effect::ForwardDateConfirmation => {
                    let job = self.job_for_quote(&persisted)?;
                    let updated = scheduling::confirm_dates(&job, now)?;
                    self.job_repository.update_job(&updated, job.version)?;
                }
                Effect::ArchiveQuote => {
                    info!("Quote archived: {}", persisted.id);
                }
            }
        }

        Ok(QuoteEventResult {
            quote: persisted,
            created_job_id,
        })
    }

    /// Re-derive amounts on open quotes after a config change. Drafts
    /// get full recomputation; sent and stale quotes keep their
    /// communicated totals and only the deposit is re-derived.
    pub fn recompute_open_deposits(&self, account_id: &str) -> Result<Vec<String>> {
        let config = self.account_repository.get_config(account_id)?;
        let quotes = self.quote_repository.list_quotes(account_id)?;
        let mut recomputed = Vec::new();

        for quote in quotes {
            let mut updated = quote.clone();
            match quote.status {
                QuoteStatus::Draft => {
                    updated.recompute_amounts(config.vat_rate, config.deposit_percentage);
                }
                status if status.is_pre_terminal() => {
                    updated.deposit_percentage = config.deposit_percentage;
                    updated.deposit_amount = crate::domain::models::quote::round2(
                        updated.total_ttc * config.deposit_percentage / 100.0,
                    );
                }
                _ => continue,
            }
            if updated != quote {
                updated.updated_at = Utc::now();
                self.quote_repository.update_quote(&updated, quote.version)?;
                recomputed.push(quote.id.clone());
            }
        }

        if !recomputed.is_empty() {
            info!(
                "Recomputed deposits on {} quotes for {}",
                recomputed.len(),
                account_id
            );
        }
        Ok(recomputed)
    }

    fn client_for_quote(&self, quote: &DomainQuote) -> Result<Option<DomainClient>> {
        self.client_repository
            .get_client(&quote.account_id, &quote.client_ref)
    }

    fn send_email(&self, quote: &DomainQuote, kind: EmailKind) {
        match self.client_for_quote(quote) {
            Ok(Some(client)) => {
                if let Err(e) = self.email_service.send_quote_email(kind, quote, &client) {
                    warn!("Failed to send email for quote {}: {}", quote.id, e);
                }
            }
            Ok(None) => {
                warn!(
                    "No client record {} for quote {}, skipping email",
                    quote.client_ref, quote.id
                );
            }
            Err(e) => warn!("Failed to load client for quote {}: {}", quote.id, e),
        }
    }

    fn job_for_quote(&self, quote: &DomainQuote) -> Result<DomainJob> {
        self.job_repository
            .get_job_for_quote(&quote.account_id, &quote.id)?
            .ok_or_else(|| anyhow::anyhow!("Job not found for quote: {}", quote.id))
    }

    fn create_job_for_quote(&self, quote: &DomainQuote) -> Result<String> {
        // Re-acceptance after a payment event must not create a second job.
        if let Some(existing) = self
            .job_repository
            .get_job_for_quote(&quote.account_id, &quote.id)?
        {
            return Ok(existing.id);
        }

        let now = Utc::now();
        let job = DomainJob::for_quote(
            DomainJob::generate_id(now.timestamp_millis() as u64),
            quote.id.clone(),
            quote.account_id.clone(),
            now,
        );
        self.job_repository.store_job(&job)?;
        info!("Created job {} for quote {}", job.id, quote.id);
        Ok(job.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::email_service::EmailConfig;
    use crate::domain::lifecycle::QuoteEvent;
    use tempfile::TempDir;

    fn setup() -> (QuoteService, Arc<CsvConnection>, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let connection =
            Arc::new(CsvConnection::new(temp_dir.path()).expect("Failed to create connection"));
        let email_service = Arc::new(EmailService::new(EmailConfig::default()));
        let service = QuoteService::new(connection.clone(), email_service);
        (service, connection, temp_dir)
    }

    fn create_command() -> CreateQuoteCommand {
        CreateQuoteCommand {
            account_id: "account::1".to_string(),
            client_ref: "client::1".to_string(),
            description: "Rénovation cuisine".to_string(),
            items: vec![
                QuoteItem {
                    description: "Main d'oeuvre".to_string(),
                    quantity: 10.0,
                    unit_price: 45.0,
                },
                QuoteItem {
                    description: "Carrelage".to_string(),
                    quantity: 20.0,
                    unit_price: 12.5,
                },
            ],
        }
    }

    fn event_command(quote: &DomainQuote, event: QuoteEvent) -> QuoteEventCommand {
        QuoteEventCommand {
            account_id: quote.account_id.clone(),
            quote_id: quote.id.clone(),
            event,
            expected_version: quote.version,
        }
    }

    #[test]
    fn test_create_quote_applies_default_percentages() {
        let (service, _conn, _temp_dir) = setup();
        let quote = service.create_quote(create_command()).unwrap();

        assert_eq!(quote.status, QuoteStatus::Draft);
        assert_eq!(quote.total_ht, 700.0);
        assert_eq!(quote.total_ttc, 840.0);
        assert_eq!(quote.deposit_amount, 252.0);
        assert_eq!(quote.version, 0);
    }

    #[test]
    fn test_create_quote_rejects_empty_items() {
        let (service, _conn, _temp_dir) = setup();
        let mut command = create_command();
        command.items.clear();
        let err = service.create_quote(command).unwrap_err();
        assert!(err.to_string().contains("at least one item"));
    }

    #[test]
    fn test_update_items_locked_after_send() {
        let (service, _conn, _temp_dir) = setup();
        let quote = service.create_quote(create_command()).unwrap();
        let result = service
            .apply_event(event_command(&quote, QuoteEvent::ArtisanSent))
            .unwrap();

        let err = service
            .update_items(UpdateQuoteItemsCommand {
                account_id: quote.account_id.clone(),
                quote_id: quote.id.clone(),
                items: vec![QuoteItem {
                    description: "Autre".to_string(),
                    quantity: 1.0,
                    unit_price: 100.0,
                }],
                expected_version: result.quote.version,
            })
            .unwrap_err();
        assert!(err.to_string().contains("no longer be edited"));
    }

    #[test]
    fn test_apply_event_rejects_stale_version() {
        let (service, _conn, _temp_dir) = setup();
        let quote = service.create_quote(create_command()).unwrap();

        service
            .apply_event(event_command(&quote, QuoteEvent::ArtisanSent))
            .unwrap();

        // Second caller still holds version 0.
        let err = service
            .apply_event(event_command(&quote, QuoteEvent::ArtisanMarkedRefused))
            .unwrap_err();
        assert!(err.to_string().contains("Version conflict"));
    }

    #[test]
    fn test_acceptance_creates_exactly_one_job() {
        let (service, conn, _temp_dir) = setup();
        let quote = service.create_quote(create_command()).unwrap();
        let sent = service
            .apply_event(event_command(&quote, QuoteEvent::ArtisanSent))
            .unwrap();

        let accepted = service
            .apply_event(event_command(&sent.quote, QuoteEvent::ClientAccepted))
            .unwrap();
        let job_id = accepted.created_job_id.expect("Job should be created");

        // A payment after acceptance must reuse the job.
        let paid = service
            .apply_event(event_command(&accepted.quote, QuoteEvent::PaymentReceived))
            .unwrap();
        assert!(paid.quote.deposit_paid);

        let job_repo = JobRepository::new((*conn).clone());
        let jobs = job_repo.list_jobs("account::1").unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].id, job_id);
        assert_eq!(jobs[0].quote_id, quote.id);
    }

    #[test]
    fn test_invalid_transition_is_reported() {
        let (service, _conn, _temp_dir) = setup();
        let quote = service.create_quote(create_command()).unwrap();

        let err = service
            .apply_event(event_command(&quote, QuoteEvent::ClientAccepted))
            .unwrap_err();
        assert!(err.to_string().contains("Invalid transition"));
    }

    #[test]
    fn test_recompute_open_deposits_preserves_sent_totals() {
        let (service, conn, _temp_dir) = setup();
        let draft = service.create_quote(create_command()).unwrap();
        let sent = service
            .create_quote(create_command())
            .and_then(|q| service.apply_event(event_command(&q, QuoteEvent::ArtisanSent)))
            .unwrap();

        let account_repo = crate::storage::csv::AccountRepository::new((*conn).clone());
        let mut config = account_repo.get_config("account::1").unwrap();
        config.deposit_percentage = 40.0;
        account_repo.save_config("account::1", &config).unwrap();

        let recomputed = service.recompute_open_deposits("account::1").unwrap();
        assert_eq!(recomputed.len(), 2);

        let draft = service.get_quote("account::1", &draft.id).unwrap();
        assert_eq!(draft.deposit_amount, 336.0);

        let sent = service.get_quote("account::1", &sent.quote.id).unwrap();
        // Totals stay as communicated, only the deposit moves.
        assert_eq!(sent.total_ttc, 840.0);
        assert_eq!(sent.deposit_amount, 336.0);
    }
}
