//! Artisan account management and server-held configuration.
//!
//! The deposit and VAT percentages live server-side with the account,
//! so every lifecycle computation sees the same values. Updating the
//! config immediately re-derives the deposit on open quotes through
//! the quote service.

use anyhow::Result;
use chrono::Utc;
use log::info;
use std::sync::Arc;

use crate::domain::commands::accounts::{
    CreateAccountCommand, UpdateAccountConfigCommand, UpdateAccountConfigResult,
};
use crate::domain::models::account::{AccountConfig, AccountValidationError, DomainAccount};
use crate::domain::quote_service::QuoteService;
use crate::storage::csv::{AccountRepository, CsvConnection};
use crate::storage::AccountStorage;

#[derive(Clone)]
pub struct AccountService {
    account_repository: AccountRepository,
    quote_service: QuoteService,
}

impl AccountService {
    pub fn new(csv_conn: Arc<CsvConnection>, quote_service: QuoteService) -> Self {
        Self {
            account_repository: AccountRepository::new((*csv_conn).clone()),
            quote_service,
        }
    }

    pub fn get_account(&self, account_id: &str) -> Result<DomainAccount> {
        self.account_repository
            .get_account(account_id)?
            .ok_or_else(|| anyhow::anyhow!("Account not found: {}", account_id))
    }

    pub fn list_accounts(&self) -> Result<Vec<DomainAccount>> {
        self.account_repository.list_accounts()
    }

    pub fn create_account(&self, command: CreateAccountCommand) -> Result<DomainAccount> {
        if command.company_name.trim().is_empty() {
            return Err(AccountValidationError::EmptyCompanyName.into());
        }

        let now = Utc::now();
        let mut millis = now.timestamp_millis() as u64;
        while self
            .account_repository
            .get_account(&DomainAccount::generate_id(millis))?
            .is_some()
        {
            millis += 1;
        }

        let account = DomainAccount {
            id: DomainAccount::generate_id(millis),
            company_name: command.company_name.clone(),
            created_at: now,
        };
        self.account_repository.store_account(&account)?;

        let mut config = AccountConfig::default();
        config.company_name = command.company_name;
        self.account_repository.save_config(&account.id, &config)?;

        info!("Created account: {}", account.id);
        Ok(account)
    }

    pub fn get_config(&self, account_id: &str) -> Result<AccountConfig> {
        self.get_account(account_id)?;
        self.account_repository.get_config(account_id)
    }

    fn validate_config(config: &AccountConfig) -> Result<()> {
        if config.company_name.trim().is_empty() {
            return Err(AccountValidationError::EmptyCompanyName.into());
        }
        if !(0.0..=100.0).contains(&config.deposit_percentage) {
            return Err(AccountValidationError::InvalidDepositPercentage.into());
        }
        if !(0.0..=100.0).contains(&config.vat_rate) {
            return Err(AccountValidationError::InvalidVatRate.into());
        }
        if config.hourly_rate < 0.0 {
            return Err(AccountValidationError::NegativeHourlyRate.into());
        }
        Ok(())
    }

    pub fn update_config(
        &self,
        command: UpdateAccountConfigCommand,
    ) -> Result<UpdateAccountConfigResult> {
        self.get_account(&command.account_id)?;
        Self::validate_config(&command.config)?;

        self.account_repository
            .save_config(&command.account_id, &command.config)?;
        let recomputed_quote_ids = self
            .quote_service
            .recompute_open_deposits(&command.account_id)?;

        Ok(UpdateAccountConfigResult {
            config: command.config,
            recomputed_quote_ids,
        })
    }
}
