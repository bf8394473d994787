//! # CSV Account Repository
//!
//! Accounts live in a single `accounts.csv` at the root of the data
//! directory. Each account's business configuration is a `config.yaml`
//! inside its own directory.

use anyhow::Result;
use chrono::{DateTime, Utc};
use csv::{Reader, Writer};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use super::connection::CsvConnection;
use crate::domain::models::account::{AccountConfig, DomainAccount};
use crate::storage::AccountStorage;

/// CSV record structure for accounts
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AccountRecord {
    id: String,
    company_name: String,
    created_at: String,
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .map_err(|e| anyhow::anyhow!("Failed to parse timestamp '{}': {}", value, e))?
        .with_timezone(&Utc))
}

impl From<&DomainAccount> for AccountRecord {
    fn from(account: &DomainAccount) -> Self {
        AccountRecord {
            id: account.id.clone(),
            company_name: account.company_name.clone(),
            created_at: account.created_at.to_rfc3339(),
        }
    }
}

impl TryFrom<AccountRecord> for DomainAccount {
    type Error = anyhow::Error;

    fn try_from(record: AccountRecord) -> Result<Self> {
        Ok(DomainAccount {
            id: record.id,
            company_name: record.company_name,
            created_at: parse_timestamp(&record.created_at)?,
        })
    }
}

/// CSV- and YAML-based account repository
#[derive(Clone)]
pub struct AccountRepository {
    connection: CsvConnection,
}

impl AccountRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn accounts_file_path(&self) -> PathBuf {
        self.connection.base_directory().join("accounts.csv")
    }

    fn config_file_path(&self, account_id: &str) -> PathBuf {
        self.connection.account_directory(account_id).join("config.yaml")
    }

    fn read_accounts(&self) -> Result<Vec<DomainAccount>> {
        let path = self.accounts_file_path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&path)?;
        let mut csv_reader = Reader::from_reader(BufReader::new(file));
        let mut accounts = Vec::new();

        for result in csv_reader.deserialize::<AccountRecord>() {
            let record = result?;
            match DomainAccount::try_from(record) {
                Ok(account) => accounts.push(account),
                Err(e) => {
                    warn!("Failed to parse account record: {}. Skipping.", e);
                    continue;
                }
            }
        }

        Ok(accounts)
    }

    fn write_accounts(&self, accounts: &[DomainAccount]) -> Result<()> {
        let path = self.accounts_file_path();
        let temp_path = path.with_extension("csv.tmp");

        {
            let temp_file = File::create(&temp_path)?;
            let mut csv_writer = Writer::from_writer(BufWriter::new(temp_file));
            for account in accounts {
                csv_writer.serialize(AccountRecord::from(account))?;
            }
            csv_writer.flush()?;
        }

        std::fs::rename(&temp_path, &path)?;
        debug!("Wrote {} accounts to {:?}", accounts.len(), path);
        Ok(())
    }
}

impl AccountStorage for AccountRepository {
    fn store_account(&self, account: &DomainAccount) -> Result<()> {
        info!("Storing account: {}", account.id);

        let mut accounts = self.read_accounts()?;
        if accounts.iter().any(|a| a.id == account.id) {
            return Err(anyhow::anyhow!("Account already exists: {}", account.id));
        }
        accounts.push(account.clone());
        self.write_accounts(&accounts)?;

        self.connection.ensure_account_directory(&account.id)?;
        Ok(())
    }

    fn get_account(&self, account_id: &str) -> Result<Option<DomainAccount>> {
        let accounts = self.read_accounts()?;
        Ok(accounts.into_iter().find(|a| a.id == account_id))
    }

    fn list_accounts(&self) -> Result<Vec<DomainAccount>> {
        let mut accounts = self.read_accounts()?;
        accounts.sort_by(|a, b| {
            a.company_name
                .to_lowercase()
                .cmp(&b.company_name.to_lowercase())
        });
        Ok(accounts)
    }

    fn get_config(&self, account_id: &str) -> Result<AccountConfig> {
        let path = self.config_file_path(account_id);
        if !path.exists() {
            debug!("No config saved yet for {}, using defaults", account_id);
            return Ok(AccountConfig::default());
        }

        let contents = std::fs::read_to_string(&path)?;
        let config: AccountConfig = serde_yaml::from_str(&contents)
            .map_err(|e| anyhow::anyhow!("Failed to parse config for {}: {}", account_id, e))?;
        Ok(config)
    }

    fn save_config(&self, account_id: &str, config: &AccountConfig) -> Result<()> {
        self.connection.ensure_account_directory(account_id)?;
        let path = self.config_file_path(account_id);
        let temp_path = path.with_extension("yaml.tmp");

        let contents = serde_yaml::to_string(config)?;
        std::fs::write(&temp_path, contents)?;
        std::fs::rename(&temp_path, &path)?;

        info!("Saved config for account: {}", account_id);
        Ok(())
    }
}
