//! # CSV Quote Repository
//!
//! File-based quote storage using one `quotes.csv` per account
//! directory. Line items are stored as a JSON column so a quote stays
//! one row. Writes go through a temp file and an atomic rename.

use anyhow::Result;
use chrono::{DateTime, Utc};
use csv::{Reader, Writer};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use super::connection::CsvConnection;
use crate::domain::models::quote::{DomainQuote, QuoteItem, QuoteStatus};
use crate::storage::QuoteStorage;

/// CSV record structure for quotes
#[derive(Debug, Clone, Serialize, Deserialize)]
struct QuoteRecord {
    id: String,
    account_id: String,
    client_ref: String,
    description: String,
    items: String,
    total_ht: f64,
    total_ttc: f64,
    deposit_percentage: f64,
    deposit_amount: f64,
    deposit_paid: bool,
    status: String,
    sent_at: String,
    last_reminder_at: String,
    responded_at: String,
    created_at: String,
    updated_at: String,
    version: u64,
}

fn format_opt(value: &Option<DateTime<Utc>>) -> String {
    value.map(|v| v.to_rfc3339()).unwrap_or_default()
}

fn parse_opt(value: &str) -> Result<Option<DateTime<Utc>>> {
    if value.is_empty() {
        return Ok(None);
    }
    Ok(Some(parse_timestamp(value)?))
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .map_err(|e| anyhow::anyhow!("Failed to parse timestamp '{}': {}", value, e))?
        .with_timezone(&Utc))
}

impl TryFrom<&DomainQuote> for QuoteRecord {
    type Error = anyhow::Error;

    fn try_from(quote: &DomainQuote) -> Result<Self> {
        Ok(QuoteRecord {
            id: quote.id.clone(),
            account_id: quote.account_id.clone(),
            client_ref: quote.client_ref.clone(),
            description: quote.description.clone(),
            items: serde_json::to_string(&quote.items)?,
            total_ht: quote.total_ht,
            total_ttc: quote.total_ttc,
            deposit_percentage: quote.deposit_percentage,
            deposit_amount: quote.deposit_amount,
            deposit_paid: quote.deposit_paid,
            status: quote.status.to_string(),
            sent_at: format_opt(&quote.sent_at),
            last_reminder_at: format_opt(&quote.last_reminder_at),
            responded_at: format_opt(&quote.responded_at),
            created_at: quote.created_at.to_rfc3339(),
            updated_at: quote.updated_at.to_rfc3339(),
            version: quote.version,
        })
    }
}

impl TryFrom<QuoteRecord> for DomainQuote {
    type Error = anyhow::Error;

    fn try_from(record: QuoteRecord) -> Result<Self> {
        let status = QuoteStatus::from_string(&record.status)
            .map_err(|e| anyhow::anyhow!("Failed to parse quote status: {}", e))?;
        let items: Vec<QuoteItem> = serde_json::from_str(&record.items)
            .map_err(|e| anyhow::anyhow!("Failed to parse quote items: {}", e))?;

        Ok(DomainQuote {
            id: record.id,
            account_id: record.account_id,
            client_ref: record.client_ref,
            description: record.description,
            items,
            total_ht: record.total_ht,
            total_ttc: record.total_ttc,
            deposit_percentage: record.deposit_percentage,
            deposit_amount: record.deposit_amount,
            deposit_paid: record.deposit_paid,
            status,
            sent_at: parse_opt(&record.sent_at)?,
            last_reminder_at: parse_opt(&record.last_reminder_at)?,
            responded_at: parse_opt(&record.responded_at)?,
            created_at: parse_timestamp(&record.created_at)?,
            updated_at: parse_timestamp(&record.updated_at)?,
            version: record.version,
        })
    }
}

/// CSV-based quote repository using per-account files
#[derive(Clone)]
pub struct QuoteRepository {
    connection: CsvConnection,
}

impl QuoteRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn quotes_file_path(&self, account_id: &str) -> PathBuf {
        self.connection.account_directory(account_id).join("quotes.csv")
    }

    fn read_quotes(&self, account_id: &str) -> Result<Vec<DomainQuote>> {
        let path = self.quotes_file_path(account_id);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&path)?;
        let mut csv_reader = Reader::from_reader(BufReader::new(file));
        let mut quotes = Vec::new();

        for result in csv_reader.deserialize::<QuoteRecord>() {
            let record = result?;
            match DomainQuote::try_from(record) {
                Ok(quote) => quotes.push(quote),
                Err(e) => {
                    warn!("Failed to parse quote record: {}. Skipping.", e);
                    continue;
                }
            }
        }

        Ok(quotes)
    }

    fn write_quotes(&self, account_id: &str, quotes: &[DomainQuote]) -> Result<()> {
        self.connection.ensure_account_directory(account_id)?;
        let path = self.quotes_file_path(account_id);
        let temp_path = path.with_extension("csv.tmp");

        {
            let temp_file = File::create(&temp_path)?;
            let mut csv_writer = Writer::from_writer(BufWriter::new(temp_file));
            for quote in quotes {
                csv_writer.serialize(QuoteRecord::try_from(quote)?)?;
            }
            csv_writer.flush()?;
        }

        std::fs::rename(&temp_path, &path)?;
        debug!("Wrote {} quotes to {:?}", quotes.len(), path);
        Ok(())
    }
}

impl QuoteStorage for QuoteRepository {
    fn store_quote(&self, quote: &DomainQuote) -> Result<()> {
        info!("Storing quote in CSV: {}", quote.id);

        let mut quotes = self.read_quotes(&quote.account_id)?;
        if quotes.iter().any(|q| q.id == quote.id) {
            return Err(anyhow::anyhow!("Quote already exists: {}", quote.id));
        }
        quotes.push(quote.clone());
        self.write_quotes(&quote.account_id, &quotes)
    }

    fn get_quote(&self, account_id: &str, quote_id: &str) -> Result<Option<DomainQuote>> {
        let quotes = self.read_quotes(account_id)?;
        Ok(quotes.into_iter().find(|q| q.id == quote_id))
    }

    fn list_quotes(&self, account_id: &str) -> Result<Vec<DomainQuote>> {
        let mut quotes = self.read_quotes(account_id)?;
        quotes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(quotes)
    }

    fn update_quote(&self, quote: &DomainQuote, expected_version: u64) -> Result<DomainQuote> {
        let mut quotes = self.read_quotes(&quote.account_id)?;
        let position = quotes
            .iter()
            .position(|q| q.id == quote.id)
            .ok_or_else(|| anyhow::anyhow!("Quote not found: {}", quote.id))?;

        let stored_version = quotes[position].version;
        if stored_version != expected_version {
            return Err(anyhow::anyhow!(
                "Version conflict: expected version {}, found {}",
                expected_version,
                stored_version
            ));
        }

        let mut updated = quote.clone();
        updated.version = stored_version + 1;
        quotes[position] = updated.clone();
        self.write_quotes(&quote.account_id, &quotes)?;

        info!("Updated quote {} to version {}", updated.id, updated.version);
        Ok(updated)
    }
}
