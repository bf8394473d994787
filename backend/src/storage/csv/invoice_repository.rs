//! # CSV Invoice Repository
//!
//! File-based invoice storage using one `invoices.csv` per account
//! directory. Line items are a JSON column, as in the quote file.

use anyhow::Result;
use chrono::{DateTime, Utc};
use csv::{Reader, Writer};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use super::connection::CsvConnection;
use crate::domain::models::invoice::{DomainInvoice, InvoiceKind, InvoiceStatus};
use crate::domain::models::quote::QuoteItem;
use crate::storage::InvoiceStorage;

/// CSV record structure for invoices
#[derive(Debug, Clone, Serialize, Deserialize)]
struct InvoiceRecord {
    id: String,
    account_id: String,
    quote_id: String,
    kind: String,
    client_ref: String,
    description: String,
    items: String,
    total_ht: f64,
    total_ttc: f64,
    status: String,
    created_at: String,
    paid_at: String,
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .map_err(|e| anyhow::anyhow!("Failed to parse timestamp '{}': {}", value, e))?
        .with_timezone(&Utc))
}

impl TryFrom<&DomainInvoice> for InvoiceRecord {
    type Error = anyhow::Error;

    fn try_from(invoice: &DomainInvoice) -> Result<Self> {
        Ok(InvoiceRecord {
            id: invoice.id.clone(),
            account_id: invoice.account_id.clone(),
            quote_id: invoice.quote_id.clone().unwrap_or_default(),
            kind: invoice.kind.to_string(),
            client_ref: invoice.client_ref.clone(),
            description: invoice.description.clone(),
            items: serde_json::to_string(&invoice.items)?,
            total_ht: invoice.total_ht,
            total_ttc: invoice.total_ttc,
            status: invoice.status.to_string(),
            created_at: invoice.created_at.to_rfc3339(),
            paid_at: invoice.paid_at.map(|v| v.to_rfc3339()).unwrap_or_default(),
        })
    }
}

impl TryFrom<InvoiceRecord> for DomainInvoice {
    type Error = anyhow::Error;

    fn try_from(record: InvoiceRecord) -> Result<Self> {
        let status = InvoiceStatus::from_string(&record.status)
            .map_err(|e| anyhow::anyhow!("Failed to parse invoice status: {}", e))?;
        let kind = InvoiceKind::from_string(&record.kind)
            .map_err(|e| anyhow::anyhow!("Failed to parse invoice kind: {}", e))?;
        let items: Vec<QuoteItem> = serde_json::from_str(&record.items)
            .map_err(|e| anyhow::anyhow!("Failed to parse invoice items: {}", e))?;

        Ok(DomainInvoice {
            id: record.id,
            account_id: record.account_id,
            quote_id: if record.quote_id.is_empty() {
                None
            } else {
                Some(record.quote_id)
            },
            kind,
            client_ref: record.client_ref,
            description: record.description,
            items,
            total_ht: record.total_ht,
            total_ttc: record.total_ttc,
            status,
            created_at: parse_timestamp(&record.created_at)?,
            paid_at: if record.paid_at.is_empty() {
                None
            } else {
                Some(parse_timestamp(&record.paid_at)?)
            },
        })
    }
}

/// CSV-based invoice repository using per-account files
#[derive(Clone)]
pub struct InvoiceRepository {
    connection: CsvConnection,
}

impl InvoiceRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn invoices_file_path(&self, account_id: &str) -> PathBuf {
        self.connection
            .account_directory(account_id)
            .join("invoices.csv")
    }

    fn read_invoices(&self, account_id: &str) -> Result<Vec<DomainInvoice>> {
        let path = self.invoices_file_path(account_id);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&path)?;
        let mut csv_reader = Reader::from_reader(BufReader::new(file));
        let mut invoices = Vec::new();

        for result in csv_reader.deserialize::<InvoiceRecord>() {
            let record = result?;
            match DomainInvoice::try_from(record) {
                Ok(invoice) => invoices.push(invoice),
                Err(e) => {
                    warn!("Failed to parse invoice record: {}. Skipping.", e);
                    continue;
                }
            }
        }

        Ok(invoices)
    }

    fn write_invoices(&self, account_id: &str, invoices: &[DomainInvoice]) -> Result<()> {
        self.connection.ensure_account_directory(account_id)?;
        let path = self.invoices_file_path(account_id);
        let temp_path = path.with_extension("csv.tmp");

        {
            let temp_file = File::create(&temp_path)?;
            let mut csv_writer = Writer::from_writer(BufWriter::new(temp_file));
            for invoice in invoices {
                csv_writer.serialize(InvoiceRecord::try_from(invoice)?)?;
            }
            csv_writer.flush()?;
        }

        std::fs::rename(&temp_path, &path)?;
        debug!("Wrote {} invoices to {:?}", invoices.len(), path);
        Ok(())
    }
}

impl InvoiceStorage for InvoiceRepository {
    fn store_invoice(&self, invoice: &DomainInvoice) -> Result<()> {
        info!("Storing invoice in CSV: {}", invoice.id);

        let mut invoices = self.read_invoices(&invoice.account_id)?;
        if invoices.iter().any(|i| i.id == invoice.id) {
            return Err(anyhow::anyhow!("Invoice already exists: {}", invoice.id));
        }
        invoices.push(invoice.clone());
        self.write_invoices(&invoice.account_id, &invoices)
    }

    fn get_invoice(&self, account_id: &str, invoice_id: &str) -> Result<Option<DomainInvoice>> {
        let invoices = self.read_invoices(account_id)?;
        Ok(invoices.into_iter().find(|i| i.id == invoice_id))
    }

    fn list_invoices(&self, account_id: &str) -> Result<Vec<DomainInvoice>> {
        let mut invoices = self.read_invoices(account_id)?;
        invoices.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(invoices)
    }

    fn list_invoices_for_quote(
        &self,
        account_id: &str,
        quote_id: &str,
    ) -> Result<Vec<DomainInvoice>> {
        let invoices = self.read_invoices(account_id)?;
        Ok(invoices
            .into_iter()
            .filter(|i| i.quote_id.as_deref() == Some(quote_id))
            .collect())
    }

    fn update_invoice(&self, invoice: &DomainInvoice) -> Result<()> {
        let mut invoices = self.read_invoices(&invoice.account_id)?;
        let position = invoices
            .iter()
            .position(|i| i.id == invoice.id)
            .ok_or_else(|| anyhow::anyhow!("Invoice not found: {}", invoice.id))?;

        invoices[position] = invoice.clone();
        self.write_invoices(&invoice.account_id, &invoices)?;
        info!("Updated invoice: {}", invoice.id);
        Ok(())
    }
}
