//! Invoice service domain logic.
//!
//! ## Business Rules
//!
//! - A final invoice against a quote requires that quote's deposit to
//!   be paid, enforced here rather than by a disabled button
//! - A paid invoice can never change status again
//! - Totals are derived from the item lines and the account's VAT rate

use anyhow::Result;
use chrono::Utc;
use log::info;
use std::sync::Arc;

use crate::domain::commands::invoices::{
    CreateInvoiceCommand, InvoiceListQuery, UpdateInvoiceStatusCommand,
};
use crate::domain::models::invoice::{DomainInvoice, InvoiceKind, InvoiceStatus, PolicyViolation};
use crate::domain::models::quote::round2;
use crate::storage::csv::{AccountRepository, CsvConnection, InvoiceRepository, QuoteRepository};
use crate::storage::{AccountStorage, InvoiceStorage, QuoteStorage};

#[derive(Clone)]
pub struct InvoiceService {
    invoice_repository: InvoiceRepository,
    quote_repository: QuoteRepository,
    account_repository: AccountRepository,
}

impl InvoiceService {
    pub fn new(csv_conn: Arc<CsvConnection>) -> Self {
        Self {
            invoice_repository: InvoiceRepository::new((*csv_conn).clone()),
            quote_repository: QuoteRepository::new((*csv_conn).clone()),
            account_repository: AccountRepository::new((*csv_conn).clone()),
        }
    }

    pub fn get_invoice(&self, account_id: &str, invoice_id: &str) -> Result<DomainInvoice> {
        self.invoice_repository
            .get_invoice(account_id, invoice_id)?
            .ok_or_else(|| anyhow::anyhow!("Invoice not found: {}", invoice_id))
    }

    pub fn list_invoices(
        &self,
        account_id: &str,
        query: InvoiceListQuery,
    ) -> Result<Vec<DomainInvoice>> {
        match query.quote_id {
            Some(quote_id) => self
                .invoice_repository
                .list_invoices_for_quote(account_id, &quote_id),
            None => self.invoice_repository.list_invoices(account_id),
        }
    }

    pub fn create_invoice(&self, command: CreateInvoiceCommand) -> Result<DomainInvoice> {
        info!(
            "Creating {} invoice for account {}",
            command.kind.to_string(),
            command.account_id
        );

        if let Some(quote_id) = &command.quote_id {
            let quote = self
                .quote_repository
                .get_quote(&command.account_id, quote_id)?
                .ok_or_else(|| anyhow::anyhow!("Quote not found: {}", quote_id))?;

            if command.kind == InvoiceKind::Final && !quote.deposit_paid {
                return Err(PolicyViolation::DepositNotPaid(quote.id).into());
            }
        }

        let config = self.account_repository.get_config(&command.account_id)?;
        let total_ht = round2(command.items.iter().map(|i| i.line_total()).sum());
        let total_ttc = round2(total_ht * (1.0 + config.vat_rate / 100.0));

        let now = Utc::now();
        let mut millis = now.timestamp_millis() as u64;
        while self
            .invoice_repository
            .get_invoice(&command.account_id, &DomainInvoice::generate_id(millis))?
            .is_some()
        {
            millis += 1;
        }

        let invoice = DomainInvoice {
            id: DomainInvoice::generate_id(millis),
            account_id: command.account_id,
            quote_id: command.quote_id,
            kind: command.kind,
            client_ref: command.client_ref,
            description: command.description,
            items: command.items,
            total_ht,
            total_ttc,
            status: InvoiceStatus::Pending,
            created_at: now,
            paid_at: None,
        };

        self.invoice_repository.store_invoice(&invoice)?;
        info!("Created invoice: {}", invoice.id);
        Ok(invoice)
    }

    pub fn update_status(&self, command: UpdateInvoiceStatusCommand) -> Result<DomainInvoice> {
        let invoice = self.get_invoice(&command.account_id, &command.invoice_id)?;

        if invoice.status == InvoiceStatus::Paid {
            return Err(PolicyViolation::AlreadyPaid.into());
        }

        let mut updated = invoice;
        updated.status = command.status;
        if command.status == InvoiceStatus::Paid {
            updated.paid_at = Some(Utc::now());
        }

        self.invoice_repository.update_invoice(&updated)?;
        info!(
            "Invoice {} is now {}",
            updated.id,
            updated.status.to_string()
        );
        Ok(updated)
    }
}
