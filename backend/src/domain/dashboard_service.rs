//! Read-only aggregates for the dashboard home screen.

use anyhow::Result;
use std::sync::Arc;

use crate::domain::commands::dashboard::DashboardStats;
use crate::domain::models::invoice::InvoiceStatus;
use crate::domain::models::quote::{round2, QuoteStatus};
use crate::storage::csv::{CsvConnection, InventoryRepository, InvoiceRepository, QuoteRepository};
use crate::storage::{InventoryStorage, InvoiceStorage, QuoteStorage};

#[derive(Clone)]
pub struct DashboardService {
    quote_repository: QuoteRepository,
    invoice_repository: InvoiceRepository,
    inventory_repository: InventoryRepository,
}

impl DashboardService {
    pub fn new(csv_conn: Arc<CsvConnection>) -> Self {
        Self {
            quote_repository: QuoteRepository::new((*csv_conn).clone()),
            invoice_repository: InvoiceRepository::new((*csv_conn).clone()),
            inventory_repository: InventoryRepository::new((*csv_conn).clone()),
        }
    }

    pub fn get_stats(&self, account_id: &str) -> Result<DashboardStats> {
        let quotes = self.quote_repository.list_quotes(account_id)?;
        let invoices = self.invoice_repository.list_invoices(account_id)?;
        let items = self.inventory_repository.list_items(account_id)?;

        let total_revenue = round2(
            invoices
                .iter()
                .filter(|i| i.status == InvoiceStatus::Paid)
                .map(|i| i.total_ttc)
                .sum(),
        );
        // Overdue invoices are still awaiting payment.
        let pending_invoices = invoices
            .iter()
            .filter(|i| matches!(i.status, InvoiceStatus::Pending | InvoiceStatus::Overdue))
            .count();
        let pending_quotes = quotes
            .iter()
            .filter(|q| q.status == QuoteStatus::Draft)
            .count();
        let low_stock_items = items.iter().filter(|i| i.is_low_stock()).count();

        Ok(DashboardStats {
            total_revenue,
            pending_invoices,
            pending_quotes,
            low_stock_items,
            total_quotes: quotes.len(),
            total_invoices: invoices.len(),
            total_inventory_items: items.len(),
        })
    }
}
