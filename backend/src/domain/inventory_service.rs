//! Stock management: CRUD plus the low-stock report.

use anyhow::Result;
use chrono::Utc;
use log::info;
use std::sync::Arc;

use crate::domain::commands::inventory::{
    CreateInventoryItemCommand, UpdateInventoryQuantityCommand,
};
use crate::domain::models::inventory::{DomainInventoryItem, InventoryValidationError};
use crate::storage::csv::{CsvConnection, InventoryRepository};
use crate::storage::InventoryStorage;

const DEFAULT_MIN_STOCK: i64 = 10;
const DEFAULT_CATEGORY: &str = "Matériaux";

#[derive(Clone)]
pub struct InventoryService {
    inventory_repository: InventoryRepository,
}

impl InventoryService {
    pub fn new(csv_conn: Arc<CsvConnection>) -> Self {
        Self {
            inventory_repository: InventoryRepository::new((*csv_conn).clone()),
        }
    }

    pub fn get_item(&self, account_id: &str, item_id: &str) -> Result<DomainInventoryItem> {
        self.inventory_repository
            .get_item(account_id, item_id)?
            .ok_or_else(|| anyhow::anyhow!("Inventory item not found: {}", item_id))
    }

    pub fn list_items(&self, account_id: &str) -> Result<Vec<DomainInventoryItem>> {
        self.inventory_repository.list_items(account_id)
    }

    /// Items at or below their reorder threshold.
    pub fn list_low_stock(&self, account_id: &str) -> Result<Vec<DomainInventoryItem>> {
        let items = self.inventory_repository.list_items(account_id)?;
        Ok(items.into_iter().filter(|i| i.is_low_stock()).collect())
    }

    pub fn create_item(&self, command: CreateInventoryItemCommand) -> Result<DomainInventoryItem> {
        if command.name.trim().is_empty() {
            return Err(InventoryValidationError::EmptyName.into());
        }
        if command.reference.trim().is_empty() {
            return Err(InventoryValidationError::EmptyReference.into());
        }
        if command.quantity < 0 {
            return Err(InventoryValidationError::NegativeQuantity.into());
        }
        if command.unit_price < 0.0 {
            return Err(InventoryValidationError::NegativeUnitPrice.into());
        }

        let now = Utc::now();
        let mut millis = now.timestamp_millis() as u64;
        while self
            .inventory_repository
            .get_item(&command.account_id, &DomainInventoryItem::generate_id(millis))?
            .is_some()
        {
            millis += 1;
        }

        let item = DomainInventoryItem {
            id: DomainInventoryItem::generate_id(millis),
            account_id: command.account_id,
            name: command.name,
            reference: command.reference,
            quantity: command.quantity,
            unit_price: command.unit_price,
            min_stock: command.min_stock.unwrap_or(DEFAULT_MIN_STOCK),
            category: command
                .category
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            created_at: now,
        };

        self.inventory_repository.store_item(&item)?;
        info!("Created inventory item: {}", item.id);
        Ok(item)
    }

    pub fn update_quantity(
        &self,
        command: UpdateInventoryQuantityCommand,
    ) -> Result<DomainInventoryItem> {
        if command.quantity < 0 {
            return Err(InventoryValidationError::NegativeQuantity.into());
        }

        let mut item = self.get_item(&command.account_id, &command.item_id)?;
        item.quantity = command.quantity;
        self.inventory_repository.update_item(&item)?;

        if item.is_low_stock() {
            info!(
                "Item {} is low on stock: {} <= {}",
                item.id, item.quantity, item.min_stock
            );
        }
        Ok(item)
    }

    pub fn delete_item(&self, account_id: &str, item_id: &str) -> Result<()> {
        if !self.inventory_repository.delete_item(account_id, item_id)? {
            return Err(anyhow::anyhow!("Inventory item not found: {}", item_id));
        }
        Ok(())
    }
}
