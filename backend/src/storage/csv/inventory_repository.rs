//! # CSV Inventory Repository
//!
//! File-based stock storage using one `inventory.csv` per account
//! directory.

use anyhow::Result;
use chrono::{DateTime, Utc};
use csv::{Reader, Writer};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use super::connection::CsvConnection;
use crate::domain::models::inventory::DomainInventoryItem;
use crate::storage::InventoryStorage;

/// CSV record structure for inventory items
#[derive(Debug, Clone, Serialize, Deserialize)]
struct InventoryRecord {
    id: String,
    account_id: String,
    name: String,
    reference: String,
    quantity: i64,
    unit_price: f64,
    min_stock: i64,
    category: String,
    created_at: String,
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .map_err(|e| anyhow::anyhow!("Failed to parse timestamp '{}': {}", value, e))?
        .with_timezone(&Utc))
}

impl From<&DomainInventoryItem> for InventoryRecord {
    fn from(item: &DomainInventoryItem) -> Self {
        InventoryRecord {
            id: item.id.clone(),
            account_id: item.account_id.clone(),
            name: item.name.clone(),
            reference: item.reference.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            min_stock: item.min_stock,
            category: item.category.clone(),
            created_at: item.created_at.to_rfc3339(),
        }
    }
}

impl TryFrom<InventoryRecord> for DomainInventoryItem {
    type Error = anyhow::Error;

    fn try_from(record: InventoryRecord) -> Result<Self> {
        Ok(DomainInventoryItem {
            id: record.id,
            account_id: record.account_id,
            name: record.name,
            reference: record.reference,
            quantity: record.quantity,
            unit_price: record.unit_price,
            min_stock: record.min_stock,
            category: record.category,
            created_at: parse_timestamp(&record.created_at)?,
        })
    }
}

/// CSV-based inventory repository using per-account files
#[derive(Clone)]
pub struct InventoryRepository {
    connection: CsvConnection,
}

impl InventoryRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn inventory_file_path(&self, account_id: &str) -> PathBuf {
        self.connection
            .account_directory(account_id)
            .join("inventory.csv")
    }

    fn read_items(&self, account_id: &str) -> Result<Vec<DomainInventoryItem>> {
        let path = self.inventory_file_path(account_id);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&path)?;
        let mut csv_reader = Reader::from_reader(BufReader::new(file));
        let mut items = Vec::new();

        for result in csv_reader.deserialize::<InventoryRecord>() {
            let record = result?;
            match DomainInventoryItem::try_from(record) {
                Ok(item) => items.push(item),
                Err(e) => {
                    warn!("Failed to parse inventory record: {}. Skipping.", e);
                    continue;
                }
            }
        }

        Ok(items)
    }

    fn write_items(&self, account_id: &str, items: &[DomainInventoryItem]) -> Result<()> {
        self.connection.ensure_account_directory(account_id)?;
        let path = self.inventory_file_path(account_id);
        let temp_path = path.with_extension("csv.tmp");

        {
            let temp_file = File::create(&temp_path)?;
            let mut csv_writer = Writer::from_writer(BufWriter::new(temp_file));
            for item in items {
                csv_writer.serialize(InventoryRecord::from(item))?;
            }
            csv_writer.flush()?;
        }

        std::fs::rename(&temp_path, &path)?;
        debug!("Wrote {} inventory items to {:?}", items.len(), path);
        Ok(())
    }
}

impl InventoryStorage for InventoryRepository {
    fn store_item(&self, item: &DomainInventoryItem) -> Result<()> {
        info!("Storing inventory item in CSV: {}", item.id);

        let mut items = self.read_items(&item.account_id)?;
        if items.iter().any(|i| i.id == item.id) {
            return Err(anyhow::anyhow!("Inventory item already exists: {}", item.id));
        }
        items.push(item.clone());
        self.write_items(&item.account_id, &items)
    }

    fn get_item(&self, account_id: &str, item_id: &str) -> Result<Option<DomainInventoryItem>> {
        let items = self.read_items(account_id)?;
        Ok(items.into_iter().find(|i| i.id == item_id))
    }

    fn list_items(&self, account_id: &str) -> Result<Vec<DomainInventoryItem>> {
        let mut items = self.read_items(account_id)?;
        items.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(items)
    }

    fn update_item(&self, item: &DomainInventoryItem) -> Result<()> {
        let mut items = self.read_items(&item.account_id)?;
        let position = items
            .iter()
            .position(|i| i.id == item.id)
            .ok_or_else(|| anyhow::anyhow!("Inventory item not found: {}", item.id))?;

        items[position] = item.clone();
        self.write_items(&item.account_id, &items)?;
        info!("Updated inventory item: {}", item.id);
        Ok(())
    }

    fn delete_item(&self, account_id: &str, item_id: &str) -> Result<bool> {
        let mut items = self.read_items(account_id)?;
        let before = items.len();
        items.retain(|i| i.id != item_id);
        if items.len() == before {
            return Ok(false);
        }
        self.write_items(account_id, &items)?;
        info!("Deleted inventory item: {}", item_id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (InventoryRepository, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let connection = CsvConnection::new(temp_dir.path()).expect("Failed to create connection");
        (InventoryRepository::new(connection), temp_dir)
    }

    fn sample_item(id: &str, name: &str, quantity: i64) -> DomainInventoryItem {
        DomainInventoryItem {
            id: id.to_string(),
            account_id: "account::1".to_string(),
            name: name.to_string(),
            reference: "REF-001".to_string(),
            quantity,
            unit_price: 4.5,
            min_stock: 10,
            category: "Matériaux".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_store_update_and_delete_item() {
        let (repo, _temp_dir) = setup();
        let item = sample_item("item::1", "Tube cuivre 15mm", 25);

        repo.store_item(&item).expect("Failed to store item");

        let mut restocked = item.clone();
        restocked.quantity = 40;
        repo.update_item(&restocked).expect("Failed to update item");

        let retrieved = repo.get_item("account::1", "item::1").unwrap().unwrap();
        assert_eq!(retrieved.quantity, 40);

        assert!(repo.delete_item("account::1", "item::1").unwrap());
        assert!(repo.get_item("account::1", "item::1").unwrap().is_none());
    }

    #[test]
    fn test_low_stock_survives_round_trip() {
        let (repo, _temp_dir) = setup();
        repo.store_item(&sample_item("item::1", "Joint fibre", 3)).unwrap();

        let items = repo.list_items("account::1").unwrap();
        assert!(items[0].is_low_stock());
    }
}
