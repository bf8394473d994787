//! # CSV Client Repository
//!
//! File-based client record storage using one `clients.csv` per
//! account directory.

use anyhow::Result;
use chrono::{DateTime, Utc};
use csv::{Reader, Writer};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use super::connection::CsvConnection;
use crate::domain::models::client::DomainClient;
use crate::storage::ClientStorage;

/// CSV record structure for clients
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ClientRecord {
    id: String,
    account_id: String,
    name: String,
    email: String,
    phone: String,
    address: String,
    created_at: String,
    updated_at: String,
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .map_err(|e| anyhow::anyhow!("Failed to parse timestamp '{}': {}", value, e))?
        .with_timezone(&Utc))
}

impl From<&DomainClient> for ClientRecord {
    fn from(client: &DomainClient) -> Self {
        ClientRecord {
            id: client.id.clone(),
            account_id: client.account_id.clone(),
            name: client.name.clone(),
            email: client.email.clone(),
            phone: client.phone.clone(),
            address: client.address.clone(),
            created_at: client.created_at.to_rfc3339(),
            updated_at: client.updated_at.to_rfc3339(),
        }
    }
}

impl TryFrom<ClientRecord> for DomainClient {
    type Error = anyhow::Error;

    fn try_from(record: ClientRecord) -> Result<Self> {
        Ok(DomainClient {
            id: record.id,
            account_id: record.account_id,
            name: record.name,
            email: record.email,
            phone: record.phone,
            address: record.address,
            created_at: parse_timestamp(&record.created_at)?,
            updated_at: parse_timestamp(&record.updated_at)?,
        })
    }
}

/// CSV-based client repository using per-account files
#[derive(Clone)]
pub struct ClientRepository {
    connection: CsvConnection,
}

impl ClientRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn clients_file_path(&self, account_id: &str) -> PathBuf {
        self.connection
            .account_directory(account_id)
            .join("clients.csv")
    }

    fn read_clients(&self, account_id: &str) -> Result<Vec<DomainClient>> {
        let path = self.clients_file_path(account_id);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&path)?;
        let mut csv_reader = Reader::from_reader(BufReader::new(file));
        let mut clients = Vec::new();

        for result in csv_reader.deserialize::<ClientRecord>() {
            let record = result?;
            match DomainClient::try_from(record) {
                Ok(client) => clients.push(client),
                Err(e) => {
                    warn!("Failed to parse client record: {}. Skipping.", e);
                    continue;
                }
            }
        }

        Ok(clients)
    }

    fn write_clients(&self, account_id: &str, clients: &[DomainClient]) -> Result<()> {
        self.connection.ensure_account_directory(account_id)?;
        let path = self.clients_file_path(account_id);
        let temp_path = path.with_extension("csv.tmp");

        {
            let temp_file = File::create(&temp_path)?;
            let mut csv_writer = Writer::from_writer(BufWriter::new(temp_file));
            for client in clients {
                csv_writer.serialize(ClientRecord::from(client))?;
            }
            csv_writer.flush()?;
        }

        std::fs::rename(&temp_path, &path)?;
        debug!("Wrote {} clients to {:?}", clients.len(), path);
        Ok(())
    }
}

impl ClientStorage for ClientRepository {
    fn store_client(&self, client: &DomainClient) -> Result<()> {
        info!("Storing client in CSV: {}", client.id);

        let mut clients = self.read_clients(&client.account_id)?;
        if clients.iter().any(|c| c.id == client.id) {
            return Err(anyhow::anyhow!("Client already exists: {}", client.id));
        }
        clients.push(client.clone());
        self.write_clients(&client.account_id, &clients)
    }

    fn get_client(&self, account_id: &str, client_id: &str) -> Result<Option<DomainClient>> {
        let clients = self.read_clients(account_id)?;
        Ok(clients.into_iter().find(|c| c.id == client_id))
    }

    fn list_clients(&self, account_id: &str) -> Result<Vec<DomainClient>> {
        let mut clients = self.read_clients(account_id)?;
        clients.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(clients)
    }

    fn update_client(&self, client: &DomainClient) -> Result<()> {
        let mut clients = self.read_clients(&client.account_id)?;
        let position = clients
            .iter()
            .position(|c| c.id == client.id)
            .ok_or_else(|| anyhow::anyhow!("Client not found: {}", client.id))?;

        clients[position] = client.clone();
        self.write_clients(&client.account_id, &clients)?;
        info!("Updated client: {}", client.id);
        Ok(())
    }

    fn delete_client(&self, account_id: &str, client_id: &str) -> Result<bool> {
        let mut clients = self.read_clients(account_id)?;
        let before = clients.len();
        clients.retain(|c| c.id != client_id);
        if clients.len() == before {
            return Ok(false);
        }
        self.write_clients(account_id, &clients)?;
        info!("Deleted client: {}", client_id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (ClientRepository, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let connection = CsvConnection::new(temp_dir.path()).expect("Failed to create connection");
        (ClientRepository::new(connection), temp_dir)
    }

    fn sample_client(id: &str, name: &str) -> DomainClient {
        let now = Utc::now();
        DomainClient {
            id: id.to_string(),
            account_id: "account::1".to_string(),
            name: name.to_string(),
            email: format!("{}@example.fr", name.to_lowercase()),
            phone: "06 12 34 56 78".to_string(),
            address: "12 rue des Lilas, Lyon".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_store_get_and_delete_client() {
        let (repo, _temp_dir) = setup();
        let client = sample_client("client::1", "Durand");

        repo.store_client(&client).expect("Failed to store client");
        let retrieved = repo
            .get_client("account::1", "client::1")
            .unwrap()
            .expect("Client should exist");
        assert_eq!(retrieved.name, "Durand");

        assert!(repo.delete_client("account::1", "client::1").unwrap());
        assert!(!repo.delete_client("account::1", "client::1").unwrap());
        assert!(repo.get_client("account::1", "client::1").unwrap().is_none());
    }

    #[test]
    fn test_list_is_ordered_by_name() {
        let (repo, _temp_dir) = setup();
        repo.store_client(&sample_client("client::1", "Martin")).unwrap();
        repo.store_client(&sample_client("client::2", "Bernard")).unwrap();

        let clients = repo.list_clients("account::1").unwrap();
        assert_eq!(clients[0].name, "Bernard");
        assert_eq!(clients[1].name, "Martin");
    }
}
