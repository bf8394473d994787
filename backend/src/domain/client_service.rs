//! Client record management.

use anyhow::Result;
use chrono::Utc;
use log::info;
use std::sync::Arc;

use crate::domain::commands::clients::{CreateClientCommand, UpdateClientCommand};
use crate::domain::models::client::{ClientValidationError, DomainClient};
use crate::storage::csv::{ClientRepository, CsvConnection};
use crate::storage::ClientStorage;

#[derive(Clone)]
pub struct ClientService {
    client_repository: ClientRepository,
}

impl ClientService {
    pub fn new(csv_conn: Arc<CsvConnection>) -> Self {
        Self {
            client_repository: ClientRepository::new((*csv_conn).clone()),
        }
    }

    pub fn get_client(&self, account_id: &str, client_id: &str) -> Result<DomainClient> {
        self.client_repository
            .get_client(account_id, client_id)?
            .ok_or_else(|| anyhow::anyhow!("Client not found: {}", client_id))
    }

    pub fn list_clients(&self, account_id: &str) -> Result<Vec<DomainClient>> {
        self.client_repository.list_clients(account_id)
    }

    pub fn create_client(&self, command: CreateClientCommand) -> Result<DomainClient> {
        if command.name.trim().is_empty() {
            return Err(ClientValidationError::EmptyName.into());
        }
        if command.email.trim().is_empty() {
            return Err(ClientValidationError::EmptyEmail.into());
        }

        let now = Utc::now();
        let mut millis = now.timestamp_millis() as u64;
        while self
            .client_repository
            .get_client(&command.account_id, &DomainClient::generate_id(millis))?
            .is_some()
        {
            millis += 1;
        }

        let client = DomainClient {
            id: DomainClient::generate_id(millis),
            account_id: command.account_id,
            name: command.name,
            email: command.email,
            phone: command.phone,
            address: command.address,
            created_at: now,
            updated_at: now,
        };

        self.client_repository.store_client(&client)?;
        info!("Created client: {}", client.id);
        Ok(client)
    }

    pub fn update_client(&self, command: UpdateClientCommand) -> Result<DomainClient> {
        let mut client = self.get_client(&command.account_id, &command.client_id)?;

        if let Some(name) = command.name {
            if name.trim().is_empty() {
                return Err(ClientValidationError::EmptyName.into());
            }
            client.name = name;
        }
        if let Some(email) = command.email {
            if email.trim().is_empty() {
                return Err(ClientValidationError::EmptyEmail.into());
            }
            client.email = email;
        }
        if let Some(phone) = command.phone {
            client.phone = phone;
        }
        if let Some(address) = command.address {
            client.address = address;
        }
        client.updated_at = Utc::now();

        self.client_repository.update_client(&client)?;
        Ok(client)
    }

    pub fn delete_client(&self, account_id: &str, client_id: &str) -> Result<()> {
        if !self.client_repository.delete_client(account_id, client_id)? {
            return Err(anyhow::anyhow!("Client not found: {}", client_id));
        }
        Ok(())
    }
}
