use shared::Client;

use crate::domain::models::client::DomainClient;

pub struct ClientMapper;

impl ClientMapper {
    pub fn to_dto(domain: DomainClient) -> Client {
        Client {
            id: domain.id,
            account_id: domain.account_id,
            name: domain.name,
            email: domain.email,
            phone: domain.phone,
            address: domain.address,
            created_at: domain.created_at.to_rfc3339(),
            updated_at: domain.updated_at.to_rfc3339(),
        }
    }

    pub fn to_dto_list(clients: Vec<DomainClient>) -> Vec<Client> {
        clients.into_iter().map(Self::to_dto).collect()
    }
}
