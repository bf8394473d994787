use shared::{Account, AccountConfig, UpdateAccountConfigRequest};

use crate::domain::models::account::{
    AccountConfig as DomainAccountConfig, DomainAccount,
};

pub struct AccountMapper;

impl AccountMapper {
    pub fn to_dto(domain: DomainAccount) -> Account {
        Account {
            id: domain.id,
            company_name: domain.company_name,
            created_at: domain.created_at.to_rfc3339(),
        }
    }

    pub fn to_dto_list(accounts: Vec<DomainAccount>) -> Vec<Account> {
        accounts.into_iter().map(Self::to_dto).collect()
    }

    pub fn config_to_dto(domain: DomainAccountConfig) -> AccountConfig {
        AccountConfig {
            company_name: domain.company_name,
            hourly_rate: domain.hourly_rate,
            margin_percentage: domain.margin_percentage,
            deposit_percentage: domain.deposit_percentage,
            vat_rate: domain.vat_rate,
            iban: domain.iban,
            bic: domain.bic,
        }
    }

    /// Apply a partial update request on top of the current config.
    pub fn merge_config_request(
        current: DomainAccountConfig,
        request: UpdateAccountConfigRequest,
    ) -> DomainAccountConfig {
        DomainAccountConfig {
            company_name: request.company_name.unwrap_or(current.company_name),
            hourly_rate: request.hourly_rate.unwrap_or(current.hourly_rate),
            margin_percentage: request
                .margin_percentage
                .unwrap_or(current.margin_percentage),
            deposit_percentage: request
                .deposit_percentage
                .unwrap_or(current.deposit_percentage),
            vat_rate: request.vat_rate.unwrap_or(current.vat_rate),
            iban: request.iban.unwrap_or(current.iban),
            bic: request.bic.unwrap_or(current.bic),
        }
    }
}
