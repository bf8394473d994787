use shared::{Invoice, InvoiceKind, InvoiceStatus};

use super::quote_mapper::QuoteMapper;
use crate::domain::models::invoice::{
    DomainInvoice, InvoiceKind as DomainInvoiceKind, InvoiceStatus as DomainInvoiceStatus,
};

pub struct InvoiceMapper;

impl InvoiceMapper {
    pub fn status_to_domain(dto: InvoiceStatus) -> DomainInvoiceStatus {
        match dto {
            InvoiceStatus::Pending => DomainInvoiceStatus::Pending,
            InvoiceStatus::Paid => DomainInvoiceStatus::Paid,
            InvoiceStatus::Overdue => DomainInvoiceStatus::Overdue,
            InvoiceStatus::Cancelled => DomainInvoiceStatus::Cancelled,
        }
    }

    pub fn status_to_dto(domain: DomainInvoiceStatus) -> InvoiceStatus {
        match domain {
            DomainInvoiceStatus::Pending => InvoiceStatus::Pending,
            DomainInvoiceStatus::Paid => InvoiceStatus::Paid,
            DomainInvoiceStatus::Overdue => InvoiceStatus::Overdue,
            DomainInvoiceStatus::Cancelled => InvoiceStatus::Cancelled,
        }
    }

    pub fn kind_to_domain(dto: InvoiceKind) -> DomainInvoiceKind {
        match dto {
            InvoiceKind::Deposit => DomainInvoiceKind::Deposit,
            InvoiceKind::Final => DomainInvoiceKind::Final,
        }
    }

    pub fn kind_to_dto(domain: DomainInvoiceKind) -> InvoiceKind {
        match domain {
            DomainInvoiceKind::Deposit => InvoiceKind::Deposit,
            DomainInvoiceKind::Final => InvoiceKind::Final,
        }
    }

    pub fn to_dto(domain: DomainInvoice) -> Invoice {
        Invoice {
            id: domain.id,
            account_id: domain.account_id,
            quote_id: domain.quote_id,
            kind: Self::kind_to_dto(domain.kind),
            client_ref: domain.client_ref,
            description: domain.description,
            items: domain
                .items
                .into_iter()
                .map(QuoteMapper::item_to_dto)
                .collect(),
            total_ht: domain.total_ht,
            total_ttc: domain.total_ttc,
            status: Self::status_to_dto(domain.status),
            created_at: domain.created_at.to_rfc3339(),
            paid_at: domain.paid_at.map(|v| v.to_rfc3339()),
        }
    }

    pub fn to_dto_list(invoices: Vec<DomainInvoice>) -> Vec<Invoice> {
        invoices.into_iter().map(Self::to_dto).collect()
    }
}
