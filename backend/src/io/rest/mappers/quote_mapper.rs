use anyhow::Result;
use shared::{Quote, QuoteEventDto, QuoteItem, QuoteStatus};

use super::job_mapper::JobMapper;
use crate::domain::lifecycle::QuoteEvent;
use crate::domain::models::quote::{
    DomainQuote, QuoteItem as DomainQuoteItem, QuoteStatus as DomainQuoteStatus,
};

pub struct QuoteMapper;

impl QuoteMapper {
    pub fn status_to_dto(status: DomainQuoteStatus) -> QuoteStatus {
        match status {
            DomainQuoteStatus::Draft => QuoteStatus::Draft,
            DomainQuoteStatus::Sent => QuoteStatus::Sent,
            DomainQuoteStatus::Stale => QuoteStatus::Stale,
            DomainQuoteStatus::Accepted => QuoteStatus::Accepted,
            DomainQuoteStatus::RefusedManual => QuoteStatus::RefusedManual,
            DomainQuoteStatus::RefusedAuto => QuoteStatus::RefusedAuto,
            DomainQuoteStatus::Archived => QuoteStatus::Archived,
        }
    }

    pub fn item_to_domain(dto: QuoteItem) -> DomainQuoteItem {
        DomainQuoteItem {
            description: dto.description,
            quantity: dto.quantity,
            unit_price: dto.unit_price,
        }
    }

    pub fn item_to_dto(domain: DomainQuoteItem) -> QuoteItem {
        QuoteItem {
            description: domain.description,
            quantity: domain.quantity,
            unit_price: domain.unit_price,
        }
    }

    pub fn items_to_domain(items: Vec<QuoteItem>) -> Vec<DomainQuoteItem> {
        items.into_iter().map(Self::item_to_domain).collect()
    }

    /// Convert a wire event to the engine's event type. Date ranges are
    /// validated here so the engine only ever sees well-formed ones.
    pub fn event_to_domain(dto: QuoteEventDto) -> Result<QuoteEvent> {
        Ok(match dto {
            QuoteEventDto::ArtisanSent => QuoteEvent::ArtisanSent,
            QuoteEventDto::ClientAccepted => QuoteEvent::ClientAccepted,
            QuoteEventDto::ClientProposedAlternate { range } => {
                QuoteEvent::ClientProposedAlternate(JobMapper::range_to_domain(range)?)
            }
            QuoteEventDto::ArtisanConfirmedDates => QuoteEvent::ArtisanConfirmedDates,
            QuoteEventDto::ArtisanMarkedRefused => QuoteEvent::ArtisanMarkedRefused,
            QuoteEventDto::ArtisanSentReminder => QuoteEvent::ArtisanSentReminder,
            QuoteEventDto::PaymentReceived => QuoteEvent::PaymentReceived,
        })
    }

    pub fn to_dto(domain: DomainQuote) -> Quote {
        Quote {
            id: domain.id,
            account_id: domain.account_id,
            client_ref: domain.client_ref,
            description: domain.description,
            items: domain.items.into_iter().map(Self::item_to_dto).collect(),
            total_ht: domain.total_ht,
            total_ttc: domain.total_ttc,
            deposit_percentage: domain.deposit_percentage,
            deposit_amount: domain.deposit_amount,
            deposit_paid: domain.deposit_paid,
            status: Self::status_to_dto(domain.status),
            sent_at: domain.sent_at.map(|v| v.to_rfc3339()),
            last_reminder_at: domain.last_reminder_at.map(|v| v.to_rfc3339()),
            responded_at: domain.responded_at.map(|v| v.to_rfc3339()),
            created_at: domain.created_at.to_rfc3339(),
            updated_at: domain.updated_at.to_rfc3339(),
            version: domain.version,
        }
    }

    pub fn to_dto_list(quotes: Vec<DomainQuote>) -> Vec<Quote> {
        quotes.into_iter().map(Self::to_dto).collect()
    }
}
