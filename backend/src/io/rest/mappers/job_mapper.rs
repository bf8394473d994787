use anyhow::Result;
use chrono::NaiveDate;
use shared::{ClientDateResponseDto, DateRange, Job, JobStatus};

use crate::domain::models::job::{
    ClientDateResponse, DateRange as DomainDateRange, DomainJob, JobStatus as DomainJobStatus,
};

pub struct JobMapper;

impl JobMapper {
    pub fn status_to_dto(status: DomainJobStatus) -> JobStatus {
        match status {
            DomainJobStatus::AwaitingClientResponse => JobStatus::AwaitingClientResponse,
            DomainJobStatus::ClientAcceptedDates => JobStatus::ClientAcceptedDates,
            DomainJobStatus::ClientProposedAlternate => JobStatus::ClientProposedAlternate,
            DomainJobStatus::Planned => JobStatus::Planned,
            DomainJobStatus::InProgress => JobStatus::InProgress,
            DomainJobStatus::Completed => JobStatus::Completed,
        }
    }

    pub fn range_to_domain(dto: DateRange) -> Result<DomainDateRange> {
        let start = NaiveDate::parse_from_str(&dto.start, "%Y-%m-%d")
            .map_err(|e| anyhow::anyhow!("Invalid start date '{}': {}", dto.start, e))?;
        let end = NaiveDate::parse_from_str(&dto.end, "%Y-%m-%d")
            .map_err(|e| anyhow::anyhow!("Invalid end date '{}': {}", dto.end, e))?;
        Ok(DomainDateRange::new(start, end)?)
    }

    pub fn range_to_dto(domain: DomainDateRange) -> DateRange {
        DateRange {
            start: domain.start.to_string(),
            end: domain.end.to_string(),
        }
    }

    pub fn response_to_domain(dto: ClientDateResponseDto) -> Result<ClientDateResponse> {
        Ok(match dto {
            ClientDateResponseDto::Accept => ClientDateResponse::Accept,
            ClientDateResponseDto::Counter { range } => {
                ClientDateResponse::Counter(Self::range_to_domain(range)?)
            }
        })
    }

    pub fn to_dto(domain: DomainJob) -> Job {
        Job {
            id: domain.id,
            quote_id: domain.quote_id,
            account_id: domain.account_id,
            proposed_range: domain.proposed_range.map(Self::range_to_dto),
            counter_range: domain.counter_range.map(Self::range_to_dto),
            status: Self::status_to_dto(domain.status),
            created_at: domain.created_at.to_rfc3339(),
            updated_at: domain.updated_at.to_rfc3339(),
            version: domain.version,
        }
    }

    pub fn to_dto_list(jobs: Vec<DomainJob>) -> Vec<Job> {
        jobs.into_iter().map(Self::to_dto).collect()
    }
}
