//! Job service domain logic.
//!
//! Thin persistence wrapper around the pure scheduling functions. Every
//! mutating call carries the caller's expected version.

use anyhow::Result;
use chrono::Utc;
use log::info;
use std::sync::Arc;

use crate::domain::commands::jobs::{
    AdvanceJobsCommand, AdvanceJobsResult, ClientDateResponseCommand, CompleteJobCommand,
    ConfirmDatesCommand, ProposeDatesCommand,
};
use crate::domain::models::job::DomainJob;
use crate::domain::scheduling;
use crate::storage::csv::{CsvConnection, JobRepository};
use crate::storage::JobStorage;

#[derive(Clone)]
pub struct JobService {
    job_repository: JobRepository,
}

impl JobService {
    pub fn new(csv_conn: Arc<CsvConnection>) -> Self {
        Self {
            job_repository: JobRepository::new((*csv_conn).clone()),
        }
    }

    pub fn get_job(&self, account_id: &str, job_id: &str) -> Result<DomainJob> {
        self.job_repository
            .get_job(account_id, job_id)?
            .ok_or_else(|| anyhow::anyhow!("Job not found: {}", job_id))
    }

    pub fn list_jobs(&self, account_id: &str) -> Result<Vec<DomainJob>> {
        self.job_repository.list_jobs(account_id)
    }

    pub fn propose_dates(&self, command: ProposeDatesCommand) -> Result<DomainJob> {
        let job = self.get_job(&command.account_id, &command.job_id)?;
        let updated = scheduling::propose_dates(&job, command.range, Utc::now())?;
        self.job_repository
            .update_job(&updated, command.expected_version)
    }

    pub fn record_client_response(&self, command: ClientDateResponseCommand) -> Result<DomainJob> {
        let job = self.get_job(&command.account_id, &command.job_id)?;
        let updated = scheduling::record_client_response(&job, &command.response, Utc::now())?;
        self.job_repository
            .update_job(&updated, command.expected_version)
    }

    pub fn confirm_dates(&self, command: ConfirmDatesCommand) -> Result<DomainJob> {
        let job = self.get_job(&command.account_id, &command.job_id)?;
        let updated = scheduling::confirm_dates(&job, Utc::now())?;
        let planned = self
            .job_repository
            .update_job(&updated, command.expected_version)?;
        info!("Job planned: {}", planned.id);
        Ok(planned)
    }

    pub fn complete_job(&self, command: CompleteJobCommand) -> Result<DomainJob> {
        let job = self.get_job(&command.account_id, &command.job_id)?;
        let updated = scheduling::mark_completed(&job, Utc::now())?;
        self.job_repository
            .update_job(&updated, command.expected_version)
    }

    /// Start every planned job whose start date has arrived.
    pub fn advance_jobs(&self, command: AdvanceJobsCommand) -> Result<AdvanceJobsResult> {
        let jobs = self.job_repository.list_jobs(&command.account_id)?;
        let mut started_job_ids = Vec::new();
        let now = Utc::now();

        for job in jobs {
            if let Some(started) = scheduling::advance_if_due(&job, command.today, now) {
                self.job_repository.update_job(&started, job.version)?;
                info!("Job started: {}", started.id);
                started_job_ids.push(started.id);
            }
        }

        Ok(AdvanceJobsResult { started_job_ids })
    }
}
