//! # CSV Job Repository
//!
//! File-based job storage using one `jobs.csv` per account directory.
//! Date ranges are stored as `start/end` ISO date pairs.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use csv::{Reader, Writer};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use super::connection::CsvConnection;
use crate::domain::models::job::{DateRange, DomainJob, JobStatus};
use crate::storage::JobStorage;

/// CSV record structure for jobs
#[derive(Debug, Clone, Serialize, Deserialize)]
struct JobRecord {
    id: String,
    quote_id: String,
    account_id: String,
    proposed_range: String,
    counter_range: String,
    status: String,
    created_at: String,
    updated_at: String,
    version: u64,
}

fn format_range(range: &Option<DateRange>) -> String {
    range
        .map(|r| format!("{}/{}", r.start, r.end))
        .unwrap_or_default()
}

fn parse_range(value: &str) -> Result<Option<DateRange>> {
    if value.is_empty() {
        return Ok(None);
    }
    let (start, end) = value
        .split_once('/')
        .ok_or_else(|| anyhow::anyhow!("Malformed date range: {}", value))?;
    let start = NaiveDate::parse_from_str(start, "%Y-%m-%d")
        .map_err(|e| anyhow::anyhow!("Failed to parse range start '{}': {}", start, e))?;
    let end = NaiveDate::parse_from_str(end, "%Y-%m-%d")
        .map_err(|e| anyhow::anyhow!("Failed to parse range end '{}': {}", end, e))?;
    let range = DateRange::new(start, end)
        .map_err(|e| anyhow::anyhow!("Invalid stored date range: {}", e))?;
    Ok(Some(range))
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .map_err(|e| anyhow::anyhow!("Failed to parse timestamp '{}': {}", value, e))?
        .with_timezone(&Utc))
}

impl From<&DomainJob> for JobRecord {
    fn from(job: &DomainJob) -> Self {
        JobRecord {
            id: job.id.clone(),
            quote_id: job.quote_id.clone(),
            account_id: job.account_id.clone(),
            proposed_range: format_range(&job.proposed_range),
            counter_range: format_range(&job.counter_range),
            status: job.status.to_string(),
            created_at: job.created_at.to_rfc3339(),
            updated_at: job.updated_at.to_rfc3339(),
            version: job.version,
        }
    }
}

impl TryFrom<JobRecord> for DomainJob {
    type Error = anyhow::Error;

    fn try_from(record: JobRecord) -> Result<Self> {
        let status = JobStatus::from_string(&record.status)
            .map_err(|e| anyhow::anyhow!("Failed to parse job status: {}", e))?;

        Ok(DomainJob {
            id: record.id,
            quote_id: record.quote_id,
            account_id: record.account_id,
            proposed_range: parse_range(&record.proposed_range)?,
            counter_range: parse_range(&record.counter_range)?,
            status,
            created_at: parse_timestamp(&record.created_at)?,
            updated_at: parse_timestamp(&record.updated_at)?,
            version: record.version,
        })
    }
}

/// CSV-based job repository using per-account files
#[derive(Clone)]
pub struct JobRepository {
    connection: CsvConnection,
}

impl JobRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn jobs_file_path(&self, account_id: &str) -> PathBuf {
        self.connection.account_directory(account_id).join("jobs.csv")
    }

    fn read_jobs(&self, account_id: &str) -> Result<Vec<DomainJob>> {
        let path = self.jobs_file_path(account_id);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&path)?;
        let mut csv_reader = Reader::from_reader(BufReader::new(file));
        let mut jobs = Vec::new();

        for result in csv_reader.deserialize::<JobRecord>() {
            let record = result?;
            match DomainJob::try_from(record) {
                Ok(job) => jobs.push(job),
                Err(e) => {
                    warn!("Failed to parse job record: {}. Skipping.", e);
                    continue;
                }
            }
        }

        Ok(jobs)
    }

    fn write_jobs(&self, account_id: &str, jobs: &[DomainJob]) -> Result<()> {
        self.connection.ensure_account_directory(account_id)?;
        let path = self.jobs_file_path(account_id);
        let temp_path = path.with_extension("csv.tmp");

        {
            let temp_file = File::create(&temp_path)?;
            let mut csv_writer = Writer::from_writer(BufWriter::new(temp_file));
            for job in jobs {
                csv_writer.serialize(JobRecord::from(job))?;
            }
            csv_writer.flush()?;
        }

        std::fs::rename(&temp_path, &path)?;
        debug!("Wrote {} jobs to {:?}", jobs.len(), path);
        Ok(())
    }
}

impl JobStorage for JobRepository {
    fn store_job(&self, job: &DomainJob) -> Result<()> {
        info!("Storing job in CSV: {}", job.id);

        let mut jobs = self.read_jobs(&job.account_id)?;
        if jobs.iter().any(|j| j.id == job.id) {
            return Err(anyhow::anyhow!("Job already exists: {}", job.id));
        }
        jobs.push(job.clone());
        self.write_jobs(&job.account_id, &jobs)
    }

    fn get_job(&self, account_id: &str, job_id: &str) -> Result<Option<DomainJob>> {
        let jobs = self.read_jobs(account_id)?;
        Ok(jobs.into_iter().find(|j| j.id == job_id))
    }

    fn get_job_for_quote(&self, account_id: &str, quote_id: &str) -> Result<Option<DomainJob>> {
        let jobs = self.read_jobs(account_id)?;
        Ok(jobs.into_iter().find(|j| j.quote_id == quote_id))
    }

    fn list_jobs(&self, account_id: &str) -> Result<Vec<DomainJob>> {
        let mut jobs = self.read_jobs(account_id)?;
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(jobs)
    }

    fn update_job(&self, job: &DomainJob, expected_version: u64) -> Result<DomainJob> {
        let mut jobs = self.read_jobs(&job.account_id)?;
        let position = jobs
            .iter()
            .position(|j| j.id == job.id)
            .ok_or_else(|| anyhow::anyhow!("Job not found: {}", job.id))?;

        let stored_version = jobs[position].version;
        if stored_version != expected_version {
            return Err(anyhow::anyhow!(
                "Version conflict: expected version {}, found {}",
                expected_version,
                stored_version
            ));
        }

        let mut updated = job.clone();
        updated.version = stored_version + 1;
        jobs[position] = updated.clone();
        self.write_jobs(&job.account_id, &jobs)?;

        info!("Updated job {} to version {}", updated.id, updated.version);
        Ok(updated)
    }
}
