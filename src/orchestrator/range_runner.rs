//! Range runner - orchestration layer
//!
//! ## Responsibilities
//!
//! 1. **Identifiers**: turn `region` + `start..=end` into checked identifiers
//! 2. **Concurrency**: at most `processes` records in flight (Semaphore)
//! 3. **Resources**: every record gets its own session, closed on every path
//! 4. **Statistics**: tally outcomes into a [`RunSummary`]
//!
//! Per-record failures are logged and counted here and never stop the run.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tracing::{error, info, warn};

use crate::browser::{BrowserSession, ChromeLauncher, SessionFactory};
use crate::config::Config;
use crate::error::AppError;
use crate::models::checksum::validate_region;
use crate::models::RecordId;
use crate::services::OutputWriter;
use crate::utils::logging;
use crate::workflow::{RecordFlow, RetrievalOutcome};

/// Which books to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeJob {
    pub region: String,
    pub start: u32,
    pub end: u32,
    pub processes: usize,
}

impl RangeJob {
    pub fn len(&self) -> usize {
        if self.start > self.end {
            0
        } else {
            (self.end - self.start) as usize + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rejects a range whose start lies past its end
    pub fn check_bounds(&self) -> Result<()> {
        anyhow::ensure!(
            self.start <= self.end,
            "--start {} is greater than --end {}",
            self.start,
            self.end
        );
        Ok(())
    }
}

/// Outcome counts of a run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    /// All five sections saved
    pub found: usize,
    /// Saved with skipped sections
    pub partial: usize,
    pub not_found: usize,
    pub blocked: usize,
    pub lookup_failed: usize,
    /// Session, IO or task failures
    pub failed: usize,
    /// Identifiers the checksum rejected
    pub invalid: usize,
}

impl RunSummary {
    fn tally(&mut self, record: &RecordId, result: Result<RetrievalOutcome, AppError>) {
        self.total += 1;
        match result {
            Ok(outcome) => match &outcome {
                RetrievalOutcome::Found { .. } if outcome.is_partial() => self.partial += 1,
                RetrievalOutcome::Found { .. } => self.found += 1,
                RetrievalOutcome::NotFound => self.not_found += 1,
                RetrievalOutcome::Blocked { .. } => self.blocked += 1,
                RetrievalOutcome::LookupError { .. } => self.lookup_failed += 1,
            },
            Err(e) => {
                error!("[{}] ❌ Failed: {}", record, e);
                self.failed += 1;
            }
        }
    }
}

/// Main application
pub struct App<F: SessionFactory> {
    config: Arc<Config>,
    factory: Arc<F>,
    flow: Arc<RecordFlow>,
    writer: Arc<OutputWriter>,
}

impl App<ChromeLauncher> {
    /// Validates the config and prepares a Chrome-backed app
    pub fn initialize(config: Config) -> Result<Self, AppError> {
        config.validate()?;
        let launcher = ChromeLauncher::new(&config);
        Ok(Self::with_factory(config, launcher))
    }
}

impl<F: SessionFactory> App<F> {
    pub fn with_factory(config: Config, factory: F) -> Self {
        let writer = Arc::new(OutputWriter::new(&config));
        let flow = Arc::new(RecordFlow::new(&config, writer.clone()));
        Self {
            config: Arc::new(config),
            factory: Arc::new(factory),
            flow,
            writer,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fetches every book of the job
    pub async fn run(&self, job: &RangeJob) -> Result<RunSummary> {
        logging::log_startup(&self.config, job);

        self.writer
            .ensure_directory(self.writer.out_dir())
            .await
            .context("cannot create the output directory")?;

        let semaphore = Arc::new(Semaphore::new(job.processes.max(1)));
        let mut tasks = JoinSet::new();
        let mut summary = RunSummary::default();

        if job.is_empty() {
            warn!("⚠️ Empty range {}..={}, nothing to do", job.start, job.end);
            return Ok(summary);
        }

        if let Err(e) = validate_region(&job.region) {
            warn!("⚠️ Skipping {} numbers of {}: {}", job.len(), job.region, e);
            summary.total = job.len();
            summary.invalid = job.len();
            logging::print_final_stats(&summary, &self.config);
            return Ok(summary);
        }

        for number in job.start..=job.end {
            let record = match RecordId::new(&job.region, number) {
                Ok(record) => record,
                Err(e) => {
                    warn!("⚠️ Skipping {}/{:08}: {}", job.region, number, e);
                    summary.total += 1;
                    summary.invalid += 1;
                    continue;
                }
            };

            let permit = semaphore.clone().acquire_owned().await?;
            info!("📥 Fetching {}", record);

            let factory = self.factory.clone();
            let flow = self.flow.clone();
            tasks.spawn(async move {
                let _permit = permit;
                let outcome = process_record(factory.as_ref(), &flow, &record).await;
                (record, outcome)
            });

            // Collect finished tasks so long ranges don't pile up results
            while let Some(joined) = tasks.try_join_next() {
                tally_joined(&mut summary, joined);
            }
        }

        while let Some(joined) = tasks.join_next().await {
            tally_joined(&mut summary, joined);
        }

        logging::print_final_stats(&summary, &self.config);
        Ok(summary)
    }
}

/// Runs one record in a fresh session and always closes it
pub async fn process_record<F: SessionFactory>(
    factory: &F,
    flow: &RecordFlow,
    record: &RecordId,
) -> Result<RetrievalOutcome, AppError> {
    let session = factory.open().await?;
    let result = flow.run(&session, record).await;

    if let Err(e) = session.close().await {
        warn!("[{}] ⚠️ Failed to close browser session: {}", record, e);
    }

    Ok(result?)
}

fn tally_joined(
    summary: &mut RunSummary,
    joined: Result<(RecordId, Result<RetrievalOutcome, AppError>), JoinError>,
) {
    match joined {
        Ok((record, result)) => summary.tally(&record, result),
        Err(e) => {
            error!("❌ Worker task failed: {}", e);
            summary.total += 1;
            summary.failed += 1;
        }
    }
}
