//! Search, pagination, and dedup around the per-job apply flow.
//!
//! The [`Runner`] owns the run state: the ledger, the in-run set of covered
//! job ids, and the processed counter behind the compact `Job #N` progress
//! lines. It drives any [`JobBoard`], which keeps the loop testable without
//! a browser.

use crate::apply::ApplyReport;
use crate::ledger::{extract_job_id, ApplicationLog, ApplicationRecord};
use async_trait::async_trait;
use gladhand_common::Result;
use gladhand_config::SettingsSection;
use std::collections::HashSet;
use tracing::{debug, error, info, warn};

/// Board-level operations the runner drives.
///
/// [`JobBoard::pause`] exists so a live session can space its requests out;
/// the default no-op keeps tests instant.
#[async_trait]
pub trait JobBoard {
    /// Type a title into the search box and submit it.
    async fn search_title(&self, title: &str) -> Result<bool>;

    /// URL of the results page currently showing.
    async fn current_results_url(&self) -> Result<String>;

    /// Href of every job card on the current results page.
    async fn collect_job_urls(&self) -> Result<Vec<String>>;

    /// Open a job posting.
    async fn goto_job(&self, url: &str) -> Result<()>;

    /// Run the apply flow against the posting currently open.
    async fn apply_to_current(&self) -> ApplyReport;

    /// Move to the next results page. `false` means the run is out of pages.
    async fn advance_to_next_page(&self, results_url: &str) -> Result<bool>;

    /// Space two actions apart.
    async fn pause(&self, _min_secs: f64, _max_secs: f64) {}
}

pub struct Runner {
    settings: SettingsSection,
    log: ApplicationLog,
    applied: HashSet<String>,
    total_jobs_processed: usize,
}

impl Runner {
    /// Load the ledger and seed the in-run dedup set from it.
    pub fn new(settings: SettingsSection, log: ApplicationLog) -> Self {
        let applied = log.applied_job_ids();
        info!(count = applied.len(), "loaded previously applied jobs");
        Self {
            settings,
            log,
            applied,
            total_jobs_processed: 0,
        }
    }

    /// Jobs seen this run, including ones skipped by dedup.
    pub fn total_jobs_processed(&self) -> usize {
        self.total_jobs_processed
    }

    /// Search every configured title and work through its results.
    pub async fn run_searches(
        &mut self,
        board: &(dyn JobBoard + Send + Sync),
        titles: &[String],
    ) -> Result<()> {
        for title in titles {
            info!(title, "searching for job title");
            if board.search_title(title).await? {
                self.process_results(board).await?;
                board.pause(3.0, 5.0).await;
            } else {
                warn!(title, "search failed, skipping to next title");
            }
        }
        Ok(())
    }

    /// Work through results pages starting from the one currently showing.
    pub async fn process_results(&mut self, board: &(dyn JobBoard + Send + Sync)) -> Result<()> {
        let mut page_number: u32 = 1;

        loop {
            if self.settings.verbose_logging {
                info!(page_number, "processing results page");
            }
            // Pagination rewrites this URL, so grab it before the per-job
            // navigation trashes the browser's location.
            let results_url = board.current_results_url().await?;

            let job_urls = board.collect_job_urls().await?;
            if job_urls.is_empty() {
                warn!("no job urls found, stopping");
                break;
            }
            info!(count = job_urls.len(), page_number, "found job urls");

            for job_url in &job_urls {
                self.process_job(board, job_url).await?;
            }

            if page_number >= self.settings.max_pages {
                debug!(limit = self.settings.max_pages, "page limit reached");
                break;
            }
            if board.advance_to_next_page(&results_url).await? {
                page_number += 1;
            } else {
                if self.settings.verbose_logging {
                    info!("no more pages available");
                }
                break;
            }
        }

        Ok(())
    }

    async fn process_job(
        &mut self,
        board: &(dyn JobBoard + Send + Sync),
        job_url: &str,
    ) -> Result<()> {
        self.total_jobs_processed += 1;
        let verbose = self.settings.verbose_logging;

        let job_id = extract_job_id(job_url);
        if let Some(id) = job_id.as_deref() {
            if self.applied.contains(id) {
                if verbose {
                    info!(job_id = id, "already processed, skipping");
                } else {
                    info!("Job #{}: ⏭️  already processed", self.total_jobs_processed);
                }
                return Ok(());
            }
        }

        board.goto_job(job_url).await?;
        board.pause(1.0, 2.0).await;

        let report = board.apply_to_current().await;
        if verbose {
            debug!(status = %report.status, url = job_url, "job outcome");
        } else {
            info!(
                "Job #{}: {}",
                self.total_jobs_processed,
                report.status.summary_line()
            );
        }

        let record = ApplicationRecord::new(job_url, report.status, report.details);
        if let Err(append_error) = self.log.append(&record) {
            error!(%append_error, "failed to record application");
        }

        if report.status.counts_as_applied() {
            if let Some(id) = job_id {
                self.applied.insert(id);
            }
        }

        board.pause(2.0, 3.0).await;
        Ok(())
    }
}
