//! Append-only record of every application attempt.
//!
//! The ledger is one JSON array on disk, pretty-printed so it stays easy to
//! inspect by hand. Each run reloads it to rebuild the set of job ids that
//! need no second visit, then appends one record per processed job.

use anyhow::Context;
use chrono::Local;
use gladhand_common::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Where the ledger lives unless the caller picks another spot.
pub const DEFAULT_LOG_PATH: &str = "logs/applications_log.json";

/// Local time, filesystem-safe.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Outcome of one job visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Applied,
    AlreadyApplied,
    ExternalApplication,
    UnansweredQuestions,
    Error,
}

impl ApplicationStatus {
    /// Whether the job counts as covered for the rest of this run.
    ///
    /// External and unanswered outcomes stay out of the in-run set; if the
    /// same posting surfaces again on a later page it gets another look.
    pub fn counts_as_applied(&self) -> bool {
        matches!(self, Self::Applied | Self::AlreadyApplied)
    }

    /// One-line summary for the per-job progress output.
    pub fn summary_line(&self) -> &'static str {
        match self {
            Self::Applied => "✅ applied",
            Self::AlreadyApplied => "🏎️  already applied",
            Self::ExternalApplication => "🔗 external application",
            Self::UnansweredQuestions => "❌ unanswered questions",
            Self::Error => "❌ error",
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Applied => "applied",
            Self::AlreadyApplied => "already_applied",
            Self::ExternalApplication => "external_application",
            Self::UnansweredQuestions => "unanswered_questions",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

/// Job metadata scraped from the posting page. Every field is best-effort;
/// absent ones are omitted from the serialized record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employment_type: Option<String>,
}

/// One ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub timestamp: String,
    pub url: String,
    pub status: ApplicationStatus,
    #[serde(flatten)]
    pub details: JobDetails,
}

impl ApplicationRecord {
    /// Stamp a record with the current local time.
    pub fn new(url: impl Into<String>, status: ApplicationStatus, details: JobDetails) -> Self {
        Self {
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            url: url.into(),
            status,
            details,
        }
    }
}

/// Handle on the ledger file.
pub struct ApplicationLog {
    path: PathBuf,
}

impl ApplicationLog {
    /// Point at a ledger file. The file does not have to exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every record currently on disk.
    ///
    /// A missing file is an empty ledger. An unreadable one is logged and
    /// treated as empty rather than aborting the run.
    pub fn records(&self) -> Vec<ApplicationRecord> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(error) => {
                warn!(path = %self.path.display(), %error, "application log unreadable, starting empty");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(error) => {
                warn!(path = %self.path.display(), %error, "application log corrupt, starting empty");
                Vec::new()
            }
        }
    }

    /// Rebuild the set of job ids that need no further visit.
    ///
    /// Errored attempts are left out so they are retried on the next run.
    pub fn applied_job_ids(&self) -> HashSet<String> {
        self.records()
            .iter()
            .filter(|record| record.status != ApplicationStatus::Error)
            .filter_map(|record| extract_job_id(&record.url))
            .collect()
    }

    /// Append one record, rewriting the array in place.
    pub fn append(&self, record: &ApplicationRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create log directory: {}", parent.display()))?;
        }

        let mut records = self.records();
        records.push(record.clone());

        let serialized =
            serde_json::to_string_pretty(&records).context("failed to serialize application log")?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("failed to write {}", self.path.display()))?;

        debug!(path = %self.path.display(), total = records.len(), "application recorded");
        Ok(())
    }
}

/// Pull the numeric job id out of a posting URL.
pub fn extract_job_id(url: &str) -> Option<String> {
    let re = Regex::new(r"/jobs/(\d+)").ok()?;
    re.captures(url)
        .and_then(|caps| caps.get(1).map(|m| m.as_str().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(url: &str, status: ApplicationStatus) -> ApplicationRecord {
        ApplicationRecord::new(url, status, JobDetails::default())
    }

    #[test]
    fn extracts_job_id_from_posting_urls() {
        assert_eq!(
            extract_job_id("https://app.joinhandshake.com/stu/jobs/9876543?searchId=ab12"),
            Some("9876543".to_string())
        );
        assert_eq!(
            extract_job_id("https://app.joinhandshake.com/stu/jobs/123/share_preview"),
            Some("123".to_string())
        );
        assert_eq!(
            extract_job_id("https://app.joinhandshake.com/stu/postings?page=2"),
            None
        );
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let tmp = TempDir::new().expect("tempdir");
        let log = ApplicationLog::open(tmp.path().join("applications_log.json"));
        assert!(log.records().is_empty());
        assert!(log.applied_job_ids().is_empty());
    }

    #[test]
    fn corrupt_file_reads_as_empty() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("applications_log.json");
        fs::write(&path, "{ not an array").expect("write");

        let log = ApplicationLog::open(&path);
        assert!(log.records().is_empty());
    }

    #[test]
    fn append_creates_parent_and_preserves_order_across_reopens() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("logs").join("applications_log.json");

        let log = ApplicationLog::open(&path);
        log.append(&record("https://x/jobs/1", ApplicationStatus::Applied))
            .expect("append");
        log.append(&record("https://x/jobs/2", ApplicationStatus::ExternalApplication))
            .expect("append");

        let reopened = ApplicationLog::open(&path);
        reopened
            .append(&record("https://x/jobs/3", ApplicationStatus::Error))
            .expect("append");

        let urls: Vec<String> = reopened
            .records()
            .into_iter()
            .map(|record| record.url)
            .collect();
        assert_eq!(urls, ["https://x/jobs/1", "https://x/jobs/2", "https://x/jobs/3"]);
    }

    #[test]
    fn applied_ids_skip_errors_and_collapse_duplicates() {
        let tmp = TempDir::new().expect("tempdir");
        let log = ApplicationLog::open(tmp.path().join("applications_log.json"));

        log.append(&record("https://x/jobs/111", ApplicationStatus::Applied))
            .expect("append");
        log.append(&record("https://x/jobs/222", ApplicationStatus::Error))
            .expect("append");
        log.append(&record("https://x/jobs/333", ApplicationStatus::ExternalApplication))
            .expect("append");
        log.append(&record("https://x/jobs/111", ApplicationStatus::AlreadyApplied))
            .expect("append");
        // No extractable id; contributes nothing to the set.
        log.append(&record("https://x/postings?page=2", ApplicationStatus::Applied))
            .expect("append");

        let ids = log.applied_job_ids();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains("111"));
        assert!(ids.contains("333"));
        assert!(!ids.contains("222"), "errored jobs are retried next run");
    }

    #[test]
    fn statuses_serialize_snake_case() {
        let json = serde_json::to_string(&ApplicationStatus::UnansweredQuestions).expect("json");
        assert_eq!(json, "\"unanswered_questions\"");

        let back: ApplicationStatus = serde_json::from_str("\"already_applied\"").expect("parse");
        assert_eq!(back, ApplicationStatus::AlreadyApplied);
    }

    #[test]
    fn record_serializes_flat_and_omits_absent_details() {
        let bare = record("https://x/jobs/5", ApplicationStatus::Applied);
        let value = serde_json::to_value(&bare).expect("value");
        assert!(value.get("job_title").is_none());
        assert_eq!(value["status"], "applied");

        let full = ApplicationRecord::new(
            "https://x/jobs/6",
            ApplicationStatus::Applied,
            JobDetails {
                job_title: Some("Junior Data Analyst".to_string()),
                employer: Some("Acme Corp".to_string()),
                location: Some("Remote".to_string()),
                employment_type: Some("Full-Time".to_string()),
            },
        );
        let value = serde_json::to_value(&full).expect("value");
        assert_eq!(value["job_title"], "Junior Data Analyst");
        assert_eq!(value["employer"], "Acme Corp");
    }

    #[test]
    fn only_terminal_outcomes_count_as_applied() {
        assert!(ApplicationStatus::Applied.counts_as_applied());
        assert!(ApplicationStatus::AlreadyApplied.counts_as_applied());
        assert!(!ApplicationStatus::ExternalApplication.counts_as_applied());
        assert!(!ApplicationStatus::UnansweredQuestions.counts_as_applied());
        assert!(!ApplicationStatus::Error.counts_as_applied());
    }
}
