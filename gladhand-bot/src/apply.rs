//! Per-job apply flow.
//!
//! One call drives an open job posting to a terminal [`ApplicationStatus`]:
//! external postings are skipped, a missing apply control is read as an
//! application already on file, and an apply modal that survives submission
//! means required questions were left unanswered. The flow never returns an
//! error; anything that breaks mid-way collapses into
//! [`ApplicationStatus::Error`] so the caller can record it and move on.

use crate::ledger::{ApplicationStatus, JobDetails};
use async_trait::async_trait;
use gladhand_common::{GladhandError, Result};
use tracing::{debug, warn};

/// Counts of controls answered while filling the form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillSummary {
    pub documents: usize,
    pub dropdowns: usize,
    pub text_inputs: usize,
    pub radios: usize,
    pub checkboxes: usize,
}

/// What the flow decided for one job.
#[derive(Debug, Clone)]
pub struct ApplyReport {
    pub status: ApplicationStatus,
    pub details: JobDetails,
}

/// The pieces of a job posting page the apply flow needs.
///
/// Absence of a control is data here, not a fault: probes return `Ok(false)`
/// when the page simply does not have the element, and reserve `Err` for a
/// broken session.
#[async_trait]
pub trait ApplyPage {
    /// Probe for an external-application control.
    async fn external_apply_present(&self) -> Result<bool>;

    /// Find and click the apply control. `false` means none was there.
    async fn open_application_form(&self) -> Result<bool>;

    /// Answer every required field on the form.
    async fn fill_required_fields(&self) -> Result<FillSummary>;

    /// Find and click the submit control. `false` means none was there.
    async fn submit_application(&self) -> Result<bool>;

    /// Whether the apply modal disappeared after submission.
    async fn apply_modal_gone(&self) -> Result<bool>;

    /// Scrape title, employer, location, and employment type.
    async fn capture_details(&self) -> Result<JobDetails>;
}

/// Drive the posting that `page` is currently showing to an outcome.
pub async fn run_apply_flow(page: &(dyn ApplyPage + Send + Sync)) -> ApplyReport {
    match attempt(page).await {
        Ok(report) => report,
        Err(error) => {
            warn!(%error, "apply flow failed");
            ApplyReport {
                status: ApplicationStatus::Error,
                details: capture_or_empty(page).await,
            }
        }
    }
}

async fn attempt(page: &(dyn ApplyPage + Send + Sync)) -> Result<ApplyReport> {
    if page.external_apply_present().await? {
        debug!("external application required, skipping");
        return Ok(ApplyReport {
            status: ApplicationStatus::ExternalApplication,
            details: capture_or_empty(page).await,
        });
    }

    if !page.open_application_form().await? {
        debug!("no apply control found, application already on file");
        return Ok(ApplyReport {
            status: ApplicationStatus::AlreadyApplied,
            details: capture_or_empty(page).await,
        });
    }

    match page.fill_required_fields().await {
        Ok(summary) => debug!(
            documents = summary.documents,
            dropdowns = summary.dropdowns,
            text_inputs = summary.text_inputs,
            radios = summary.radios,
            checkboxes = summary.checkboxes,
            "application form filled"
        ),
        // Submission still gets a chance: a partially filled form sometimes
        // has every required answer already.
        Err(error) => warn!(%error, "form fill incomplete"),
    }

    if !page.submit_application().await? {
        return Err(GladhandError::Automation(
            "submit control not found".to_string(),
        ));
    }

    match page.apply_modal_gone().await {
        Ok(true) => {
            debug!("apply modal closed, application went through");
            Ok(ApplyReport {
                status: ApplicationStatus::Applied,
                details: capture_or_empty(page).await,
            })
        }
        Ok(false) => {
            debug!("apply modal still present, submission did not complete");
            Ok(ApplyReport {
                status: ApplicationStatus::UnansweredQuestions,
                details: capture_or_empty(page).await,
            })
        }
        // The probe itself broke. The click did land, so record the
        // application with a bare entry instead of dropping it.
        Err(error) => {
            warn!(%error, "could not confirm modal state after submit");
            Ok(ApplyReport {
                status: ApplicationStatus::Applied,
                details: JobDetails::default(),
            })
        }
    }
}

async fn capture_or_empty(page: &(dyn ApplyPage + Send + Sync)) -> JobDetails {
    match page.capture_details().await {
        Ok(details) => details,
        Err(error) => {
            warn!(%error, "could not extract job details");
            JobDetails::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FakePage {
        external: bool,
        apply_found: bool,
        fill_fails: bool,
        submit_found: bool,
        // None scripts a probe failure instead of an answer.
        modal_gone: Option<bool>,
        details_fail: bool,
        calls: Mutex<Vec<&'static str>>,
    }

    impl FakePage {
        fn clean_submission() -> Self {
            Self {
                external: false,
                apply_found: true,
                fill_fails: false,
                submit_found: true,
                modal_gone: Some(true),
                details_fail: false,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn called(&self, op: &'static str) {
            self.calls.lock().unwrap().push(op);
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ApplyPage for FakePage {
        async fn external_apply_present(&self) -> Result<bool> {
            self.called("external");
            Ok(self.external)
        }

        async fn open_application_form(&self) -> Result<bool> {
            self.called("open");
            Ok(self.apply_found)
        }

        async fn fill_required_fields(&self) -> Result<FillSummary> {
            self.called("fill");
            if self.fill_fails {
                return Err(GladhandError::Automation("stale field".to_string()));
            }
            Ok(FillSummary {
                text_inputs: 1,
                radios: 1,
                ..FillSummary::default()
            })
        }

        async fn submit_application(&self) -> Result<bool> {
            self.called("submit");
            Ok(self.submit_found)
        }

        async fn apply_modal_gone(&self) -> Result<bool> {
            self.called("modal");
            self.modal_gone
                .ok_or_else(|| GladhandError::Automation("lost session".to_string()))
        }

        async fn capture_details(&self) -> Result<JobDetails> {
            self.called("details");
            if self.details_fail {
                return Err(GladhandError::Automation("no heading".to_string()));
            }
            Ok(JobDetails {
                job_title: Some("Data Analyst".to_string()),
                employer: Some("Acme Corp".to_string()),
                ..JobDetails::default()
            })
        }
    }

    #[tokio::test]
    async fn external_posting_short_circuits() {
        let page = FakePage {
            external: true,
            ..FakePage::clean_submission()
        };

        let report = run_apply_flow(&page).await;
        assert_eq!(report.status, ApplicationStatus::ExternalApplication);
        assert_eq!(page.calls(), ["external", "details"]);
    }

    #[tokio::test]
    async fn missing_apply_control_reads_as_already_applied() {
        let page = FakePage {
            apply_found: false,
            ..FakePage::clean_submission()
        };

        let report = run_apply_flow(&page).await;
        assert_eq!(report.status, ApplicationStatus::AlreadyApplied);
        assert!(!page.calls().contains(&"fill"));
        assert!(!page.calls().contains(&"submit"));
    }

    #[tokio::test]
    async fn clean_submission_is_applied_with_details() {
        let page = FakePage::clean_submission();

        let report = run_apply_flow(&page).await;
        assert_eq!(report.status, ApplicationStatus::Applied);
        assert_eq!(report.details.job_title.as_deref(), Some("Data Analyst"));
        assert_eq!(
            page.calls(),
            ["external", "open", "fill", "submit", "modal", "details"]
        );
    }

    #[tokio::test]
    async fn lingering_modal_means_unanswered_questions() {
        let page = FakePage {
            modal_gone: Some(false),
            ..FakePage::clean_submission()
        };

        let report = run_apply_flow(&page).await;
        assert_eq!(report.status, ApplicationStatus::UnansweredQuestions);
    }

    #[tokio::test]
    async fn modal_probe_failure_still_counts_the_application() {
        let page = FakePage {
            modal_gone: None,
            ..FakePage::clean_submission()
        };

        let report = run_apply_flow(&page).await;
        assert_eq!(report.status, ApplicationStatus::Applied);
        assert_eq!(report.details, JobDetails::default());
        assert!(!page.calls().contains(&"details"));
    }

    #[tokio::test]
    async fn fill_failure_still_reaches_submission() {
        let page = FakePage {
            fill_fails: true,
            ..FakePage::clean_submission()
        };

        let report = run_apply_flow(&page).await;
        assert_eq!(report.status, ApplicationStatus::Applied);
        assert!(page.calls().contains(&"submit"));
    }

    #[tokio::test]
    async fn missing_submit_control_is_an_error() {
        let page = FakePage {
            submit_found: false,
            ..FakePage::clean_submission()
        };

        let report = run_apply_flow(&page).await;
        assert_eq!(report.status, ApplicationStatus::Error);
        assert!(!page.calls().contains(&"modal"));
    }

    #[tokio::test]
    async fn detail_capture_failure_keeps_the_outcome() {
        let page = FakePage {
            details_fail: true,
            ..FakePage::clean_submission()
        };

        let report = run_apply_flow(&page).await;
        assert_eq!(report.status, ApplicationStatus::Applied);
        assert_eq!(report.details, JobDetails::default());
    }
}
