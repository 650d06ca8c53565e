//! Handshake automation for Gladhand.
//!
//! This crate holds the job-board flows: the selector inventory, the
//! append-only application ledger, the per-job apply state machine, the live
//! Handshake session, and the runner that ties searches, pagination, and
//! dedup together.
//!
//! # Examples
//! ```
//! use gladhand_bot::ledger::ApplicationLog;
//!
//! let log = ApplicationLog::open("logs/applications_log.json");
//! println!("{} jobs already covered", log.applied_job_ids().len());
//! ```
pub mod apply;
pub mod ledger;
pub mod runner;
pub mod selectors;
pub mod session;
