//! Common types shared across the gladhand workspace.
//!
//! Holds the error type every crate speaks and the tracing setup the binary
//! installs. Kept small so the leaf crates can depend on it freely.
//!
//! - [`observability`]: rolling-file + stderr `tracing` initialisation
//! - [`GladhandError`] and [`Result`]: shared error handling

pub mod observability;

/// Error types used across the gladhand system.
#[derive(thiserror::Error, Debug)]
pub enum GladhandError {
    /// A browser-automation step failed in a way the flow cannot recover from.
    #[error("Automation error: {0}")]
    Automation(String),

    /// A credential environment variable was not set.
    ///
    /// Carries the variable name only; credential values never enter errors
    /// or logs.
    #[error("credential environment variable {var} is not set")]
    MissingCredentials { var: &'static str },

    /// Connecting to an already-running Chrome debugging session failed.
    #[error("could not attach to Chrome on port {port}")]
    Attach {
        port: u16,
        #[source]
        source: anyhow::Error,
    },

    /// A driver (browser, filesystem, etc.) reported an error.
    #[error("Driver error: {0}")]
    Driver(#[from] anyhow::Error),
}

/// Convenient alias for results that use [`GladhandError`].
pub type Result<T> = std::result::Result<T, GladhandError>;
