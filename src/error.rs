//! Error types for the activity meter.

use thiserror::Error;

/// Result type alias for actimeter operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while setting up or stopping the meter.
///
/// The steady-state path (absorbing input, ticking the engine) is infallible;
/// everything here comes from startup, shutdown or configuration.
#[derive(Debug, Error)]
pub enum Error {
    /// The scheduler or pump is already running.
    #[error("meter is already running")]
    AlreadyRunning,

    /// The scheduler or pump is not running.
    #[error("meter is not running")]
    NotRunning,

    /// A resource the meter needs (scheduler thread, pump thread) could not be acquired.
    #[error("resource unavailable: {0}")]
    ResourceUnavailable(String),

    /// The configuration is out of range or could not be parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Thread-related error.
    #[error("thread error: {0}")]
    ThreadError(String),

    /// Other errors.
    #[error("{0}")]
    Other(String),
}
