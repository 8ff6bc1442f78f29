//! Error types for flocksim_core.
//!
//! Numerical degeneracies inside a tick are recovered locally and never show
//! up here. These errors cover what the caller can act on: bad parameters and
//! correlation requests that cannot produce a meaningful answer.

use thiserror::Error;

/// Main error type for flocksim_core operations.
#[derive(Error, Debug)]
pub enum SimError {
    /// Construction parameters outside their domain
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// TOML parsing errors
    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Correlation request parameters outside their domain
    #[error("Invalid correlation request: {0}")]
    InvalidRequest(String),

    /// Snapshot with no usable fluctuation signal
    #[error("Degenerate sample: {0}")]
    DegenerateSample(String),

    /// Background task dropped its channel without answering
    #[error("Correlation task disconnected")]
    TaskDisconnected,
}

/// Result type alias for flocksim_core operations.
pub type Result<T> = std::result::Result<T, SimError>;

impl SimError {
    /// Creates a new configuration error.
    #[must_use]
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Creates a new request error.
    #[must_use]
    pub fn invalid_request<S: Into<String>>(msg: S) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Creates a new degenerate sample error.
    #[must_use]
    pub fn degenerate<S: Into<String>>(msg: S) -> Self {
        Self::DegenerateSample(msg.into())
    }
}

/// Returns `InvalidConfig` with the message when the condition fails.
macro_rules! ensure_config {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::error::SimError::InvalidConfig(format!($($arg)+)));
        }
    };
}

pub(crate) use ensure_config;
