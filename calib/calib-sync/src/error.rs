//! Error types for calib-sync crate.

use calib_types::Timestamp;
use thiserror::Error;

/// Errors that can occur in synchronization operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A sample was older than the one before it.
    #[error("out of order sample: {timestamp} after {previous}")]
    OutOfOrder {
        /// Last accepted timestamp.
        previous: Timestamp,
        /// Rejected timestamp.
        timestamp: Timestamp,
    },
}

impl SyncError {
    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }

    /// Creates an out of order error.
    #[must_use]
    pub const fn out_of_order(previous: Timestamp, timestamp: Timestamp) -> Self {
        Self::OutOfOrder {
            previous,
            timestamp,
        }
    }
}

/// Result type for synchronization operations.
pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_invalid_config() {
        let err = SyncError::invalid_config("tick step must be positive");
        assert!(err.to_string().contains("invalid configuration"));
    }

    #[test]
    fn error_out_of_order() {
        let err = SyncError::out_of_order(Timestamp::from_nanos(200), Timestamp::from_nanos(100));
        let msg = err.to_string();
        assert!(msg.contains("100ns"));
        assert!(msg.contains("200ns"));
    }
}
