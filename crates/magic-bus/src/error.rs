//! Error types for the magic bus.
//!
//! Posting never fails and mailbox failures travel the bus as
//! [`FailedMessage`](crate::FailedMessage)s, so the only errors surfaced to
//! callers come from building a bus with bad configuration.

use thiserror::Error;

/// Errors from bus construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    /// Configuration failed validation.
    #[error("Invalid bus configuration: {0}")]
    InvalidConfig(String),

    /// An environment variable held an unparsable value.
    #[error("Invalid value {value:?} for environment variable {name}")]
    InvalidEnvVar {
        /// Variable name.
        name: &'static str,
        /// Raw value found.
        value: String,
    },
}
