//! Error types for the configuration engine
//!
//! Domain failures are typed so callers can tell a retryable save failure
//! from a programming error. Application glue wraps these in `anyhow`.

use thiserror::Error;

use crate::gateway::GatewayError;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Field name outside the closed field set (version skew or typo)
    #[error("unknown configuration field: {0}")]
    UnknownField(String),

    /// Operation does not fit the field's cardinality
    #[error("field '{field}' does not accept {operation}")]
    FieldShape {
        field: &'static str,
        operation: &'static str,
    },

    /// Per-field hydration read failed; the field degrades to absent
    #[error("failed to read field '{field}': {source}")]
    GatewayRead {
        field: String,
        #[source]
        source: GatewayError,
    },

    /// Save write failed; the working configuration is kept for retry
    #[error("failed to save configuration: {0}")]
    GatewaySave(#[source] GatewayError),

    /// Enumerating or deleting persisted fields failed; the view is not reloaded
    #[error("failed to clear configuration: {0}")]
    GatewayClear(#[source] GatewayError),

    /// A save or clear is in flight
    #[error("cannot accept changes while {0} is in progress")]
    Busy(&'static str),

    /// The panel was closed or reset; the session must be reopened
    #[error("configuration session has ended ({0})")]
    SessionEnded(&'static str),
}

impl ConfigError {
    /// Whether retrying the same action can succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ConfigError::GatewaySave(_) | ConfigError::GatewayClear(_) | ConfigError::Busy(_)
        )
    }
}
