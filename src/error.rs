//! Bridge Errors
//!
//! Failures surfaced to callers of the bridge. Discovery never produces an
//! error: an exhausted probe is reported as `establish() == false`.

use thiserror::Error;

/// Bridge errors
#[derive(Error, Debug)]
pub enum BridgeError {
    /// A command was issued before an endpoint was established
    #[error("client not connected")]
    NotConnected,

    /// The command request could not complete (refused, timed out, body read failed)
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The companion answered, but the body does not match the reply schema
    #[error("Protocol error (HTTP {status}): {reason}")]
    Protocol { status: u16, reason: String },

    /// Non-success status under the strict status policy
    #[error("Command rejected with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Credential cannot be carried verbatim in a header
    #[error("Invalid credential: must be visible ASCII")]
    InvalidCredential,

    /// Page origin or source path cannot be resolved to an absolute URL
    #[error("Invalid URL '{input}': {reason}")]
    InvalidUrl { input: String, reason: String },
}

impl BridgeError {
    /// Whether the failure happened before anything was sent
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::NotConnected | Self::InvalidCredential | Self::InvalidUrl { .. }
        )
    }
}

/// Result type for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;
