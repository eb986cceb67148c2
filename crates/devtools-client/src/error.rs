//! The error type returned by every client operation.

use std::time::Duration;

use devtools_core::protocol::describe_remote_error;
use serde_json::Value;
use thiserror::Error;

/// Failure of a session-level operation or of a single command.
///
/// Every variant that belongs to a command carries the method name.  No
/// variant is retried automatically.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The discovery endpoint could not be queried or returned garbage.
    #[error("target discovery at {url} failed: {reason}")]
    Discovery { url: String, reason: String },

    /// The target's connection is missing, failed to open, or was lost.
    #[error("connection to target {target} unavailable for `{method}`: {reason}")]
    Connection {
        target: usize,
        method: String,
        reason: String,
    },

    /// No page target matched a focus query and strict focus is enabled.
    #[error("no page target title contains {query:?}")]
    FocusMiss { query: String },

    /// A target index outside the discovered list.
    #[error("no target at index {index} ({count} targets discovered)")]
    UnknownTarget { index: usize, count: usize },

    /// The target answered with an `error` field, kept verbatim in `payload`.
    #[error("`{method}` failed: {}", describe_remote_error(.payload))]
    Protocol { method: String, payload: Value },

    /// A frame received while the call was pending could not be decoded.
    #[error("malformed message while waiting for `{method}`: {reason}")]
    MalformedMessage { method: String, reason: String },

    /// No reply arrived within the configured call timeout.
    #[error("`{method}` timed out after {after:?}")]
    Timeout { method: String, after: Duration },
}

impl ClientError {
    /// The method a command-level error belongs to.
    pub fn method(&self) -> Option<&str> {
        match self {
            Self::Connection { method, .. }
            | Self::Protocol { method, .. }
            | Self::MalformedMessage { method, .. }
            | Self::Timeout { method, .. } => Some(method),
            Self::Discovery { .. } | Self::FocusMiss { .. } | Self::UnknownTarget { .. } => None,
        }
    }

    /// The remote `error` payload of a [`ClientError::Protocol`].
    pub fn remote_error(&self) -> Option<&Value> {
        match self {
            Self::Protocol { payload, .. } => Some(payload),
            _ => None,
        }
    }
}
