//! Error types for the policy pipeline.

use crate::model::Response;
use std::fmt;
use thiserror::Error;

/// Reason code attached to a transport-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    ConnectionRefused,
    DnsFailure,
    Other,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Timeout => "timeout",
            Self::ConnectionRefused => "connection-refused",
            Self::DnsFailure => "dns-failure",
            Self::Other => "other",
        };
        f.write_str(s)
    }
}

/// A failure reported by the transport adapter for one physical attempt.
///
/// All transport-level failures are treated as transient by the retry policy.
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct TransportFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl TransportFailure {
    #[must_use]
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Terminal error surfaced by `Pipeline::execute`.
///
/// Only two outcomes cross the pipeline boundary as errors: transport-level
/// exhaustion (with the terminal cause attached) and retryable-status
/// exhaustion (with the last observed response attached). Non-retryable
/// client errors (4xx other than 429) are returned as normal responses.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport failed after {attempts} attempt(s): {failure}")]
    Transport {
        attempts: u32,
        #[source]
        failure: TransportFailure,
    },
    #[error("retries exhausted after {attempts} attempt(s); last status {status}", status = response.status)]
    Exhausted { attempts: u32, response: Response },
}

impl TransportError {
    /// Status of the last observed response, if any attempt got that far.
    #[must_use]
    pub fn last_status(&self) -> Option<u16> {
        match self {
            Self::Transport { .. } => None,
            Self::Exhausted { response, .. } => Some(response.status),
        }
    }
}
