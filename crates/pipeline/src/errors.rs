//! Error taxonomy and retry-policy types for the fetch pipeline.
//!
//! [`MinerError`] is what every pipeline entry point returns. It wraps exactly
//! three families:
//!
//! - [`RemoteAccessError`]: the remote API could not be reached or refused the
//!   request. Never retried by the pipeline; [`RemoteAccessError::retry_policy`]
//!   tells the caller whether a retry at a higher level makes sense.
//! - [`MalformedRecordError`]: a raw record lacks a field the normalizers
//!   cannot default. Aborts the invocation instead of dropping the row.
//! - [`InvalidArgumentError`]: a caller-supplied argument was rejected before
//!   any remote call was issued.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Timestamp;

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether an error condition is safe to retry and, if so, after what delay.
///
/// The pipeline itself never retries; this is advice for the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// The operation may be retried.
    Retryable {
        /// Minimum back-off before the next attempt (e.g. derived from
        /// `x-ratelimit-reset`). `None` means apply the caller's own schedule.
        after: Option<Duration>,
    },
    /// Retrying will not help; a human has to change credentials or input.
    NonRetryable,
}

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Errors returned by the commit and issue pipelines.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MinerError {
    /// The remote API failed or refused the request.
    #[error(transparent)]
    RemoteAccess(#[from] RemoteAccessError),

    /// A raw record could not be normalized.
    #[error(transparent)]
    MalformedRecord(#[from] MalformedRecordError),

    /// A caller-supplied argument was invalid.
    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgumentError),
}

// ---------------------------------------------------------------------------
// Remote access
// ---------------------------------------------------------------------------

/// Failure to obtain data from the remote API.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RemoteAccessError {
    /// The credentials were missing, invalid, or expired (HTTP 401).
    #[error("authentication failed: {message}")]
    Unauthorized {
        /// Message reported by the remote.
        message: String,
    },

    /// The credentials are valid but lack access (HTTP 403 without rate limiting).
    #[error("access forbidden: {message}")]
    Forbidden {
        /// Message reported by the remote.
        message: String,
    },

    /// The repository does not exist or is not visible to the caller (HTTP 404).
    #[error("repository not found: {repository}")]
    RepositoryNotFound {
        /// `owner/name` of the requested repository.
        repository: String,
    },

    /// The request quota is exhausted.
    #[error("rate limit exceeded{}", reset_suffix(.reset_at))]
    RateLimited {
        /// When the quota window resets, if the remote reported it.
        reset_at: Option<Timestamp>,
    },

    /// The request never produced an HTTP response (DNS, TLS, connection reset, timeout).
    #[error("network failure: {message}")]
    Network {
        /// Transport-level description.
        message: String,
    },

    /// Any other non-success status.
    #[error("unexpected HTTP status {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
        /// Message reported by the remote.
        message: String,
    },
}

fn reset_suffix(reset_at: &Option<Timestamp>) -> String {
    reset_at
        .map(|reset| format!(", resets at {reset}"))
        .unwrap_or_default()
}

impl RemoteAccessError {
    /// Classifies this error for callers that implement their own retry loop.
    ///
    /// `now` is used to turn a rate-limit reset instant into a delay.
    pub fn retry_policy(&self, now: Timestamp) -> RetryPolicy {
        match self {
            Self::RateLimited { reset_at } => RetryPolicy::Retryable {
                after: reset_at.map(|reset| {
                    (reset.as_datetime() - now.as_datetime())
                        .to_std()
                        .unwrap_or(Duration::ZERO)
                }),
            },
            Self::Network { .. } => RetryPolicy::Retryable { after: None },
            Self::UnexpectedStatus { status, .. } if *status >= 500 => {
                RetryPolicy::Retryable { after: None }
            }
            Self::Unauthorized { .. }
            | Self::Forbidden { .. }
            | Self::RepositoryNotFound { .. }
            | Self::UnexpectedStatus { .. } => RetryPolicy::NonRetryable,
        }
    }
}

// ---------------------------------------------------------------------------
// Malformed records
// ---------------------------------------------------------------------------

/// Which collection a malformed record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// An entry of the commit collection.
    Commit,
    /// An entry of the issue collection.
    Issue,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Commit => f.write_str("commit"),
            Self::Issue => f.write_str("issue"),
        }
    }
}

/// A raw record is missing a structurally required field, or could not be
/// decoded at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed {kind} record ({locator}): {reason}")]
pub struct MalformedRecordError {
    /// Collection the record belongs to.
    pub kind: RecordKind,
    /// Best available handle on the record (SHA, `#number`, or page position).
    pub locator: String,
    /// What is wrong with it.
    pub reason: String,
}

impl MalformedRecordError {
    /// A required field is absent or `null`.
    pub fn missing_field(kind: RecordKind, locator: impl Into<String>, field: &str) -> Self {
        Self {
            kind,
            locator: locator.into(),
            reason: format!("missing required field `{field}`"),
        }
    }

    /// A field is present but holds a value outside its domain.
    pub fn invalid_field(
        kind: RecordKind,
        locator: impl Into<String>,
        field: &str,
        value: &str,
    ) -> Self {
        Self {
            kind,
            locator: locator.into(),
            reason: format!("invalid value {value:?} for field `{field}`"),
        }
    }

    /// The payload could not be decoded into records.
    pub fn undecodable(kind: RecordKind, locator: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            kind,
            locator: locator.into(),
            reason: reason.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Invalid arguments
// ---------------------------------------------------------------------------

/// A caller-supplied argument was rejected before any remote call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidArgumentError {
    /// The repository identifier is not of the form `owner/name`.
    #[error("invalid repository '{value}', expected owner/name")]
    Repository {
        /// The rejected input.
        value: String,
    },

    /// The maximum record count is zero or negative.
    #[error("invalid max {value}, expected a positive integer")]
    Max {
        /// The rejected input.
        value: i64,
    },

    /// The state filter is not one of `all`, `open`, `closed`.
    #[error("invalid state '{value}', expected one of all, open, closed")]
    State {
        /// The rejected input.
        value: String,
    },

    /// The page size is outside the range the remote accepts.
    #[error("invalid page size {value}, expected 1..=100")]
    PageSize {
        /// The rejected input.
        value: u64,
    },
}
