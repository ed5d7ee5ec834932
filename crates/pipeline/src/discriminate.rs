//! Issue discriminator and state filter.
//!
//! GitHub serves issues and pull requests from the same endpoint. Every raw
//! record is first tagged with a [`RecordVariant`]; only
//! [`RecordVariant::Issue`] records continue to the state filter and the
//! normalizer. New record shapes get a new variant here and nowhere else.

use crate::normalize::{issue_state, normalize_issue};
use crate::{FlatIssueRecord, IssueState, MalformedRecordError, RemoteIssueRecord, StateFilter};

/// What kind of entry a raw issue-collection record is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordVariant {
    /// A genuine issue.
    Issue,
    /// A pull request listed through the issue endpoint.
    PullRequest {
        /// Whether the pull request is still a draft.
        draft: bool,
    },
}

/// Why a record was left out of the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// The record is a pull request, not an issue.
    PullRequest {
        /// Whether the pull request is still a draft.
        draft: bool,
    },
    /// The issue is not in the requested state.
    StateMismatch {
        /// The issue's actual state.
        state: IssueState,
    },
}

/// Outcome of running one raw record through the discriminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discrimination {
    /// The record is an issue in the requested state.
    Keep(FlatIssueRecord),
    /// The record is silently dropped.
    Skip(SkipReason),
}

/// Tags a raw record by the presence of the pull-request marker.
pub fn classify(raw: &RemoteIssueRecord) -> RecordVariant {
    match raw.pull_request {
        Some(_) => RecordVariant::PullRequest {
            draft: raw.draft.unwrap_or(false),
        },
        None => RecordVariant::Issue,
    }
}

/// Decides whether `raw` belongs in the issue table under `filter`, and
/// normalizes it if so.
///
/// Pull requests are skipped before anything else is inspected, so a
/// malformed pull request never aborts an issue fetch.
///
/// # Errors
///
/// Returns [`MalformedRecordError`] when a genuine issue cannot be normalized.
pub fn discriminate(
    raw: &RemoteIssueRecord,
    filter: StateFilter,
) -> Result<Discrimination, MalformedRecordError> {
    match classify(raw) {
        RecordVariant::PullRequest { draft } => Ok(Discrimination::Skip(SkipReason::PullRequest { draft })),
        RecordVariant::Issue => {
            let locator = raw.number.map_or_else(|| "<unidentified>".to_owned(), |n| format!("#{n}"));
            let state = issue_state(raw, &locator)?;
            if !filter.admits(state) {
                return Ok(Discrimination::Skip(SkipReason::StateMismatch { state }));
            }
            normalize_issue(raw).map(Discrimination::Keep)
        }
    }
}
