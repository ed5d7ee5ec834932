//! Raw records as returned by the remote API, and the flat records the
//! pipeline turns them into.
//!
//! Raw records mirror GitHub's REST payloads. Fields the normalizers require
//! are still modelled as `Option` so that a single incomplete record is
//! reported as a [`crate::MalformedRecordError`] naming the field, rather than
//! failing the decode of a whole page. Unknown JSON keys are ignored.
//!
//! Flat records have a fixed field order, which is also their column order in
//! tabular output (see [`FlatRecord::COLUMNS`]).

use serde::{Deserialize, Deserializer, Serialize};

use crate::{CommitSha, IssueNumber, IssueState, Timestamp};

// ---------------------------------------------------------------------------
// Raw: shared
// ---------------------------------------------------------------------------

/// A GitHub account linked to a commit or issue.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct RemoteAccount {
    /// Account handle. GitHub reports deleted accounts as `ghost`, and some
    /// mirrors report them with an empty login.
    #[serde(default)]
    pub login: String,
    /// Display name, present only on full user payloads.
    #[serde(default)]
    pub name: Option<String>,
    /// Public e-mail, present only on full user payloads.
    #[serde(default)]
    pub email: Option<String>,
}

/// An account reference whose absence must be told apart from a deleted account.
///
/// - key missing from the payload → [`AccountRef::Missing`]
/// - key present with `null` → [`AccountRef::Deleted`]
/// - key present with an object → [`AccountRef::Linked`]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AccountRef {
    /// The payload has no account key at all.
    #[default]
    Missing,
    /// The account was deleted or anonymised.
    Deleted,
    /// A live account.
    Linked(RemoteAccount),
}

impl<'de> Deserialize<'de> for AccountRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<RemoteAccount>::deserialize(deserializer)? {
            Some(account) => Self::Linked(account),
            None => Self::Deleted,
        })
    }
}

// ---------------------------------------------------------------------------
// Raw: commits
// ---------------------------------------------------------------------------

/// Name, e-mail and date recorded by Git itself (not a GitHub account).
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct GitIdentity {
    /// `user.name` at commit time.
    #[serde(default)]
    pub name: Option<String>,
    /// `user.email` at commit time.
    #[serde(default)]
    pub email: Option<String>,
    /// When this identity authored or committed the change.
    #[serde(default)]
    pub date: Option<Timestamp>,
}

/// The Git commit object embedded in a GitHub commit payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct CommitMetadata {
    /// Git author.
    #[serde(default)]
    pub author: Option<GitIdentity>,
    /// Git committer.
    #[serde(default)]
    pub committer: Option<GitIdentity>,
    /// Full commit message.
    #[serde(default)]
    pub message: Option<String>,
}

/// One entry of `GET /repos/{owner}/{repo}/commits`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct RemoteCommitRecord {
    /// Commit hash.
    #[serde(default)]
    pub sha: Option<String>,
    /// GitHub account matched to the Git author, `null` when none matches.
    #[serde(default)]
    pub author: Option<RemoteAccount>,
    /// GitHub account matched to the Git committer.
    #[serde(default)]
    pub committer: Option<RemoteAccount>,
    /// The embedded Git commit object.
    #[serde(default)]
    pub commit: Option<CommitMetadata>,
}

// ---------------------------------------------------------------------------
// Raw: issues
// ---------------------------------------------------------------------------

/// Present on entries of the issue collection that are really pull requests.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct PullRequestMarker {
    /// API URL of the pull request.
    #[serde(default)]
    pub url: Option<String>,
    /// When the pull request was merged, if it was.
    #[serde(default)]
    pub merged_at: Option<Timestamp>,
}

/// One entry of `GET /repos/{owner}/{repo}/issues`.
///
/// That endpoint returns issues and pull requests together; see
/// [`crate::discriminate`] for how they are told apart.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct RemoteIssueRecord {
    /// Repository-scoped number.
    #[serde(default)]
    pub number: Option<u64>,
    /// Title.
    #[serde(default)]
    pub title: Option<String>,
    /// Reporting account.
    #[serde(default)]
    pub user: AccountRef,
    /// `open` or `closed`, in whatever case the remote uses.
    #[serde(default)]
    pub state: Option<String>,
    /// Creation time.
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    /// Closing time; `null` while open.
    #[serde(default)]
    pub closed_at: Option<Timestamp>,
    /// Pull-request marker.
    #[serde(default)]
    pub pull_request: Option<PullRequestMarker>,
    /// Draft flag, only reported for pull requests.
    #[serde(default)]
    pub draft: Option<bool>,
}

// ---------------------------------------------------------------------------
// Flat records
// ---------------------------------------------------------------------------

/// A normalized, fixed-schema record ready for tabular export.
///
/// Serialising a value must emit exactly the fields in [`Self::COLUMNS`], in
/// that order; absent values serialise as `None`, never as a missing field.
pub trait FlatRecord: Serialize {
    /// Column names, in output order.
    const COLUMNS: &'static [&'static str];

    /// Plural label used in log events and user-facing summaries.
    const KIND: &'static str;
}

/// One normalized commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatCommitRecord {
    /// Commit hash, verbatim.
    pub sha: CommitSha,
    /// Author name (linked account first, Git metadata as fallback).
    pub author_name: String,
    /// Author e-mail (linked account first, Git metadata as fallback).
    pub author_email: String,
    /// Authored time.
    pub author_date: Timestamp,
    /// Full commit message, embedded newlines included.
    pub message: String,
}

impl FlatRecord for FlatCommitRecord {
    const COLUMNS: &'static [&'static str] =
        &["sha", "author_name", "author_email", "author_date", "message"];
    const KIND: &'static str = "commits";
}

/// One normalized issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatIssueRecord {
    /// Repository-scoped issue number.
    pub id: IssueNumber,
    /// Title, verbatim.
    pub title: String,
    /// Reporter login, or [`crate::normalize::DELETED_ACCOUNT_LOGIN`].
    pub user: String,
    /// Lifecycle state.
    pub state: IssueState,
    /// Creation time.
    pub created_at: Timestamp,
    /// Closing time; `None` while open.
    pub closed_at: Option<Timestamp>,
}

impl FlatRecord for FlatIssueRecord {
    const COLUMNS: &'static [&'static str] =
        &["id", "title", "user", "state", "created_at", "closed_at"];
    const KIND: &'static str = "issues";
}
