//! Normalizers: one raw record in, one flat record out.
//!
//! Neither normalizer filters. Filtering of issues happens in
//! [`crate::discriminate`] before [`normalize_issue`] is reached.

use crate::{
    AccountRef, CommitSha, FlatCommitRecord, FlatIssueRecord, GitIdentity, IssueNumber,
    IssueState, MalformedRecordError, RecordKind, RemoteAccount, RemoteCommitRecord,
    RemoteIssueRecord,
};

/// Login emitted for issues whose reporting account was deleted.
///
/// Matches the placeholder account GitHub itself substitutes for deleted users.
pub const DELETED_ACCOUNT_LOGIN: &str = "ghost";

const UNKNOWN_LOCATOR: &str = "<unidentified>";

// ---------------------------------------------------------------------------
// Commits
// ---------------------------------------------------------------------------

/// Maps one raw commit to a [`FlatCommitRecord`].
///
/// Author name and e-mail come from the linked GitHub account when it carries
/// them, falling back field by field to the Git author embedded in the commit.
/// A commit with no linked account (anonymous or deleted) therefore still
/// produces a row.
///
/// # Errors
///
/// Returns [`MalformedRecordError`] when the SHA, the embedded commit object,
/// its author identity, the authored date, or the message is absent.
pub fn normalize_commit(raw: &RemoteCommitRecord) -> Result<FlatCommitRecord, MalformedRecordError> {
    let sha = raw
        .sha
        .as_deref()
        .and_then(CommitSha::new)
        .ok_or_else(|| MalformedRecordError::missing_field(RecordKind::Commit, UNKNOWN_LOCATOR, "sha"))?;
    let missing = |field: &str| MalformedRecordError::missing_field(RecordKind::Commit, sha.as_str(), field);

    let commit = raw.commit.as_ref().ok_or_else(|| missing("commit"))?;
    let git_author = commit.author.as_ref().ok_or_else(|| missing("commit.author"))?;
    let author_date = git_author.date.ok_or_else(|| missing("commit.author.date"))?;
    let message = commit.message.clone().ok_or_else(|| missing("commit.message"))?;

    let (author_name, author_email) = author_identity(raw.author.as_ref(), git_author);

    Ok(FlatCommitRecord {
        sha,
        author_name,
        author_email,
        author_date,
        message,
    })
}

fn author_identity(account: Option<&RemoteAccount>, git: &GitIdentity) -> (String, String) {
    let pick = |linked: Option<&String>, embedded: &Option<String>| {
        linked
            .filter(|value| !value.is_empty())
            .or(embedded.as_ref())
            .cloned()
            .unwrap_or_default()
    };
    (
        pick(account.and_then(|a| a.name.as_ref()), &git.name),
        pick(account.and_then(|a| a.email.as_ref()), &git.email),
    )
}

// ---------------------------------------------------------------------------
// Issues
// ---------------------------------------------------------------------------

/// Maps one raw issue to a [`FlatIssueRecord`].
///
/// Callers are expected to have run the record through
/// [`crate::discriminate::discriminate`] first; this function does not look at
/// the pull-request marker.
///
/// # Errors
///
/// Returns [`MalformedRecordError`] when the number, title, state or creation
/// time is absent, when the state is neither `open` nor `closed`, or when the
/// `user` key is missing altogether. A `null` user (deleted account) maps to
/// [`DELETED_ACCOUNT_LOGIN`] instead.
pub fn normalize_issue(raw: &RemoteIssueRecord) -> Result<FlatIssueRecord, MalformedRecordError> {
    let number = raw
        .number
        .map(IssueNumber::new)
        .ok_or_else(|| MalformedRecordError::missing_field(RecordKind::Issue, UNKNOWN_LOCATOR, "number"))?;
    let locator = format!("#{number}");
    let missing = |field: &str| MalformedRecordError::missing_field(RecordKind::Issue, locator.as_str(), field);

    let state = issue_state(raw, &locator)?;
    let title = raw.title.clone().ok_or_else(|| missing("title"))?;
    let created_at = raw.created_at.ok_or_else(|| missing("created_at"))?;
    let user = match &raw.user {
        AccountRef::Missing => return Err(missing("user")),
        AccountRef::Deleted => DELETED_ACCOUNT_LOGIN.to_owned(),
        AccountRef::Linked(account) if account.login.is_empty() => DELETED_ACCOUNT_LOGIN.to_owned(),
        AccountRef::Linked(account) => account.login.clone(),
    };

    if state == IssueState::Closed && raw.closed_at.is_none() {
        tracing::warn!(issue = %number, "closed issue has no closed_at; emitting it as absent");
    }

    Ok(FlatIssueRecord {
        id: number,
        title,
        user,
        state,
        created_at,
        closed_at: raw.closed_at,
    })
}

/// Parses the raw state case-insensitively.
pub(crate) fn issue_state(raw: &RemoteIssueRecord, locator: &str) -> Result<IssueState, MalformedRecordError> {
    let value = raw
        .state
        .as_deref()
        .ok_or_else(|| MalformedRecordError::missing_field(RecordKind::Issue, locator, "state"))?;
    value
        .parse()
        .map_err(|_| MalformedRecordError::invalid_field(RecordKind::Issue, locator, "state", value))
}

#[cfg(test)]
#[path = "normalize_tests.rs"]
mod tests;
