//! The two pipeline entry points: commits and issues.
//!
//! Both follow the same shape: open the remote collection, cap it, run every
//! raw record through the pipeline's filter (issues only) and normalizer, and
//! return the flat records in remote order. Any error aborts the whole
//! invocation; no partial result is returned.

use tracing::{debug, info};

use crate::discriminate::{discriminate, Discrimination, SkipReason};
use crate::normalize::normalize_commit;
use crate::pager::collect_capped;
use crate::ports::{CommitSource, IssueSource};
use crate::{FetchRunId, FlatCommitRecord, FlatIssueRecord, MinerError, RecordCap, RepositoryId, StateFilter};

/// Parameters of one commit fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitQuery {
    /// Repository to read.
    pub repository: RepositoryId,
    /// Maximum number of raw commits to pull.
    pub cap: RecordCap,
}

impl CommitQuery {
    /// Creates an uncapped query for `repository`.
    pub fn new(repository: RepositoryId) -> Self {
        Self {
            repository,
            cap: RecordCap::Unbounded,
        }
    }

    /// Sets the record cap.
    #[must_use]
    pub fn with_cap(mut self, cap: RecordCap) -> Self {
        self.cap = cap;
        self
    }
}

/// Parameters of one issue fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueQuery {
    /// Repository to read.
    pub repository: RepositoryId,
    /// Which issues to keep, by state.
    pub state: StateFilter,
    /// Maximum number of raw records (issues and pull requests) to pull.
    pub cap: RecordCap,
}

impl IssueQuery {
    /// Creates an uncapped query for all issues of `repository`.
    pub fn new(repository: RepositoryId) -> Self {
        Self {
            repository,
            state: StateFilter::All,
            cap: RecordCap::Unbounded,
        }
    }

    /// Sets the state filter.
    #[must_use]
    pub fn with_state(mut self, state: StateFilter) -> Self {
        self.state = state;
        self
    }

    /// Sets the record cap.
    #[must_use]
    pub fn with_cap(mut self, cap: RecordCap) -> Self {
        self.cap = cap;
        self
    }
}

/// Fetches and normalizes the commits of a repository.
///
/// # Errors
///
/// Returns [`MinerError::RemoteAccess`] when the source fails, and
/// [`MinerError::MalformedRecord`] when a commit cannot be normalized.
#[tracing::instrument(
    name = "fetch_commits",
    skip_all,
    fields(run_id = %FetchRunId::new_random(), repository = %query.repository, cap = %query.cap)
)]
pub fn fetch_commits<S>(source: &S, query: &CommitQuery) -> Result<Vec<FlatCommitRecord>, MinerError>
where
    S: CommitSource + ?Sized,
{
    let stream = source.commits(&query.repository, query.cap)?;
    let rows = collect_capped(stream, query.cap)?
        .iter()
        .map(normalize_commit)
        .collect::<Result<Vec<_>, _>>()?;
    info!(rows = rows.len(), "commits normalized");
    Ok(rows)
}

/// Fetches the issues of a repository, dropping pull requests and issues
/// outside the requested state.
///
/// The cap bounds the raw records pulled from the source, pull requests
/// included, so fewer than `cap` rows may come back.
///
/// # Errors
///
/// Returns [`MinerError::RemoteAccess`] when the source fails, and
/// [`MinerError::MalformedRecord`] when an issue cannot be normalized.
#[tracing::instrument(
    name = "fetch_issues",
    skip_all,
    fields(
        run_id = %FetchRunId::new_random(),
        repository = %query.repository,
        state = %query.state,
        cap = %query.cap
    )
)]
pub fn fetch_issues<S>(source: &S, query: &IssueQuery) -> Result<Vec<FlatIssueRecord>, MinerError>
where
    S: IssueSource + ?Sized,
{
    let stream = source.issues(&query.repository, query.state, query.cap)?;
    let raws = collect_capped(stream, query.cap)?;
    let mut rows = Vec::new();
    let mut skipped_pull_requests = 0usize;
    let mut skipped_state = 0usize;
    for raw in &raws {
        match discriminate(raw, query.state)? {
            Discrimination::Keep(row) => rows.push(row),
            Discrimination::Skip(reason) => {
                debug!(number = ?raw.number, ?reason, "skipping record");
                match reason {
                    SkipReason::PullRequest { .. } => skipped_pull_requests += 1,
                    SkipReason::StateMismatch { .. } => skipped_state += 1,
                }
            }
        }
    }
    info!(
        rows = rows.len(),
        skipped_pull_requests, skipped_state, "issues normalized"
    );
    Ok(rows)
}
