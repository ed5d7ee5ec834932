//! Port traits through which the pipeline reaches the remote collections.
//!
//! A source hands out a [`RecordStream`]: a lazy, finite-or-unbounded,
//! non-restartable sequence of raw records. Implementations must not fetch a
//! page until the consumer asks for a record beyond the ones already buffered,
//! so that a consumer that stops early stops the fetching too.
//!
//! Credentials, base URLs and page sizing are the implementation's concern and
//! are injected when it is constructed; the pipeline never sees them.

use crate::{
    MinerError, RecordCap, RemoteCommitRecord, RemoteIssueRecord, RepositoryId, StateFilter,
};

/// Lazy sequence of raw records. Yields `Err` at most once and then ends.
pub type RecordStream<'a, T> = Box<dyn Iterator<Item = Result<T, MinerError>> + 'a>;

/// Supplies the commit collection of a repository.
pub trait CommitSource {
    /// Opens the commit collection of `repository`, newest first.
    ///
    /// `cap` is a sizing hint only: the implementation may use it to request
    /// smaller pages, but enforcement is the caller's job.
    ///
    /// # Errors
    ///
    /// Returns [`MinerError::RemoteAccess`] if the collection cannot even be
    /// opened. Failures while paging surface as `Err` items of the stream.
    fn commits(
        &self,
        repository: &RepositoryId,
        cap: RecordCap,
    ) -> Result<RecordStream<'_, RemoteCommitRecord>, MinerError>;
}

/// Supplies the issue collection of a repository, pull requests included.
pub trait IssueSource {
    /// Opens the issue collection of `repository`.
    ///
    /// Implementations should apply `state` server-side where the remote
    /// supports it; the pipeline re-checks it on every record regardless.
    ///
    /// # Errors
    ///
    /// Returns [`MinerError::RemoteAccess`] if the collection cannot even be
    /// opened. Failures while paging surface as `Err` items of the stream.
    fn issues(
        &self,
        repository: &RepositoryId,
        state: StateFilter,
        cap: RecordCap,
    ) -> Result<RecordStream<'_, RemoteIssueRecord>, MinerError>;
}

impl<S: CommitSource + ?Sized> CommitSource for &S {
    fn commits(
        &self,
        repository: &RepositoryId,
        cap: RecordCap,
    ) -> Result<RecordStream<'_, RemoteCommitRecord>, MinerError> {
        (**self).commits(repository, cap)
    }
}

impl<S: IssueSource + ?Sized> IssueSource for &S {
    fn issues(
        &self,
        repository: &RepositoryId,
        state: StateFilter,
        cap: RecordCap,
    ) -> Result<RecordStream<'_, RemoteIssueRecord>, MinerError> {
        (**self).issues(repository, state, cap)
    }
}
