//! In-memory commit and issue sources for offline runs and tests.
//!
//! Both sources serve a fixed, ordered list of raw records through the port
//! traits, count how many records consumers actually pulled, and can be told
//! to fail either when the collection is opened or at a given position.

use std::cell::Cell;

use crate::ports::{CommitSource, IssueSource, RecordStream};
use crate::{
    IssueState, MinerError, RecordCap, RemoteAccessError, RemoteCommitRecord, RemoteIssueRecord,
    RepositoryId, StateFilter,
};

/// Failure injection shared by both sources.
#[derive(Debug, Clone, Default)]
struct Faults {
    on_open: Option<RemoteAccessError>,
    at_position: Option<(usize, RemoteAccessError)>,
}

impl Faults {
    fn check_open(&self) -> Result<(), MinerError> {
        match &self.on_open {
            Some(err) => Err(err.clone().into()),
            None => Ok(()),
        }
    }
}

/// Lazily replays fixture records, counting every pull.
struct FixtureStream<'a, T> {
    records: std::vec::IntoIter<&'a T>,
    position: usize,
    fault: Option<&'a (usize, RemoteAccessError)>,
    pulled: &'a Cell<usize>,
    done: bool,
}

impl<T: Clone> Iterator for FixtureStream<'_, T> {
    type Item = Result<T, MinerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if let Some((at, err)) = self.fault {
            if *at == self.position {
                self.done = true;
                return Some(Err(err.clone().into()));
            }
        }
        let record = self.records.next()?;
        self.position += 1;
        self.pulled.set(self.pulled.get() + 1);
        Some(Ok(record.clone()))
    }
}

// ---------------------------------------------------------------------------
// Commits
// ---------------------------------------------------------------------------

/// Serves a fixed commit list for any repository.
#[derive(Debug, Default)]
pub struct InMemoryCommitSource {
    records: Vec<RemoteCommitRecord>,
    faults: Faults,
    pulled: Cell<usize>,
}

impl InMemoryCommitSource {
    /// Creates a source that serves `records` in the given order.
    #[must_use]
    pub fn new(records: Vec<RemoteCommitRecord>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    /// Makes opening the collection fail with `err`.
    #[must_use]
    pub fn failing_on_open(mut self, err: RemoteAccessError) -> Self {
        self.faults.on_open = Some(err);
        self
    }

    /// Makes the stream yield `err` after `position` records.
    #[must_use]
    pub fn failing_at(mut self, position: usize, err: RemoteAccessError) -> Self {
        self.faults.at_position = Some((position, err));
        self
    }

    /// Number of records consumers have pulled so far.
    pub fn pulled(&self) -> usize {
        self.pulled.get()
    }
}

impl CommitSource for InMemoryCommitSource {
    fn commits(
        &self,
        _repository: &RepositoryId,
        _cap: RecordCap,
    ) -> Result<RecordStream<'_, RemoteCommitRecord>, MinerError> {
        self.faults.check_open()?;
        Ok(Box::new(FixtureStream {
            records: self.records.iter().collect::<Vec<_>>().into_iter(),
            position: 0,
            fault: self.faults.at_position.as_ref(),
            pulled: &self.pulled,
            done: false,
        }))
    }
}

// ---------------------------------------------------------------------------
// Issues
// ---------------------------------------------------------------------------

/// Serves a fixed issue list (pull requests included) for any repository.
///
/// Like GitHub, it applies the state filter before records reach the stream,
/// comparing case-insensitively. Records whose state cannot be parsed only
/// pass [`StateFilter::All`].
#[derive(Debug, Default)]
pub struct InMemoryIssueSource {
    records: Vec<RemoteIssueRecord>,
    faults: Faults,
    pulled: Cell<usize>,
}

impl InMemoryIssueSource {
    /// Creates a source that serves `records` in the given order.
    #[must_use]
    pub fn new(records: Vec<RemoteIssueRecord>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    /// Makes opening the collection fail with `err`.
    #[must_use]
    pub fn failing_on_open(mut self, err: RemoteAccessError) -> Self {
        self.faults.on_open = Some(err);
        self
    }

    /// Makes the stream yield `err` after `position` records.
    #[must_use]
    pub fn failing_at(mut self, position: usize, err: RemoteAccessError) -> Self {
        self.faults.at_position = Some((position, err));
        self
    }

    /// Number of records consumers have pulled so far.
    pub fn pulled(&self) -> usize {
        self.pulled.get()
    }
}

impl IssueSource for InMemoryIssueSource {
    fn issues(
        &self,
        _repository: &RepositoryId,
        state: StateFilter,
        _cap: RecordCap,
    ) -> Result<RecordStream<'_, RemoteIssueRecord>, MinerError> {
        self.faults.check_open()?;
        let matching = self
            .records
            .iter()
            .filter(|record| {
                state == StateFilter::All
                    || record
                        .state
                        .as_deref()
                        .and_then(|s| s.parse::<IssueState>().ok())
                        .is_some_and(|s| state.admits(s))
            })
            .collect::<Vec<_>>();
        Ok(Box::new(FixtureStream {
            records: matching.into_iter(),
            position: 0,
            fault: self.faults.at_position.as_ref(),
            pulled: &self.pulled,
            done: false,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> RepositoryId {
        RepositoryId::parse("octo/fixture").unwrap()
    }

    fn issue(number: u64, state: &str) -> RemoteIssueRecord {
        RemoteIssueRecord {
            number: Some(number),
            state: Some(state.to_owned()),
            ..RemoteIssueRecord::default()
        }
    }

    #[test]
    fn issue_source_filters_by_state_like_the_remote() {
        let source = InMemoryIssueSource::new(vec![issue(1, "open"), issue(2, "closed"), issue(3, "OPEN")]);
        let numbers: Vec<_> = source
            .issues(&repo(), StateFilter::Open, RecordCap::Unbounded)
            .unwrap()
            .map(|r| r.unwrap().number.unwrap())
            .collect();
        assert_eq!(numbers, vec![1, 3]);
    }

    #[test]
    fn stream_counts_pulls_lazily() {
        let source = InMemoryCommitSource::new(vec![RemoteCommitRecord::default(); 10]);
        let mut stream = source.commits(&repo(), RecordCap::Unbounded).unwrap();
        assert_eq!(source.pulled(), 0);
        assert!(stream.next().is_some());
        assert!(stream.next().is_some());
        drop(stream);
        assert_eq!(source.pulled(), 2);
    }

    #[test]
    fn injected_failure_ends_the_stream() {
        let err = RemoteAccessError::Network {
            message: "reset".to_owned(),
        };
        let source = InMemoryCommitSource::new(vec![RemoteCommitRecord::default(); 3]).failing_at(1, err.clone());
        let items: Vec<_> = source.commits(&repo(), RecordCap::Unbounded).unwrap().collect();
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert_eq!(items[1], Err(MinerError::RemoteAccess(err)));
    }

    #[test]
    fn open_failure_is_reported_before_streaming() {
        let source = InMemoryIssueSource::new(vec![]).failing_on_open(RemoteAccessError::RepositoryNotFound {
            repository: "octo/fixture".to_owned(),
        });
        assert!(source.issues(&repo(), StateFilter::All, RecordCap::Unbounded).is_err());
    }
}
