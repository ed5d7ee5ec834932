//! Fetch-and-normalize domain for RepoMiner.
//!
//! This crate turns a lazily paginated remote collection of commits or issues
//! into a finite list of flat, fixed-schema records. Infrastructure crates
//! implement the source ports defined here; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`RepositoryId`, `CommitSha`, etc.) |
//! | [`types`] | Value types (`Timestamp`, `RecordCap`, `StateFilter`, etc.) |
//! | [`errors`] | Error taxonomy and retry-policy types |
//! | [`records`] | Raw and flat record shapes |
//! | [`ports`] | `CommitSource` / `IssueSource` traits |
//! | [`pager`] | Pager/Capper over lazy record streams |
//! | [`normalize`] | Commit and issue normalizers |
//! | [`discriminate`] | Issue/pull-request discriminator and state filter |
//! | [`miner`] | `fetch_commits` / `fetch_issues` entry points |
//! | [`adapters`] | In-memory sources |

pub mod adapters;
pub mod discriminate;
pub mod errors;
pub mod identifiers;
pub mod miner;
pub mod normalize;
pub mod pager;
pub mod ports;
pub mod records;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{
    InvalidArgumentError, MalformedRecordError, MinerError, RecordKind, RemoteAccessError,
    RetryPolicy,
};
pub use identifiers::{CommitSha, FetchRunId, IssueNumber, RepositoryId};
pub use miner::{fetch_commits, fetch_issues, CommitQuery, IssueQuery};
pub use ports::{CommitSource, IssueSource, RecordStream};
pub use records::{
    AccountRef, CommitMetadata, FlatCommitRecord, FlatIssueRecord, FlatRecord, GitIdentity,
    PullRequestMarker, RemoteAccount, RemoteCommitRecord, RemoteIssueRecord,
};
pub use types::{IssueState, PageSize, RecordCap, StateFilter, Timestamp};
