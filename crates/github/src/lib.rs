//! RepoMiner GitHub infrastructure adapter.
//!
//! Implements the source ports defined in the [`pipeline`] crate
//! ([`pipeline::CommitSource`], [`pipeline::IssueSource`]) over the GitHub
//! REST API.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules.
//! All GitHub API details (rate-limit headers, `Link` pagination,
//! authentication) are handled here; the [`pipeline`] crate never sees them.
//!
//! ## Request Model
//!
//! Blocking and strictly sequential: one request is in flight at a time, and a
//! page is only requested when the consumer has drained the previous one.
//! Dropping a stream stops all further requests. Nothing is retried here;
//! every [`pipeline::RemoteAccessError`] exposes a
//! [`pipeline::RetryPolicy`] for callers that want to.

pub mod client;
pub mod config;
pub mod pagination;
mod status;
pub mod transport;

pub use client::GithubClient;
pub use config::{GithubClientError, GithubConfig, DEFAULT_API_URL, DEFAULT_USER_AGENT};
pub use pagination::Paginator;
pub use transport::{RawResponse, ReqwestTransport, Transport};
