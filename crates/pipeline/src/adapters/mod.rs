//! Source adapters that live inside the domain crate.
//!
//! Only [`memory`] lives here; adapters that perform I/O belong in their own
//! infrastructure crates.

pub mod memory;

pub use memory::{InMemoryCommitSource, InMemoryIssueSource};
