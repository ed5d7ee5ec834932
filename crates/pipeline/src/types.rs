//! Shared value types for the fetch pipeline.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! invariants (a cap is strictly positive, a page holds 1..=100 records) and
//! drive pipeline decisions.

use std::num::NonZeroUsize;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::InvalidArgumentError;

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly. Parsed from any RFC 3339 offset; always rendered (and serialised)
/// as RFC 3339 with second precision and a `Z` suffix, e.g.
/// `2024-05-01T12:00:00Z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Parses an RFC 3339 string, normalising its offset to UTC.
    ///
    /// # Errors
    ///
    /// Returns the `chrono` parse error when the input is not RFC 3339.
    pub fn parse_rfc3339(value: &str) -> Result<Self, chrono::ParseError> {
        DateTime::parse_from_rfc3339(value).map(|dt| Self(dt.with_timezone(&Utc)))
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::Secs, true))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse_rfc3339(&raw).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Record cap
// ---------------------------------------------------------------------------

/// Upper bound on the number of raw records pulled from a remote collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecordCap {
    /// Consume the collection to exhaustion.
    #[default]
    Unbounded,
    /// Consume at most this many raw records.
    AtMost(NonZeroUsize),
}

impl RecordCap {
    /// Validates a user-supplied maximum.
    ///
    /// `None` means no cap. Zero and negative values are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgumentError::Max`] for `Some(n)` with `n <= 0`.
    pub fn from_requested(max: Option<i64>) -> Result<Self, InvalidArgumentError> {
        match max {
            None => Ok(Self::Unbounded),
            Some(value) => usize::try_from(value)
                .ok()
                .and_then(NonZeroUsize::new)
                .map(Self::AtMost)
                .ok_or(InvalidArgumentError::Max { value }),
        }
    }

    /// Returns the cap as a plain count, or `None` when unbounded.
    pub fn limit(self) -> Option<usize> {
        match self {
            Self::Unbounded => None,
            Self::AtMost(n) => Some(n.get()),
        }
    }
}

impl std::fmt::Display for RecordCap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unbounded => f.write_str("unbounded"),
            Self::AtMost(n) => write!(f, "{n}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Page size
// ---------------------------------------------------------------------------

/// Number of records requested per remote page (GitHub's `per_page`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageSize(u8);

impl PageSize {
    /// Largest page the GitHub REST API will serve.
    pub const MAX: Self = Self(100);

    /// Validates a page size.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgumentError::PageSize`] outside `1..=100`.
    pub fn new(value: u64) -> Result<Self, InvalidArgumentError> {
        u8::try_from(value)
            .ok()
            .filter(|v| (1..=Self::MAX.0).contains(v))
            .map(Self)
            .ok_or(InvalidArgumentError::PageSize { value })
    }

    /// Shrinks the page to `cap` when the cap is smaller, so a capped fetch
    /// never downloads records it will discard.
    pub fn for_cap(self, cap: RecordCap) -> Self {
        match cap.limit() {
            Some(limit) if limit < usize::from(self.0) => {
                // limit < self.0 <= 100, so the cast is lossless and non-zero.
                Self(limit as u8)
            }
            _ => self,
        }
    }

    /// Returns the page size as an integer.
    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::MAX
    }
}

impl std::fmt::Display for PageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Issue state
// ---------------------------------------------------------------------------

/// Lifecycle state of an issue as reported by the remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    /// The issue is open.
    Open,
    /// The issue has been closed.
    Closed,
}

impl IssueState {
    /// Returns the lowercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl FromStr for IssueState {
    type Err = InvalidArgumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("open") {
            Ok(Self::Open)
        } else if s.eq_ignore_ascii_case("closed") {
            Ok(Self::Closed)
        } else {
            Err(InvalidArgumentError::State {
                value: s.to_owned(),
            })
        }
    }
}

impl std::fmt::Display for IssueState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which issues the caller wants, by state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateFilter {
    /// Open and closed issues alike.
    #[default]
    All,
    /// Only open issues.
    Open,
    /// Only closed issues.
    Closed,
}

impl StateFilter {
    /// Returns `true` if an issue in `state` passes this filter.
    pub fn admits(self, state: IssueState) -> bool {
        match self {
            Self::All => true,
            Self::Open => state == IssueState::Open,
            Self::Closed => state == IssueState::Closed,
        }
    }

    /// Returns the lowercase wire name (GitHub's `state` query value).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl FromStr for StateFilter {
    type Err = InvalidArgumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        match s.parse::<IssueState>() {
            Ok(IssueState::Open) => Ok(Self::Open),
            Ok(IssueState::Closed) => Ok(Self::Closed),
            Err(err) => Err(err),
        }
    }
}

impl std::fmt::Display for StateFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
