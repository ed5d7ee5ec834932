//! Pager/Capper: bounds a lazy remote collection to an optional maximum.
//!
//! [`capped`] never asks the underlying stream for more than `n` items, so a
//! paginated source never fetches a page that is not needed to reach `n`.
//! Remote order is preserved. The first error ends the sequence.

use crate::{MinerError, RecordCap};

/// Iterator adapter returned by [`capped`].
#[derive(Debug)]
pub struct Capped<I> {
    inner: I,
    remaining: Option<usize>,
    failed: bool,
}

/// Wraps `stream` so that at most `cap` items are pulled from it.
pub fn capped<I, T>(stream: I, cap: RecordCap) -> Capped<I>
where
    I: Iterator<Item = Result<T, MinerError>>,
{
    Capped {
        inner: stream,
        remaining: cap.limit(),
        failed: false,
    }
}

impl<I, T> Iterator for Capped<I>
where
    I: Iterator<Item = Result<T, MinerError>>,
{
    type Item = Result<T, MinerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.remaining == Some(0) {
            return None;
        }
        let item = self.inner.next()?;
        match &item {
            Ok(_) => {
                if let Some(remaining) = self.remaining.as_mut() {
                    *remaining -= 1;
                }
            }
            Err(_) => self.failed = true,
        }
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        let (lower, upper) = self.inner.size_hint();
        match self.remaining {
            None => (lower, upper),
            Some(n) => (
                lower.min(n),
                Some(upper.map_or(n, |upper| upper.min(n))),
            ),
        }
    }
}

/// Drains the capped stream into memory, all or nothing.
///
/// # Errors
///
/// Returns the first error the stream yields. Records accumulated before it
/// are discarded.
pub fn collect_capped<I, T>(stream: I, cap: RecordCap) -> Result<Vec<T>, MinerError>
where
    I: Iterator<Item = Result<T, MinerError>>,
{
    let records = capped(stream, cap).collect::<Result<Vec<_>, _>>()?;
    tracing::trace!(count = records.len(), %cap, "collected raw records");
    Ok(records)
}
