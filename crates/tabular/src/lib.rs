//! RepoMiner tabular sink.
//!
//! Serialises [`pipeline::FlatRecord`]s as CSV: one header row with the
//! record type's exact column names, then one row per record in the order
//! given. Free-text fields are quoted per RFC 4180 when they contain the
//! delimiter, a quote, or a line break; absent values become empty fields.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Knows about bytes and files; knows nothing about where
//! the records came from.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use pipeline::FlatRecord;
use tempfile::NamedTempFile;
use thiserror::Error;

/// Errors raised while writing tabular output.
#[derive(Debug, Error)]
pub enum SinkError {
    /// A record could not be encoded as CSV.
    #[error("failed to encode CSV: {0}")]
    Encode(#[from] csv::Error),

    /// The destination could not be written.
    #[error("failed to write {path}: {source}")]
    Io {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl SinkError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Writes `records` as CSV to `writer` and returns the number of data rows.
///
/// The header row is always written, even when `records` is empty, so the
/// column set is stable across runs.
///
/// # Errors
///
/// Returns [`SinkError::Encode`] when a record cannot be serialised or the
/// writer fails.
pub fn write_csv<W, R>(writer: W, records: &[R]) -> Result<usize, SinkError>
where
    W: Write,
    R: FlatRecord,
{
    let mut csv = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    csv.write_record(R::COLUMNS)?;
    for record in records {
        csv.serialize(record)?;
    }
    csv.flush().map_err(csv::Error::from)?;
    Ok(records.len())
}

/// Writes `records` to `path` atomically.
///
/// The rows go to a temporary file in the destination directory, which is
/// renamed over `path` only once fully written. On any error `path` is left
/// as it was (absent, or holding its previous contents).
///
/// # Errors
///
/// Returns [`SinkError::Io`] for filesystem failures and
/// [`SinkError::Encode`] for serialisation failures.
pub fn write_csv_file<R: FlatRecord>(path: &Path, records: &[R]) -> Result<usize, SinkError> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staging = NamedTempFile::new_in(directory).map_err(|err| SinkError::io(path, err))?;
    let rows = write_csv(staging.as_file_mut(), records)?;
    staging
        .as_file()
        .sync_all()
        .map_err(|err| SinkError::io(path, err))?;
    staging
        .persist(path)
        .map_err(|err| SinkError::io(path, err.error))?;
    tracing::debug!(path = %path.display(), rows, kind = R::KIND, "wrote csv");
    Ok(rows)
}

#[cfg(test)]
mod tests;
