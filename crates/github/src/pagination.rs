//! Lazy `Link`-header pagination.
//!
//! A [`Paginator`] holds at most one page in memory. It issues the request for
//! the next page only when the consumer asks for a record past the end of the
//! current one, and issues nothing at all before the first `next()` call.

use pipeline::{MalformedRecordError, MinerError, RecordKind, RepositoryId};
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::status::check_status;
use crate::transport::Transport;

/// Iterator over every record of a paginated collection.
pub struct Paginator<'a, T, X: ?Sized> {
    transport: &'a X,
    repository: RepositoryId,
    kind: RecordKind,
    next_url: Option<Url>,
    buffer: std::vec::IntoIter<T>,
    page: u32,
}

impl<'a, T, X: Transport + ?Sized> Paginator<'a, T, X> {
    /// Starts a paginator at `first_page`. Nothing is fetched yet.
    pub(crate) fn new(transport: &'a X, repository: RepositoryId, kind: RecordKind, first_page: Url) -> Self {
        Self {
            transport,
            repository,
            kind,
            next_url: Some(first_page),
            buffer: Vec::new().into_iter(),
            page: 0,
        }
    }
}

impl<T, X> Paginator<'_, T, X>
where
    T: DeserializeOwned,
    X: Transport + ?Sized,
{
    #[tracing::instrument(level = "debug", skip_all, fields(page = self.page + 1, %url, kind = %self.kind))]
    fn fetch(&mut self, url: &Url) -> Result<(), MinerError> {
        self.page += 1;

        let response = self.transport.get(url)?;
        check_status(&response, &self.repository)?;

        let records: Vec<T> = serde_json::from_str(&response.body).map_err(|err| {
            MalformedRecordError::undecodable(self.kind, format!("page {}", self.page), err.to_string())
        })?;
        let next = response
            .link
            .as_deref()
            .and_then(next_page_link)
            .map(|link| {
                Url::parse(link).map_err(|err| {
                    MalformedRecordError::undecodable(
                        self.kind,
                        format!("page {}", self.page),
                        format!("invalid next-page link {link:?}: {err}"),
                    )
                })
            })
            .transpose()?;

        debug!(
            records = records.len(),
            rate_limit_remaining = ?response.rate_limit_remaining,
            has_next = next.is_some(),
            "page received"
        );
        self.buffer = records.into_iter();
        self.next_url = next;
        Ok(())
    }
}

impl<T, X> Iterator for Paginator<'_, T, X>
where
    T: DeserializeOwned,
    X: Transport + ?Sized,
{
    type Item = Result<T, MinerError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.buffer.next() {
                return Some(Ok(record));
            }
            // Taking the URL fuses the iterator if the fetch fails.
            let url = self.next_url.take()?;
            if let Err(err) = self.fetch(&url) {
                return Some(Err(err));
            }
        }
    }
}

/// Extracts the `rel="next"` target from an RFC 8288 `Link` header.
///
/// ```text
/// <https://api.github.com/repositories/1/issues?page=2>; rel="next",
/// <https://api.github.com/repositories/1/issues?page=5>; rel="last"
/// ```
pub(crate) fn next_page_link(header: &str) -> Option<&str> {
    header.split(',').find_map(|entry| {
        let (target, params) = entry.split_once(';')?;
        let is_next = params.split(';').any(|param| {
            let param = param.trim();
            param
                .strip_prefix("rel=")
                .map(|rel| rel.trim_matches('"'))
                .is_some_and(|rel| rel.split_whitespace().any(|r| r == "next"))
        });
        is_next.then(|| target.trim().trim_start_matches('<').trim_end_matches('>'))
    })
}
