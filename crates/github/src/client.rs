//! [`GithubClient`]: the commit and issue sources backed by the REST API.

use pipeline::{
    CommitSource, IssueSource, MinerError, PageSize, RecordCap, RecordKind, RecordStream,
    RemoteCommitRecord, RemoteIssueRecord, RepositoryId, StateFilter,
};
use reqwest::Url;

use crate::config::{GithubClientError, GithubConfig};
use crate::pagination::Paginator;
use crate::transport::{ReqwestTransport, Transport};

/// Read-only GitHub REST client for repository commits and issues.
#[derive(Debug, Clone)]
pub struct GithubClient<X = ReqwestTransport> {
    transport: X,
    base_url: Url,
    page_size: PageSize,
}

impl GithubClient {
    /// Builds a client that talks to GitHub over HTTPS.
    ///
    /// # Errors
    ///
    /// See [`ReqwestTransport::new`].
    pub fn new(config: &GithubConfig) -> Result<Self, GithubClientError> {
        let transport = ReqwestTransport::new(config)?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<X: Transport> GithubClient<X> {
    /// Builds a client over a caller-supplied transport.
    ///
    /// Only the base URL and page size of `config` are used; credentials are
    /// the transport's concern.
    pub fn with_transport(config: &GithubConfig, transport: X) -> Self {
        Self {
            transport,
            base_url: config.base_url().clone(),
            page_size: config.page_size(),
        }
    }

    /// Returns the underlying transport.
    pub fn transport(&self) -> &X {
        &self.transport
    }

    /// `{base}/repos/{owner}/{name}/{collection}?per_page=N`
    fn collection_url(&self, repository: &RepositoryId, collection: &str, cap: RecordCap) -> Url {
        let mut url = self.base_url.clone();
        // `GithubConfig::new` only admits hierarchical URLs, so this always applies.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["repos", repository.owner(), repository.name(), collection]);
        }
        url.query_pairs_mut()
            .append_pair("per_page", &self.page_size.for_cap(cap).to_string());
        url
    }
}

impl<X: Transport> CommitSource for GithubClient<X> {
    #[tracing::instrument(level = "debug", skip_all, fields(%repository, %cap))]
    fn commits(
        &self,
        repository: &RepositoryId,
        cap: RecordCap,
    ) -> Result<RecordStream<'_, RemoteCommitRecord>, MinerError> {
        let url = self.collection_url(repository, "commits", cap);
        Ok(Box::new(Paginator::new(
            &self.transport,
            repository.clone(),
            RecordKind::Commit,
            url,
        )))
    }
}

impl<X: Transport> IssueSource for GithubClient<X> {
    #[tracing::instrument(level = "debug", skip_all, fields(%repository, %state, %cap))]
    fn issues(
        &self,
        repository: &RepositoryId,
        state: StateFilter,
        cap: RecordCap,
    ) -> Result<RecordStream<'_, RemoteIssueRecord>, MinerError> {
        let mut url = self.collection_url(repository, "issues", cap);
        url.query_pairs_mut().append_pair("state", state.as_str());
        Ok(Box::new(Paginator::new(
            &self.transport,
            repository.clone(),
            RecordKind::Issue,
            url,
        )))
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
