//! Explicit client configuration.
//!
//! Everything the client needs (base URL, credentials, page sizing) is passed
//! in through [`GithubConfig`]; nothing is read from the environment here.

use std::time::Duration;

use pipeline::PageSize;
use reqwest::Url;
use thiserror::Error;

/// Public GitHub REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// `User-Agent` sent when the caller does not override it. GitHub rejects
/// requests without one.
pub const DEFAULT_USER_AGENT: &str = concat!("repo-miner/", env!("CARGO_PKG_VERSION"));

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised while building a client.
#[derive(Debug, Error)]
pub enum GithubClientError {
    /// The base URL is not an absolute `http(s)` URL.
    #[error("invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The token or user agent contains bytes not allowed in an HTTP header.
    #[error("invalid value for header {header}")]
    InvalidHeader {
        /// Header name.
        header: &'static str,
    },

    /// The underlying HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Connection settings for [`crate::GithubClient`].
#[derive(Clone)]
pub struct GithubConfig {
    base_url: Url,
    token: Option<String>,
    user_agent: String,
    page_size: PageSize,
    timeout: Duration,
}

impl GithubConfig {
    /// Creates a configuration for the API rooted at `base_url`.
    ///
    /// GitHub Enterprise roots with a path prefix (`https://host/api/v3`) are
    /// supported.
    ///
    /// # Errors
    ///
    /// Returns [`GithubClientError::InvalidBaseUrl`] unless `base_url` is an
    /// absolute `http` or `https` URL without query or fragment.
    pub fn new(base_url: &str) -> Result<Self, GithubClientError> {
        let invalid = |reason: &str| GithubClientError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: reason.to_owned(),
        };
        let url = Url::parse(base_url).map_err(|err| invalid(&err.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        if url.cannot_be_a_base() {
            return Err(invalid("URL cannot be used as a base"));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("URL must not carry a query or fragment"));
        }
        Ok(Self {
            base_url: url,
            token: None,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            page_size: PageSize::default(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Authenticates requests with a personal access or installation token.
    ///
    /// Blank tokens are ignored, so an empty `GITHUB_TOKEN` means anonymous.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = (!token.trim().is_empty()).then_some(token);
        self
    }

    /// Overrides the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the preferred page size. Capped fetches may request smaller pages.
    #[must_use]
    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// API root.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Bearer token, if any.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// `User-Agent` header value.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Preferred page size.
    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl std::fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("user_agent", &self.user_agent)
            .field("page_size", &self.page_size)
            .field("timeout", &self.timeout)
            .finish()
    }
}
