//! HTTP transport seam.
//!
//! [`Transport`] performs one authenticated `GET` and hands back the parts of
//! the response the client cares about. [`ReqwestTransport`] is the real
//! implementation; tests substitute a scripted one.

use pipeline::RemoteAccessError;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, LINK, USER_AGENT};
use reqwest::Url;

use crate::config::{GithubClientError, GithubConfig};

const GITHUB_JSON: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "x-github-api-version";
const API_VERSION: &str = "2022-11-28";
const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";
const RATE_LIMIT_RESET: &str = "x-ratelimit-reset";

/// The subset of an HTTP response the client inspects.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw `Link` header.
    pub link: Option<String>,
    /// `x-ratelimit-remaining`.
    pub rate_limit_remaining: Option<u64>,
    /// `x-ratelimit-reset`, seconds since the Unix epoch.
    pub rate_limit_reset: Option<i64>,
    /// Response body.
    pub body: String,
}

/// Performs a single `GET` request. One call is one remote request.
pub trait Transport {
    /// Fetches `url`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteAccessError::Network`] when no HTTP response was
    /// received. Non-success statuses are *not* errors at this layer.
    fn get(&self, url: &Url) -> Result<RawResponse, RemoteAccessError>;
}

/// Blocking `reqwest` transport carrying GitHub's standard headers.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    /// Builds a transport from `config`'s credentials, user agent and timeout.
    ///
    /// # Errors
    ///
    /// Returns [`GithubClientError::InvalidHeader`] when the token or user
    /// agent cannot be sent as a header, and [`GithubClientError::HttpClient`]
    /// when the TLS backend fails to initialise.
    pub fn new(config: &GithubConfig) -> Result<Self, GithubClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_JSON));
        headers.insert(
            HeaderName::from_static(API_VERSION_HEADER),
            HeaderValue::from_static(API_VERSION),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(config.user_agent())
                .map_err(|_| GithubClientError::InvalidHeader { header: "user-agent" })?,
        );
        if let Some(token) = config.token() {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| GithubClientError::InvalidHeader { header: "authorization" })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()?;
        Ok(Self { http })
    }
}

impl Transport for ReqwestTransport {
    fn get(&self, url: &Url) -> Result<RawResponse, RemoteAccessError> {
        let response = self.http.get(url.clone()).send().map_err(network)?;
        read_response(response)
    }
}

fn read_response(response: Response) -> Result<RawResponse, RemoteAccessError> {
    let headers = response.headers();
    let status = response.status().as_u16();
    let link = header_str(headers, LINK.as_str()).map(str::to_owned);
    let rate_limit_remaining = header_str(headers, RATE_LIMIT_REMAINING).and_then(|v| v.parse().ok());
    let rate_limit_reset = header_str(headers, RATE_LIMIT_RESET).and_then(|v| v.parse().ok());
    let body = response.text().map_err(network)?;
    Ok(RawResponse {
        status,
        link,
        rate_limit_remaining,
        rate_limit_reset,
        body,
    })
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

fn network(err: reqwest::Error) -> RemoteAccessError {
    RemoteAccessError::Network {
        message: err.to_string(),
    }
}
