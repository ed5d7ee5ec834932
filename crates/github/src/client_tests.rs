//! Paging and request-shaping tests against a scripted transport.

use std::cell::RefCell;
use std::collections::VecDeque;

use pipeline::{
    fetch_commits, fetch_issues, CommitQuery, IssueQuery, MinerError,
    RecordCap, RecordKind, RemoteAccessError, RepositoryId, StateFilter,
};
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};

use super::*;
use crate::transport::RawResponse;

/// Replays canned responses in order and records every requested URL.
#[derive(Default)]
struct ScriptedTransport {
    responses: RefCell<VecDeque<Result<RawResponse, RemoteAccessError>>>,
    requests: RefCell<Vec<String>>,
}

impl ScriptedTransport {
    fn page(self, body: &str, next: Option<&str>) -> Self {
        self.responses.borrow_mut().push_back(Ok(RawResponse {
            status: 200,
            link: next.map(|url| format!(r#"<{url}>; rel="next""#)),
            rate_limit_remaining: Some(4_000),
            rate_limit_reset: None,
            body: body.to_owned(),
        }));
        self
    }

    fn status(self, status: u16, body: &str) -> Self {
        self.responses.borrow_mut().push_back(Ok(RawResponse {
            status,
            body: body.to_owned(),
            ..RawResponse::default()
        }));
        self
    }

    fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl Transport for ScriptedTransport {
    fn get(&self, url: &Url) -> Result<RawResponse, RemoteAccessError> {
        self.requests.borrow_mut().push(url.to_string());
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected request to {url}"))
    }
}

fn commits_json(shas: &[&str]) -> String {
    let items: Vec<_> = shas
        .iter()
        .map(|sha| {
            serde_json::json!({
                "sha": sha,
                "author": null,
                "commit": {
                    "author": {"name": "Dev", "email": "dev@example.com", "date": "2024-01-01T00:00:00Z"},
                    "message": format!("commit {sha}")
                }
            })
        })
        .collect();
    serde_json::Value::Array(items).to_string()
}

fn issue_json(number: u64, state: &str, pull_request: bool) -> serde_json::Value {
    let mut issue = serde_json::json!({
        "id": number + 10_000,
        "number": number,
        "title": format!("Issue {number}"),
        "user": {"login": "reporter"},
        "state": state,
        "created_at": "2024-01-01T00:00:00Z",
        "closed_at": null,
        "comments": 0
    });
    if pull_request {
        issue["pull_request"] = serde_json::json!({"url": "https://api.github.com/repos/o/r/pulls/1"});
    }
    issue
}

fn client(transport: ScriptedTransport) -> GithubClient<ScriptedTransport> {
    let config = GithubConfig::new("https://api.github.com").unwrap();
    GithubClient::with_transport(&config, transport)
}

fn cap(n: i64) -> RecordCap {
    RecordCap::from_requested(Some(n)).unwrap()
}

#[fixture]
fn repo() -> RepositoryId {
    RepositoryId::parse("octocat/hello-world").unwrap()
}

#[rstest]
fn opening_a_collection_sends_no_request(repo: RepositoryId) {
    let client = client(ScriptedTransport::default());
    let stream = client.commits(&repo, RecordCap::Unbounded).unwrap();
    drop(stream);
    assert!(client.transport().requests().is_empty());
}

#[rstest]
fn follows_next_links_until_exhausted(repo: RepositoryId) {
    let client = client(
        ScriptedTransport::default()
            .page(&commits_json(&["a", "b"]), Some("https://api.github.com/repositories/1/commits?per_page=100&page=2"))
            .page(&commits_json(&["c"]), None),
    );

    let rows = fetch_commits(&client, &CommitQuery::new(repo)).unwrap();

    let shas: Vec<_> = rows.iter().map(|r| r.sha.as_str()).collect();
    assert_eq!(shas, vec!["a", "b", "c"]);
    assert_eq!(
        client.transport().requests(),
        vec![
            "https://api.github.com/repos/octocat/hello-world/commits?per_page=100",
            "https://api.github.com/repositories/1/commits?per_page=100&page=2",
        ]
    );
}

#[rstest]
fn cap_within_first_page_never_requests_the_second(repo: RepositoryId) {
    let client = client(ScriptedTransport::default().page(
        &commits_json(&["a", "b", "c"]),
        Some("https://api.github.com/repositories/1/commits?page=2"),
    ));

    let rows = fetch_commits(&client, &CommitQuery::new(repo).with_cap(cap(3))).unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(
        client.transport().requests(),
        vec!["https://api.github.com/repos/octocat/hello-world/commits?per_page=3"]
    );
}

#[rstest]
fn issues_request_carries_state_and_drops_pull_requests(repo: RepositoryId) {
    let body = serde_json::Value::Array(vec![
        issue_json(1, "open", false),
        issue_json(2, "open", true),
        issue_json(3, "open", false),
    ])
    .to_string();
    let client = client(ScriptedTransport::default().page(&body, None));

    let rows = fetch_issues(&client, &IssueQuery::new(repo).with_state(StateFilter::Open)).unwrap();

    let ids: Vec<_> = rows.iter().map(|r| r.id.as_u64()).collect();
    assert_eq!(ids, vec![1, 3]);
    assert_eq!(
        client.transport().requests(),
        vec!["https://api.github.com/repos/octocat/hello-world/issues?per_page=100&state=open"]
    );
}

#[rstest]
fn enterprise_base_path_is_preserved(repo: RepositoryId) {
    let config = GithubConfig::new("https://ghe.example.com/api/v3/").unwrap();
    let client = GithubClient::with_transport(&config, ScriptedTransport::default().page("[]", None));

    let rows = fetch_commits(&client, &CommitQuery::new(repo)).unwrap();

    assert!(rows.is_empty());
    assert_eq!(
        client.transport().requests(),
        vec!["https://ghe.example.com/api/v3/repos/octocat/hello-world/commits?per_page=100"]
    );
}

#[rstest]
fn authentication_failure_surfaces_as_remote_access_error(repo: RepositoryId) {
    let client = client(ScriptedTransport::default().status(401, r#"{"message":"Bad credentials"}"#));

    let result = fetch_commits(&client, &CommitQuery::new(repo));

    assert_eq!(
        result,
        Err(MinerError::RemoteAccess(RemoteAccessError::Unauthorized {
            message: "Bad credentials".to_owned()
        }))
    );
}

#[rstest]
fn failure_on_a_later_page_discards_earlier_pages(repo: RepositoryId) {
    let client = client(
        ScriptedTransport::default()
            .page(&commits_json(&["a"]), Some("https://api.github.com/repositories/1/commits?page=2"))
            .status(500, "oops"),
    );

    let result = fetch_commits(&client, &CommitQuery::new(repo));

    assert!(matches!(
        result,
        Err(MinerError::RemoteAccess(RemoteAccessError::UnexpectedStatus { status: 500, .. }))
    ));
}

#[rstest]
fn undecodable_page_is_a_malformed_record(repo: RepositoryId) {
    let client = client(ScriptedTransport::default().page(r#"{"not": "a list"}"#, None));

    let result = fetch_issues(&client, &IssueQuery::new(repo));

    let Err(MinerError::MalformedRecord(err)) = &result else {
        panic!("expected a malformed record error, got {result:?}");
    };
    assert_eq!(err.kind, RecordKind::Issue);
    assert_eq!(err.locator, "page 1");
}

#[rstest]
fn paginator_is_fused_after_an_error(repo: RepositoryId) {
    let client = client(
        ScriptedTransport::default()
            .status(404, r#"{"message":"Not Found"}"#)
            .page(&commits_json(&["never"]), None),
    );

    let mut stream = client.commits(&repo, RecordCap::Unbounded).unwrap();
    assert!(matches!(
        stream.next(),
        Some(Err(MinerError::RemoteAccess(RemoteAccessError::RepositoryNotFound { .. })))
    ));
    assert!(stream.next().is_none());
    drop(stream);
    assert_eq!(client.transport().requests().len(), 1);
}

#[rstest]
fn empty_page_with_next_link_keeps_paging(repo: RepositoryId) {
    let client = client(
        ScriptedTransport::default()
            .page("[]", Some("https://api.github.com/repositories/1/commits?page=2"))
            .page(&commits_json(&["z"]), None),
    );

    let rows = fetch_commits(&client, &CommitQuery::new(repo)).unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(client.transport().requests().len(), 2);
}
