//! RepoMiner CLI entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Parse arguments**: sub-command, repository, cap, state filter, output
//!    path, and connection options (with `GITHUB_TOKEN` / `GITHUB_API_URL`
//!    environment fallbacks).
//! 2. **Validate**: turn raw arguments into typed queries before any client
//!    exists, so bad input never costs API quota.
//! 3. **Wire logging**: configure `tracing-subscriber` (text or JSON, to
//!    stderr). Every span and event emitted by the workspace crates flows
//!    through it.
//! 4. **Construct infrastructure**: build the [`github::GithubClient`] from an
//!    explicit [`github::GithubConfig`] and hand it to the pipeline.
//! 5. **Export**: write the flat records with [`tabular::write_csv_file`],
//!    only after the whole fetch succeeded.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use github::{GithubClient, GithubConfig, DEFAULT_API_URL};
use pipeline::{
    fetch_commits, fetch_issues, CommitQuery, CommitSource, FlatRecord, InvalidArgumentError,
    IssueQuery, IssueSource, PageSize, RecordCap, RepositoryId, StateFilter,
};
use tracing_subscriber::EnvFilter;

/// Fetch GitHub commits or issues and save them as CSV.
#[derive(Debug, Parser)]
#[command(name = "repo-miner", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    connection: ConnectionArgs,

    /// Log output format (written to stderr; filter with RUST_LOG).
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch commits and save them to CSV.
    FetchCommits(FetchArgs),

    /// Fetch issues (pull requests excluded) and save them to CSV.
    FetchIssues {
        #[command(flatten)]
        fetch: FetchArgs,

        /// Filter issues by state: all, open, or closed.
        #[arg(long, default_value = "all")]
        state: String,
    },
}

#[derive(Debug, Args)]
struct FetchArgs {
    /// Repository in owner/repo format.
    #[arg(long)]
    repo: String,

    /// Maximum number of records to fetch.
    #[arg(long, allow_negative_numbers = true)]
    max: Option<i64>,

    /// Path of the CSV file to write.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Debug, Args)]
struct ConnectionArgs {
    /// GitHub token; anonymous access when unset.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    /// API root, e.g. https://ghe.example.com/api/v3 for GitHub Enterprise.
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL, global = true)]
    api_url: String,

    /// Records requested per page (1-100).
    #[arg(long, default_value_t = 100, global = true)]
    page_size: u64,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 30, global = true)]
    timeout: u64,

    /// Override the User-Agent header sent to the API.
    #[arg(long, global = true)]
    user_agent: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

// ---------------------------------------------------------------------------
// Validated requests
// ---------------------------------------------------------------------------

/// A fully validated sub-command.
#[derive(Debug, PartialEq, Eq)]
enum Request {
    Commits { query: CommitQuery, out: PathBuf },
    Issues { query: IssueQuery, out: PathBuf },
}

impl FetchArgs {
    fn validate(&self) -> Result<(RepositoryId, RecordCap), InvalidArgumentError> {
        Ok((RepositoryId::parse(&self.repo)?, RecordCap::from_requested(self.max)?))
    }
}

impl Command {
    fn validate(&self) -> Result<Request, InvalidArgumentError> {
        match self {
            Self::FetchCommits(fetch) => {
                let (repository, cap) = fetch.validate()?;
                Ok(Request::Commits {
                    query: CommitQuery::new(repository).with_cap(cap),
                    out: fetch.out.clone(),
                })
            }
            Self::FetchIssues { fetch, state } => {
                let (repository, cap) = fetch.validate()?;
                let state: StateFilter = state.parse()?;
                Ok(Request::Issues {
                    query: IssueQuery::new(repository).with_state(state).with_cap(cap),
                    out: fetch.out.clone(),
                })
            }
        }
    }
}

impl ConnectionArgs {
    fn config(&self) -> Result<GithubConfig> {
        let mut config = GithubConfig::new(&self.api_url)?
            .with_page_size(PageSize::new(self.page_size)?)
            .with_timeout(Duration::from_secs(self.timeout));
        if let Some(token) = &self.token {
            config = config.with_token(token.clone());
        }
        if let Some(user_agent) = &self.user_agent {
            config = config.with_user_agent(user_agent.clone());
        }
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Fetches commits from `source` and writes them to `out`.
///
/// Nothing is written unless the fetch succeeds in full.
fn export_commits<S: CommitSource>(source: &S, query: &CommitQuery, out: &Path) -> Result<usize> {
    let rows = fetch_commits(source, query)
        .with_context(|| format!("failed to fetch commits from {}", query.repository))?;
    save(out, &rows)
}

/// Fetches issues from `source` and writes them to `out`.
///
/// Nothing is written unless the fetch succeeds in full.
fn export_issues<S: IssueSource>(source: &S, query: &IssueQuery, out: &Path) -> Result<usize> {
    let rows = fetch_issues(source, query)
        .with_context(|| format!("failed to fetch issues from {}", query.repository))?;
    save(out, &rows)
}

fn save<R: FlatRecord>(out: &Path, rows: &[R]) -> Result<usize> {
    let written = tabular::write_csv_file(out, rows)?;
    println!("Saved {written} {} to {}", R::KIND, out.display());
    Ok(written)
}

fn run(cli: &Cli) -> Result<()> {
    let request = cli.command.validate()?;
    let config = cli.connection.config()?;
    tracing::debug!(?config, "connecting");
    let client = GithubClient::new(&config)?;

    match request {
        Request::Commits { query, out } => export_commits(&client, &query, &out)?,
        Request::Issues { query, out } => export_issues(&client, &query, &out)?,
    };
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "fetch failed");
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use pipeline::adapters::{InMemoryCommitSource, InMemoryIssueSource};
    use pipeline::{
        CommitMetadata, GitIdentity, MinerError, RemoteAccessError, RemoteCommitRecord, Timestamp,
    };
    use rstest::rstest;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("repo-miner").chain(args.iter().copied())).unwrap()
    }

    fn commit(sha: &str) -> RemoteCommitRecord {
        RemoteCommitRecord {
            sha: Some(sha.to_owned()),
            commit: Some(CommitMetadata {
                author: Some(GitIdentity {
                    name: Some("Dev".to_owned()),
                    email: Some("dev@example.com".to_owned()),
                    date: Some(Timestamp::parse_rfc3339("2024-01-01T00:00:00Z").unwrap()),
                }),
                committer: None,
                message: Some("msg".to_owned()),
            }),
            ..RemoteCommitRecord::default()
        }
    }

    #[test]
    fn fetch_issues_arguments_become_a_typed_query() {
        let cli = parse(&[
            "fetch-issues", "--repo", "octocat/hello-world", "--state", "Open", "--max", "5", "--out", "issues.csv",
        ]);

        let request = cli.command.validate().unwrap();

        assert_eq!(
            request,
            Request::Issues {
                query: IssueQuery::new(RepositoryId::parse("octocat/hello-world").unwrap())
                    .with_state(StateFilter::Open)
                    .with_cap(RecordCap::from_requested(Some(5)).unwrap()),
                out: PathBuf::from("issues.csv"),
            }
        );
    }

    #[rstest]
    #[case(&["fetch-commits", "--repo", "octocat", "--out", "c.csv"])]
    #[case(&["fetch-commits", "--repo", "octocat/hello-world", "--max", "0", "--out", "c.csv"])]
    #[case(&["fetch-commits", "--repo", "octocat/hello-world", "--max", "-3", "--out", "c.csv"])]
    #[case(&["fetch-issues", "--repo", "octocat/hello-world", "--state", "merged", "--out", "i.csv"])]
    fn invalid_arguments_are_rejected_before_fetching(#[case] args: &[&str]) {
        assert!(parse(args).command.validate().is_err());
    }

    #[test]
    fn connection_options_build_a_config() {
        let cli = parse(&[
            "--api-url", "https://ghe.example.com/api/v3", "--page-size", "30", "--token", "t0k",
            "fetch-commits", "--repo", "o/r", "--out", "c.csv",
        ]);

        let config = cli.connection.config().unwrap();

        assert_eq!(config.base_url().as_str(), "https://ghe.example.com/api/v3");
        assert_eq!(config.page_size().get(), 30);
        assert_eq!(config.token(), Some("t0k"));
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.user_agent(), github::DEFAULT_USER_AGENT);
    }

    #[test]
    fn timeout_and_user_agent_overrides_reach_the_config() {
        let cli = parse(&[
            "fetch-issues", "--repo", "o/r", "--out", "i.csv", "--timeout", "5", "--user-agent", "mining-bot/2",
        ]);

        let config = cli.connection.config().unwrap();

        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.user_agent(), "mining-bot/2");
    }

    #[test]
    fn out_of_range_page_size_is_rejected() {
        let cli = parse(&["--page-size", "500", "fetch-commits", "--repo", "o/r", "--out", "c.csv"]);
        assert!(cli.connection.config().is_err());
    }

    #[test]
    fn successful_export_writes_every_row() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("commits.csv");
        let source = InMemoryCommitSource::new(vec![commit("a"), commit("b"), commit("c")]);
        let query = CommitQuery::new(RepositoryId::parse("o/r").unwrap());

        assert_eq!(export_commits(&source, &query, &out).unwrap(), 3);
        let written = std::fs::read_to_string(&out).unwrap();
        assert_eq!(written.lines().count(), 4);
    }

    #[test]
    fn authentication_failure_creates_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("commits.csv");
        let err = RemoteAccessError::Unauthorized {
            message: "Bad credentials".to_owned(),
        };
        let source = InMemoryCommitSource::new(vec![commit("a")]).failing_on_open(err.clone());
        let query = CommitQuery::new(RepositoryId::parse("o/r").unwrap());

        let failure = export_commits(&source, &query, &out).unwrap_err();

        assert_eq!(
            failure.downcast_ref::<MinerError>(),
            Some(&MinerError::RemoteAccess(err))
        );
        assert!(!out.exists());
    }

    #[test]
    fn mid_stream_failure_leaves_existing_output_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("issues.csv");
        std::fs::write(&out, "previous run").unwrap();
        let source = InMemoryIssueSource::new(vec![]).failing_at(0, RemoteAccessError::RateLimited { reset_at: None });
        let query = IssueQuery::new(RepositoryId::parse("o/r").unwrap());

        assert!(export_issues(&source, &query, &out).is_err());
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "previous run");
    }
}
