//! CSV sink tests.

use pipeline::{CommitSha, FlatCommitRecord, FlatIssueRecord, IssueNumber, IssueState, Timestamp};
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};

use super::*;

fn ts(value: &str) -> Timestamp {
    Timestamp::parse_rfc3339(value).unwrap()
}

fn render<R: FlatRecord>(records: &[R]) -> String {
    let mut out = Vec::new();
    write_csv(&mut out, records).unwrap();
    String::from_utf8(out).unwrap()
}

#[fixture]
fn commit() -> FlatCommitRecord {
    FlatCommitRecord {
        sha: CommitSha::new("6dcb09b5b57875f334f61aebed695e2e4193db5e").unwrap(),
        author_name: "Doe, Jane".to_owned(),
        author_email: "jane@example.com".to_owned(),
        author_date: ts("2024-05-01T12:00:00Z"),
        message: "Fix \"parser\"\n\nHandles commas, quotes and newlines.".to_owned(),
    }
}

#[fixture]
fn issues() -> Vec<FlatIssueRecord> {
    vec![
        FlatIssueRecord {
            id: IssueNumber::new(1),
            title: "Open, still".to_owned(),
            user: "octocat".to_owned(),
            state: IssueState::Open,
            created_at: ts("2024-01-01T00:00:00Z"),
            closed_at: None,
        },
        FlatIssueRecord {
            id: IssueNumber::new(2),
            title: "Done".to_owned(),
            user: "ghost".to_owned(),
            state: IssueState::Closed,
            created_at: ts("2024-01-01T00:00:00Z"),
            closed_at: Some(ts("2024-01-02T00:00:00Z")),
        },
    ]
}

#[test]
fn header_is_written_for_empty_output() {
    assert_eq!(
        render::<FlatCommitRecord>(&[]),
        "sha,author_name,author_email,author_date,message\n"
    );
    assert_eq!(
        render::<FlatIssueRecord>(&[]),
        "id,title,user,state,created_at,closed_at\n"
    );
}

#[rstest]
fn issue_rows_keep_column_order_and_blank_absent_values(issues: Vec<FlatIssueRecord>) {
    assert_eq!(
        render(&issues),
        "id,title,user,state,created_at,closed_at\n\
         1,\"Open, still\",octocat,open,2024-01-01T00:00:00Z,\n\
         2,Done,ghost,closed,2024-01-01T00:00:00Z,2024-01-02T00:00:00Z\n"
    );
}

#[rstest]
fn free_text_is_escaped(commit: FlatCommitRecord) {
    assert_eq!(
        render(&[commit]),
        "sha,author_name,author_email,author_date,message\n\
         6dcb09b5b57875f334f61aebed695e2e4193db5e,\"Doe, Jane\",jane@example.com,2024-05-01T12:00:00Z,\
         \"Fix \"\"parser\"\"\n\nHandles commas, quotes and newlines.\"\n"
    );
}

#[rstest]
fn commit_row_reads_back_unchanged(commit: FlatCommitRecord) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("commits.csv");

    assert_eq!(write_csv_file(&path, &[commit.clone()]).unwrap(), 1);

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers: Vec<_> = reader.headers().unwrap().iter().map(str::to_owned).collect();
    assert_eq!(headers, FlatCommitRecord::COLUMNS);
    let rows: Vec<FlatCommitRecord> = reader.deserialize().collect::<Result<_, _>>().unwrap();
    assert_eq!(rows, vec![commit]);
}

#[rstest]
fn issue_rows_read_back_with_absent_closed_at(issues: Vec<FlatIssueRecord>) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("issues.csv");

    write_csv_file(&path, &issues).unwrap();

    let rows: Vec<FlatIssueRecord> = csv::Reader::from_path(&path)
        .unwrap()
        .deserialize()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(rows, issues);
}

#[rstest]
fn file_write_replaces_previous_contents(issues: Vec<FlatIssueRecord>) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("issues.csv");
    std::fs::write(&path, "stale").unwrap();

    write_csv_file(&path, &issues[..1]).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("id,title,user,state,created_at,closed_at\n1,"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn missing_directory_is_an_io_error_and_creates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent").join("out.csv");

    let err = write_csv_file::<FlatIssueRecord>(&path, &[]).unwrap_err();

    assert!(matches!(err, SinkError::Io { .. }));
    assert!(!path.exists());
}
