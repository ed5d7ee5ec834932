//! Mapping from HTTP responses to [`RemoteAccessError`].

use chrono::DateTime;
use pipeline::{RemoteAccessError, RepositoryId, Timestamp};
use serde::Deserialize;

use crate::transport::RawResponse;

/// GitHub's error body: `{"message": "...", "documentation_url": "..."}`.
#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Accepts 2xx responses and classifies everything else.
pub(crate) fn check_status(response: &RawResponse, repository: &RepositoryId) -> Result<(), RemoteAccessError> {
    let status = response.status;
    if (200..300).contains(&status) {
        return Ok(());
    }
    let message = error_message(&response.body);
    Err(match status {
        401 => RemoteAccessError::Unauthorized { message },
        403 | 429 if status == 429 || response.rate_limit_remaining == Some(0) => {
            RemoteAccessError::RateLimited {
                reset_at: response
                    .rate_limit_reset
                    .and_then(|secs| DateTime::from_timestamp(secs, 0))
                    .map(Timestamp::from_utc),
            }
        }
        403 => RemoteAccessError::Forbidden { message },
        404 => RemoteAccessError::RepositoryNotFound {
            repository: repository.to_string(),
        },
        _ => RemoteAccessError::UnexpectedStatus { status, message },
    })
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|parsed| parsed.message)
        .unwrap_or_else(|_| body.chars().take(200).collect())
}
