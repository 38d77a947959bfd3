// services/oauth/github/errors.rs
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitHubApiError {
    #[error("failed to perform GitHub request: {0}")]
    Http(#[from] reqwest::Error),
    #[error("GitHub responded with status {status}: {message}")]
    UnexpectedStatus { status: StatusCode, message: String },
    #[error("GitHub returned an invalid response: {0}")]
    InvalidResponse(String),
    #[error("{}", description.as_deref().unwrap_or(error))]
    OAuth {
        error: String,
        description: Option<String>,
    },
}

/// Pulls GitHub's `message` field out of an error body, falling back to the raw text.
pub(crate) fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| json["message"].as_str().map(str::to_string))
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oauth_error_prefers_description() {
        let err = GitHubApiError::OAuth {
            error: "bad_verification_code".into(),
            description: Some("The code passed is incorrect or expired.".into()),
        };
        assert_eq!(err.to_string(), "The code passed is incorrect or expired.");

        let err = GitHubApiError::OAuth {
            error: "bad_verification_code".into(),
            description: None,
        };
        assert_eq!(err.to_string(), "bad_verification_code");
    }

    #[test]
    fn extracts_message_from_json_body() {
        let body = r#"{"message":"Bad credentials","documentation_url":"https://docs.github.com"}"#;
        assert_eq!(extract_error_message(body), "Bad credentials");
        assert_eq!(extract_error_message("  upstream down \n"), "upstream down");
    }
}
