use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::services::oauth::github::{
    errors::GitHubApiError,
    models::{GitHubRepository, GitHubToken, GitHubUser},
    service::GitHubOAuthService,
};

/// Scripted GitHub double. A `*_error` message makes that call fail; every call is recorded.
#[derive(Default)]
pub struct MockGitHubOAuth {
    pub token: GitHubToken,
    pub user_info: GitHubUser,
    pub repositories: Vec<GitHubRepository>,
    pub token_error: Option<String>,
    pub user_info_error: Option<String>,
    pub repositories_error: Option<String>,
    pub calls: Mutex<Vec<&'static str>>,
    pub received_codes: Mutex<Vec<String>>,
}

impl MockGitHubOAuth {
    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn call_count(&self, call: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|recorded| **recorded == call)
            .count()
    }
}

#[async_trait]
impl GitHubOAuthService for MockGitHubOAuth {
    async fn exchange_code_for_token(&self, code: &str) -> Result<GitHubToken, GitHubApiError> {
        self.record("exchange_code_for_token");
        self.received_codes.lock().unwrap().push(code.to_string());
        match &self.token_error {
            Some(error) => Err(GitHubApiError::OAuth {
                error: error.clone(),
                description: None,
            }),
            None => Ok(self.token.clone()),
        }
    }

    async fn fetch_user_info(&self, _token: &GitHubToken) -> Result<GitHubUser, GitHubApiError> {
        self.record("fetch_user_info");
        match &self.user_info_error {
            Some(message) => Err(GitHubApiError::UnexpectedStatus {
                status: StatusCode::UNAUTHORIZED,
                message: message.clone(),
            }),
            None => Ok(self.user_info.clone()),
        }
    }

    async fn fetch_user_repositories(
        &self,
        _token: &GitHubToken,
    ) -> Result<Vec<GitHubRepository>, GitHubApiError> {
        self.record("fetch_user_repositories");
        match &self.repositories_error {
            Some(message) => Err(GitHubApiError::UnexpectedStatus {
                status: StatusCode::FORBIDDEN,
                message: message.clone(),
            }),
            None => Ok(self.repositories.clone()),
        }
    }
}
