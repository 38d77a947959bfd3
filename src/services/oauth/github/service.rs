// services/oauth/github/service.rs

use super::{
    errors::GitHubApiError,
    models::{GitHubRepository, GitHubToken, GitHubUser},
};
use async_trait::async_trait;

#[async_trait]
pub trait GitHubOAuthService: Send + Sync {
    async fn exchange_code_for_token(&self, code: &str) -> Result<GitHubToken, GitHubApiError>;
    async fn fetch_user_info(&self, token: &GitHubToken) -> Result<GitHubUser, GitHubApiError>;
    /// Public repositories the user owns, administers, or maintains.
    async fn fetch_user_repositories(
        &self,
        token: &GitHubToken,
    ) -> Result<Vec<GitHubRepository>, GitHubApiError>;
}
