// services/oauth/github/client.rs

use crate::config::GitHubSettings;
use crate::services::oauth::github::errors::{extract_error_message, GitHubApiError};
use crate::services::oauth::github::models::{
    GitHubRepository, GitHubToken, GitHubUser, RawRepository, RawTokenResponse, RawUser,
};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::de::DeserializeOwned;

use super::service::GitHubOAuthService;

const USER_AGENT: &str = "repobadge";
const REPOS_PER_PAGE: usize = 100;

#[derive(Clone)]
pub struct GitHubOAuthClient {
    pub client: Client,
    pub settings: GitHubSettings,
}

impl GitHubOAuthClient {
    pub fn new(client: Client, settings: GitHubSettings) -> Self {
        Self { client, settings }
    }

    fn api_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.settings.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn github_get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        token: &GitHubToken,
    ) -> Result<T, GitHubApiError> {
        let response = self
            .client
            .get(self.api_url(path))
            .query(query)
            .bearer_auth(&token.access_token)
            .header(header::ACCEPT, "application/vnd.github+json")
            .header(header::USER_AGENT, USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GitHubApiError::UnexpectedStatus {
                status,
                message: extract_error_message(&body),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|err| GitHubApiError::InvalidResponse(err.to_string()))
    }
}

#[async_trait]
impl GitHubOAuthService for GitHubOAuthClient {
    async fn exchange_code_for_token(&self, code: &str) -> Result<GitHubToken, GitHubApiError> {
        let response = self
            .client
            .post(&self.settings.token_url)
            .header(header::ACCEPT, "application/json") // Needed to get JSON response instead of URL-encoded
            .header(header::USER_AGENT, USER_AGENT)
            .form(&[
                ("client_id", self.settings.client_id.as_str()),
                ("client_secret", self.settings.client_secret.as_str()),
                ("code", code),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GitHubApiError::UnexpectedStatus {
                status,
                message: extract_error_message(&body),
            });
        }

        let body: RawTokenResponse = response
            .json()
            .await
            .map_err(|err| GitHubApiError::InvalidResponse(err.to_string()))?;

        // GitHub reports a bad code with a 200 and an `error` field
        if let Some(error) = body.error {
            return Err(GitHubApiError::OAuth {
                error,
                description: body.error_description,
            });
        }

        match body.access_token {
            Some(access_token) if !access_token.is_empty() => Ok(GitHubToken { access_token }),
            _ => Err(GitHubApiError::InvalidResponse(
                "missing access_token".to_string(),
            )),
        }
    }

    async fn fetch_user_info(&self, token: &GitHubToken) -> Result<GitHubUser, GitHubApiError> {
        let raw: RawUser = self.github_get("/user", &[], token).await?;
        Ok(raw.into())
    }

    async fn fetch_user_repositories(
        &self,
        token: &GitHubToken,
    ) -> Result<Vec<GitHubRepository>, GitHubApiError> {
        let mut repositories = Vec::new();
        let mut page = 1usize;

        loop {
            let query = [
                ("visibility", "public".to_string()),
                (
                    "affiliation",
                    "owner,collaborator,organization_member".to_string(),
                ),
                ("per_page", REPOS_PER_PAGE.to_string()),
                ("page", page.to_string()),
            ];
            let batch: Vec<RawRepository> = self.github_get("/user/repos", &query, token).await?;
            let fetched = batch.len();

            repositories.extend(
                batch
                    .into_iter()
                    .filter(RawRepository::is_managed)
                    .map(GitHubRepository::from),
            );

            if fetched < REPOS_PER_PAGE {
                break;
            }
            page += 1;
        }

        tracing::debug!(count = repositories.len(), "fetched GitHub repositories");
        Ok(repositories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn client_for(server: &httpmock::MockServer) -> GitHubOAuthClient {
        GitHubOAuthClient::new(
            Client::new(),
            GitHubSettings {
                client_id: "client-id".into(),
                client_secret: "client-secret".into(),
                token_url: server.url("/login/oauth/access_token"),
                api_base_url: server.url(""),
            },
        )
    }

    fn token() -> GitHubToken {
        GitHubToken {
            access_token: "gho_token".into(),
        }
    }

    #[tokio::test]
    async fn exchanges_code_for_token() {
        let server = httpmock::MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(httpmock::Method::POST)
                .path("/login/oauth/access_token")
                .header("accept", "application/json")
                .x_www_form_urlencoded_tuple("client_id", "client-id")
                .x_www_form_urlencoded_tuple("client_secret", "client-secret")
                .x_www_form_urlencoded_tuple("code", "abc123");
            then.status(200)
                .header("content-type", "application/json")
                .body(
                    serde_json::json!({
                        "access_token": "gho_token",
                        "token_type": "bearer",
                        "scope": ""
                    })
                    .to_string(),
                );
        });

        let token = client_for(&server)
            .exchange_code_for_token("abc123")
            .await
            .expect("token");

        mock.assert();
        assert_eq!(token.access_token, "gho_token");
    }

    #[tokio::test]
    async fn token_exchange_surfaces_oauth_error_payload() {
        let server = httpmock::MockServer::start();
        server.mock(|when, then| {
            when.method(httpmock::Method::POST)
                .path("/login/oauth/access_token");
            then.status(200)
                .header("content-type", "application/json")
                .body(
                    serde_json::json!({
                        "error": "bad_verification_code",
                        "error_description": "The code passed is incorrect or expired."
                    })
                    .to_string(),
                );
        });

        let err = client_for(&server)
            .exchange_code_for_token("stale")
            .await
            .expect_err("oauth error");

        match err {
            GitHubApiError::OAuth { error, description } => {
                assert_eq!(error, "bad_verification_code");
                assert_eq!(
                    description.as_deref(),
                    Some("The code passed is incorrect or expired.")
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn token_exchange_without_access_token_is_invalid() {
        let server = httpmock::MockServer::start();
        server.mock(|when, then| {
            when.method(httpmock::Method::POST)
                .path("/login/oauth/access_token");
            then.status(200)
                .header("content-type", "application/json")
                .body("{}");
        });

        let err = client_for(&server)
            .exchange_code_for_token("abc")
            .await
            .expect_err("missing token");
        assert!(matches!(err, GitHubApiError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn fetches_user_info_with_bearer_token() {
        let server = httpmock::MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(httpmock::Method::GET)
                .path("/user")
                .header("authorization", "Bearer gho_token")
                .header("user-agent", USER_AGENT);
            then.status(200)
                .header("content-type", "application/json")
                .body(
                    serde_json::json!({
                        "id": 583231,
                        "login": "octocat",
                        "name": "The Octocat",
                        "email": "octocat@github.com"
                    })
                    .to_string(),
                );
        });

        let user = client_for(&server)
            .fetch_user_info(&token())
            .await
            .expect("user");

        mock.assert();
        assert_eq!(
            user,
            GitHubUser {
                login: "octocat".into(),
                name: "The Octocat".into(),
                email: Some("octocat@github.com".into()),
                id: "583231".into(),
            }
        );
    }

    #[tokio::test]
    async fn user_info_reports_status_and_message() {
        let server = httpmock::MockServer::start();
        server.mock(|when, then| {
            when.any_request();
            then.status(401)
                .header("content-type", "application/json")
                .body(serde_json::json!({ "message": "Bad credentials" }).to_string());
        });

        let err = client_for(&server)
            .fetch_user_info(&token())
            .await
            .expect_err("unauthorized");

        match err {
            GitHubApiError::UnexpectedStatus { status, message } => {
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert_eq!(message, "Bad credentials");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn lists_only_managed_public_repositories() {
        let server = httpmock::MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(httpmock::Method::GET)
                .path("/user/repos")
                .query_param("visibility", "public")
                .query_param("affiliation", "owner,collaborator,organization_member")
                .query_param("per_page", "100")
                .query_param("page", "1");
            then.status(200)
                .header("content-type", "application/json")
                .body(
                    serde_json::json!([
                        { "id": 10, "full_name": "alice/repo1", "permissions": { "admin": true, "maintain": true, "push": true } },
                        { "id": 11, "full_name": "org/shared", "permissions": { "admin": false, "maintain": true, "push": true } },
                        { "id": 12, "full_name": "org/readonly", "permissions": { "admin": false, "maintain": false, "push": false } },
                        { "id": 13, "full_name": "org/unknown" }
                    ])
                    .to_string(),
                );
        });

        let repos = client_for(&server)
            .fetch_user_repositories(&token())
            .await
            .expect("repos");

        mock.assert();
        assert_eq!(
            repos,
            vec![
                GitHubRepository {
                    id: 10,
                    full_name: "alice/repo1".into()
                },
                GitHubRepository {
                    id: 11,
                    full_name: "org/shared".into()
                },
            ]
        );
    }

    #[tokio::test]
    async fn follows_pages_until_a_short_page() {
        let full_page: Vec<serde_json::Value> = (0..REPOS_PER_PAGE as i64)
            .map(|i| {
                serde_json::json!({
                    "id": i,
                    "full_name": format!("alice/repo{i}"),
                    "permissions": { "admin": true }
                })
            })
            .collect();

        let server = httpmock::MockServer::start();
        let first = server.mock(|when, then| {
            when.method(httpmock::Method::GET)
                .path("/user/repos")
                .query_param("page", "1");
            then.status(200)
                .header("content-type", "application/json")
                .body(serde_json::Value::Array(full_page).to_string());
        });
        let second = server.mock(|when, then| {
            when.method(httpmock::Method::GET)
                .path("/user/repos")
                .query_param("page", "2");
            then.status(200)
                .header("content-type", "application/json")
                .body(
                    serde_json::json!([
                        { "id": 500, "full_name": "alice/last", "permissions": { "admin": true } }
                    ])
                    .to_string(),
                );
        });

        let repos = client_for(&server)
            .fetch_user_repositories(&token())
            .await
            .expect("repos");

        first.assert();
        second.assert();
        assert_eq!(repos.len(), REPOS_PER_PAGE + 1);
        assert_eq!(repos.last().map(|r| r.id), Some(500));
    }
}
