use std::convert::Infallible;

use axum::{
    extract::{FromRequest, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    config::ResponseMode,
    models::user::{NewUser, SavedUser},
    services::oauth::github::{
        errors::GitHubApiError,
        models::{GitHubCallback, GitHubRepository},
    },
    state::AppState,
};

pub const GITHUB_CALLBACK_PATH: &str = "/api/callback/github";
pub const REPOS_TO_BADGE_PATH: &str = "/api/repos-to-badge";
const PROVIDER: &str = "github";

#[derive(Debug, Error)]
pub enum CallbackError {
    #[error(transparent)]
    TokenExchange(GitHubApiError),
    #[error(transparent)]
    UserInfoFetch(GitHubApiError),
    #[error("Error saving user info")]
    Persistence,
    #[error(transparent)]
    RepositoryFetch(GitHubApiError),
    #[error("Unknown process mode")]
    UnknownMode,
}

impl CallbackError {
    fn stage(&self) -> &'static str {
        match self {
            CallbackError::TokenExchange(_) => "token_exchange",
            CallbackError::UserInfoFetch(_) => "user_info",
            CallbackError::Persistence => "persistence",
            CallbackError::RepositoryFetch(_) => "repositories",
            CallbackError::UnknownMode => "response_mode",
        }
    }
}

impl IntoResponse for CallbackError {
    fn into_response(self) -> Response {
        error!(stage = self.stage(), error = %self, "GitHub OAuth callback failed");
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

/// Authorization code from the body (JSON or form), else the query string.
/// A missing code is passed on as an empty string.
pub struct CallbackCode(pub String);

impl<S> FromRequest<S> for CallbackCode
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let query_code = Query::<GitHubCallback>::try_from_uri(req.uri())
            .ok()
            .and_then(|Query(params)| params.code);

        let body_code = if has_json_content_type(req.headers()) {
            Json::<GitHubCallback>::from_request(req, state)
                .await
                .ok()
                .and_then(|Json(params)| params.code)
        } else {
            Form::<GitHubCallback>::from_request(req, state)
                .await
                .ok()
                .and_then(|Form(params)| params.code)
        };

        Ok(CallbackCode(body_code.or(query_code).unwrap_or_default()))
    }
}

/// `application/json` or any `+json` subtype, compared case-insensitively.
fn has_json_content_type(headers: &HeaderMap) -> bool {
    let Some(mime) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<mime::Mime>().ok())
    else {
        return false;
    };

    mime.type_() == "application"
        && (mime.subtype() == "json" || mime.suffix().is_some_and(|name| name == "json"))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GitHubLoginPayload {
    pub user_id: i64,
    pub name: String,
    pub username: String,
    pub email: Option<String>,
    pub repos: Vec<GitHubRepository>,
    pub provider: &'static str,
}

/// Exchanges the code, saves the GitHub user and answers with their repositories.
pub async fn github_callback(
    State(state): State<AppState>,
    CallbackCode(code): CallbackCode,
) -> Response {
    match complete_login(&state, &code).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

async fn complete_login(state: &AppState, code: &str) -> Result<Response, CallbackError> {
    let token = state
        .github_oauth
        .exchange_code_for_token(code)
        .await
        .map_err(CallbackError::TokenExchange)?;

    let user_info = state
        .github_oauth
        .fetch_user_info(&token)
        .await
        .map_err(CallbackError::UserInfoFetch)?;

    let new_user = NewUser {
        login: user_info.login,
        name: user_info.name,
        email: user_info.email,
        github_id: Some(user_info.id),
        gitlab_id: None,
    };

    let saved_user = match state.db.save_user(&new_user).await {
        Ok(Some(user)) => user,
        Ok(None) => return Err(CallbackError::Persistence),
        Err(e) => {
            error!(login = %new_user.login, "DB user save error: {:?}", e);
            return Err(CallbackError::Persistence);
        }
    };

    let repositories = state
        .github_oauth
        .fetch_user_repositories(&token)
        .await
        .map_err(CallbackError::RepositoryFetch)?;

    info!(
        user_id = saved_user.id,
        repos = repositories.len(),
        "GitHub login completed"
    );

    match state.response_mode {
        Some(ResponseMode::Json) => Ok((
            StatusCode::OK,
            Json(GitHubLoginPayload {
                user_id: saved_user.id,
                name: saved_user.name,
                username: saved_user.login,
                email: saved_user.email,
                repos: repositories,
                provider: PROVIDER,
            }),
        )
            .into_response()),
        Some(ResponseMode::Html) => Ok((
            StatusCode::OK,
            Html(render_repo_selection(&saved_user, &repositories)),
        )
            .into_response()),
        None => Err(CallbackError::UnknownMode),
    }
}

/// Development page listing repositories as checkboxes for badge selection.
pub fn render_repo_selection(user: &SavedUser, repositories: &[GitHubRepository]) -> String {
    let repo_items: String = repositories
        .iter()
        .map(|repo| {
            format!(
                r#"
        <div>
          <input type="checkbox" id="{id}" name="repos[]" value="{id}">
          <label for="{id}">{full_name}</label>
        </div>"#,
                id = repo.id,
                full_name = escape_html(&repo.full_name),
            )
        })
        .collect();

    format!(
        r#"<html>
  <head>
    <title>Repo List</title>
  </head>
  <body>
    <h1>Welcome {name}</h1>
    <h2>Username: {login}</h2>
    <h2>Email: {email}</h2>
    <form action="{action}" method="post">
      <input type="hidden" name="provider" value="{provider}">
      <input type="hidden" name="userId" value="{user_id}">
      <h2>Select Repositories:</h2>{repo_items}
      <br>
      <input type="submit" value="Submit">
    </form>
  </body>
</html>
"#,
        name = escape_html(&user.name),
        login = escape_html(&user.login),
        email = escape_html(user.email.as_deref().unwrap_or("")),
        action = REPOS_TO_BADGE_PATH,
        provider = PROVIDER,
        user_id = user.id,
        repo_items = repo_items,
    )
}

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Mounts the callback as `POST` for JSON mode or `GET` for HTML mode; nothing otherwise.
pub fn github_routes(mode: Option<ResponseMode>) -> Router<AppState> {
    let router = Router::new();
    match mode {
        Some(ResponseMode::Json) => router.route(GITHUB_CALLBACK_PATH, post(github_callback)),
        Some(ResponseMode::Html) => router.route(GITHUB_CALLBACK_PATH, get(github_callback)),
        None => {
            warn!("Unknown process mode, GitHub callback route not registered");
            router
        }
    }
}
