use std::{env, net::SocketAddr};

use anyhow::{Context, Result};

pub const DEFAULT_GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
pub const DEFAULT_GITHUB_API_BASE_URL: &str = "https://api.github.com";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Deployment mode, read from `NODE_ENV`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessMode {
    Production,
    Development,
    Other(String),
}

impl ProcessMode {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("production") => ProcessMode::Production,
            Some("development") => ProcessMode::Development,
            Some(other) => ProcessMode::Other(other.to_string()),
            None => ProcessMode::Other(String::new()),
        }
    }
}

/// Shape of a successful OAuth callback response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    /// `POST` callback answered with a JSON payload.
    Json,
    /// `GET` callback answered with the repository selection page.
    Html,
}

impl ResponseMode {
    /// Forcing JSON wins over development mode.
    pub fn resolve(mode: &ProcessMode, return_json_on_login: bool) -> Option<Self> {
        match mode {
            ProcessMode::Production => Some(ResponseMode::Json),
            _ if return_json_on_login => Some(ResponseMode::Json),
            ProcessMode::Development => Some(ResponseMode::Html),
            ProcessMode::Other(_) => None,
        }
    }
}

#[derive(Clone)]
pub struct GitHubSettings {
    pub client_id: String,
    pub client_secret: String,
    pub token_url: String,
    pub api_base_url: String,
}

impl GitHubSettings {
    fn from_env() -> Result<Self> {
        Ok(GitHubSettings {
            client_id: env::var("GITHUB_CLIENT_ID").context("GITHUB_CLIENT_ID must be set")?,
            client_secret: env::var("GITHUB_CLIENT_SECRET")
                .context("GITHUB_CLIENT_SECRET must be set")?,
            token_url: env::var("GITHUB_OAUTH_TOKEN_URL")
                .unwrap_or_else(|_| DEFAULT_GITHUB_TOKEN_URL.to_string()),
            api_base_url: env::var("GITHUB_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GITHUB_API_BASE_URL.to_string()),
        })
    }
}

pub struct Config {
    pub database_url: String,
    pub frontend_origin: Option<String>,
    pub bind_addr: SocketAddr,
    pub process_mode: ProcessMode,
    pub return_json_on_login: bool,
    pub github: GitHubSettings,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok(); // Load .env file

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let frontend_origin = env::var("FRONTEND_ORIGIN")
            .ok()
            .filter(|origin| !origin.trim().is_empty());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("BIND_ADDR must be a socket address like 127.0.0.1:3000")?;

        let process_mode = ProcessMode::parse(env::var("NODE_ENV").ok().as_deref());
        let return_json_on_login = parse_flag(env::var("RETURN_JSON_ON_LOGIN").ok().as_deref());

        Ok(Config {
            database_url,
            frontend_origin,
            bind_addr,
            process_mode,
            return_json_on_login,
            github: GitHubSettings::from_env()?,
        })
    }

    pub fn response_mode(&self) -> Option<ResponseMode> {
        ResponseMode::resolve(&self.process_mode, self.return_json_on_login)
    }
}

/// Empty, `0` and `false` count as unset.
fn parse_flag(raw: Option<&str>) -> bool {
    match raw.map(str::trim) {
        None | Some("") | Some("0") => false,
        Some(value) => !value.eq_ignore_ascii_case("false"),
    }
}
