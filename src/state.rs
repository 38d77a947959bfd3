use crate::config::ResponseMode;
use crate::db::user_repository::UserRepository;
use crate::services::oauth::github::service::GitHubOAuthService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn UserRepository>,
    pub github_oauth: Arc<dyn GitHubOAuthService + Send + Sync>,
    /// Resolved once at startup; `None` leaves the callback unrouted.
    pub response_mode: Option<ResponseMode>,
}
