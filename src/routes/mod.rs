pub mod github;

use axum::{
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{responses::JsonResponse, state::AppState};

/// Full application router; the GitHub callback follows `state.response_mode`.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .merge(github::github_routes(state.response_mode))
        .fallback(not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// A simple root route.
async fn root() -> Response {
    JsonResponse::success("Hello, RepoBadge!").into_response()
}

async fn not_found() -> Response {
    JsonResponse::not_found("Not found").into_response()
}
