use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{header::CONTENT_TYPE, HeaderValue, Method};
use reqwest::Client;
use sqlx::PgPool;
#[cfg(not(feature = "tls"))]
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use repobadge_backend::{
    config::Config,
    db::{postgres_user_repository::PostgresUserRepository, user_repository::UserRepository},
    routes::app_router,
    services::oauth::github::client::GitHubOAuthClient,
    state::AppState,
};

#[cfg(feature = "tls")]
use axum_server::tls_rustls::RustlsConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    init_tracing();

    let pg_pool = establish_connection(&config.database_url).await?;
    let user_repo = Arc::new(PostgresUserRepository { pool: pg_pool }) as Arc<dyn UserRepository>;

    let github_oauth = Arc::new(GitHubOAuthClient::new(
        Client::new(),
        config.github.clone(),
    ));

    let response_mode = config.response_mode();
    match response_mode {
        Some(mode) => info!(
            process_mode = ?config.process_mode,
            ?mode,
            "GitHub callback response mode resolved"
        ),
        None => warn!(
            process_mode = ?config.process_mode,
            "Unknown process mode; GitHub callback disabled"
        ),
    }

    let state = AppState {
        db: user_repo,
        github_oauth,
        response_mode,
    };

    let mut app = app_router(state);
    if let Some(origin) = &config.frontend_origin {
        let origin = origin
            .parse::<HeaderValue>()
            .context("FRONTEND_ORIGIN is not a valid header value")?;
        app = app.layer(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([CONTENT_TYPE]),
        );
    }

    let make_service = app.into_make_service();
    let addr = config.bind_addr;

    #[cfg(feature = "tls")]
    {
        // TLS: Only run this block when `--features tls` is used
        let tls_config = RustlsConfig::from_pem_file(
            std::env::var("DEV_CERT_LOCATION").context("DEV_CERT_LOCATION must be set")?,
            std::env::var("DEV_KEY_LOCATION").context("DEV_KEY_LOCATION must be set")?,
        )
        .await
        .context("Failed to load TLS certs")?;

        info!("Running with TLS at https://{}", addr);
        axum_server::bind_rustls(addr, tls_config)
            .serve(make_service)
            .await
            .context("TLS server error")?;
    }

    #[cfg(not(feature = "tls"))]
    {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {}", addr))?;
        info!("Running without TLS at http://{}", addr);
        axum::serve(listener, make_service)
            .await
            .context("server error")?;
    }

    Ok(())
}

/// `RUST_LOG` filters (default `info`); `LOG_FORMAT=json` switches to structured output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|value| value.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Establish a connection to the database and verify it.
async fn establish_connection(database_url: &str) -> Result<PgPool> {
    let pool = PgPool::connect(database_url)
        .await
        .context("Failed to connect to the database")?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .context("Failed to verify database connection")?;

    info!("✅ Successfully connected to the database");
    Ok(pool)
}
