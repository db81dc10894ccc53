//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use anyhow::Context;
use axum::{
    Router, http,
    http::{Method, header},
};
use rbac::application::UserService;
use rbac::{AuthConfig, PgRbacRepository, rbac_router};
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

/// Minimum signing secret length accepted from the environment
const MIN_SECRET_LENGTH: usize = 32;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,rbac=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    let auth_config = auth_config_from_env()?;
    tracing::info!(
        token_ttl_secs = auth_config.token_ttl.as_secs(),
        password_min_length = auth_config.password_min_length,
        "Auth configuration loaded"
    );

    let repo = PgRbacRepository::new(pool.clone());

    bootstrap_super_admin(&repo, &auth_config).await?;

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:5173,http://127.0.0.1:5173".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]));

    // Build router
    let app = Router::new()
        .nest("/api", rbac_router(repo, auth_config))
        .fallback(route_not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        );

    // Start server
    let addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:31113".to_string())
        .parse()
        .context("BIND_ADDR must be a socket address")?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn route_not_found() -> AppError {
    AppError::not_found("Route not found")
}

/// Build [`AuthConfig`] from environment variables
///
/// `JWT_SECRET` is mandatory in release builds. Debug builds fall back to a
/// random secret, which invalidates every token on restart.
fn auth_config_from_env() -> anyhow::Result<AuthConfig> {
    let mut config = match env::var("JWT_SECRET") {
        Ok(secret) => {
            anyhow::ensure!(
                secret.len() >= MIN_SECRET_LENGTH,
                "JWT_SECRET must be at least {MIN_SECRET_LENGTH} bytes"
            );
            AuthConfig {
                token_secret: secret.into_bytes(),
                ..AuthConfig::default()
            }
        }
        Err(_) if cfg!(debug_assertions) => {
            tracing::warn!("JWT_SECRET not set, using a random development secret");
            AuthConfig::development()
        }
        Err(_) => anyhow::bail!("JWT_SECRET must be set in production"),
    };

    if let Ok(ttl) = env::var("JWT_TTL_SECS") {
        let secs: u64 = ttl.parse().context("JWT_TTL_SECS must be an integer")?;
        anyhow::ensure!(
            secs > 0 && i64::try_from(secs).is_ok(),
            "JWT_TTL_SECS must be between 1 and {}",
            i64::MAX
        );
        config.token_ttl = Duration::from_secs(secs);
    }

    if let Ok(min) = env::var("PASSWORD_MIN_LENGTH") {
        config.password_min_length = min
            .parse()
            .context("PASSWORD_MIN_LENGTH must be an integer")?;
    }

    if let Ok(pepper) = env::var("PASSWORD_PEPPER") {
        config.password_pepper = Some(pepper.into_bytes());
    }

    Ok(config)
}

/// Create the initial SuperAdmin when `BOOTSTRAP_ADMIN_EMAIL` is set
async fn bootstrap_super_admin(repo: &PgRbacRepository, config: &AuthConfig) -> anyhow::Result<()> {
    let Ok(email) = env::var("BOOTSTRAP_ADMIN_EMAIL") else {
        return Ok(());
    };
    let password = env::var("BOOTSTRAP_ADMIN_PASSWORD")
        .context("BOOTSTRAP_ADMIN_PASSWORD must be set with BOOTSTRAP_ADMIN_EMAIL")?;

    let repo = Arc::new(repo.clone());
    let service = UserService::new(repo.clone(), repo, Arc::new(config.clone()));

    match service.ensure_super_admin(&email, password).await {
        Ok(true) => tracing::info!("Bootstrap SuperAdmin created"),
        Ok(false) => tracing::info!("Bootstrap SuperAdmin already present"),
        Err(e) => anyhow::bail!("Bootstrap SuperAdmin failed: {}", e.to_app_error()),
    }

    Ok(())
}
