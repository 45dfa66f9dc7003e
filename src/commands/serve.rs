//! Serve command - Starts the HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::api::{create_router, AppState};
use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{Database, RateLimiter};

/// Execute the serve command
pub async fn execute(args: ServeArgs, config: Config) -> AppResult<()> {
    tracing::info!("Starting server...");

    // Initialize database (applies pending migrations)
    let db = Arc::new(Database::connect(&config).await?);

    // Rate limiting is optional and only enabled with REDIS_URL
    let rate_limiter = match &config.redis_url {
        Some(url) => Some(Arc::new(
            RateLimiter::connect(url)
                .await
                .map_err(|e| AppError::internal(format!("Failed to connect to Redis: {}", e)))?
                .trust_proxy_headers(config.trust_proxy_headers),
        )),
        None => {
            tracing::warn!("REDIS_URL not set - credential rate limiting disabled");
            None
        }
    };

    let app_state = AppState::from_config(db, rate_limiter, config);

    // Build router
    let app = create_router(app_state);

    // Start server
    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);

    // Connection info feeds the rate limiter's client identifier
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    Ok(())
}
