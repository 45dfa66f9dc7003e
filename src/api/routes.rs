//! Application route configuration.

use axum::{extract::State, http::StatusCode, middleware, response::Json, routing::get, Router};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    account_routes, admin_routes, bootstrap_routes, profile_routes, status_routes, user_routes,
};
use super::middleware::{auth_middleware, bootstrap_middleware, rate_limit_auth_middleware};
use super::openapi::ApiDoc;
use super::AppState;

/// Create the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check endpoints (gate-exempt)
        .route("/", get(root))
        .route("/health", get(health))
        // OpenAPI Swagger UI documentation
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Registration and signin are rate limited; record access needs a token
        .nest(
            "/users",
            account_routes()
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    rate_limit_auth_middleware,
                ))
                .merge(user_routes().route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                ))),
        )
        // Superuser bootstrap, signin and profile
        .nest(
            "/superuser",
            status_routes()
                .merge(bootstrap_routes().route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    rate_limit_auth_middleware,
                )))
                .merge(profile_routes().route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                ))),
        )
        // Admin area (admin or superuser token)
        .nest(
            "/admin",
            admin_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        // Global middleware: the bootstrap gate sees every request
        .layer(middleware::from_fn_with_state(
            state.clone(),
            bootstrap_middleware,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Storefront API is running"
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    services: ServiceHealth,
}

/// Individual service health status
#[derive(Serialize)]
struct ServiceHealth {
    database: ServiceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    redis: Option<ServiceStatus>,
}

/// Service status
#[derive(Serialize)]
struct ServiceStatus {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ServiceStatus {
    fn from_result<E: std::fmt::Display>(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Self {
                status: "healthy",
                error: None,
            },
            Err(e) => Self {
                status: "unhealthy",
                error: Some(e.to_string()),
            },
        }
    }

    fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Health check endpoint with database and (when configured) Redis connectivity
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let db_status = ServiceStatus::from_result(state.database.ping().await);

    let redis_status = match &state.rate_limiter {
        Some(limiter) => Some(ServiceStatus::from_result(limiter.ping().await)),
        None => None,
    };

    let all_healthy =
        db_status.is_healthy() && redis_status.as_ref().map_or(true, ServiceStatus::is_healthy);

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" },
        services: ServiceHealth {
            database: db_status,
            redis: redis_status,
        },
    };

    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}
