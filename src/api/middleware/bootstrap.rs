//! Bootstrap gate middleware.
//!
//! Runs on every request. While no superuser exists, everything except the
//! superuser bootstrap routes, signin, health and docs gets `SETUP_REQUIRED`.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::api::AppState;
use crate::errors::AppError;

pub async fn bootstrap_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    state.setup_gate.check(request.uri().path()).await?;
    Ok(next.run(request).await)
}
