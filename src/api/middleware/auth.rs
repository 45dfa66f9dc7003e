//! JWT authentication middleware.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::api::AppState;
use crate::config::BEARER_TOKEN_PREFIX;
use crate::domain::access::{self, Decision};
use crate::domain::{Principal, Role};
use crate::errors::{AppError, AppResult};

/// JWT authentication middleware.
///
/// Extracts and validates the JWT token from the Authorization header,
/// then injects the [`Principal`] into the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = auth_header
        .strip_prefix(BEARER_TOKEN_PREFIX)
        .ok_or(AppError::Unauthorized)?;

    let claims = state.auth_service.verify_token(token).map_err(|e| {
        tracing::debug!(error = %e, path = %request.uri().path(), "Rejected session token");
        AppError::Unauthorized
    })?;

    request.extensions_mut().insert(Principal::from(claims));

    Ok(next.run(request).await)
}

/// Turn an authorization decision into a result, logging denials.
pub fn enforce(decision: Decision, principal: &Principal, action: &str) -> AppResult<()> {
    if !decision.is_allowed() {
        tracing::warn!(
            user_id = %principal.id,
            role = %principal.role,
            action = action,
            "Authorization denied"
        );
    }
    decision.into_result()
}

/// Require at least `required` privilege.
pub fn require_role(principal: &Principal, required: Role) -> AppResult<()> {
    enforce(
        access::authorize(Some(principal), required),
        principal,
        required.as_str(),
    )
}

/// Require admin or superuser.
pub fn require_admin(principal: &Principal) -> AppResult<()> {
    require_role(principal, Role::Admin)
}
