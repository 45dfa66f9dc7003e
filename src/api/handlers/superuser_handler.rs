//! Superuser bootstrap, signin and profile handlers.

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::user_handler::SigninRequest;
use crate::api::extractors::ValidatedJson;
use crate::api::middleware::enforce;
use crate::api::AppState;
use crate::config::SUPERUSER_CREATED_BY_SYSTEM;
use crate::domain::access::authorize_superuser_profile;
use crate::domain::{Principal, SuperUserProfile, SuperUserStatus};
use crate::errors::AppResult;
use crate::services::{SessionResponse, SuperUserSignup, SuperUserUpdate};
use crate::types::{blank_as_none, Created};

/// First-run superuser creation
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSuperUserRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    #[schema(example = "Store Owner")]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "owner@example.com")]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    #[schema(min_length = 6)]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateSuperUserRequest {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
}

/// Open superuser routes; `create` and `signin` sit behind the credential rate limiter
pub fn bootstrap_routes() -> Router<AppState> {
    Router::new()
        .route("/create", post(create_superuser))
        .route("/signin", post(signin_superuser))
}

/// Existence check, never rate limited
pub fn status_routes() -> Router<AppState> {
    Router::new().route("/check", get(check_superuser))
}

/// Token-protected superuser routes
pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile).put(update_profile))
}

/// Report whether the superuser has been created
#[utoipa::path(
    get,
    path = "/superuser/check",
    tag = "Superuser",
    responses((status = 200, description = "Superuser status", body = SuperUserStatus))
)]
pub async fn check_superuser(State(state): State<AppState>) -> AppResult<Json<SuperUserStatus>> {
    Ok(Json(state.superuser_service.status().await?))
}

/// Create the one and only superuser
#[utoipa::path(
    post,
    path = "/superuser/create",
    tag = "Superuser",
    request_body = CreateSuperUserRequest,
    responses(
        (status = 201, description = "Superuser created", body = SessionResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "A superuser already exists"),
        (status = 409, description = "Email already in use")
    )
)]
pub async fn create_superuser(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateSuperUserRequest>,
) -> AppResult<Created<SessionResponse>> {
    let session = state
        .auth_service
        .create_superuser(SuperUserSignup {
            name: payload.name,
            email: payload.email,
            password: payload.password,
            created_by: SUPERUSER_CREATED_BY_SYSTEM.to_string(),
        })
        .await?;

    Ok(Created(session))
}

/// Superuser-only signin
#[utoipa::path(
    post,
    path = "/superuser/signin",
    tag = "Superuser",
    request_body = SigninRequest,
    responses(
        (status = 200, description = "Signed in", body = SessionResponse),
        (status = 401, description = "Invalid email or password")
    )
)]
pub async fn signin_superuser(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<SigninRequest>,
) -> AppResult<Json<SessionResponse>> {
    let session = state
        .auth_service
        .signin_superuser(payload.email, payload.password)
        .await?;

    Ok(Json(session))
}

#[utoipa::path(
    get,
    path = "/superuser/profile",
    tag = "Superuser",
    responses(
        (status = 200, description = "Superuser profile", body = SuperUserProfile),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Superuser token required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> AppResult<Json<SuperUserProfile>> {
    enforce(authorize_superuser_profile(Some(&principal)), &principal, "read superuser profile")?;

    Ok(Json(state.superuser_service.profile(principal.id).await?))
}

#[utoipa::path(
    put,
    path = "/superuser/profile",
    tag = "Superuser",
    request_body = UpdateSuperUserRequest,
    responses(
        (status = 200, description = "Profile updated", body = SuperUserProfile),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Superuser token required"),
        (status = 409, description = "Email already in use")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ValidatedJson(payload): ValidatedJson<UpdateSuperUserRequest>,
) -> AppResult<Json<SuperUserProfile>> {
    enforce(authorize_superuser_profile(Some(&principal)), &principal, "update superuser profile")?;

    let profile = state
        .superuser_service
        .update_profile(
            principal.id,
            SuperUserUpdate {
                name: payload.name,
                email: payload.email,
                password: payload.password,
            },
        )
        .await?;

    Ok(Json(profile))
}
