//! Account handlers: registration, signin and self-service profile edits.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::enforce;
use crate::api::AppState;
use crate::domain::access::authorize_user_update;
use crate::domain::{Principal, UserResponse};
use crate::errors::AppResult;
use crate::services::{SessionResponse, UserUpdate};
use crate::types::{blank_as_none, Created};

/// User registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// Display name
    #[validate(length(min = 1, message = "Name is required"))]
    #[schema(example = "Jane Doe")]
    pub name: String,
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "jane@example.com")]
    pub email: String,
    /// Password (minimum 6 characters)
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    #[schema(example = "secret1", min_length = 6)]
    pub password: String,
}

/// Signin request, shared by `/users/signin` and `/superuser/signin`
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SigninRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "jane@example.com")]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "secret1")]
    pub password: String,
}

/// Profile update. Omitted or blank fields are left unchanged.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[serde(default, deserialize_with = "blank_as_none")]
    #[schema(example = "Jane Q. Doe")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
}

/// Result of `PUT /users/:id`.
///
/// Editing your own record re-issues the session token so the new name and
/// email are reflected in it. An admin editing someone else gets the record.
#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum UpdateUserResponse {
    Session(SessionResponse),
    User(UserResponse),
}

/// Open account routes, mounted under `/users` behind the credential rate limiter
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/signin", post(signin))
}

/// Token-protected routes, mounted under `/users`
pub fn user_routes() -> Router<AppState> {
    Router::new().route("/:id", get(get_user).put(update_user))
}

/// Register a new customer account
#[utoipa::path(
    post,
    path = "/users/register",
    tag = "Users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = SessionResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already registered"),
        (status = 503, description = "Initial setup required")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<Created<SessionResponse>> {
    let session = state
        .auth_service
        .register(payload.name, payload.email, payload.password)
        .await?;

    Ok(Created(session))
}

/// Sign in as the superuser or a regular user
#[utoipa::path(
    post,
    path = "/users/signin",
    tag = "Users",
    request_body = SigninRequest,
    responses(
        (status = 200, description = "Signed in", body = SessionResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid email or password"),
        (status = 429, description = "Too many attempts")
    )
)]
pub async fn signin(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<SigninRequest>,
) -> AppResult<Json<SessionResponse>> {
    let session = state
        .auth_service
        .signin(payload.email, payload.password)
        .await?;

    Ok(Json(session))
}

/// Get a user record (self or admin)
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not your record"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    enforce(authorize_user_update(Some(&principal), id), &principal, "read user")?;

    let user = state.user_service.get_user(id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Update a user record (self or admin)
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated; a fresh session when editing yourself", body = UpdateUserResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not your record"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already in use")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> AppResult<Json<UpdateUserResponse>> {
    enforce(authorize_user_update(Some(&principal), id), &principal, "update user")?;

    let update = UserUpdate {
        name: payload.name,
        email: payload.email,
        password: payload.password,
        is_admin: None,
    };
    let user = state.user_service.update_user(id, update).await?;

    if principal.id == user.id {
        let session = state.auth_service.session_for_user(&user)?;
        return Ok(Json(UpdateUserResponse::Session(session)));
    }

    Ok(Json(UpdateUserResponse::User(UserResponse::from(user))))
}
