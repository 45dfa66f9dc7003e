//! Admin handlers: user management and the dashboard.
//!
//! Every handler requires an admin or superuser token.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, put},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::report_handler;
use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{enforce, require_admin};
use crate::api::AppState;
use crate::domain::access::authorize_user_deletion;
use crate::domain::{DashboardStats, Principal, UserResponse};
use crate::errors::AppResult;
use crate::services::{AdminNewUser, UserUpdate};
use crate::types::{blank_as_none, Created, MessageResponse};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminCreateUserRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateUserRequest {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
    pub is_admin: Option<bool>,
}

/// Admin routes, mounted under `/admin`
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id", put(update_user).delete(delete_user))
        .route("/users/:id/toggle-admin", put(toggle_admin))
        .route("/stats", get(dashboard_stats))
        .merge(report_handler::report_routes())
}

#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "Admin",
    responses(
        (status = 200, description = "All users, newest first", body = Vec<UserResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> AppResult<Json<Vec<UserResponse>>> {
    require_admin(&principal)?;

    let users = state.user_service.list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/admin/users",
    tag = "Admin",
    request_body = AdminCreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin access required"),
        (status = 409, description = "Email already registered")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ValidatedJson(payload): ValidatedJson<AdminCreateUserRequest>,
) -> AppResult<Created<UserResponse>> {
    require_admin(&principal)?;

    let user = state
        .user_service
        .create_user(AdminNewUser {
            name: payload.name,
            email: payload.email,
            password: payload.password,
            is_admin: payload.is_admin,
        })
        .await?;

    tracing::info!(user_id = %user.id, by = %principal.id, "User created by admin");
    Ok(Created(UserResponse::from(user)))
}

#[utoipa::path(
    put,
    path = "/admin/users/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = AdminUpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already in use")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<AdminUpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    require_admin(&principal)?;

    let user = state
        .user_service
        .update_user(
            id,
            UserUpdate {
                name: payload.name,
                email: payload.email,
                password: payload.password,
                is_admin: payload.is_admin,
            },
        )
        .await?;

    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    delete,
    path = "/admin/users/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User removed", body = MessageResponse),
        (status = 403, description = "Admin access required, or deleting yourself"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    enforce(authorize_user_deletion(Some(&principal), id), &principal, "delete user")?;

    state.user_service.delete_user(id).await?;

    tracing::info!(user_id = %id, by = %principal.id, "User deleted");
    Ok(Json(MessageResponse::new("User removed")))
}

#[utoipa::path(
    put,
    path = "/admin/users/{id}/toggle-admin",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Admin flag flipped", body = UserResponse),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn toggle_admin(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    require_admin(&principal)?;

    let user = state.user_service.toggle_admin(id).await?;
    tracing::info!(user_id = %id, is_admin = user.is_admin, by = %principal.id, "Admin flag toggled");

    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    get,
    path = "/admin/stats",
    tag = "Admin",
    responses(
        (status = 200, description = "Dashboard counters and recent orders", body = DashboardStats),
        (status = 403, description = "Admin access required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn dashboard_stats(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> AppResult<Json<DashboardStats>> {
    require_admin(&principal)?;

    Ok(Json(state.report_service.dashboard_stats().await?))
}
