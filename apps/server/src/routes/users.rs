//! # User & Auth Routes
//!
//! Login/logout (with audit trail) and SUPER_ADMIN-gated user management.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use dukaan_core::{CoreError, Role, User};

use crate::error::ApiError;
use crate::routes::SuccessResponse;
use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        UserDto {
            id: user.id,
            username: user.username,
            role: user.role,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub requesting_role: Role,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub username: String,
    pub password: Option<String>,
    pub role: Role,
    pub requesting_role: Role,
    /// Username of whoever is performing the edit.
    pub current_user: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUserRequest {
    pub requesting_role: Role,
    pub current_user: String,
}

fn require_super_admin(role: Role) -> Result<(), ApiError> {
    if !role.is_super_admin() {
        return Err(CoreError::Unauthorized {
            required: Role::SuperAdmin,
        }
        .into());
    }
    Ok(())
}

/// Verifies credentials; a success lands in the login history.
pub async fn login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<UserDto>, ApiError> {
    let store = state.registry.store().await;
    let user = store
        .users()
        .verify_login(&req.username, &req.password)
        .await?
        .ok_or_else(ApiError::invalid_credentials)?;

    Ok(Json(user.into()))
}

/// Records a logout event.
pub async fn logout(
    State(state): State<SharedState>,
    Json(req): Json<LogoutRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    if let Some(username) = req.username {
        let store = state.registry.store().await;
        store.users().record_logout(&username).await;
    }
    Ok(Json(SuccessResponse::ok()))
}

/// Lists users (without credentials).
pub async fn list(State(state): State<SharedState>) -> Result<Json<Vec<UserDto>>, ApiError> {
    let store = state.registry.store().await;
    let users = store.users().list().await?;
    Ok(Json(users.into_iter().map(UserDto::from).collect()))
}

/// Creates a user. SUPER_ADMIN only.
pub async fn create(
    State(state): State<SharedState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<UserDto>, ApiError> {
    require_super_admin(req.requesting_role)?;

    let store = state.registry.store().await;
    let user = store
        .users()
        .create(&req.username, &req.password, req.role)
        .await?;

    Ok(Json(user.into()))
}

/// Edits a user. SUPER_ADMIN only; self-demotion is refused.
pub async fn update(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    require_super_admin(req.requesting_role)?;

    let store = state.registry.store().await;
    store
        .users()
        .update(
            id,
            &req.username,
            req.password.as_deref(),
            req.role,
            &req.current_user,
        )
        .await?;

    Ok(Json(SuccessResponse::ok()))
}

/// Deletes a user. SUPER_ADMIN only; the last SUPER_ADMIN is protected.
pub async fn delete(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Json(req): Json<DeleteUserRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    require_super_admin(req.requesting_role)?;

    let store = state.registry.store().await;
    store.users().delete(id, &req.current_user).await?;

    Ok(Json(SuccessResponse::ok()))
}
