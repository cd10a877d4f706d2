// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 StyleDecor

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{AdminOnly, Auth, Role};
use crate::error::ApiError;
use crate::state::AppState;
use crate::storage::repository::{StoredUser, UserRepository};
use crate::storage::StorageError;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub photo_url: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct UserSearchQuery {
    /// Name/email substring filter
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRoleRequest {
    pub role: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RoleResponse {
    pub role: Role,
}

/// Register a user on first sign-in.
///
/// Re-posting an existing email is not an error: the stored account comes
/// back unchanged, so sign-in can post unconditionally.
#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = StoredUser),
        (status = 200, description = "User already existed", body = StoredUser),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<StoredUser>), ApiError> {
    let email = request.email.trim().to_string();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::bad_request("A valid email is required"));
    }
    if request.name.trim().is_empty() {
        return Err(ApiError::bad_request("Name is required"));
    }

    let repo = UserRepository::new(state.storage());
    if let Some(existing) = repo.find_by_email(&email).map_err(ApiError::internal)? {
        return Ok((StatusCode::OK, Json(existing)));
    }

    let user = StoredUser {
        id: Uuid::new_v4().to_string(),
        email,
        name: request.name.trim().to_string(),
        photo_url: request.photo_url,
        role: Role::default(),
        created_at: Utc::now(),
    };

    match repo.create(&user) {
        Ok(()) => Ok((StatusCode::CREATED, Json(user))),
        // lost a create race to a concurrent first sign-in
        Err(StorageError::AlreadyExists(_)) => {
            let existing = repo
                .find_by_email(&user.email)
                .map_err(ApiError::internal)?
                .ok_or_else(|| ApiError::internal("user vanished after duplicate create"))?;
            Ok((StatusCode::OK, Json(existing)))
        }
        Err(e) => Err(ApiError::internal(e)),
    }
}

/// Search users by name or email (admin).
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    params(UserSearchQuery),
    responses(
        (status = 200, description = "Matching users", body = [StoredUser]),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn list_users(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    Query(query): Query<UserSearchQuery>,
) -> Result<Json<Vec<StoredUser>>, ApiError> {
    let users = UserRepository::new(state.storage())
        .search(query.search.as_deref())
        .map_err(ApiError::internal)?;
    Ok(Json(users))
}

/// Change a user's role (admin).
#[utoipa::path(
    patch,
    path = "/users/{user_id}/role",
    tag = "Users",
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = StoredUser),
        (status = 400, description = "Unknown role"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user_role(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<UpdateRoleRequest>,
) -> Result<Json<StoredUser>, ApiError> {
    let role = Role::from_str(&request.role)
        .ok_or_else(|| ApiError::bad_request(format!("Invalid role: {}", request.role)))?;

    let repo = UserRepository::new(state.storage());
    let mut user = match repo.get(&user_id) {
        Ok(user) => user,
        Err(StorageError::NotFound(_)) => return Err(ApiError::not_found("User not found")),
        Err(e) => return Err(ApiError::internal(e)),
    };

    user.role = role;
    repo.update(&user).map_err(ApiError::internal)?;
    Ok(Json(user))
}

/// Look up a user's role by email (self, or any user for admins).
#[utoipa::path(
    get,
    path = "/users/{email}/role",
    tag = "Users",
    responses(
        (status = 200, description = "The user's role", body = RoleResponse),
        (status = 403, description = "Asked about someone else")
    )
)]
pub async fn get_user_role(
    Auth(caller): Auth,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<RoleResponse>, ApiError> {
    let repo = UserRepository::new(state.storage());

    if !caller.email.eq_ignore_ascii_case(&email) {
        let caller_role = repo.role_of(&caller.email).map_err(ApiError::internal)?;
        if caller_role != Role::Admin {
            return Err(ApiError::forbidden("Forbidden access"));
        }
    }

    let role = repo.role_of(&email).map_err(ApiError::internal)?;
    Ok(Json(RoleResponse { role }))
}
