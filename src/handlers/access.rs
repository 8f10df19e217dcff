use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::auth::{self, Actor};
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::models::{
    CreateUserRequest, LoginRequest, LoginResponse, Permission, PermissionPayload, RoleDetail,
    RolePayload, UpdateUserRequest, UserResponse,
};
use crate::repository::RepositoryState;

/// Email/password login. Returns a signed session token together with the
/// user profile. Invalid credentials are a uniform 401 with no detail about
/// which part failed.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses((status = 200, body = LoginResponse), (status = 401)),
    tag = "auth"
)]
pub async fn login(
    State(repo): State<RepositoryState>,
    State(config): State<AppConfig>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = repo
        .get_user_by_email(&payload.email)
        .await
        .ok_or_else(ApiError::unauthorized)?;
    if !auth::verify_password(payload.password, user.password_hash.clone()).await {
        return Err(ApiError::unauthorized());
    }
    let token = auth::issue_token(user.id, &config.jwt_secret).map_err(|e| {
        tracing::error!("token issuance failed: {:?}", e);
        ApiError::internal()
    })?;
    Ok(Json(LoginResponse {
        token,
        user: user.into(),
    }))
}

/// Profile of the authenticated user.
#[utoipa::path(
    get,
    path = "/api/admin/me",
    responses((status = 200, body = UserResponse), (status = 401)),
    security(("bearer_auth" = [])),
    tag = "admin-access"
)]
pub async fn me(
    actor: Actor,
    State(repo): State<RepositoryState>,
) -> Result<Json<UserResponse>, ApiError> {
    repo.get_user(actor.id)
        .await
        .map(|user| Json(user.into()))
        .ok_or_else(ApiError::unauthorized)
}

// --- User management (admin role only) ---

#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses((status = 200, body = Vec<UserResponse>), (status = 401)),
    security(("bearer_auth" = [])),
    tag = "admin-access"
)]
pub async fn list_users(
    actor: Actor,
    State(repo): State<RepositoryState>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    actor.permissions.require_admin()?;
    let users = repo.list_users().await;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/admin/users",
    request_body = CreateUserRequest,
    responses((status = 200, body = UserResponse), (status = 400), (status = 401)),
    security(("bearer_auth" = [])),
    tag = "admin-access"
)]
pub async fn create_user(
    actor: Actor,
    State(repo): State<RepositoryState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    actor.permissions.require_admin()?;
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::bad_request("email and password are required"));
    }
    if repo.get_user_by_email(&payload.email).await.is_some() {
        return Err(ApiError::bad_request("email already in use"));
    }
    let password_hash = auth::hash_password(payload.password.clone())
        .await
        .map_err(|_| ApiError::internal())?;
    repo.create_user(payload, password_hash)
        .await
        .map(|user| Json(user.into()))
        .ok_or_else(|| ApiError::bad_request("email already in use"))
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{id}",
    params(("id" = Uuid, Path,)),
    request_body = UpdateUserRequest,
    responses((status = 200, body = UserResponse), (status = 401), (status = 404)),
    security(("bearer_auth" = [])),
    tag = "admin-access"
)]
pub async fn update_user(
    actor: Actor,
    State(repo): State<RepositoryState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    actor.permissions.require_admin()?;
    let password_hash = match payload.password.clone() {
        Some(password) => Some(
            auth::hash_password(password)
                .await
                .map_err(|_| ApiError::internal())?,
        ),
        None => None,
    };
    repo.update_user(id, payload, password_hash)
        .await
        .map(|user| Json(user.into()))
        .ok_or_else(|| ApiError::not_found("user not found"))
}

/// Hard delete. Deleting the account behind the current session is
/// rejected.
#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(("id" = Uuid, Path,)),
    responses((status = 200), (status = 400), (status = 401), (status = 404)),
    security(("bearer_auth" = [])),
    tag = "admin-access"
)]
pub async fn delete_user(
    actor: Actor,
    State(repo): State<RepositoryState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    actor.permissions.require_admin()?;
    if id == actor.id {
        return Err(ApiError::bad_request("cannot delete your own account"));
    }
    if repo.delete_user(id).await {
        Ok(Json(serde_json::json!({ "deleted": true })))
    } else {
        Err(ApiError::not_found("user not found"))
    }
}

// --- Role management (admin role only) ---

#[utoipa::path(
    get,
    path = "/api/admin/roles",
    responses((status = 200, body = Vec<RoleDetail>), (status = 401)),
    security(("bearer_auth" = [])),
    tag = "admin-access"
)]
pub async fn list_roles(
    actor: Actor,
    State(repo): State<RepositoryState>,
) -> Result<Json<Vec<RoleDetail>>, ApiError> {
    actor.permissions.require_admin()?;
    Ok(Json(repo.list_roles().await))
}

#[utoipa::path(
    post,
    path = "/api/admin/roles",
    request_body = RolePayload,
    responses((status = 200, body = RoleDetail), (status = 400), (status = 401)),
    security(("bearer_auth" = [])),
    tag = "admin-access"
)]
pub async fn create_role(
    actor: Actor,
    State(repo): State<RepositoryState>,
    Json(payload): Json<RolePayload>,
) -> Result<Json<RoleDetail>, ApiError> {
    actor.permissions.require_admin()?;
    if payload.key.is_empty() {
        return Err(ApiError::bad_request("role key is required"));
    }
    repo.create_role(payload)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::bad_request("role key already in use"))
}

/// Replaces the role's fields and its full permission link set.
#[utoipa::path(
    put,
    path = "/api/admin/roles/{id}",
    params(("id" = Uuid, Path,)),
    request_body = RolePayload,
    responses((status = 200, body = RoleDetail), (status = 401), (status = 404)),
    security(("bearer_auth" = [])),
    tag = "admin-access"
)]
pub async fn update_role(
    actor: Actor,
    State(repo): State<RepositoryState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RolePayload>,
) -> Result<Json<RoleDetail>, ApiError> {
    actor.permissions.require_admin()?;
    repo.update_role(id, payload)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found("role not found"))
}

#[utoipa::path(
    delete,
    path = "/api/admin/roles/{id}",
    params(("id" = Uuid, Path,)),
    responses((status = 200), (status = 400), (status = 401), (status = 404)),
    security(("bearer_auth" = [])),
    tag = "admin-access"
)]
pub async fn delete_role(
    actor: Actor,
    State(repo): State<RepositoryState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    actor.permissions.require_admin()?;
    let role = repo
        .get_role(id)
        .await
        .ok_or_else(|| ApiError::not_found("role not found"))?;
    if role.is_system {
        return Err(ApiError::bad_request("system roles cannot be deleted"));
    }
    if repo.delete_role(id).await {
        Ok(Json(serde_json::json!({ "deleted": true })))
    } else {
        Err(ApiError::not_found("role not found"))
    }
}

// --- Permission catalog (admin role only) ---

#[utoipa::path(
    get,
    path = "/api/admin/permissions",
    responses((status = 200, body = Vec<Permission>), (status = 401)),
    security(("bearer_auth" = [])),
    tag = "admin-access"
)]
pub async fn list_permissions(
    actor: Actor,
    State(repo): State<RepositoryState>,
) -> Result<Json<Vec<Permission>>, ApiError> {
    actor.permissions.require_admin()?;
    Ok(Json(repo.list_permissions().await))
}

#[utoipa::path(
    post,
    path = "/api/admin/permissions",
    request_body = PermissionPayload,
    responses((status = 200, body = Permission), (status = 400), (status = 401)),
    security(("bearer_auth" = [])),
    tag = "admin-access"
)]
pub async fn create_permission(
    actor: Actor,
    State(repo): State<RepositoryState>,
    Json(payload): Json<PermissionPayload>,
) -> Result<Json<Permission>, ApiError> {
    actor.permissions.require_admin()?;
    if payload.key.is_empty() {
        return Err(ApiError::bad_request("permission key is required"));
    }
    repo.create_permission(payload)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::bad_request("permission key already in use"))
}

#[utoipa::path(
    put,
    path = "/api/admin/permissions/{id}",
    params(("id" = Uuid, Path,)),
    request_body = PermissionPayload,
    responses((status = 200, body = Permission), (status = 401), (status = 404)),
    security(("bearer_auth" = [])),
    tag = "admin-access"
)]
pub async fn update_permission(
    actor: Actor,
    State(repo): State<RepositoryState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PermissionPayload>,
) -> Result<Json<Permission>, ApiError> {
    actor.permissions.require_admin()?;
    repo.update_permission(id, payload)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found("permission not found"))
}

/// A permission still linked to any role cannot be deleted.
#[utoipa::path(
    delete,
    path = "/api/admin/permissions/{id}",
    params(("id" = Uuid, Path,)),
    responses((status = 200), (status = 400), (status = 401), (status = 404)),
    security(("bearer_auth" = [])),
    tag = "admin-access"
)]
pub async fn delete_permission(
    actor: Actor,
    State(repo): State<RepositoryState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    actor.permissions.require_admin()?;
    repo.get_permission(id)
        .await
        .ok_or_else(|| ApiError::not_found("permission not found"))?;
    if repo.permission_in_use(id).await {
        return Err(ApiError::bad_request(
            "permission is assigned to one or more roles",
        ));
    }
    if repo.delete_permission(id).await {
        Ok(Json(serde_json::json!({ "deleted": true })))
    } else {
        Err(ApiError::not_found("permission not found"))
    }
}
