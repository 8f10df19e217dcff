use axum::{
    Json,
    extract::{Path, Query, State},
};
use uuid::Uuid;

use crate::auth::Actor;
use crate::error::ApiError;
use crate::handlers::{LocaleQuery, PlacementQuery};
use crate::models::{
    AdView, AdvertisementDetail, AdvertisementPayload, CategoryDetail, CategoryPayload,
    CategoryView, MenuDetail, MenuItem, MenuPayload, PageDetail, PagePayload, PageView, TagDetail,
    TagPayload, TagView,
};
use crate::repository::RepositoryState;

#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Service is up")),
    tag = "meta"
)]
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// --- Public content endpoints ---

/// Active categories in display order.
#[utoipa::path(
    get,
    path = "/api/categories",
    params(LocaleQuery),
    responses((status = 200, body = Vec<CategoryView>)),
    tag = "content"
)]
pub async fn list_categories(
    State(repo): State<RepositoryState>,
    Query(query): Query<LocaleQuery>,
) -> Json<Vec<CategoryView>> {
    Json(repo.list_categories(query.locale.unwrap_or_default()).await)
}

#[utoipa::path(
    get,
    path = "/api/tags",
    params(LocaleQuery),
    responses((status = 200, body = Vec<TagView>)),
    tag = "content"
)]
pub async fn list_tags(
    State(repo): State<RepositoryState>,
    Query(query): Query<LocaleQuery>,
) -> Json<Vec<TagView>> {
    Json(repo.list_tags(query.locale.unwrap_or_default()).await)
}

#[utoipa::path(
    get,
    path = "/api/pages",
    params(LocaleQuery),
    responses((status = 200, body = Vec<PageView>)),
    tag = "content"
)]
pub async fn list_pages(
    State(repo): State<RepositoryState>,
    Query(query): Query<LocaleQuery>,
) -> Json<Vec<PageView>> {
    Json(repo.list_pages(query.locale.unwrap_or_default()).await)
}

/// Static page by its localized slug.
#[utoipa::path(
    get,
    path = "/api/pages/{slug}",
    params(("slug" = String, Path,), LocaleQuery),
    responses((status = 200, body = PageView), (status = 404)),
    tag = "content"
)]
pub async fn page_by_slug(
    State(repo): State<RepositoryState>,
    Path(slug): Path<String>,
    Query(query): Query<LocaleQuery>,
) -> Result<Json<PageView>, ApiError> {
    repo.page_by_slug(&slug, query.locale.unwrap_or_default())
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found("page not found"))
}

/// Navigation tree with labels and derived URLs for the requested locale.
#[utoipa::path(
    get,
    path = "/api/menus",
    params(LocaleQuery),
    responses((status = 200, body = Vec<MenuItem>)),
    tag = "content"
)]
pub async fn menu_tree(
    State(repo): State<RepositoryState>,
    Query(query): Query<LocaleQuery>,
) -> Json<Vec<MenuItem>> {
    Json(repo.menu_tree(query.locale.unwrap_or_default()).await)
}

/// Active advertisements for a placement slot, in display order.
#[utoipa::path(
    get,
    path = "/api/advertisements",
    params(PlacementQuery),
    responses((status = 200, body = Vec<AdView>)),
    tag = "content"
)]
pub async fn ads_by_placement(
    State(repo): State<RepositoryState>,
    Query(query): Query<PlacementQuery>,
) -> Json<Vec<AdView>> {
    Json(
        repo.ads_by_placement(&query.position, query.locale.unwrap_or_default())
            .await,
    )
}

// --- Admin category endpoints ---

#[utoipa::path(
    get,
    path = "/api/admin/categories",
    responses((status = 200, body = Vec<CategoryDetail>), (status = 401)),
    security(("bearer_auth" = [])),
    tag = "admin-content"
)]
pub async fn admin_list_categories(
    actor: Actor,
    State(repo): State<RepositoryState>,
) -> Result<Json<Vec<CategoryDetail>>, ApiError> {
    actor.permissions.require("categories.view")?;
    Ok(Json(repo.list_categories_admin().await))
}

#[utoipa::path(
    post,
    path = "/api/admin/categories",
    request_body = CategoryPayload,
    responses((status = 200, body = CategoryDetail), (status = 401), (status = 500)),
    security(("bearer_auth" = [])),
    tag = "admin-content"
)]
pub async fn admin_create_category(
    actor: Actor,
    State(repo): State<RepositoryState>,
    Json(payload): Json<CategoryPayload>,
) -> Result<Json<CategoryDetail>, ApiError> {
    actor.permissions.require("categories.create")?;
    repo.create_category(payload)
        .await
        .map(Json)
        .ok_or_else(ApiError::internal)
}

#[utoipa::path(
    put,
    path = "/api/admin/categories/{id}",
    params(("id" = Uuid, Path,)),
    request_body = CategoryPayload,
    responses((status = 200, body = CategoryDetail), (status = 401), (status = 404)),
    security(("bearer_auth" = [])),
    tag = "admin-content"
)]
pub async fn admin_update_category(
    actor: Actor,
    State(repo): State<RepositoryState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryPayload>,
) -> Result<Json<CategoryDetail>, ApiError> {
    actor.permissions.require("categories.edit")?;
    repo.update_category(id, payload)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found("category not found"))
}

#[utoipa::path(
    delete,
    path = "/api/admin/categories/{id}",
    params(("id" = Uuid, Path,)),
    responses((status = 200), (status = 401), (status = 404)),
    security(("bearer_auth" = [])),
    tag = "admin-content"
)]
pub async fn admin_delete_category(
    actor: Actor,
    State(repo): State<RepositoryState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    actor.permissions.require("categories.delete")?;
    if repo.delete_category(id).await {
        Ok(Json(serde_json::json!({ "deleted": true })))
    } else {
        Err(ApiError::not_found("category not found"))
    }
}

// --- Admin tag endpoints ---

#[utoipa::path(
    get,
    path = "/api/admin/tags",
    responses((status = 200, body = Vec<TagDetail>), (status = 401)),
    security(("bearer_auth" = [])),
    tag = "admin-content"
)]
pub async fn admin_list_tags(
    actor: Actor,
    State(repo): State<RepositoryState>,
) -> Result<Json<Vec<TagDetail>>, ApiError> {
    actor.permissions.require("tags.view")?;
    Ok(Json(repo.list_tags_admin().await))
}

#[utoipa::path(
    post,
    path = "/api/admin/tags",
    request_body = TagPayload,
    responses((status = 200, body = TagDetail), (status = 401), (status = 500)),
    security(("bearer_auth" = [])),
    tag = "admin-content"
)]
pub async fn admin_create_tag(
    actor: Actor,
    State(repo): State<RepositoryState>,
    Json(payload): Json<TagPayload>,
) -> Result<Json<TagDetail>, ApiError> {
    actor.permissions.require("tags.create")?;
    repo.create_tag(payload)
        .await
        .map(Json)
        .ok_or_else(ApiError::internal)
}

#[utoipa::path(
    put,
    path = "/api/admin/tags/{id}",
    params(("id" = Uuid, Path,)),
    request_body = TagPayload,
    responses((status = 200, body = TagDetail), (status = 401), (status = 404)),
    security(("bearer_auth" = [])),
    tag = "admin-content"
)]
pub async fn admin_update_tag(
    actor: Actor,
    State(repo): State<RepositoryState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TagPayload>,
) -> Result<Json<TagDetail>, ApiError> {
    actor.permissions.require("tags.edit")?;
    repo.update_tag(id, payload)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found("tag not found"))
}

#[utoipa::path(
    delete,
    path = "/api/admin/tags/{id}",
    params(("id" = Uuid, Path,)),
    responses((status = 200), (status = 401), (status = 404)),
    security(("bearer_auth" = [])),
    tag = "admin-content"
)]
pub async fn admin_delete_tag(
    actor: Actor,
    State(repo): State<RepositoryState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    actor.permissions.require("tags.delete")?;
    if repo.delete_tag(id).await {
        Ok(Json(serde_json::json!({ "deleted": true })))
    } else {
        Err(ApiError::not_found("tag not found"))
    }
}

// --- Admin page endpoints ---

#[utoipa::path(
    get,
    path = "/api/admin/pages",
    responses((status = 200, body = Vec<PageDetail>), (status = 401)),
    security(("bearer_auth" = [])),
    tag = "admin-content"
)]
pub async fn admin_list_pages(
    actor: Actor,
    State(repo): State<RepositoryState>,
) -> Result<Json<Vec<PageDetail>>, ApiError> {
    actor.permissions.require("pages.view")?;
    Ok(Json(repo.list_pages_admin().await))
}

#[utoipa::path(
    post,
    path = "/api/admin/pages",
    request_body = PagePayload,
    responses((status = 200, body = PageDetail), (status = 401), (status = 500)),
    security(("bearer_auth" = [])),
    tag = "admin-content"
)]
pub async fn admin_create_page(
    actor: Actor,
    State(repo): State<RepositoryState>,
    Json(payload): Json<PagePayload>,
) -> Result<Json<PageDetail>, ApiError> {
    actor.permissions.require("pages.create")?;
    repo.create_page(payload)
        .await
        .map(Json)
        .ok_or_else(ApiError::internal)
}

#[utoipa::path(
    put,
    path = "/api/admin/pages/{id}",
    params(("id" = Uuid, Path,)),
    request_body = PagePayload,
    responses((status = 200, body = PageDetail), (status = 401), (status = 404)),
    security(("bearer_auth" = [])),
    tag = "admin-content"
)]
pub async fn admin_update_page(
    actor: Actor,
    State(repo): State<RepositoryState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PagePayload>,
) -> Result<Json<PageDetail>, ApiError> {
    actor.permissions.require("pages.edit")?;
    repo.update_page(id, payload)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found("page not found"))
}

#[utoipa::path(
    delete,
    path = "/api/admin/pages/{id}",
    params(("id" = Uuid, Path,)),
    responses((status = 200), (status = 401), (status = 404)),
    security(("bearer_auth" = [])),
    tag = "admin-content"
)]
pub async fn admin_delete_page(
    actor: Actor,
    State(repo): State<RepositoryState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    actor.permissions.require("pages.delete")?;
    if repo.delete_page(id).await {
        Ok(Json(serde_json::json!({ "deleted": true })))
    } else {
        Err(ApiError::not_found("page not found"))
    }
}

// --- Admin menu endpoints ---

#[utoipa::path(
    get,
    path = "/api/admin/menus",
    responses((status = 200, body = Vec<MenuDetail>), (status = 401)),
    security(("bearer_auth" = [])),
    tag = "admin-content"
)]
pub async fn admin_list_menus(
    actor: Actor,
    State(repo): State<RepositoryState>,
) -> Result<Json<Vec<MenuDetail>>, ApiError> {
    actor.permissions.require("menus.view")?;
    Ok(Json(repo.list_menus_admin().await))
}

#[utoipa::path(
    post,
    path = "/api/admin/menus",
    request_body = MenuPayload,
    responses((status = 200, body = MenuDetail), (status = 400), (status = 401)),
    security(("bearer_auth" = [])),
    tag = "admin-content"
)]
pub async fn admin_create_menu(
    actor: Actor,
    State(repo): State<RepositoryState>,
    Json(payload): Json<MenuPayload>,
) -> Result<Json<MenuDetail>, ApiError> {
    actor.permissions.require("menus.create")?;
    validate_menu_payload(&payload)?;
    repo.create_menu(payload)
        .await
        .map(Json)
        .ok_or_else(ApiError::internal)
}

#[utoipa::path(
    put,
    path = "/api/admin/menus/{id}",
    params(("id" = Uuid, Path,)),
    request_body = MenuPayload,
    responses((status = 200, body = MenuDetail), (status = 400), (status = 401), (status = 404)),
    security(("bearer_auth" = [])),
    tag = "admin-content"
)]
pub async fn admin_update_menu(
    actor: Actor,
    State(repo): State<RepositoryState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MenuPayload>,
) -> Result<Json<MenuDetail>, ApiError> {
    actor.permissions.require("menus.edit")?;
    validate_menu_payload(&payload)?;
    if payload.parent_id == Some(id) {
        return Err(ApiError::bad_request("a menu cannot be its own parent"));
    }
    repo.update_menu(id, payload)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found("menu not found"))
}

/// Deleting a parent removes its children as well.
#[utoipa::path(
    delete,
    path = "/api/admin/menus/{id}",
    params(("id" = Uuid, Path,)),
    responses((status = 200), (status = 401), (status = 404)),
    security(("bearer_auth" = [])),
    tag = "admin-content"
)]
pub async fn admin_delete_menu(
    actor: Actor,
    State(repo): State<RepositoryState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    actor.permissions.require("menus.delete")?;
    if repo.delete_menu(id).await {
        Ok(Json(serde_json::json!({ "deleted": true })))
    } else {
        Err(ApiError::not_found("menu not found"))
    }
}

fn validate_menu_payload(payload: &MenuPayload) -> Result<(), ApiError> {
    use crate::models::MenuKind;
    if payload.kind != MenuKind::Custom && payload.target_id.is_none() {
        return Err(ApiError::bad_request(
            "category and page menus require a target_id",
        ));
    }
    Ok(())
}

// --- Admin advertisement endpoints ---

#[utoipa::path(
    get,
    path = "/api/admin/advertisements",
    responses((status = 200, body = Vec<AdvertisementDetail>), (status = 401)),
    security(("bearer_auth" = [])),
    tag = "admin-content"
)]
pub async fn admin_list_ads(
    actor: Actor,
    State(repo): State<RepositoryState>,
) -> Result<Json<Vec<AdvertisementDetail>>, ApiError> {
    actor.permissions.require("advertisements.view")?;
    Ok(Json(repo.list_ads_admin().await))
}

#[utoipa::path(
    post,
    path = "/api/admin/advertisements",
    request_body = AdvertisementPayload,
    responses((status = 200, body = AdvertisementDetail), (status = 401), (status = 500)),
    security(("bearer_auth" = [])),
    tag = "admin-content"
)]
pub async fn admin_create_ad(
    actor: Actor,
    State(repo): State<RepositoryState>,
    Json(payload): Json<AdvertisementPayload>,
) -> Result<Json<AdvertisementDetail>, ApiError> {
    actor.permissions.require("advertisements.create")?;
    repo.create_ad(payload)
        .await
        .map(Json)
        .ok_or_else(ApiError::internal)
}

#[utoipa::path(
    put,
    path = "/api/admin/advertisements/{id}",
    params(("id" = Uuid, Path,)),
    request_body = AdvertisementPayload,
    responses((status = 200, body = AdvertisementDetail), (status = 401), (status = 404)),
    security(("bearer_auth" = [])),
    tag = "admin-content"
)]
pub async fn admin_update_ad(
    actor: Actor,
    State(repo): State<RepositoryState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdvertisementPayload>,
) -> Result<Json<AdvertisementDetail>, ApiError> {
    actor.permissions.require("advertisements.edit")?;
    repo.update_ad(id, payload)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found("advertisement not found"))
}

#[utoipa::path(
    delete,
    path = "/api/admin/advertisements/{id}",
    params(("id" = Uuid, Path,)),
    responses((status = 200), (status = 401), (status = 404)),
    security(("bearer_auth" = [])),
    tag = "admin-content"
)]
pub async fn admin_delete_ad(
    actor: Actor,
    State(repo): State<RepositoryState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    actor.permissions.require("advertisements.delete")?;
    if repo.delete_ad(id).await {
        Ok(Json(serde_json::json!({ "deleted": true })))
    } else {
        Err(ApiError::not_found("advertisement not found"))
    }
}
