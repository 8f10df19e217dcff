use axum::{
    Json,
    extract::{Path, Query, State},
};
use uuid::Uuid;

use crate::auth::Actor;
use crate::error::ApiError;
use crate::handlers::{ArticleAdminQuery, ListQuery, SearchQuery, clamp_limit};
use crate::models::{
    Article, ArticleCard, ArticleDetail, ArticlePayload, ArticleView, ToggleArticleRequest,
};
use crate::repository::RepositoryState;

// --- Public article endpoints ---

/// Featured articles for the home page hero.
#[utoipa::path(
    get,
    path = "/api/articles/featured",
    params(ListQuery),
    responses((status = 200, body = Vec<ArticleCard>)),
    tag = "articles"
)]
pub async fn featured_articles(
    State(repo): State<RepositoryState>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<ArticleCard>> {
    let locale = query.locale.unwrap_or_default();
    Json(
        repo.featured_articles(locale, clamp_limit(query.limit))
            .await,
    )
}

/// Latest articles; agenda-flagged ones sort ahead of the rest.
#[utoipa::path(
    get,
    path = "/api/articles/recent",
    params(ListQuery),
    responses((status = 200, body = Vec<ArticleCard>)),
    tag = "articles"
)]
pub async fn recent_articles(
    State(repo): State<RepositoryState>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<ArticleCard>> {
    let locale = query.locale.unwrap_or_default();
    Json(repo.recent_articles(locale, clamp_limit(query.limit)).await)
}

#[utoipa::path(
    get,
    path = "/api/articles/agenda",
    params(ListQuery),
    responses((status = 200, body = Vec<ArticleCard>)),
    tag = "articles"
)]
pub async fn agenda_articles(
    State(repo): State<RepositoryState>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<ArticleCard>> {
    let locale = query.locale.unwrap_or_default();
    Json(repo.agenda_articles(locale, clamp_limit(query.limit)).await)
}

/// Most-read articles, ordered by view count.
#[utoipa::path(
    get,
    path = "/api/articles/top",
    params(ListQuery),
    responses((status = 200, body = Vec<ArticleCard>)),
    tag = "articles"
)]
pub async fn top_articles(
    State(repo): State<RepositoryState>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<ArticleCard>> {
    let locale = query.locale.unwrap_or_default();
    Json(repo.top_articles(locale, clamp_limit(query.limit)).await)
}

#[utoipa::path(
    get,
    path = "/api/articles/category/{slug}",
    params(("slug" = String, Path,), ListQuery),
    responses((status = 200, body = Vec<ArticleCard>)),
    tag = "articles"
)]
pub async fn articles_by_category(
    State(repo): State<RepositoryState>,
    Path(slug): Path<String>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<ArticleCard>> {
    let locale = query.locale.unwrap_or_default();
    Json(
        repo.articles_by_category(&slug, locale, clamp_limit(query.limit))
            .await,
    )
}

/// Single article by localized slug. Each successful read also bumps the
/// article's view counter.
#[utoipa::path(
    get,
    path = "/api/articles/{slug}",
    params(("slug" = String, Path,), crate::handlers::LocaleQuery),
    responses(
        (status = 200, body = ArticleView),
        (status = 404, description = "No visible article under this slug")
    ),
    tag = "articles"
)]
pub async fn article_by_slug(
    State(repo): State<RepositoryState>,
    Path(slug): Path<String>,
    Query(query): Query<crate::handlers::LocaleQuery>,
) -> Result<Json<ArticleView>, ApiError> {
    let locale = query.locale.unwrap_or_default();
    let article = repo
        .article_by_slug(&slug, locale)
        .await
        .ok_or_else(|| ApiError::not_found("article not found"))?;
    repo.increment_views(article.id).await;
    Ok(Json(article))
}

/// Full-text search across titles, excerpts and bodies.
#[utoipa::path(
    get,
    path = "/api/search",
    params(SearchQuery),
    responses((status = 200, body = Vec<ArticleCard>)),
    tag = "articles"
)]
pub async fn search_articles(
    State(repo): State<RepositoryState>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<ArticleCard>> {
    let locale = query.locale.unwrap_or_default();
    let term = query.q.trim();
    if term.is_empty() {
        return Json(vec![]);
    }
    Json(
        repo.search_articles(term, locale, clamp_limit(query.limit))
            .await,
    )
}

// --- Admin article endpoints ---

#[utoipa::path(
    get,
    path = "/api/admin/articles",
    params(ArticleAdminQuery),
    responses((status = 200, body = Vec<ArticleDetail>), (status = 401)),
    security(("bearer_auth" = [])),
    tag = "admin-articles"
)]
pub async fn admin_list_articles(
    actor: Actor,
    State(repo): State<RepositoryState>,
    Query(query): Query<ArticleAdminQuery>,
) -> Result<Json<Vec<ArticleDetail>>, ApiError> {
    actor.permissions.require("articles.view")?;
    Ok(Json(
        repo.list_articles_admin(query.status, query.search).await,
    ))
}

#[utoipa::path(
    get,
    path = "/api/admin/articles/{id}",
    params(("id" = Uuid, Path,)),
    responses((status = 200, body = ArticleDetail), (status = 401), (status = 404)),
    security(("bearer_auth" = [])),
    tag = "admin-articles"
)]
pub async fn admin_get_article(
    actor: Actor,
    State(repo): State<RepositoryState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ArticleDetail>, ApiError> {
    actor.permissions.require("articles.view")?;
    repo.get_article_admin(id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found("article not found"))
}

#[utoipa::path(
    post,
    path = "/api/admin/articles",
    request_body = ArticlePayload,
    responses((status = 200, body = ArticleDetail), (status = 401), (status = 500)),
    security(("bearer_auth" = [])),
    tag = "admin-articles"
)]
pub async fn admin_create_article(
    actor: Actor,
    State(repo): State<RepositoryState>,
    Json(payload): Json<ArticlePayload>,
) -> Result<Json<ArticleDetail>, ApiError> {
    actor.permissions.require("articles.create")?;
    repo.create_article(actor.id, payload)
        .await
        .map(Json)
        .ok_or_else(ApiError::internal)
}

#[utoipa::path(
    put,
    path = "/api/admin/articles/{id}",
    params(("id" = Uuid, Path,)),
    request_body = ArticlePayload,
    responses((status = 200, body = ArticleDetail), (status = 401), (status = 404)),
    security(("bearer_auth" = [])),
    tag = "admin-articles"
)]
pub async fn admin_update_article(
    actor: Actor,
    State(repo): State<RepositoryState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ArticlePayload>,
) -> Result<Json<ArticleDetail>, ApiError> {
    actor.permissions.require("articles.edit")?;
    repo.update_article(id, payload)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found("article not found"))
}

/// Flips a single flag or the publication status without resubmitting the
/// whole article. Publishing stamps `published_at` when it was unset.
#[utoipa::path(
    patch,
    path = "/api/admin/articles/{id}/toggle",
    params(("id" = Uuid, Path,)),
    request_body = ToggleArticleRequest,
    responses((status = 200, body = Article), (status = 401), (status = 404)),
    security(("bearer_auth" = [])),
    tag = "admin-articles"
)]
pub async fn admin_toggle_article(
    actor: Actor,
    State(repo): State<RepositoryState>,
    Path(id): Path<Uuid>,
    Json(toggle): Json<ToggleArticleRequest>,
) -> Result<Json<Article>, ApiError> {
    actor.permissions.require("articles.edit")?;
    repo.toggle_article(id, toggle)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found("article not found"))
}

/// Soft delete; the row is retained but disappears from every listing,
/// admin included. Deleting an already-deleted article is a 404.
#[utoipa::path(
    delete,
    path = "/api/admin/articles/{id}",
    params(("id" = Uuid, Path,)),
    responses((status = 200), (status = 401), (status = 404)),
    security(("bearer_auth" = [])),
    tag = "admin-articles"
)]
pub async fn admin_delete_article(
    actor: Actor,
    State(repo): State<RepositoryState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    actor.permissions.require("articles.delete")?;
    if repo.soft_delete_article(id).await {
        Ok(Json(serde_json::json!({ "deleted": true })))
    } else {
        Err(ApiError::not_found("article not found"))
    }
}
