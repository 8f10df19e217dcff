use axum::{Router, routing::get, routing::post};

use crate::AppState;
use crate::handlers::{access, articles, content};

/// Unauthenticated surface: localized reads plus login and the health
/// probe.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(content::health))
        .route("/api/auth/login", post(access::login))
        .route("/api/articles/featured", get(articles::featured_articles))
        .route("/api/articles/recent", get(articles::recent_articles))
        .route("/api/articles/agenda", get(articles::agenda_articles))
        .route("/api/articles/top", get(articles::top_articles))
        .route(
            "/api/articles/category/{slug}",
            get(articles::articles_by_category),
        )
        // Registered after the fixed segments so those match first.
        .route("/api/articles/{slug}", get(articles::article_by_slug))
        .route("/api/search", get(articles::search_articles))
        .route("/api/categories", get(content::list_categories))
        .route("/api/tags", get(content::list_tags))
        .route("/api/pages", get(content::list_pages))
        .route("/api/pages/{slug}", get(content::page_by_slug))
        .route("/api/menus", get(content::menu_tree))
        .route("/api/advertisements", get(content::ads_by_placement))
}
