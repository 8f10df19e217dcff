use axum::{
    Router,
    routing::{get, patch, put},
};

use crate::AppState;
use crate::handlers::{access, articles, content};

/// Authenticated back-office surface, nested under `/api/admin` behind the
/// session middleware. Every handler additionally checks its own
/// permission key.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(access::me))
        // Users, roles and the permission catalog (admin role only)
        .route("/users", get(access::list_users).post(access::create_user))
        .route(
            "/users/{id}",
            put(access::update_user).delete(access::delete_user),
        )
        .route("/roles", get(access::list_roles).post(access::create_role))
        .route(
            "/roles/{id}",
            put(access::update_role).delete(access::delete_role),
        )
        .route(
            "/permissions",
            get(access::list_permissions).post(access::create_permission),
        )
        .route(
            "/permissions/{id}",
            put(access::update_permission).delete(access::delete_permission),
        )
        // Articles
        .route(
            "/articles",
            get(articles::admin_list_articles).post(articles::admin_create_article),
        )
        .route(
            "/articles/{id}",
            get(articles::admin_get_article)
                .put(articles::admin_update_article)
                .delete(articles::admin_delete_article),
        )
        .route("/articles/{id}/toggle", patch(articles::admin_toggle_article))
        // Categories
        .route(
            "/categories",
            get(content::admin_list_categories).post(content::admin_create_category),
        )
        .route(
            "/categories/{id}",
            put(content::admin_update_category).delete(content::admin_delete_category),
        )
        // Tags
        .route(
            "/tags",
            get(content::admin_list_tags).post(content::admin_create_tag),
        )
        .route(
            "/tags/{id}",
            put(content::admin_update_tag).delete(content::admin_delete_tag),
        )
        // Pages
        .route(
            "/pages",
            get(content::admin_list_pages).post(content::admin_create_page),
        )
        .route(
            "/pages/{id}",
            put(content::admin_update_page).delete(content::admin_delete_page),
        )
        // Menus
        .route(
            "/menus",
            get(content::admin_list_menus).post(content::admin_create_menu),
        )
        .route(
            "/menus/{id}",
            put(content::admin_update_menu).delete(content::admin_delete_menu),
        )
        // Advertisements
        .route(
            "/advertisements",
            get(content::admin_list_ads).post(content::admin_create_ad),
        )
        .route(
            "/advertisements/{id}",
            put(content::admin_update_ad).delete(content::admin_delete_ad),
        )
}
