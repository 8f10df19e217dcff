use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod permissions;
pub mod repository;

// Routing is segregated into the public surface and the authenticated
// back-office nest.
pub mod routes;
use auth::AuthUser;
use routes::{admin, public};

pub use config::AppConfig;
pub use repository::{PostgresRepository, RepositoryState};

/// Aggregated OpenAPI document, served at `/api-docs/openapi.json` and
/// rendered by the Swagger UI.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::content::health,
        handlers::access::login,
        handlers::articles::featured_articles,
        handlers::articles::recent_articles,
        handlers::articles::agenda_articles,
        handlers::articles::top_articles,
        handlers::articles::articles_by_category,
        handlers::articles::article_by_slug,
        handlers::articles::search_articles,
        handlers::content::list_categories,
        handlers::content::list_tags,
        handlers::content::list_pages,
        handlers::content::page_by_slug,
        handlers::content::menu_tree,
        handlers::content::ads_by_placement,
        handlers::access::me,
        handlers::access::list_users,
        handlers::access::create_user,
        handlers::access::update_user,
        handlers::access::delete_user,
        handlers::access::list_roles,
        handlers::access::create_role,
        handlers::access::update_role,
        handlers::access::delete_role,
        handlers::access::list_permissions,
        handlers::access::create_permission,
        handlers::access::update_permission,
        handlers::access::delete_permission,
        handlers::articles::admin_list_articles,
        handlers::articles::admin_get_article,
        handlers::articles::admin_create_article,
        handlers::articles::admin_update_article,
        handlers::articles::admin_toggle_article,
        handlers::articles::admin_delete_article,
        handlers::content::admin_list_categories,
        handlers::content::admin_create_category,
        handlers::content::admin_update_category,
        handlers::content::admin_delete_category,
        handlers::content::admin_list_tags,
        handlers::content::admin_create_tag,
        handlers::content::admin_update_tag,
        handlers::content::admin_delete_tag,
        handlers::content::admin_list_pages,
        handlers::content::admin_create_page,
        handlers::content::admin_update_page,
        handlers::content::admin_delete_page,
        handlers::content::admin_list_menus,
        handlers::content::admin_create_menu,
        handlers::content::admin_update_menu,
        handlers::content::admin_delete_menu,
        handlers::content::admin_list_ads,
        handlers::content::admin_create_ad,
        handlers::content::admin_update_ad,
        handlers::content::admin_delete_ad,
    ),
    components(
        schemas(
            models::Locale,
            models::ArticleStatus,
            models::MenuKind,
            models::AdKind,
            models::Article,
            models::ArticleTranslation,
            models::ArticleImage,
            models::ArticleDetail,
            models::ArticleCard,
            models::ArticleView,
            models::ArticlePayload,
            models::ArticleTranslations,
            models::ArticleTranslationInput,
            models::ArticleImageInput,
            models::ToggleArticleRequest,
            models::Category,
            models::CategoryTranslation,
            models::CategoryDetail,
            models::CategoryView,
            models::CategoryPayload,
            models::CategoryTranslations,
            models::CategoryTranslationInput,
            models::Tag,
            models::TagTranslation,
            models::TagDetail,
            models::TagView,
            models::TagPayload,
            models::TagTranslations,
            models::TagTranslationInput,
            models::Page,
            models::PageTranslation,
            models::PageDetail,
            models::PageView,
            models::PagePayload,
            models::PageTranslations,
            models::PageTranslationInput,
            models::Menu,
            models::MenuTranslation,
            models::MenuDetail,
            models::MenuItem,
            models::MenuPayload,
            models::MenuTranslations,
            models::MenuTranslationInput,
            models::Advertisement,
            models::AdvertisementTranslation,
            models::AdvertisementDetail,
            models::AdView,
            models::AdvertisementPayload,
            models::AdvertisementTranslations,
            models::AdvertisementTranslationInput,
            models::Role,
            models::RoleDetail,
            models::RolePayload,
            models::Permission,
            models::PermissionPayload,
            models::UserResponse,
            models::CreateUserRequest,
            models::UpdateUserRequest,
            models::LoginRequest,
            models::LoginResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "xeber-portal", description = "Bilingual news portal API")
    )
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Shared application state: the repository handle and the immutable
/// configuration.
#[derive(Clone)]
pub struct AppState {
    pub repo: RepositoryState,
    pub config: AppConfig,
}

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// Authentication gate for the admin nest. The `AuthUser` extractor rejects
/// with 401 before the handler runs; the resolved identity is stashed in
/// request extensions so handlers do not repeat the lookup.
async fn auth_middleware(auth_user: AuthUser, mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(auth_user);
    next.run(request).await
}

/// Assembles the full routing structure, applies the middleware stack and
/// registers the shared state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::router())
        .nest(
            "/api/admin",
            admin::router().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// Span factory for `TraceLayer`; correlates every log line of a request by
/// its `x-request-id`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
