use async_trait::async_trait;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use std::sync::Arc;
use tokio::test;
use uuid::Uuid;
use xeber_portal::{
    auth::Actor,
    handlers::{self, ArticleAdminQuery, ListQuery},
    models::{
        AdView, AdvertisementDetail, AdvertisementPayload, Article, ArticleCard, ArticleDetail,
        ArticlePayload, ArticleStatus, ArticleView, CategoryDetail, CategoryPayload, CategoryView,
        CreateUserRequest, Locale, MenuDetail, MenuItem, MenuPayload, PageDetail, PagePayload,
        PageView, Permission, PermissionPayload, Role, RoleDetail, RolePayload, TagDetail,
        TagPayload, TagView, ToggleArticleRequest, UpdateUserRequest, User,
    },
    permissions::PermissionSet,
    repository::{Repository, RepositoryState},
};

// --- Mock repository ---

// Handlers depend on the Repository trait, so tests drive them through a
// canned in-memory implementation.
pub struct MockRepo {
    pub user: Option<User>,
    pub user_by_email: Option<User>,
    pub role: Option<Role>,
    pub permission: Option<Permission>,
    pub permission_in_use: bool,
    pub permission_keys: Vec<String>,
    pub delete_result: bool,
    pub article: Option<Article>,
    pub article_detail: Option<ArticleDetail>,
    pub cards: Vec<ArticleCard>,
    pub article_view: Option<ArticleView>,
}

impl Default for MockRepo {
    fn default() -> Self {
        MockRepo {
            user: Some(User::default()),
            user_by_email: None,
            role: Some(Role::default()),
            permission: Some(Permission::default()),
            permission_in_use: false,
            permission_keys: vec![],
            delete_result: true,
            article: Some(Article::default()),
            article_detail: Some(ArticleDetail::default()),
            cards: vec![],
            article_view: None,
        }
    }
}

#[async_trait]
impl Repository for MockRepo {
    async fn get_user(&self, _id: Uuid) -> Option<User> {
        self.user.clone()
    }
    async fn get_user_by_email(&self, _email: &str) -> Option<User> {
        self.user_by_email.clone()
    }
    async fn list_users(&self) -> Vec<User> {
        self.user.clone().into_iter().collect()
    }
    async fn create_user(&self, req: CreateUserRequest, password_hash: String) -> Option<User> {
        Some(User {
            id: Uuid::new_v4(),
            email: req.email,
            password_hash,
            name: req.name,
            role: req.role,
            avatar: req.avatar,
            bio_az: req.bio_az,
            bio_en: req.bio_en,
            created_at: Utc::now(),
        })
    }
    async fn update_user(
        &self,
        _id: Uuid,
        _req: UpdateUserRequest,
        _password_hash: Option<String>,
    ) -> Option<User> {
        self.user.clone()
    }
    async fn delete_user(&self, _id: Uuid) -> bool {
        self.delete_result
    }

    async fn resolve_permission_keys(&self, _role_key: &str) -> Vec<String> {
        self.permission_keys.clone()
    }
    async fn list_roles(&self) -> Vec<RoleDetail> {
        vec![]
    }
    async fn get_role(&self, _id: Uuid) -> Option<Role> {
        self.role.clone()
    }
    async fn create_role(&self, payload: RolePayload) -> Option<RoleDetail> {
        Some(RoleDetail::new(
            Role {
                id: Uuid::new_v4(),
                key: payload.key,
                name: payload.name,
                description: payload.description,
                is_system: false,
            },
            vec![],
        ))
    }
    async fn update_role(&self, _id: Uuid, _payload: RolePayload) -> Option<RoleDetail> {
        self.role.clone().map(|role| RoleDetail::new(role, vec![]))
    }
    async fn delete_role(&self, _id: Uuid) -> bool {
        self.delete_result
    }
    async fn list_permissions(&self) -> Vec<Permission> {
        self.permission.clone().into_iter().collect()
    }
    async fn get_permission(&self, _id: Uuid) -> Option<Permission> {
        self.permission.clone()
    }
    async fn create_permission(&self, _payload: PermissionPayload) -> Option<Permission> {
        self.permission.clone()
    }
    async fn update_permission(&self, _id: Uuid, _payload: PermissionPayload) -> Option<Permission> {
        self.permission.clone()
    }
    async fn permission_in_use(&self, _id: Uuid) -> bool {
        self.permission_in_use
    }
    async fn delete_permission(&self, _id: Uuid) -> bool {
        self.delete_result
    }

    async fn list_articles_admin(
        &self,
        _status: Option<ArticleStatus>,
        _search: Option<String>,
    ) -> Vec<ArticleDetail> {
        self.article_detail.clone().into_iter().collect()
    }
    async fn get_article_admin(&self, _id: Uuid) -> Option<ArticleDetail> {
        self.article_detail.clone()
    }
    async fn create_article(
        &self,
        _author_id: Uuid,
        _payload: ArticlePayload,
    ) -> Option<ArticleDetail> {
        self.article_detail.clone()
    }
    async fn update_article(&self, _id: Uuid, _payload: ArticlePayload) -> Option<ArticleDetail> {
        self.article_detail.clone()
    }
    async fn soft_delete_article(&self, _id: Uuid) -> bool {
        self.delete_result
    }
    async fn toggle_article(&self, _id: Uuid, toggle: ToggleArticleRequest) -> Option<Article> {
        // Mirrors the persistence behavior through the domain rule.
        let mut article = self.article.clone()?;
        article.apply_toggle(&toggle, Utc::now());
        Some(article)
    }

    async fn featured_articles(&self, _locale: Locale, _limit: i64) -> Vec<ArticleCard> {
        self.cards.clone()
    }
    async fn recent_articles(&self, _locale: Locale, _limit: i64) -> Vec<ArticleCard> {
        self.cards.clone()
    }
    async fn agenda_articles(&self, _locale: Locale, _limit: i64) -> Vec<ArticleCard> {
        self.cards.clone()
    }
    async fn top_articles(&self, _locale: Locale, _limit: i64) -> Vec<ArticleCard> {
        self.cards.clone()
    }
    async fn articles_by_category(
        &self,
        _slug: &str,
        _locale: Locale,
        _limit: i64,
    ) -> Vec<ArticleCard> {
        self.cards.clone()
    }
    async fn search_articles(&self, _query: &str, _locale: Locale, _limit: i64) -> Vec<ArticleCard> {
        self.cards.clone()
    }
    async fn article_by_slug(&self, _slug: &str, _locale: Locale) -> Option<ArticleView> {
        self.article_view.clone()
    }
    async fn increment_views(&self, _id: Uuid) {}

    async fn list_categories(&self, _locale: Locale) -> Vec<CategoryView> {
        vec![]
    }
    async fn list_categories_admin(&self) -> Vec<CategoryDetail> {
        vec![]
    }
    async fn create_category(&self, _payload: CategoryPayload) -> Option<CategoryDetail> {
        Some(CategoryDetail::default())
    }
    async fn update_category(
        &self,
        _id: Uuid,
        _payload: CategoryPayload,
    ) -> Option<CategoryDetail> {
        Some(CategoryDetail::default())
    }
    async fn delete_category(&self, _id: Uuid) -> bool {
        self.delete_result
    }

    async fn list_tags(&self, _locale: Locale) -> Vec<TagView> {
        vec![]
    }
    async fn list_tags_admin(&self) -> Vec<TagDetail> {
        vec![]
    }
    async fn create_tag(&self, _payload: TagPayload) -> Option<TagDetail> {
        Some(TagDetail::default())
    }
    async fn update_tag(&self, _id: Uuid, _payload: TagPayload) -> Option<TagDetail> {
        Some(TagDetail::default())
    }
    async fn delete_tag(&self, _id: Uuid) -> bool {
        self.delete_result
    }

    async fn list_pages(&self, _locale: Locale) -> Vec<PageView> {
        vec![]
    }
    async fn page_by_slug(&self, _slug: &str, _locale: Locale) -> Option<PageView> {
        None
    }
    async fn list_pages_admin(&self) -> Vec<PageDetail> {
        vec![]
    }
    async fn create_page(&self, _payload: PagePayload) -> Option<PageDetail> {
        Some(PageDetail::default())
    }
    async fn update_page(&self, _id: Uuid, _payload: PagePayload) -> Option<PageDetail> {
        Some(PageDetail::default())
    }
    async fn delete_page(&self, _id: Uuid) -> bool {
        self.delete_result
    }

    async fn menu_tree(&self, _locale: Locale) -> Vec<MenuItem> {
        vec![]
    }
    async fn list_menus_admin(&self) -> Vec<MenuDetail> {
        vec![]
    }
    async fn create_menu(&self, _payload: MenuPayload) -> Option<MenuDetail> {
        Some(MenuDetail::default())
    }
    async fn update_menu(&self, _id: Uuid, _payload: MenuPayload) -> Option<MenuDetail> {
        Some(MenuDetail::default())
    }
    async fn delete_menu(&self, _id: Uuid) -> bool {
        self.delete_result
    }

    async fn ads_by_placement(&self, _placement: &str, _locale: Locale) -> Vec<AdView> {
        vec![]
    }
    async fn list_ads_admin(&self) -> Vec<AdvertisementDetail> {
        vec![]
    }
    async fn create_ad(&self, _payload: AdvertisementPayload) -> Option<AdvertisementDetail> {
        Some(AdvertisementDetail::default())
    }
    async fn update_ad(
        &self,
        _id: Uuid,
        _payload: AdvertisementPayload,
    ) -> Option<AdvertisementDetail> {
        Some(AdvertisementDetail::default())
    }
    async fn delete_ad(&self, _id: Uuid) -> bool {
        self.delete_result
    }
}

// --- Test utilities ---

const TEST_ID: Uuid = Uuid::from_u128(123);
const TEST_ADMIN_ID: Uuid = Uuid::from_u128(456);

fn repo(mock: MockRepo) -> RepositoryState {
    Arc::new(mock)
}

fn admin_actor() -> Actor {
    Actor {
        id: TEST_ADMIN_ID,
        role: "admin".to_string(),
        permissions: PermissionSet::admin(),
    }
}

fn editor_actor() -> Actor {
    Actor {
        id: TEST_ID,
        role: "editor".to_string(),
        permissions: PermissionSet::from_keys(
            ["articles.view", "articles.create", "articles.edit", "articles.delete"]
                .map(String::from),
        ),
    }
}

fn powerless_actor() -> Actor {
    Actor {
        id: TEST_ID,
        role: "ghost".to_string(),
        permissions: PermissionSet::from_keys(Vec::new()),
    }
}

// --- Permission enforcement ---

#[test]
async fn admin_role_passes_every_permission_check() {
    let actor = admin_actor();
    assert!(actor.permissions.has("articles.view"));
    assert!(actor.permissions.has("some.future.key"));

    let result =
        handlers::access::list_users(actor, State(repo(MockRepo::default()))).await;
    assert!(result.is_ok());
}

#[test]
async fn unknown_role_is_denied_everywhere() {
    let result = handlers::articles::admin_list_articles(
        powerless_actor(),
        State(repo(MockRepo::default())),
        Query(ArticleAdminQuery::default()),
    )
    .await;
    let err = result.err().expect("expected a rejection");
    assert_eq!(err.status, StatusCode::UNAUTHORIZED);
}

#[test]
async fn editor_permissions_cover_articles_but_not_users() {
    let actor = editor_actor();
    let listing = handlers::articles::admin_list_articles(
        actor,
        State(repo(MockRepo::default())),
        Query(ArticleAdminQuery::default()),
    )
    .await;
    assert!(listing.is_ok());

    let users = handlers::access::list_users(editor_actor(), State(repo(MockRepo::default()))).await;
    assert_eq!(users.err().expect("expected a rejection").status, StatusCode::UNAUTHORIZED);
}

// --- Users ---

#[test]
async fn create_user_rejects_duplicate_email() {
    let mock = MockRepo {
        user_by_email: Some(User::default()),
        ..MockRepo::default()
    };
    let payload = CreateUserRequest {
        email: "reporter@example.com".to_string(),
        password: "hunter2hunter2".to_string(),
        name: "Reporter".to_string(),
        role: "editor".to_string(),
        ..CreateUserRequest::default()
    };
    let result =
        handlers::access::create_user(admin_actor(), State(repo(mock)), Json(payload)).await;
    assert_eq!(result.err().expect("expected a rejection").status, StatusCode::BAD_REQUEST);
}

#[test]
async fn delete_own_account_is_rejected() {
    let result = handlers::access::delete_user(
        admin_actor(),
        State(repo(MockRepo::default())),
        Path(TEST_ADMIN_ID),
    )
    .await;
    assert_eq!(result.err().expect("expected a rejection").status, StatusCode::BAD_REQUEST);
}

#[test]
async fn delete_other_account_succeeds() {
    let result = handlers::access::delete_user(
        admin_actor(),
        State(repo(MockRepo::default())),
        Path(TEST_ID),
    )
    .await;
    assert!(result.is_ok());
}

// --- Roles and permissions ---

#[test]
async fn system_role_cannot_be_deleted() {
    let mock = MockRepo {
        role: Some(Role {
            is_system: true,
            ..Role::default()
        }),
        ..MockRepo::default()
    };
    let result =
        handlers::access::delete_role(admin_actor(), State(repo(mock)), Path(TEST_ID)).await;
    assert_eq!(result.err().expect("expected a rejection").status, StatusCode::BAD_REQUEST);
}

#[test]
async fn custom_role_can_be_deleted() {
    let result = handlers::access::delete_role(
        admin_actor(),
        State(repo(MockRepo::default())),
        Path(TEST_ID),
    )
    .await;
    assert!(result.is_ok());
}

#[test]
async fn referenced_permission_cannot_be_deleted() {
    let mock = MockRepo {
        permission_in_use: true,
        ..MockRepo::default()
    };
    let result =
        handlers::access::delete_permission(admin_actor(), State(repo(mock)), Path(TEST_ID)).await;
    assert_eq!(result.err().expect("expected a rejection").status, StatusCode::BAD_REQUEST);
}

#[test]
async fn unreferenced_permission_can_be_deleted() {
    let result = handlers::access::delete_permission(
        admin_actor(),
        State(repo(MockRepo::default())),
        Path(TEST_ID),
    )
    .await;
    assert!(result.is_ok());
}

// --- Articles ---

#[test]
async fn deleting_missing_article_is_not_found() {
    // Covers soft-deleted rows too; the repository reports no row affected.
    let mock = MockRepo {
        delete_result: false,
        ..MockRepo::default()
    };
    let result = handlers::articles::admin_delete_article(
        admin_actor(),
        State(repo(mock)),
        Path(TEST_ID),
    )
    .await;
    assert_eq!(result.err().expect("expected a rejection").status, StatusCode::NOT_FOUND);
}

#[test]
async fn toggle_publish_stamps_publication_time() {
    let mock = MockRepo {
        article: Some(Article {
            status: ArticleStatus::Draft,
            published_at: None,
            ..Article::default()
        }),
        ..MockRepo::default()
    };
    let result = handlers::articles::admin_toggle_article(
        editor_actor(),
        State(repo(mock)),
        Path(TEST_ID),
        Json(ToggleArticleRequest::Status(ArticleStatus::Published)),
    )
    .await;
    let Json(article) = result.expect("toggle should succeed");
    assert_eq!(article.status, ArticleStatus::Published);
    assert!(article.published_at.is_some());
}

#[test]
async fn toggle_republish_keeps_original_publication_time() {
    let stamped = Utc::now() - chrono::Duration::days(3);
    let mock = MockRepo {
        article: Some(Article {
            status: ArticleStatus::Draft,
            published_at: Some(stamped),
            ..Article::default()
        }),
        ..MockRepo::default()
    };
    let result = handlers::articles::admin_toggle_article(
        editor_actor(),
        State(repo(mock)),
        Path(TEST_ID),
        Json(ToggleArticleRequest::Status(ArticleStatus::Published)),
    )
    .await;
    let Json(article) = result.expect("toggle should succeed");
    assert_eq!(article.published_at, Some(stamped));
}

#[test]
async fn article_by_slug_not_found() {
    let result = handlers::articles::article_by_slug(
        State(repo(MockRepo::default())),
        Path("missing-slug".to_string()),
        Query(handlers::LocaleQuery::default()),
    )
    .await;
    assert_eq!(result.err().expect("expected a rejection").status, StatusCode::NOT_FOUND);
}

#[test]
async fn article_by_slug_found() {
    let mock = MockRepo {
        article_view: Some(ArticleView {
            slug: "some-slug".to_string(),
            ..ArticleView::default()
        }),
        ..MockRepo::default()
    };
    let result = handlers::articles::article_by_slug(
        State(repo(mock)),
        Path("some-slug".to_string()),
        Query(handlers::LocaleQuery::default()),
    )
    .await;
    let Json(view) = result.expect("article should be found");
    assert_eq!(view.slug, "some-slug");
}

#[test]
async fn blank_search_short_circuits_to_empty() {
    let mock = MockRepo {
        cards: vec![ArticleCard::default()],
        ..MockRepo::default()
    };
    let Json(results) = handlers::articles::search_articles(
        State(repo(mock)),
        Query(handlers::SearchQuery {
            q: "   ".to_string(),
            locale: None,
            limit: None,
        }),
    )
    .await;
    assert!(results.is_empty());
}

#[test]
async fn public_listing_returns_repository_rows() {
    let mock = MockRepo {
        cards: vec![ArticleCard::default(), ArticleCard::default()],
        ..MockRepo::default()
    };
    let Json(cards) = handlers::articles::recent_articles(
        State(repo(mock)),
        Query(ListQuery::default()),
    )
    .await;
    assert_eq!(cards.len(), 2);
}

// --- Login ---

#[test]
async fn login_with_valid_credentials_returns_token() {
    let hash = xeber_portal::auth::hash_password("correct-horse".to_string())
        .await
        .expect("hashing should succeed");
    let mock = MockRepo {
        user_by_email: Some(User {
            email: "editor@example.com".to_string(),
            password_hash: hash,
            role: "editor".to_string(),
            ..User::default()
        }),
        ..MockRepo::default()
    };
    let result = handlers::access::login(
        State(repo(mock)),
        State(xeber_portal::AppConfig::default()),
        Json(xeber_portal::models::LoginRequest {
            email: "editor@example.com".to_string(),
            password: "correct-horse".to_string(),
        }),
    )
    .await;
    let Json(response) = result.expect("login should succeed");
    assert!(!response.token.is_empty());
    assert_eq!(response.user.email, "editor@example.com");
}

#[test]
async fn login_with_wrong_password_is_unauthorized() {
    let hash = xeber_portal::auth::hash_password("correct-horse".to_string())
        .await
        .expect("hashing should succeed");
    let mock = MockRepo {
        user_by_email: Some(User {
            password_hash: hash,
            ..User::default()
        }),
        ..MockRepo::default()
    };
    let result = handlers::access::login(
        State(repo(mock)),
        State(xeber_portal::AppConfig::default()),
        Json(xeber_portal::models::LoginRequest {
            email: "editor@example.com".to_string(),
            password: "battery-staple".to_string(),
        }),
    )
    .await;
    assert_eq!(result.err().expect("expected a rejection").status, StatusCode::UNAUTHORIZED);
}

#[test]
async fn login_with_unknown_email_is_unauthorized() {
    let result = handlers::access::login(
        State(repo(MockRepo::default())),
        State(xeber_portal::AppConfig::default()),
        Json(xeber_portal::models::LoginRequest {
            email: "nobody@example.com".to_string(),
            password: "whatever".to_string(),
        }),
    )
    .await;
    assert_eq!(result.err().expect("expected a rejection").status, StatusCode::UNAUTHORIZED);
}

// --- Menus ---

#[test]
async fn category_menu_without_target_is_rejected() {
    let payload = MenuPayload {
        kind: xeber_portal::models::MenuKind::Category,
        target_id: None,
        is_active: true,
        ..MenuPayload::default()
    };
    let result = handlers::content::admin_create_menu(
        admin_actor(),
        State(repo(MockRepo::default())),
        Json(payload),
    )
    .await;
    assert_eq!(result.err().expect("expected a rejection").status, StatusCode::BAD_REQUEST);
}

#[test]
async fn menu_cannot_become_its_own_parent() {
    let payload = MenuPayload {
        parent_id: Some(TEST_ID),
        is_active: true,
        ..MenuPayload::default()
    };
    let result = handlers::content::admin_update_menu(
        admin_actor(),
        State(repo(MockRepo::default())),
        Path(TEST_ID),
        Json(payload),
    )
    .await;
    assert_eq!(result.err().expect("expected a rejection").status, StatusCode::BAD_REQUEST);
}
