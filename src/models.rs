use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Locales ---

/// Supported content locales. Every content entity carries one translation
/// row per locale.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type, Default,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "locale", rename_all = "lowercase")]
pub enum Locale {
    /// Azerbaijani, the default locale and the fallback for missing rows.
    #[default]
    Az,
    En,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Az => "az",
            Locale::En => "en",
        }
    }
}

/// Implemented by every `*Translation` row so localized reads share one
/// fallback policy.
pub trait Localized {
    fn locale(&self) -> Locale;
}

/// Uniform translation resolution: requested locale, else the default
/// locale, else `None` (callers degrade to empty strings).
pub fn pick_translation<T: Localized>(rows: &[T], locale: Locale) -> Option<&T> {
    rows.iter()
        .find(|t| t.locale() == locale)
        .or_else(|| rows.iter().find(|t| t.locale() == Locale::default()))
}

// --- Enumerations (mapped to Postgres enum types) ---

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type, Default,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "article_status", rename_all = "lowercase")]
pub enum ArticleStatus {
    #[default]
    Draft,
    Published,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type, Default,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "menu_kind", rename_all = "lowercase")]
pub enum MenuKind {
    /// URL comes verbatim from the menu translation.
    #[default]
    Custom,
    /// URL derived from the linked category's slug.
    Category,
    /// URL derived from the linked page translation's slug.
    Page,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type, Default,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "ad_kind", rename_all = "lowercase")]
pub enum AdKind {
    #[default]
    Image,
    Html,
}

// --- Core entities (mapped to database tables) ---

/// Back-office user. `password_hash` never leaves the server; API responses
/// use [`UserResponse`].
#[derive(Debug, Clone, FromRow, Default)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    /// RBAC role key, resolved against `roles.key` per request. The sentinel
    /// `"admin"` is an implicit superuser.
    pub role: String,
    pub avatar: Option<String>,
    pub bio_az: Option<String>,
    pub bio_en: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct Role {
    pub id: Uuid,
    pub key: String,
    pub name: String,
    pub description: Option<String>,
    /// System roles are non-deletable.
    pub is_system: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct Permission {
    pub id: Uuid,
    /// Dot-namespaced key, e.g. `articles.edit`.
    pub key: String,
    pub name: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct Article {
    pub id: Uuid,
    pub author_id: Uuid,
    pub category_id: Option<Uuid>,
    pub featured: bool,
    /// Priority placement in "latest" listings, independent of `featured`.
    pub agenda: bool,
    pub status: ArticleStatus,
    pub published_at: Option<DateTime<Utc>>,
    /// Soft-delete marker. Set rows are invisible everywhere, admin
    /// included.
    pub deleted_at: Option<DateTime<Utc>>,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Article {
    /// The uniform public visibility rule: not soft-deleted, published, and
    /// not scheduled for the future.
    pub fn is_publicly_visible(&self, now: DateTime<Utc>) -> bool {
        self.deleted_at.is_none()
            && self.status == ArticleStatus::Published
            && self.published_at.is_none_or(|at| at <= now)
    }

    /// Applies a toggle mutation. Publishing a draft that has no
    /// `published_at` stamps it with `now` in the same operation.
    pub fn apply_toggle(&mut self, toggle: &ToggleArticleRequest, now: DateTime<Utc>) {
        match toggle {
            ToggleArticleRequest::Featured(value) => self.featured = *value,
            ToggleArticleRequest::Agenda(value) => self.agenda = *value,
            ToggleArticleRequest::Status(status) => {
                self.status = *status;
                if *status == ArticleStatus::Published && self.published_at.is_none() {
                    self.published_at = Some(now);
                }
            }
        }
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct ArticleTranslation {
    pub article_id: Uuid,
    pub locale: Locale,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct ArticleImage {
    pub id: Uuid,
    pub article_id: Uuid,
    pub url: String,
    pub position: i32,
    pub is_primary: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct Category {
    pub id: Uuid,
    pub slug: String,
    pub position: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct CategoryTranslation {
    pub category_id: Uuid,
    pub locale: Locale,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct Tag {
    pub id: Uuid,
    pub slug: String,
    pub position: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct TagTranslation {
    pub tag_id: Uuid,
    pub locale: Locale,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct Page {
    pub id: Uuid,
    pub slug: String,
    pub position: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct PageTranslation {
    pub page_id: Uuid,
    pub locale: Locale,
    pub title: String,
    /// Per-locale slug used in derived `/{locale}/page/{slug}` URLs.
    pub slug: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct Menu {
    pub id: Uuid,
    /// One level of nesting; children never have children of their own.
    pub parent_id: Option<Uuid>,
    pub kind: MenuKind,
    /// Polymorphic link to a Category or Page record, per `kind`.
    pub target_id: Option<Uuid>,
    pub position: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct MenuTranslation {
    pub menu_id: Uuid,
    pub locale: Locale,
    pub label: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct Advertisement {
    pub id: Uuid,
    pub kind: AdKind,
    /// Placement key the front-end requests by, e.g. `home_top`.
    pub placement: String,
    pub position: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct AdvertisementTranslation {
    pub advertisement_id: Uuid,
    pub locale: Locale,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub html: Option<String>,
}

impl Localized for ArticleTranslation {
    fn locale(&self) -> Locale {
        self.locale
    }
}
impl Localized for CategoryTranslation {
    fn locale(&self) -> Locale {
        self.locale
    }
}
impl Localized for TagTranslation {
    fn locale(&self) -> Locale {
        self.locale
    }
}
impl Localized for PageTranslation {
    fn locale(&self) -> Locale {
        self.locale
    }
}
impl Localized for MenuTranslation {
    fn locale(&self) -> Locale {
        self.locale
    }
}
impl Localized for AdvertisementTranslation {
    fn locale(&self) -> Locale {
        self.locale
    }
}

// --- Menu URL derivation ---

/// Effective URL of a menu entry.
///
/// `custom` uses the stored translation URL, `category` derives
/// `/{locale}/category/{slug}`, `page` derives `/{locale}/page/{slug}` from
/// the page translation's slug. Unresolvable targets fall back to `#`.
pub fn derive_menu_url(
    kind: MenuKind,
    locale: Locale,
    custom_url: Option<&str>,
    category_slug: Option<&str>,
    page_slug: Option<&str>,
) -> String {
    match kind {
        MenuKind::Custom => custom_url
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| "#".to_string()),
        MenuKind::Category => category_slug
            .map(|slug| format!("/{}/category/{}", locale.as_str(), slug))
            .unwrap_or_else(|| "#".to_string()),
        MenuKind::Page => page_slug
            .map(|slug| format!("/{}/page/{}", locale.as_str(), slug))
            .unwrap_or_else(|| "#".to_string()),
    }
}

// --- Admin detail views (entity + translation rows) ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct ArticleDetail {
    pub article: Article,
    pub translations: Vec<ArticleTranslation>,
    pub images: Vec<ArticleImage>,
    pub tag_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct CategoryDetail {
    pub category: Category,
    pub translations: Vec<CategoryTranslation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct TagDetail {
    pub tag: Tag,
    pub translations: Vec<TagTranslation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct PageDetail {
    pub page: Page,
    pub translations: Vec<PageTranslation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct MenuDetail {
    pub menu: Menu,
    pub translations: Vec<MenuTranslation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct AdvertisementDetail {
    pub advertisement: Advertisement,
    pub translations: Vec<AdvertisementTranslation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct RoleDetail {
    pub id: Uuid,
    pub key: String,
    pub name: String,
    pub description: Option<String>,
    pub is_system: bool,
    pub permissions: Vec<Permission>,
}

impl RoleDetail {
    pub fn new(role: Role, permissions: Vec<Permission>) -> Self {
        Self {
            id: role.id,
            key: role.key,
            name: role.name,
            description: role.description,
            is_system: role.is_system,
            permissions,
        }
    }
}

// --- Public localized views ---

/// Localized article listing row served by the public endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct ArticleCard {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub image: Option<String>,
    pub category: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub views: i64,
    pub featured: bool,
    pub agenda: bool,
}

/// Localized article detail, including body and tag names.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct ArticleView {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub image: Option<String>,
    pub category: Option<String>,
    pub category_slug: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub views: i64,
    pub featured: bool,
    pub agenda: bool,
    /// Filled in after the row query.
    #[sqlx(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct CategoryView {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct TagView {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct PageView {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub content: String,
}

/// Navigation entry with its derived URL; children are one level deep.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct MenuItem {
    pub id: Uuid,
    pub label: String,
    pub url: String,
    pub children: Vec<MenuItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct AdView {
    pub id: Uuid,
    pub kind: AdKind,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub html: Option<String>,
}

/// User shape exposed over the API; the password hash stays internal.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
    pub avatar: Option<String>,
    pub bio_az: Option<String>,
    pub bio_en: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            avatar: user.avatar,
            bio_az: user.bio_az,
            bio_en: user.bio_en,
            created_at: user.created_at,
        }
    }
}

// --- Request payloads (validated input schemas) ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: String,
    pub avatar: Option<String>,
    pub bio_az: Option<String>,
    pub bio_en: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    /// When present, re-hashed before storage.
    pub password: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub avatar: Option<String>,
    pub bio_az: Option<String>,
    pub bio_en: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct RolePayload {
    pub key: String,
    pub name: String,
    pub description: Option<String>,
    /// Full replacement set of linked permissions.
    #[serde(default)]
    pub permission_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct PermissionPayload {
    pub key: String,
    pub name: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct ArticleTranslationInput {
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
}

/// Both locales are mandatory on write; the invariant of one translation row
/// per locale is enforced at the boundary.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct ArticleTranslations {
    pub az: ArticleTranslationInput,
    pub en: ArticleTranslationInput,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct ArticleImageInput {
    pub url: String,
    pub position: i32,
    pub is_primary: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct ArticlePayload {
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub agenda: bool,
    #[serde(default)]
    pub status: ArticleStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub translations: ArticleTranslations,
    #[serde(default)]
    pub tag_ids: Vec<Uuid>,
    #[serde(default)]
    pub images: Vec<ArticleImageInput>,
}

/// Toggle mutation for a single article field, tagged so invalid
/// field/value combinations are rejected during deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(tag = "field", content = "value", rename_all = "lowercase")]
pub enum ToggleArticleRequest {
    Featured(bool),
    Agenda(bool),
    Status(ArticleStatus),
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct CategoryTranslationInput {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct CategoryTranslations {
    pub az: CategoryTranslationInput,
    pub en: CategoryTranslationInput,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct CategoryPayload {
    pub slug: String,
    #[serde(default)]
    pub position: i32,
    pub is_active: bool,
    pub translations: CategoryTranslations,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct TagTranslationInput {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct TagTranslations {
    pub az: TagTranslationInput,
    pub en: TagTranslationInput,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct TagPayload {
    pub slug: String,
    #[serde(default)]
    pub position: i32,
    pub is_active: bool,
    pub translations: TagTranslations,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct PageTranslationInput {
    pub title: String,
    pub slug: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct PageTranslations {
    pub az: PageTranslationInput,
    pub en: PageTranslationInput,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct PagePayload {
    pub slug: String,
    #[serde(default)]
    pub position: i32,
    pub is_active: bool,
    pub translations: PageTranslations,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct MenuTranslationInput {
    pub label: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct MenuTranslations {
    pub az: MenuTranslationInput,
    pub en: MenuTranslationInput,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct MenuPayload {
    pub kind: MenuKind,
    pub parent_id: Option<Uuid>,
    pub target_id: Option<Uuid>,
    #[serde(default)]
    pub position: i32,
    pub is_active: bool,
    pub translations: MenuTranslations,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct AdvertisementTranslationInput {
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub html: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct AdvertisementTranslations {
    pub az: AdvertisementTranslationInput,
    pub en: AdvertisementTranslationInput,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct AdvertisementPayload {
    pub kind: AdKind,
    pub placement: String,
    #[serde(default)]
    pub position: i32,
    pub is_active: bool,
    /// Translations are optional for advertisements.
    pub translations: Option<AdvertisementTranslations>,
}
