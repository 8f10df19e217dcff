use crate::models::{
    AdView, Advertisement, AdvertisementDetail, AdvertisementPayload, AdvertisementTranslation,
    Article,
    ArticleCard, ArticleDetail, ArticleImage, ArticlePayload, ArticleStatus, ArticleTranslation,
    ArticleView, Category, CategoryDetail, CategoryPayload, CategoryTranslation, CategoryView,
    CreateUserRequest, Locale, Menu, MenuDetail, MenuItem, MenuKind, MenuPayload, MenuTranslation,
    Page, PageDetail, PagePayload, PageTranslation, PageView, Permission, PermissionPayload, Role,
    RoleDetail, RolePayload, Tag, TagDetail, TagPayload, TagTranslation, TagView,
    ToggleArticleRequest, UpdateUserRequest, User, pick_translation,
};
use async_trait::async_trait;
use sqlx::{PgPool, query_builder::QueryBuilder};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Abstract persistence contract. Handlers depend on this trait only, which
/// keeps them testable against an in-memory mock.
///
/// Mutating methods return `Option`/`bool`; `None`/`false` covers both
/// "not found" and a logged database failure, matching the transport
/// mapping (404 or 500). Listing methods degrade to an empty vector on
/// failure, which is exactly the contract of the public read endpoints.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn get_user(&self, id: Uuid) -> Option<User>;
    async fn get_user_by_email(&self, email: &str) -> Option<User>;
    async fn list_users(&self) -> Vec<User>;
    // `None` on conflict (duplicate email) or database failure.
    async fn create_user(&self, req: CreateUserRequest, password_hash: String) -> Option<User>;
    async fn update_user(
        &self,
        id: Uuid,
        req: UpdateUserRequest,
        password_hash: Option<String>,
    ) -> Option<User>;
    async fn delete_user(&self, id: Uuid) -> bool;

    // --- Roles & permissions ---
    /// Permission keys linked to a role key; unknown keys yield an empty
    /// vector (fail-closed).
    async fn resolve_permission_keys(&self, role_key: &str) -> Vec<String>;
    async fn list_roles(&self) -> Vec<RoleDetail>;
    async fn get_role(&self, id: Uuid) -> Option<Role>;
    async fn create_role(&self, payload: RolePayload) -> Option<RoleDetail>;
    async fn update_role(&self, id: Uuid, payload: RolePayload) -> Option<RoleDetail>;
    async fn delete_role(&self, id: Uuid) -> bool;
    async fn list_permissions(&self) -> Vec<Permission>;
    async fn get_permission(&self, id: Uuid) -> Option<Permission>;
    async fn create_permission(&self, payload: PermissionPayload) -> Option<Permission>;
    async fn update_permission(&self, id: Uuid, payload: PermissionPayload) -> Option<Permission>;
    async fn permission_in_use(&self, id: Uuid) -> bool;
    async fn delete_permission(&self, id: Uuid) -> bool;

    // --- Articles (admin) ---
    async fn list_articles_admin(
        &self,
        status: Option<ArticleStatus>,
        search: Option<String>,
    ) -> Vec<ArticleDetail>;
    async fn get_article_admin(&self, id: Uuid) -> Option<ArticleDetail>;
    async fn create_article(&self, author_id: Uuid, payload: ArticlePayload)
    -> Option<ArticleDetail>;
    async fn update_article(&self, id: Uuid, payload: ArticlePayload) -> Option<ArticleDetail>;
    async fn soft_delete_article(&self, id: Uuid) -> bool;
    async fn toggle_article(&self, id: Uuid, toggle: ToggleArticleRequest) -> Option<Article>;

    // --- Articles (public) ---
    async fn featured_articles(&self, locale: Locale, limit: i64) -> Vec<ArticleCard>;
    async fn recent_articles(&self, locale: Locale, limit: i64) -> Vec<ArticleCard>;
    async fn agenda_articles(&self, locale: Locale, limit: i64) -> Vec<ArticleCard>;
    async fn top_articles(&self, locale: Locale, limit: i64) -> Vec<ArticleCard>;
    async fn articles_by_category(&self, slug: &str, locale: Locale, limit: i64)
    -> Vec<ArticleCard>;
    async fn search_articles(&self, query: &str, locale: Locale, limit: i64) -> Vec<ArticleCard>;
    async fn article_by_slug(&self, slug: &str, locale: Locale) -> Option<ArticleView>;
    async fn increment_views(&self, id: Uuid);

    // --- Categories ---
    async fn list_categories(&self, locale: Locale) -> Vec<CategoryView>;
    async fn list_categories_admin(&self) -> Vec<CategoryDetail>;
    async fn create_category(&self, payload: CategoryPayload) -> Option<CategoryDetail>;
    async fn update_category(&self, id: Uuid, payload: CategoryPayload) -> Option<CategoryDetail>;
    async fn delete_category(&self, id: Uuid) -> bool;

    // --- Tags ---
    async fn list_tags(&self, locale: Locale) -> Vec<TagView>;
    async fn list_tags_admin(&self) -> Vec<TagDetail>;
    async fn create_tag(&self, payload: TagPayload) -> Option<TagDetail>;
    async fn update_tag(&self, id: Uuid, payload: TagPayload) -> Option<TagDetail>;
    async fn delete_tag(&self, id: Uuid) -> bool;

    // --- Pages ---
    async fn list_pages(&self, locale: Locale) -> Vec<PageView>;
    async fn page_by_slug(&self, slug: &str, locale: Locale) -> Option<PageView>;
    async fn list_pages_admin(&self) -> Vec<PageDetail>;
    async fn create_page(&self, payload: PagePayload) -> Option<PageDetail>;
    async fn update_page(&self, id: Uuid, payload: PagePayload) -> Option<PageDetail>;
    async fn delete_page(&self, id: Uuid) -> bool;

    // --- Menus ---
    async fn menu_tree(&self, locale: Locale) -> Vec<MenuItem>;
    async fn list_menus_admin(&self) -> Vec<MenuDetail>;
    async fn create_menu(&self, payload: MenuPayload) -> Option<MenuDetail>;
    async fn update_menu(&self, id: Uuid, payload: MenuPayload) -> Option<MenuDetail>;
    async fn delete_menu(&self, id: Uuid) -> bool;

    // --- Advertisements ---
    async fn ads_by_placement(&self, placement: &str, locale: Locale) -> Vec<AdView>;
    async fn list_ads_admin(&self) -> Vec<AdvertisementDetail>;
    async fn create_ad(&self, payload: AdvertisementPayload) -> Option<AdvertisementDetail>;
    async fn update_ad(&self, id: Uuid, payload: AdvertisementPayload)
    -> Option<AdvertisementDetail>;
    async fn delete_ad(&self, id: Uuid) -> bool;
}

/// Shared handle to the persistence layer.
pub type RepositoryState = Arc<dyn Repository>;

/// Postgres-backed implementation of [`Repository`].
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Public article visibility: not soft-deleted, published, not scheduled for
// the future. Applied uniformly to every public query.
const VISIBLE: &str = "a.deleted_at IS NULL AND a.status = 'published' \
AND (a.published_at IS NULL OR a.published_at <= NOW())";

// Localized listing row. $1 is always the requested locale; the default
// locale join covers the fallback.
const CARD_SELECT: &str = "\
SELECT a.id, \
       COALESCE(tr.title, td.title, '') AS title, \
       COALESCE(tr.slug, td.slug, '') AS slug, \
       COALESCE(tr.excerpt, td.excerpt, '') AS excerpt, \
       img.url AS image, \
       COALESCE(ctr.name, ctd.name) AS category, \
       a.published_at, a.views, a.featured, a.agenda \
FROM articles a \
LEFT JOIN article_translations tr ON tr.article_id = a.id AND tr.locale = $1 \
LEFT JOIN article_translations td ON td.article_id = a.id AND td.locale = 'az' \
LEFT JOIN LATERAL (\
    SELECT i.url FROM article_images i WHERE i.article_id = a.id \
    ORDER BY i.is_primary DESC, i.position ASC LIMIT 1\
) img ON true \
LEFT JOIN category_translations ctr ON ctr.category_id = a.category_id AND ctr.locale = $1 \
LEFT JOIN category_translations ctd ON ctd.category_id = a.category_id AND ctd.locale = 'az' ";

const AGENDA_ORDER: &str = " ORDER BY a.agenda DESC, a.published_at DESC NULLS LAST LIMIT $2";
const RECENCY_ORDER: &str = " ORDER BY a.published_at DESC NULLS LAST LIMIT $2";

const USER_COLUMNS: &str =
    "id, email, password_hash, name, role, avatar, bio_az, bio_en, created_at";
const ARTICLE_COLUMNS: &str = "id, author_id, category_id, featured, agenda, status, \
published_at, deleted_at, views, created_at, updated_at";

impl PostgresRepository {
    async fn fetch_cards(&self, sql: &str, locale: Locale, limit: i64) -> Vec<ArticleCard> {
        match sqlx::query_as::<_, ArticleCard>(sql)
            .bind(locale)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
        {
            Ok(cards) => cards,
            Err(e) => {
                tracing::error!("article listing error: {:?}", e);
                vec![]
            }
        }
    }

    /// Loads translations, images and tag links for a set of articles in
    /// three grouped queries instead of three per article.
    async fn assemble_article_details(
        &self,
        articles: Vec<Article>,
    ) -> Result<Vec<ArticleDetail>, sqlx::Error> {
        let ids: Vec<Uuid> = articles.iter().map(|a| a.id).collect();

        let translations = sqlx::query_as::<_, ArticleTranslation>(
            "SELECT article_id, locale, title, slug, excerpt, content \
             FROM article_translations WHERE article_id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let images = sqlx::query_as::<_, ArticleImage>(
            "SELECT id, article_id, url, position, is_primary \
             FROM article_images WHERE article_id = ANY($1) \
             ORDER BY position ASC",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let tag_links: Vec<(Uuid, Uuid)> = sqlx::query_as(
            "SELECT article_id, tag_id FROM article_tags WHERE article_id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_article: HashMap<Uuid, ArticleDetail> = articles
            .into_iter()
            .map(|article| {
                let id = article.id;
                (
                    id,
                    ArticleDetail {
                        article,
                        translations: vec![],
                        images: vec![],
                        tag_ids: vec![],
                    },
                )
            })
            .collect();
        for translation in translations {
            if let Some(detail) = by_article.get_mut(&translation.article_id) {
                detail.translations.push(translation);
            }
        }
        for image in images {
            if let Some(detail) = by_article.get_mut(&image.article_id) {
                detail.images.push(image);
            }
        }
        for (article_id, tag_id) in tag_links {
            if let Some(detail) = by_article.get_mut(&article_id) {
                detail.tag_ids.push(tag_id);
            }
        }

        let mut details: Vec<ArticleDetail> = by_article.into_values().collect();
        details.sort_by(|a, b| b.article.created_at.cmp(&a.article.created_at));
        Ok(details)
    }

    async fn write_article_children(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        article_id: Uuid,
        payload: &ArticlePayload,
    ) -> Result<(), sqlx::Error> {
        for (locale, input) in [
            (Locale::Az, &payload.translations.az),
            (Locale::En, &payload.translations.en),
        ] {
            sqlx::query(
                "INSERT INTO article_translations (article_id, locale, title, slug, excerpt, content) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(article_id)
            .bind(locale)
            .bind(&input.title)
            .bind(&input.slug)
            .bind(&input.excerpt)
            .bind(&input.content)
            .execute(&mut **tx)
            .await?;
        }
        for image in &payload.images {
            sqlx::query(
                "INSERT INTO article_images (id, article_id, url, position, is_primary) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(Uuid::new_v4())
            .bind(article_id)
            .bind(&image.url)
            .bind(image.position)
            .bind(image.is_primary)
            .execute(&mut **tx)
            .await?;
        }
        for tag_id in &payload.tag_ids {
            sqlx::query(
                "INSERT INTO article_tags (article_id, tag_id) VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(article_id)
            .bind(tag_id)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    async fn create_article_tx(
        &self,
        author_id: Uuid,
        payload: ArticlePayload,
    ) -> Result<ArticleDetail, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let article = sqlx::query_as::<_, Article>(&format!(
            "INSERT INTO articles (id, author_id, category_id, featured, agenda, status, \
             published_at, views, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, 0, NOW(), NOW()) \
             RETURNING {ARTICLE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(author_id)
        .bind(payload.category_id)
        .bind(payload.featured)
        .bind(payload.agenda)
        .bind(payload.status)
        .bind(payload.published_at)
        .fetch_one(&mut *tx)
        .await?;

        Self::write_article_children(&mut tx, article.id, &payload).await?;
        tx.commit().await?;

        self.article_detail(article.id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    async fn update_article_tx(
        &self,
        id: Uuid,
        payload: ArticlePayload,
    ) -> Result<Option<ArticleDetail>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let updated = sqlx::query_as::<_, Article>(&format!(
            "UPDATE articles SET category_id = $2, featured = $3, agenda = $4, status = $5, \
             published_at = $6, updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL \
             RETURNING {ARTICLE_COLUMNS}"
        ))
        .bind(id)
        .bind(payload.category_id)
        .bind(payload.featured)
        .bind(payload.agenda)
        .bind(payload.status)
        .bind(payload.published_at)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(article) = updated else {
            return Ok(None);
        };

        // Translation (and child row) updates are delete-then-recreate,
        // inside the same transaction as the parent update.
        sqlx::query("DELETE FROM article_translations WHERE article_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM article_images WHERE article_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM article_tags WHERE article_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        Self::write_article_children(&mut tx, article.id, &payload).await?;
        tx.commit().await?;

        self.article_detail(article.id).await
    }

    async fn article_detail(&self, id: Uuid) -> Result<Option<ArticleDetail>, sqlx::Error> {
        let article = sqlx::query_as::<_, Article>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(article) = article else {
            return Ok(None);
        };
        Ok(self.assemble_article_details(vec![article]).await?.pop())
    }

    async fn role_detail(&self, role: Role) -> Result<RoleDetail, sqlx::Error> {
        let permissions = sqlx::query_as::<_, Permission>(
            "SELECT p.id, p.key, p.name, p.category FROM permissions p \
             JOIN role_permissions rp ON rp.permission_id = p.id \
             WHERE rp.role_id = $1 ORDER BY p.key",
        )
        .bind(role.id)
        .fetch_all(&self.pool)
        .await?;
        Ok(RoleDetail::new(role, permissions))
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    // --- Users ---

    async fn get_user(&self, id: Uuid) -> Option<User> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_user error: {:?}", e);
                None
            })
    }

    async fn get_user_by_email(&self, email: &str) -> Option<User> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_user_by_email error: {:?}", e);
            None
        })
    }

    async fn list_users(&self) -> Vec<User> {
        match sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        {
            Ok(users) => users,
            Err(e) => {
                tracing::error!("list_users error: {:?}", e);
                vec![]
            }
        }
    }

    async fn create_user(&self, req: CreateUserRequest, password_hash: String) -> Option<User> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, email, password_hash, name, role, avatar, bio_az, bio_en, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW()) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&req.email)
        .bind(&password_hash)
        .bind(&req.name)
        .bind(&req.role)
        .bind(&req.avatar)
        .bind(&req.bio_az)
        .bind(&req.bio_en)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| tracing::error!("create_user error: {:?}", e))
        .ok()
    }

    async fn update_user(
        &self,
        id: Uuid,
        req: UpdateUserRequest,
        password_hash: Option<String>,
    ) -> Option<User> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET email = COALESCE($2, email), \
             password_hash = COALESCE($3, password_hash), \
             name = COALESCE($4, name), role = COALESCE($5, role), \
             avatar = COALESCE($6, avatar), bio_az = COALESCE($7, bio_az), \
             bio_en = COALESCE($8, bio_en) \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(&req.email)
        .bind(&password_hash)
        .bind(&req.name)
        .bind(&req.role)
        .bind(&req.avatar)
        .bind(&req.bio_az)
        .bind(&req.bio_en)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("update_user error: {:?}", e);
            None
        })
    }

    async fn delete_user(&self, id: Uuid) -> bool {
        match sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_user error: {:?}", e);
                false
            }
        }
    }

    // --- Roles & permissions ---

    async fn resolve_permission_keys(&self, role_key: &str) -> Vec<String> {
        match sqlx::query_scalar::<_, String>(
            "SELECT p.key FROM permissions p \
             JOIN role_permissions rp ON rp.permission_id = p.id \
             JOIN roles r ON r.id = rp.role_id \
             WHERE r.key = $1",
        )
        .bind(role_key)
        .fetch_all(&self.pool)
        .await
        {
            Ok(keys) => keys,
            Err(e) => {
                tracing::error!("resolve_permission_keys error: {:?}", e);
                vec![]
            }
        }
    }

    async fn list_roles(&self) -> Vec<RoleDetail> {
        let roles = match sqlx::query_as::<_, Role>(
            "SELECT id, key, name, description, is_system FROM roles ORDER BY key",
        )
        .fetch_all(&self.pool)
        .await
        {
            Ok(roles) => roles,
            Err(e) => {
                tracing::error!("list_roles error: {:?}", e);
                return vec![];
            }
        };
        let mut details = Vec::with_capacity(roles.len());
        for role in roles {
            match self.role_detail(role).await {
                Ok(detail) => details.push(detail),
                Err(e) => tracing::error!("list_roles detail error: {:?}", e),
            }
        }
        details
    }

    async fn get_role(&self, id: Uuid) -> Option<Role> {
        sqlx::query_as::<_, Role>(
            "SELECT id, key, name, description, is_system FROM roles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_role error: {:?}", e);
            None
        })
    }

    async fn create_role(&self, payload: RolePayload) -> Option<RoleDetail> {
        let result: Result<RoleDetail, sqlx::Error> = async {
            let mut tx = self.pool.begin().await?;
            let role = sqlx::query_as::<_, Role>(
                "INSERT INTO roles (id, key, name, description, is_system) \
                 VALUES ($1, $2, $3, $4, false) \
                 RETURNING id, key, name, description, is_system",
            )
            .bind(Uuid::new_v4())
            .bind(&payload.key)
            .bind(&payload.name)
            .bind(&payload.description)
            .fetch_one(&mut *tx)
            .await?;
            for permission_id in &payload.permission_ids {
                sqlx::query(
                    "INSERT INTO role_permissions (role_id, permission_id) VALUES ($1, $2) \
                     ON CONFLICT DO NOTHING",
                )
                .bind(role.id)
                .bind(permission_id)
                .execute(&mut *tx)
                .await?;
            }
            tx.commit().await?;
            self.role_detail(role).await
        }
        .await;
        result
            .map_err(|e| tracing::error!("create_role error: {:?}", e))
            .ok()
    }

    async fn update_role(&self, id: Uuid, payload: RolePayload) -> Option<RoleDetail> {
        let result: Result<Option<RoleDetail>, sqlx::Error> = async {
            let mut tx = self.pool.begin().await?;
            let role = sqlx::query_as::<_, Role>(
                "UPDATE roles SET key = $2, name = $3, description = $4 \
                 WHERE id = $1 RETURNING id, key, name, description, is_system",
            )
            .bind(id)
            .bind(&payload.key)
            .bind(&payload.name)
            .bind(&payload.description)
            .fetch_optional(&mut *tx)
            .await?;
            let Some(role) = role else {
                return Ok(None);
            };
            sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            for permission_id in &payload.permission_ids {
                sqlx::query("INSERT INTO role_permissions (role_id, permission_id) VALUES ($1, $2)")
                    .bind(id)
                    .bind(permission_id)
                    .execute(&mut *tx)
                    .await?;
            }
            tx.commit().await?;
            self.role_detail(role).await.map(Some)
        }
        .await;
        result
            .unwrap_or_else(|e| {
                tracing::error!("update_role error: {:?}", e);
                None
            })
    }

    async fn delete_role(&self, id: Uuid) -> bool {
        match sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_role error: {:?}", e);
                false
            }
        }
    }

    async fn list_permissions(&self) -> Vec<Permission> {
        match sqlx::query_as::<_, Permission>(
            "SELECT id, key, name, category FROM permissions ORDER BY category, key",
        )
        .fetch_all(&self.pool)
        .await
        {
            Ok(permissions) => permissions,
            Err(e) => {
                tracing::error!("list_permissions error: {:?}", e);
                vec![]
            }
        }
    }

    async fn get_permission(&self, id: Uuid) -> Option<Permission> {
        sqlx::query_as::<_, Permission>(
            "SELECT id, key, name, category FROM permissions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_permission error: {:?}", e);
            None
        })
    }

    async fn create_permission(&self, payload: PermissionPayload) -> Option<Permission> {
        sqlx::query_as::<_, Permission>(
            "INSERT INTO permissions (id, key, name, category) VALUES ($1, $2, $3, $4) \
             RETURNING id, key, name, category",
        )
        .bind(Uuid::new_v4())
        .bind(&payload.key)
        .bind(&payload.name)
        .bind(&payload.category)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| tracing::error!("create_permission error: {:?}", e))
        .ok()
    }

    async fn update_permission(&self, id: Uuid, payload: PermissionPayload) -> Option<Permission> {
        sqlx::query_as::<_, Permission>(
            "UPDATE permissions SET key = $2, name = $3, category = $4 \
             WHERE id = $1 RETURNING id, key, name, category",
        )
        .bind(id)
        .bind(&payload.key)
        .bind(&payload.name)
        .bind(&payload.category)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("update_permission error: {:?}", e);
            None
        })
    }

    async fn permission_in_use(&self, id: Uuid) -> bool {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM role_permissions WHERE permission_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .unwrap_or_else(|e| {
            // Treated as in-use so a transient failure never deletes a
            // referenced permission.
            tracing::error!("permission_in_use error: {:?}", e);
            true
        })
    }

    async fn delete_permission(&self, id: Uuid) -> bool {
        match sqlx::query("DELETE FROM permissions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_permission error: {:?}", e);
                false
            }
        }
    }

    // --- Articles (admin) ---

    async fn list_articles_admin(
        &self,
        status: Option<ArticleStatus>,
        search: Option<String>,
    ) -> Vec<ArticleDetail> {
        let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles a WHERE a.deleted_at IS NULL"
        ));
        if let Some(status) = status {
            builder.push(" AND a.status = ");
            builder.push_bind(status);
        }
        if let Some(search) = search {
            let pattern = format!("%{}%", search);
            builder.push(
                " AND EXISTS (SELECT 1 FROM article_translations t \
                 WHERE t.article_id = a.id AND t.title ILIKE ",
            );
            builder.push_bind(pattern);
            builder.push(")");
        }
        builder.push(" ORDER BY a.created_at DESC");

        let articles = match builder
            .build_query_as::<Article>()
            .fetch_all(&self.pool)
            .await
        {
            Ok(articles) => articles,
            Err(e) => {
                tracing::error!("list_articles_admin error: {:?}", e);
                return vec![];
            }
        };
        self.assemble_article_details(articles)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("list_articles_admin detail error: {:?}", e);
                vec![]
            })
    }

    async fn get_article_admin(&self, id: Uuid) -> Option<ArticleDetail> {
        self.article_detail(id).await.unwrap_or_else(|e| {
            tracing::error!("get_article_admin error: {:?}", e);
            None
        })
    }

    async fn create_article(
        &self,
        author_id: Uuid,
        payload: ArticlePayload,
    ) -> Option<ArticleDetail> {
        self.create_article_tx(author_id, payload)
            .await
            .map_err(|e| tracing::error!("create_article error: {:?}", e))
            .ok()
    }

    async fn update_article(&self, id: Uuid, payload: ArticlePayload) -> Option<ArticleDetail> {
        self.update_article_tx(id, payload).await.unwrap_or_else(|e| {
            tracing::error!("update_article error: {:?}", e);
            None
        })
    }

    async fn soft_delete_article(&self, id: Uuid) -> bool {
        match sqlx::query(
            "UPDATE articles SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("soft_delete_article error: {:?}", e);
                false
            }
        }
    }

    async fn toggle_article(&self, id: Uuid, toggle: ToggleArticleRequest) -> Option<Article> {
        let result = match toggle {
            ToggleArticleRequest::Featured(value) => {
                sqlx::query_as::<_, Article>(&format!(
                    "UPDATE articles SET featured = $2, updated_at = NOW() \
                     WHERE id = $1 AND deleted_at IS NULL RETURNING {ARTICLE_COLUMNS}"
                ))
                .bind(id)
                .bind(value)
                .fetch_optional(&self.pool)
                .await
            }
            ToggleArticleRequest::Agenda(value) => {
                sqlx::query_as::<_, Article>(&format!(
                    "UPDATE articles SET agenda = $2, updated_at = NOW() \
                     WHERE id = $1 AND deleted_at IS NULL RETURNING {ARTICLE_COLUMNS}"
                ))
                .bind(id)
                .bind(value)
                .fetch_optional(&self.pool)
                .await
            }
            // Publishing a draft with no publish timestamp stamps it in the
            // same statement.
            ToggleArticleRequest::Status(status) => {
                sqlx::query_as::<_, Article>(&format!(
                    "UPDATE articles SET status = $2, \
                     published_at = CASE WHEN $2 = 'published'::article_status \
                         AND published_at IS NULL THEN NOW() ELSE published_at END, \
                     updated_at = NOW() \
                     WHERE id = $1 AND deleted_at IS NULL RETURNING {ARTICLE_COLUMNS}"
                ))
                .bind(id)
                .bind(status)
                .fetch_optional(&self.pool)
                .await
            }
        };
        result.unwrap_or_else(|e| {
            tracing::error!("toggle_article error: {:?}", e);
            None
        })
    }

    // --- Articles (public) ---

    async fn featured_articles(&self, locale: Locale, limit: i64) -> Vec<ArticleCard> {
        let sql = format!("{CARD_SELECT} WHERE {VISIBLE} AND a.featured = true {RECENCY_ORDER}");
        self.fetch_cards(&sql, locale, limit).await
    }

    async fn recent_articles(&self, locale: Locale, limit: i64) -> Vec<ArticleCard> {
        // Agenda articles take priority, the rest backfill by recency.
        let sql = format!("{CARD_SELECT} WHERE {VISIBLE} {AGENDA_ORDER}");
        self.fetch_cards(&sql, locale, limit).await
    }

    async fn agenda_articles(&self, locale: Locale, limit: i64) -> Vec<ArticleCard> {
        let sql = format!("{CARD_SELECT} WHERE {VISIBLE} AND a.agenda = true {RECENCY_ORDER}");
        self.fetch_cards(&sql, locale, limit).await
    }

    async fn top_articles(&self, locale: Locale, limit: i64) -> Vec<ArticleCard> {
        let sql = format!("{CARD_SELECT} WHERE {VISIBLE} ORDER BY a.views DESC LIMIT $2");
        self.fetch_cards(&sql, locale, limit).await
    }

    async fn articles_by_category(
        &self,
        slug: &str,
        locale: Locale,
        limit: i64,
    ) -> Vec<ArticleCard> {
        let sql = format!(
            "{CARD_SELECT} \
             JOIN categories c ON c.id = a.category_id \
             WHERE {VISIBLE} AND c.slug = $3 AND c.is_active = true {AGENDA_ORDER}"
        );
        match sqlx::query_as::<_, ArticleCard>(&sql)
            .bind(locale)
            .bind(limit)
            .bind(slug)
            .fetch_all(&self.pool)
            .await
        {
            Ok(cards) => cards,
            Err(e) => {
                tracing::error!("articles_by_category error: {:?}", e);
                vec![]
            }
        }
    }

    async fn search_articles(&self, query: &str, locale: Locale, limit: i64) -> Vec<ArticleCard> {
        let pattern = format!("%{}%", query);
        let sql = format!(
            "{CARD_SELECT} WHERE {VISIBLE} AND (\
             COALESCE(tr.title, td.title, '') ILIKE $3 \
             OR COALESCE(tr.excerpt, td.excerpt, '') ILIKE $3 \
             OR COALESCE(tr.content, td.content, '') ILIKE $3) {RECENCY_ORDER}"
        );
        match sqlx::query_as::<_, ArticleCard>(&sql)
            .bind(locale)
            .bind(limit)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await
        {
            Ok(cards) => cards,
            Err(e) => {
                tracing::error!("search_articles error: {:?}", e);
                vec![]
            }
        }
    }

    async fn article_by_slug(&self, slug: &str, locale: Locale) -> Option<ArticleView> {
        let sql = format!(
            "SELECT a.id, \
                    COALESCE(tr.title, td.title, '') AS title, \
                    COALESCE(tr.slug, td.slug, '') AS slug, \
                    COALESCE(tr.excerpt, td.excerpt, '') AS excerpt, \
                    COALESCE(tr.content, td.content, '') AS content, \
                    img.url AS image, \
                    COALESCE(ctr.name, ctd.name) AS category, \
                    c.slug AS category_slug, \
                    a.published_at, a.views, a.featured, a.agenda \
             FROM articles a \
             LEFT JOIN article_translations tr ON tr.article_id = a.id AND tr.locale = $1 \
             LEFT JOIN article_translations td ON td.article_id = a.id AND td.locale = 'az' \
             LEFT JOIN LATERAL (\
                 SELECT i.url FROM article_images i WHERE i.article_id = a.id \
                 ORDER BY i.is_primary DESC, i.position ASC LIMIT 1\
             ) img ON true \
             LEFT JOIN categories c ON c.id = a.category_id \
             LEFT JOIN category_translations ctr ON ctr.category_id = a.category_id AND ctr.locale = $1 \
             LEFT JOIN category_translations ctd ON ctd.category_id = a.category_id AND ctd.locale = 'az' \
             WHERE {VISIBLE} AND COALESCE(tr.slug, td.slug) = $2"
        );
        let view = sqlx::query_as::<_, ArticleView>(&sql)
            .bind(locale)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("article_by_slug error: {:?}", e);
                None
            });
        let mut view = view?;
        view.tags = sqlx::query_scalar::<_, String>(
            "SELECT COALESCE(tr.name, td.name, '') FROM article_tags at \
             LEFT JOIN tag_translations tr ON tr.tag_id = at.tag_id AND tr.locale = $2 \
             LEFT JOIN tag_translations td ON td.tag_id = at.tag_id AND td.locale = 'az' \
             WHERE at.article_id = $1",
        )
        .bind(view.id)
        .bind(locale)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("article tags error: {:?}", e);
            vec![]
        });
        Some(view)
    }

    async fn increment_views(&self, id: Uuid) {
        // Single-statement increment; never surfaces to the reader.
        if let Err(e) = sqlx::query("UPDATE articles SET views = views + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            tracing::error!("increment_views error: {:?}", e);
        }
    }

    // --- Categories ---

    async fn list_categories(&self, locale: Locale) -> Vec<CategoryView> {
        match sqlx::query_as::<_, CategoryView>(
            "SELECT c.id, c.slug, COALESCE(tr.name, td.name, '') AS name \
             FROM categories c \
             LEFT JOIN category_translations tr ON tr.category_id = c.id AND tr.locale = $1 \
             LEFT JOIN category_translations td ON td.category_id = c.id AND td.locale = 'az' \
             WHERE c.is_active = true ORDER BY c.position",
        )
        .bind(locale)
        .fetch_all(&self.pool)
        .await
        {
            Ok(categories) => categories,
            Err(e) => {
                tracing::error!("list_categories error: {:?}", e);
                vec![]
            }
        }
    }

    async fn list_categories_admin(&self) -> Vec<CategoryDetail> {
        let result: Result<Vec<CategoryDetail>, sqlx::Error> = async {
            let categories = sqlx::query_as::<_, Category>(
                "SELECT id, slug, position, is_active FROM categories ORDER BY position",
            )
            .fetch_all(&self.pool)
            .await?;
            let translations = sqlx::query_as::<_, CategoryTranslation>(
                "SELECT category_id, locale, name FROM category_translations",
            )
            .fetch_all(&self.pool)
            .await?;
            Ok(categories
                .into_iter()
                .map(|category| {
                    let translations = translations
                        .iter()
                        .filter(|t| t.category_id == category.id)
                        .cloned()
                        .collect();
                    CategoryDetail {
                        category,
                        translations,
                    }
                })
                .collect())
        }
        .await;
        result.unwrap_or_else(|e| {
            tracing::error!("list_categories_admin error: {:?}", e);
            vec![]
        })
    }

    async fn create_category(&self, payload: CategoryPayload) -> Option<CategoryDetail> {
        let result: Result<CategoryDetail, sqlx::Error> = async {
            let mut tx = self.pool.begin().await?;
            let category = sqlx::query_as::<_, Category>(
                "INSERT INTO categories (id, slug, position, is_active) \
                 VALUES ($1, $2, $3, $4) RETURNING id, slug, position, is_active",
            )
            .bind(Uuid::new_v4())
            .bind(&payload.slug)
            .bind(payload.position)
            .bind(payload.is_active)
            .fetch_one(&mut *tx)
            .await?;
            let mut translations = Vec::with_capacity(2);
            for (locale, input) in [
                (Locale::Az, &payload.translations.az),
                (Locale::En, &payload.translations.en),
            ] {
                let row = sqlx::query_as::<_, CategoryTranslation>(
                    "INSERT INTO category_translations (category_id, locale, name) \
                     VALUES ($1, $2, $3) RETURNING category_id, locale, name",
                )
                .bind(category.id)
                .bind(locale)
                .bind(&input.name)
                .fetch_one(&mut *tx)
                .await?;
                translations.push(row);
            }
            tx.commit().await?;
            Ok(CategoryDetail {
                category,
                translations,
            })
        }
        .await;
        result
            .map_err(|e| tracing::error!("create_category error: {:?}", e))
            .ok()
    }

    async fn update_category(&self, id: Uuid, payload: CategoryPayload) -> Option<CategoryDetail> {
        let result: Result<Option<CategoryDetail>, sqlx::Error> = async {
            let mut tx = self.pool.begin().await?;
            let category = sqlx::query_as::<_, Category>(
                "UPDATE categories SET slug = $2, position = $3, is_active = $4 \
                 WHERE id = $1 RETURNING id, slug, position, is_active",
            )
            .bind(id)
            .bind(&payload.slug)
            .bind(payload.position)
            .bind(payload.is_active)
            .fetch_optional(&mut *tx)
            .await?;
            let Some(category) = category else {
                return Ok(None);
            };
            sqlx::query("DELETE FROM category_translations WHERE category_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            let mut translations = Vec::with_capacity(2);
            for (locale, input) in [
                (Locale::Az, &payload.translations.az),
                (Locale::En, &payload.translations.en),
            ] {
                let row = sqlx::query_as::<_, CategoryTranslation>(
                    "INSERT INTO category_translations (category_id, locale, name) \
                     VALUES ($1, $2, $3) RETURNING category_id, locale, name",
                )
                .bind(id)
                .bind(locale)
                .bind(&input.name)
                .fetch_one(&mut *tx)
                .await?;
                translations.push(row);
            }
            tx.commit().await?;
            Ok(Some(CategoryDetail {
                category,
                translations,
            }))
        }
        .await;
        result.unwrap_or_else(|e| {
            tracing::error!("update_category error: {:?}", e);
            None
        })
    }

    async fn delete_category(&self, id: Uuid) -> bool {
        match sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_category error: {:?}", e);
                false
            }
        }
    }

    // --- Tags ---

    async fn list_tags(&self, locale: Locale) -> Vec<TagView> {
        match sqlx::query_as::<_, TagView>(
            "SELECT t.id, t.slug, COALESCE(tr.name, td.name, '') AS name \
             FROM tags t \
             LEFT JOIN tag_translations tr ON tr.tag_id = t.id AND tr.locale = $1 \
             LEFT JOIN tag_translations td ON td.tag_id = t.id AND td.locale = 'az' \
             WHERE t.is_active = true ORDER BY t.position",
        )
        .bind(locale)
        .fetch_all(&self.pool)
        .await
        {
            Ok(tags) => tags,
            Err(e) => {
                tracing::error!("list_tags error: {:?}", e);
                vec![]
            }
        }
    }

    async fn list_tags_admin(&self) -> Vec<TagDetail> {
        let result: Result<Vec<TagDetail>, sqlx::Error> = async {
            let tags = sqlx::query_as::<_, Tag>(
                "SELECT id, slug, position, is_active FROM tags ORDER BY position",
            )
            .fetch_all(&self.pool)
            .await?;
            let translations = sqlx::query_as::<_, TagTranslation>(
                "SELECT tag_id, locale, name FROM tag_translations",
            )
            .fetch_all(&self.pool)
            .await?;
            Ok(tags
                .into_iter()
                .map(|tag| {
                    let translations = translations
                        .iter()
                        .filter(|t| t.tag_id == tag.id)
                        .cloned()
                        .collect();
                    TagDetail { tag, translations }
                })
                .collect())
        }
        .await;
        result.unwrap_or_else(|e| {
            tracing::error!("list_tags_admin error: {:?}", e);
            vec![]
        })
    }

    async fn create_tag(&self, payload: TagPayload) -> Option<TagDetail> {
        let result: Result<TagDetail, sqlx::Error> = async {
            let mut tx = self.pool.begin().await?;
            let tag = sqlx::query_as::<_, Tag>(
                "INSERT INTO tags (id, slug, position, is_active) VALUES ($1, $2, $3, $4) \
                 RETURNING id, slug, position, is_active",
            )
            .bind(Uuid::new_v4())
            .bind(&payload.slug)
            .bind(payload.position)
            .bind(payload.is_active)
            .fetch_one(&mut *tx)
            .await?;
            let mut translations = Vec::with_capacity(2);
            for (locale, input) in [
                (Locale::Az, &payload.translations.az),
                (Locale::En, &payload.translations.en),
            ] {
                let row = sqlx::query_as::<_, TagTranslation>(
                    "INSERT INTO tag_translations (tag_id, locale, name) \
                     VALUES ($1, $2, $3) RETURNING tag_id, locale, name",
                )
                .bind(tag.id)
                .bind(locale)
                .bind(&input.name)
                .fetch_one(&mut *tx)
                .await?;
                translations.push(row);
            }
            tx.commit().await?;
            Ok(TagDetail { tag, translations })
        }
        .await;
        result
            .map_err(|e| tracing::error!("create_tag error: {:?}", e))
            .ok()
    }

    async fn update_tag(&self, id: Uuid, payload: TagPayload) -> Option<TagDetail> {
        let result: Result<Option<TagDetail>, sqlx::Error> = async {
            let mut tx = self.pool.begin().await?;
            let tag = sqlx::query_as::<_, Tag>(
                "UPDATE tags SET slug = $2, position = $3, is_active = $4 \
                 WHERE id = $1 RETURNING id, slug, position, is_active",
            )
            .bind(id)
            .bind(&payload.slug)
            .bind(payload.position)
            .bind(payload.is_active)
            .fetch_optional(&mut *tx)
            .await?;
            let Some(tag) = tag else {
                return Ok(None);
            };
            sqlx::query("DELETE FROM tag_translations WHERE tag_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            let mut translations = Vec::with_capacity(2);
            for (locale, input) in [
                (Locale::Az, &payload.translations.az),
                (Locale::En, &payload.translations.en),
            ] {
                let row = sqlx::query_as::<_, TagTranslation>(
                    "INSERT INTO tag_translations (tag_id, locale, name) \
                     VALUES ($1, $2, $3) RETURNING tag_id, locale, name",
                )
                .bind(id)
                .bind(locale)
                .bind(&input.name)
                .fetch_one(&mut *tx)
                .await?;
                translations.push(row);
            }
            tx.commit().await?;
            Ok(Some(TagDetail { tag, translations }))
        }
        .await;
        result.unwrap_or_else(|e| {
            tracing::error!("update_tag error: {:?}", e);
            None
        })
    }

    async fn delete_tag(&self, id: Uuid) -> bool {
        match sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_tag error: {:?}", e);
                false
            }
        }
    }

    // --- Pages ---

    async fn list_pages(&self, locale: Locale) -> Vec<PageView> {
        match sqlx::query_as::<_, PageView>(
            "SELECT p.id, COALESCE(tr.slug, td.slug, '') AS slug, \
                    COALESCE(tr.title, td.title, '') AS title, \
                    COALESCE(tr.content, td.content, '') AS content \
             FROM pages p \
             LEFT JOIN page_translations tr ON tr.page_id = p.id AND tr.locale = $1 \
             LEFT JOIN page_translations td ON td.page_id = p.id AND td.locale = 'az' \
             WHERE p.is_active = true ORDER BY p.position",
        )
        .bind(locale)
        .fetch_all(&self.pool)
        .await
        {
            Ok(pages) => pages,
            Err(e) => {
                tracing::error!("list_pages error: {:?}", e);
                vec![]
            }
        }
    }

    async fn page_by_slug(&self, slug: &str, locale: Locale) -> Option<PageView> {
        sqlx::query_as::<_, PageView>(
            "SELECT p.id, COALESCE(tr.slug, td.slug, '') AS slug, \
                    COALESCE(tr.title, td.title, '') AS title, \
                    COALESCE(tr.content, td.content, '') AS content \
             FROM pages p \
             LEFT JOIN page_translations tr ON tr.page_id = p.id AND tr.locale = $1 \
             LEFT JOIN page_translations td ON td.page_id = p.id AND td.locale = 'az' \
             WHERE p.is_active = true AND COALESCE(tr.slug, td.slug) = $2",
        )
        .bind(locale)
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("page_by_slug error: {:?}", e);
            None
        })
    }

    async fn list_pages_admin(&self) -> Vec<PageDetail> {
        let result: Result<Vec<PageDetail>, sqlx::Error> = async {
            let pages = sqlx::query_as::<_, Page>(
                "SELECT id, slug, position, is_active FROM pages ORDER BY position",
            )
            .fetch_all(&self.pool)
            .await?;
            let translations = sqlx::query_as::<_, PageTranslation>(
                "SELECT page_id, locale, title, slug, content FROM page_translations",
            )
            .fetch_all(&self.pool)
            .await?;
            Ok(pages
                .into_iter()
                .map(|page| {
                    let translations = translations
                        .iter()
                        .filter(|t| t.page_id == page.id)
                        .cloned()
                        .collect();
                    PageDetail { page, translations }
                })
                .collect())
        }
        .await;
        result.unwrap_or_else(|e| {
            tracing::error!("list_pages_admin error: {:?}", e);
            vec![]
        })
    }

    async fn create_page(&self, payload: PagePayload) -> Option<PageDetail> {
        let result: Result<PageDetail, sqlx::Error> = async {
            let mut tx = self.pool.begin().await?;
            let page = sqlx::query_as::<_, Page>(
                "INSERT INTO pages (id, slug, position, is_active) VALUES ($1, $2, $3, $4) \
                 RETURNING id, slug, position, is_active",
            )
            .bind(Uuid::new_v4())
            .bind(&payload.slug)
            .bind(payload.position)
            .bind(payload.is_active)
            .fetch_one(&mut *tx)
            .await?;
            let mut translations = Vec::with_capacity(2);
            for (locale, input) in [
                (Locale::Az, &payload.translations.az),
                (Locale::En, &payload.translations.en),
            ] {
                let row = sqlx::query_as::<_, PageTranslation>(
                    "INSERT INTO page_translations (page_id, locale, title, slug, content) \
                     VALUES ($1, $2, $3, $4, $5) \
                     RETURNING page_id, locale, title, slug, content",
                )
                .bind(page.id)
                .bind(locale)
                .bind(&input.title)
                .bind(&input.slug)
                .bind(&input.content)
                .fetch_one(&mut *tx)
                .await?;
                translations.push(row);
            }
            tx.commit().await?;
            Ok(PageDetail { page, translations })
        }
        .await;
        result
            .map_err(|e| tracing::error!("create_page error: {:?}", e))
            .ok()
    }

    async fn update_page(&self, id: Uuid, payload: PagePayload) -> Option<PageDetail> {
        let result: Result<Option<PageDetail>, sqlx::Error> = async {
            let mut tx = self.pool.begin().await?;
            let page = sqlx::query_as::<_, Page>(
                "UPDATE pages SET slug = $2, position = $3, is_active = $4 \
                 WHERE id = $1 RETURNING id, slug, position, is_active",
            )
            .bind(id)
            .bind(&payload.slug)
            .bind(payload.position)
            .bind(payload.is_active)
            .fetch_optional(&mut *tx)
            .await?;
            let Some(page) = page else {
                return Ok(None);
            };
            sqlx::query("DELETE FROM page_translations WHERE page_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            let mut translations = Vec::with_capacity(2);
            for (locale, input) in [
                (Locale::Az, &payload.translations.az),
                (Locale::En, &payload.translations.en),
            ] {
                let row = sqlx::query_as::<_, PageTranslation>(
                    "INSERT INTO page_translations (page_id, locale, title, slug, content) \
                     VALUES ($1, $2, $3, $4, $5) \
                     RETURNING page_id, locale, title, slug, content",
                )
                .bind(id)
                .bind(locale)
                .bind(&input.title)
                .bind(&input.slug)
                .bind(&input.content)
                .fetch_one(&mut *tx)
                .await?;
                translations.push(row);
            }
            tx.commit().await?;
            Ok(Some(PageDetail { page, translations }))
        }
        .await;
        result.unwrap_or_else(|e| {
            tracing::error!("update_page error: {:?}", e);
            None
        })
    }

    async fn delete_page(&self, id: Uuid) -> bool {
        match sqlx::query("DELETE FROM pages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_page error: {:?}", e);
                false
            }
        }
    }

    // --- Menus ---

    async fn menu_tree(&self, locale: Locale) -> Vec<MenuItem> {
        let result: Result<Vec<MenuItem>, sqlx::Error> = async {
            let menus = sqlx::query_as::<_, Menu>(
                "SELECT id, parent_id, kind, target_id, position, is_active \
                 FROM menus WHERE is_active = true ORDER BY position",
            )
            .fetch_all(&self.pool)
            .await?;
            let menu_ids: Vec<Uuid> = menus.iter().map(|m| m.id).collect();
            let translations = sqlx::query_as::<_, MenuTranslation>(
                "SELECT menu_id, locale, label, url FROM menu_translations \
                 WHERE menu_id = ANY($1)",
            )
            .bind(&menu_ids)
            .fetch_all(&self.pool)
            .await?;

            let category_ids: Vec<Uuid> = menus
                .iter()
                .filter(|m| m.kind == MenuKind::Category)
                .filter_map(|m| m.target_id)
                .collect();
            let category_slugs: HashMap<Uuid, String> = sqlx::query_as::<_, (Uuid, String)>(
                "SELECT id, slug FROM categories WHERE id = ANY($1)",
            )
            .bind(&category_ids)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .collect();

            let page_ids: Vec<Uuid> = menus
                .iter()
                .filter(|m| m.kind == MenuKind::Page)
                .filter_map(|m| m.target_id)
                .collect();
            let page_translations = sqlx::query_as::<_, PageTranslation>(
                "SELECT page_id, locale, title, slug, content FROM page_translations \
                 WHERE page_id = ANY($1)",
            )
            .bind(&page_ids)
            .fetch_all(&self.pool)
            .await?;

            Ok(build_menu_tree(
                &menus,
                &translations,
                &category_slugs,
                &page_translations,
                locale,
            ))
        }
        .await;
        result.unwrap_or_else(|e| {
            tracing::error!("menu_tree error: {:?}", e);
            vec![]
        })
    }

    async fn list_menus_admin(&self) -> Vec<MenuDetail> {
        let result: Result<Vec<MenuDetail>, sqlx::Error> = async {
            let menus = sqlx::query_as::<_, Menu>(
                "SELECT id, parent_id, kind, target_id, position, is_active \
                 FROM menus ORDER BY position",
            )
            .fetch_all(&self.pool)
            .await?;
            let translations = sqlx::query_as::<_, MenuTranslation>(
                "SELECT menu_id, locale, label, url FROM menu_translations",
            )
            .fetch_all(&self.pool)
            .await?;
            Ok(menus
                .into_iter()
                .map(|menu| {
                    let translations = translations
                        .iter()
                        .filter(|t| t.menu_id == menu.id)
                        .cloned()
                        .collect();
                    MenuDetail { menu, translations }
                })
                .collect())
        }
        .await;
        result.unwrap_or_else(|e| {
            tracing::error!("list_menus_admin error: {:?}", e);
            vec![]
        })
    }

    async fn create_menu(&self, payload: MenuPayload) -> Option<MenuDetail> {
        let result: Result<MenuDetail, sqlx::Error> = async {
            let mut tx = self.pool.begin().await?;
            let menu = sqlx::query_as::<_, Menu>(
                "INSERT INTO menus (id, parent_id, kind, target_id, position, is_active) \
                 VALUES ($1, $2, $3, $4, $5, $6) \
                 RETURNING id, parent_id, kind, target_id, position, is_active",
            )
            .bind(Uuid::new_v4())
            .bind(payload.parent_id)
            .bind(payload.kind)
            .bind(payload.target_id)
            .bind(payload.position)
            .bind(payload.is_active)
            .fetch_one(&mut *tx)
            .await?;
            let mut translations = Vec::with_capacity(2);
            for (locale, input) in [
                (Locale::Az, &payload.translations.az),
                (Locale::En, &payload.translations.en),
            ] {
                let row = sqlx::query_as::<_, MenuTranslation>(
                    "INSERT INTO menu_translations (menu_id, locale, label, url) \
                     VALUES ($1, $2, $3, $4) RETURNING menu_id, locale, label, url",
                )
                .bind(menu.id)
                .bind(locale)
                .bind(&input.label)
                .bind(&input.url)
                .fetch_one(&mut *tx)
                .await?;
                translations.push(row);
            }
            tx.commit().await?;
            Ok(MenuDetail { menu, translations })
        }
        .await;
        result
            .map_err(|e| tracing::error!("create_menu error: {:?}", e))
            .ok()
    }

    async fn update_menu(&self, id: Uuid, payload: MenuPayload) -> Option<MenuDetail> {
        let result: Result<Option<MenuDetail>, sqlx::Error> = async {
            let mut tx = self.pool.begin().await?;
            let menu = sqlx::query_as::<_, Menu>(
                "UPDATE menus SET parent_id = $2, kind = $3, target_id = $4, position = $5, \
                 is_active = $6 WHERE id = $1 \
                 RETURNING id, parent_id, kind, target_id, position, is_active",
            )
            .bind(id)
            .bind(payload.parent_id)
            .bind(payload.kind)
            .bind(payload.target_id)
            .bind(payload.position)
            .bind(payload.is_active)
            .fetch_optional(&mut *tx)
            .await?;
            let Some(menu) = menu else {
                return Ok(None);
            };
            sqlx::query("DELETE FROM menu_translations WHERE menu_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            let mut translations = Vec::with_capacity(2);
            for (locale, input) in [
                (Locale::Az, &payload.translations.az),
                (Locale::En, &payload.translations.en),
            ] {
                let row = sqlx::query_as::<_, MenuTranslation>(
                    "INSERT INTO menu_translations (menu_id, locale, label, url) \
                     VALUES ($1, $2, $3, $4) RETURNING menu_id, locale, label, url",
                )
                .bind(id)
                .bind(locale)
                .bind(&input.label)
                .bind(&input.url)
                .fetch_one(&mut *tx)
                .await?;
                translations.push(row);
            }
            tx.commit().await?;
            Ok(Some(MenuDetail { menu, translations }))
        }
        .await;
        result.unwrap_or_else(|e| {
            tracing::error!("update_menu error: {:?}", e);
            None
        })
    }

    async fn delete_menu(&self, id: Uuid) -> bool {
        match sqlx::query("DELETE FROM menus WHERE id = $1 OR parent_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_menu error: {:?}", e);
                false
            }
        }
    }

    // --- Advertisements ---

    async fn ads_by_placement(&self, placement: &str, locale: Locale) -> Vec<AdView> {
        match sqlx::query_as::<_, AdView>(
            "SELECT a.id, a.kind, \
                    COALESCE(tr.image_url, td.image_url) AS image_url, \
                    COALESCE(tr.link_url, td.link_url) AS link_url, \
                    COALESCE(tr.html, td.html) AS html \
             FROM advertisements a \
             LEFT JOIN advertisement_translations tr \
                 ON tr.advertisement_id = a.id AND tr.locale = $1 \
             LEFT JOIN advertisement_translations td \
                 ON td.advertisement_id = a.id AND td.locale = 'az' \
             WHERE a.is_active = true AND a.placement = $2 ORDER BY a.position",
        )
        .bind(locale)
        .bind(placement)
        .fetch_all(&self.pool)
        .await
        {
            Ok(ads) => ads,
            Err(e) => {
                tracing::error!("ads_by_placement error: {:?}", e);
                vec![]
            }
        }
    }

    async fn list_ads_admin(&self) -> Vec<AdvertisementDetail> {
        let result: Result<Vec<AdvertisementDetail>, sqlx::Error> = async {
            let ads = sqlx::query_as::<_, Advertisement>(
                "SELECT id, kind, placement, position, is_active \
                 FROM advertisements ORDER BY placement, position",
            )
            .fetch_all(&self.pool)
            .await?;
            let translations = sqlx::query_as::<_, AdvertisementTranslation>(
                "SELECT advertisement_id, locale, image_url, link_url, html \
                 FROM advertisement_translations",
            )
            .fetch_all(&self.pool)
            .await?;
            Ok(ads
                .into_iter()
                .map(|advertisement| {
                    let translations = translations
                        .iter()
                        .filter(|t| t.advertisement_id == advertisement.id)
                        .cloned()
                        .collect();
                    AdvertisementDetail {
                        advertisement,
                        translations,
                    }
                })
                .collect())
        }
        .await;
        result.unwrap_or_else(|e| {
            tracing::error!("list_ads_admin error: {:?}", e);
            vec![]
        })
    }

    async fn create_ad(&self, payload: AdvertisementPayload) -> Option<AdvertisementDetail> {
        let result: Result<AdvertisementDetail, sqlx::Error> = async {
            let mut tx = self.pool.begin().await?;
            let advertisement = sqlx::query_as::<_, Advertisement>(
                "INSERT INTO advertisements (id, kind, placement, position, is_active) \
                 VALUES ($1, $2, $3, $4, $5) \
                 RETURNING id, kind, placement, position, is_active",
            )
            .bind(Uuid::new_v4())
            .bind(payload.kind)
            .bind(&payload.placement)
            .bind(payload.position)
            .bind(payload.is_active)
            .fetch_one(&mut *tx)
            .await?;
            let mut translations = Vec::new();
            if let Some(inputs) = &payload.translations {
                for (locale, input) in [(Locale::Az, &inputs.az), (Locale::En, &inputs.en)] {
                    let row = sqlx::query_as::<_, AdvertisementTranslation>(
                        "INSERT INTO advertisement_translations \
                         (advertisement_id, locale, image_url, link_url, html) \
                         VALUES ($1, $2, $3, $4, $5) \
                         RETURNING advertisement_id, locale, image_url, link_url, html",
                    )
                    .bind(advertisement.id)
                    .bind(locale)
                    .bind(&input.image_url)
                    .bind(&input.link_url)
                    .bind(&input.html)
                    .fetch_one(&mut *tx)
                    .await?;
                    translations.push(row);
                }
            }
            tx.commit().await?;
            Ok(AdvertisementDetail {
                advertisement,
                translations,
            })
        }
        .await;
        result
            .map_err(|e| tracing::error!("create_ad error: {:?}", e))
            .ok()
    }

    async fn update_ad(
        &self,
        id: Uuid,
        payload: AdvertisementPayload,
    ) -> Option<AdvertisementDetail> {
        let result: Result<Option<AdvertisementDetail>, sqlx::Error> = async {
            let mut tx = self.pool.begin().await?;
            let advertisement = sqlx::query_as::<_, Advertisement>(
                "UPDATE advertisements SET kind = $2, placement = $3, position = $4, \
                 is_active = $5 WHERE id = $1 \
                 RETURNING id, kind, placement, position, is_active",
            )
            .bind(id)
            .bind(payload.kind)
            .bind(&payload.placement)
            .bind(payload.position)
            .bind(payload.is_active)
            .fetch_optional(&mut *tx)
            .await?;
            let Some(advertisement) = advertisement else {
                return Ok(None);
            };
            sqlx::query("DELETE FROM advertisement_translations WHERE advertisement_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            let mut translations = Vec::new();
            if let Some(inputs) = &payload.translations {
                for (locale, input) in [(Locale::Az, &inputs.az), (Locale::En, &inputs.en)] {
                    let row = sqlx::query_as::<_, AdvertisementTranslation>(
                        "INSERT INTO advertisement_translations \
                         (advertisement_id, locale, image_url, link_url, html) \
                         VALUES ($1, $2, $3, $4, $5) \
                         RETURNING advertisement_id, locale, image_url, link_url, html",
                    )
                    .bind(id)
                    .bind(locale)
                    .bind(&input.image_url)
                    .bind(&input.link_url)
                    .bind(&input.html)
                    .fetch_one(&mut *tx)
                    .await?;
                    translations.push(row);
                }
            }
            tx.commit().await?;
            Ok(Some(AdvertisementDetail {
                advertisement,
                translations,
            }))
        }
        .await;
        result.unwrap_or_else(|e| {
            tracing::error!("update_ad error: {:?}", e);
            None
        })
    }

    async fn delete_ad(&self, id: Uuid) -> bool {
        match sqlx::query("DELETE FROM advertisements WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_ad error: {:?}", e);
                false
            }
        }
    }
}

/// Assembles the localized navigation tree (one level of nesting) with
/// derived URLs. Pure; shared by the Postgres repository and the tests'
/// mock.
pub fn build_menu_tree(
    menus: &[Menu],
    translations: &[MenuTranslation],
    category_slugs: &HashMap<Uuid, String>,
    page_translations: &[PageTranslation],
    locale: Locale,
) -> Vec<MenuItem> {
    let resolve = |menu: &Menu| -> MenuItem {
        let own: Vec<MenuTranslation> = translations
            .iter()
            .filter(|t| t.menu_id == menu.id)
            .cloned()
            .collect();
        let translation = pick_translation(&own, locale);
        let label = translation.map(|t| t.label.clone()).unwrap_or_default();
        let custom_url = translation.and_then(|t| t.url.as_deref());

        let category_slug = menu
            .target_id
            .and_then(|id| category_slugs.get(&id))
            .map(String::as_str);
        let page_rows: Vec<PageTranslation> = menu
            .target_id
            .map(|id| {
                page_translations
                    .iter()
                    .filter(|t| t.page_id == id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        let page_slug = pick_translation(&page_rows, locale).map(|t| t.slug.as_str());

        MenuItem {
            id: menu.id,
            label,
            url: crate::models::derive_menu_url(
                menu.kind,
                locale,
                custom_url,
                category_slug,
                page_slug,
            ),
            children: vec![],
        }
    };

    menus
        .iter()
        .filter(|menu| menu.parent_id.is_none())
        .map(|parent| {
            let mut item = resolve(parent);
            item.children = menus
                .iter()
                .filter(|child| child.parent_id == Some(parent.id))
                .map(resolve)
                .collect();
            item
        })
        .collect()
}
