use chrono::{Duration, Utc};
use std::collections::HashMap;
use uuid::Uuid;
use xeber_portal::models::{
    Article, ArticleStatus, ArticleTranslation, Locale, Menu, MenuKind, MenuTranslation,
    PageTranslation, ToggleArticleRequest, derive_menu_url, pick_translation,
};
use xeber_portal::repository::build_menu_tree;

// --- Public visibility rule ---

#[test]
fn published_article_is_visible() {
    let article = Article {
        status: ArticleStatus::Published,
        published_at: Some(Utc::now() - Duration::hours(1)),
        ..Article::default()
    };
    assert!(article.is_publicly_visible(Utc::now()));
}

#[test]
fn draft_article_is_hidden() {
    let article = Article {
        status: ArticleStatus::Draft,
        published_at: Some(Utc::now() - Duration::hours(1)),
        ..Article::default()
    };
    assert!(!article.is_publicly_visible(Utc::now()));
}

#[test]
fn scheduled_article_is_hidden_until_its_time() {
    let now = Utc::now();
    let article = Article {
        status: ArticleStatus::Published,
        published_at: Some(now + Duration::hours(2)),
        ..Article::default()
    };
    assert!(!article.is_publicly_visible(now));
    assert!(article.is_publicly_visible(now + Duration::hours(3)));
}

#[test]
fn soft_deleted_article_is_hidden_even_when_published() {
    let now = Utc::now();
    let article = Article {
        status: ArticleStatus::Published,
        published_at: Some(now - Duration::hours(1)),
        deleted_at: Some(now),
        ..Article::default()
    };
    assert!(!article.is_publicly_visible(now));
}

#[test]
fn published_article_without_timestamp_is_visible() {
    let article = Article {
        status: ArticleStatus::Published,
        published_at: None,
        ..Article::default()
    };
    assert!(article.is_publicly_visible(Utc::now()));
}

// --- Toggle semantics ---

#[test]
fn publishing_stamps_missing_publication_time() {
    let now = Utc::now();
    let mut article = Article::default();
    article.apply_toggle(&ToggleArticleRequest::Status(ArticleStatus::Published), now);
    assert_eq!(article.status, ArticleStatus::Published);
    assert_eq!(article.published_at, Some(now));
    assert_eq!(article.updated_at, now);
}

#[test]
fn republishing_preserves_existing_publication_time() {
    let now = Utc::now();
    let original = now - Duration::days(7);
    let mut article = Article {
        published_at: Some(original),
        ..Article::default()
    };
    article.apply_toggle(&ToggleArticleRequest::Status(ArticleStatus::Published), now);
    assert_eq!(article.published_at, Some(original));
}

#[test]
fn unpublishing_keeps_publication_time() {
    let now = Utc::now();
    let original = now - Duration::days(1);
    let mut article = Article {
        status: ArticleStatus::Published,
        published_at: Some(original),
        ..Article::default()
    };
    article.apply_toggle(&ToggleArticleRequest::Status(ArticleStatus::Draft), now);
    assert_eq!(article.status, ArticleStatus::Draft);
    assert_eq!(article.published_at, Some(original));
}

#[test]
fn flag_toggles_touch_only_their_field() {
    let now = Utc::now();
    let mut article = Article::default();
    article.apply_toggle(&ToggleArticleRequest::Featured(true), now);
    assert!(article.featured);
    assert!(!article.agenda);
    article.apply_toggle(&ToggleArticleRequest::Agenda(true), now);
    assert!(article.agenda);
}

// --- Toggle payload wire format ---

#[test]
fn toggle_payload_deserializes_tagged_form() {
    let toggle: ToggleArticleRequest =
        serde_json::from_str(r#"{"field":"featured","value":true}"#).unwrap();
    assert!(matches!(toggle, ToggleArticleRequest::Featured(true)));

    let toggle: ToggleArticleRequest =
        serde_json::from_str(r#"{"field":"status","value":"published"}"#).unwrap();
    assert!(matches!(
        toggle,
        ToggleArticleRequest::Status(ArticleStatus::Published)
    ));
}

#[test]
fn toggle_payload_rejects_mismatched_value_type() {
    let result: Result<ToggleArticleRequest, _> =
        serde_json::from_str(r#"{"field":"featured","value":"published"}"#);
    assert!(result.is_err());

    let result: Result<ToggleArticleRequest, _> =
        serde_json::from_str(r#"{"field":"views","value":5}"#);
    assert!(result.is_err());
}

// --- Translation fallback ---

fn translation(locale: Locale, title: &str) -> ArticleTranslation {
    ArticleTranslation {
        locale,
        title: title.to_string(),
        ..ArticleTranslation::default()
    }
}

#[test]
fn requested_locale_wins_when_present() {
    let rows = vec![translation(Locale::Az, "Xəbər"), translation(Locale::En, "News")];
    let picked = pick_translation(&rows, Locale::En).unwrap();
    assert_eq!(picked.title, "News");
}

#[test]
fn missing_locale_falls_back_to_default() {
    let rows = vec![translation(Locale::Az, "Xəbər")];
    let picked = pick_translation(&rows, Locale::En).unwrap();
    assert_eq!(picked.title, "Xəbər");
}

#[test]
fn no_rows_yields_none() {
    let rows: Vec<ArticleTranslation> = vec![];
    assert!(pick_translation(&rows, Locale::Az).is_none());
}

// --- Menu URL derivation ---

#[test]
fn custom_menu_uses_stored_url() {
    let url = derive_menu_url(MenuKind::Custom, Locale::Az, Some("https://example.com"), None, None);
    assert_eq!(url, "https://example.com");
}

#[test]
fn custom_menu_without_url_falls_back_to_hash() {
    assert_eq!(derive_menu_url(MenuKind::Custom, Locale::Az, None, None, None), "#");
    assert_eq!(derive_menu_url(MenuKind::Custom, Locale::Az, Some(""), None, None), "#");
}

#[test]
fn category_menu_derives_localized_path() {
    let url = derive_menu_url(MenuKind::Category, Locale::En, None, Some("politics"), None);
    assert_eq!(url, "/en/category/politics");
}

#[test]
fn page_menu_derives_localized_path() {
    let url = derive_menu_url(MenuKind::Page, Locale::Az, None, None, Some("haqqimizda"));
    assert_eq!(url, "/az/page/haqqimizda");
}

#[test]
fn unresolvable_target_falls_back_to_hash() {
    assert_eq!(derive_menu_url(MenuKind::Category, Locale::Az, None, None, None), "#");
    assert_eq!(derive_menu_url(MenuKind::Page, Locale::En, None, None, None), "#");
}

// --- Menu tree assembly ---

#[test]
fn menu_tree_nests_children_and_localizes_labels() {
    let parent_id = Uuid::from_u128(1);
    let child_id = Uuid::from_u128(2);
    let category_id = Uuid::from_u128(10);
    let page_id = Uuid::from_u128(20);

    let menus = vec![
        Menu {
            id: parent_id,
            parent_id: None,
            kind: MenuKind::Category,
            target_id: Some(category_id),
            position: 0,
            is_active: true,
        },
        Menu {
            id: child_id,
            parent_id: Some(parent_id),
            kind: MenuKind::Page,
            target_id: Some(page_id),
            position: 0,
            is_active: true,
        },
    ];
    let translations = vec![
        MenuTranslation {
            menu_id: parent_id,
            locale: Locale::Az,
            label: "Siyasət".to_string(),
            url: None,
        },
        MenuTranslation {
            menu_id: parent_id,
            locale: Locale::En,
            label: "Politics".to_string(),
            url: None,
        },
        MenuTranslation {
            menu_id: child_id,
            locale: Locale::Az,
            label: "Haqqımızda".to_string(),
            url: None,
        },
    ];
    let category_slugs: HashMap<Uuid, String> =
        [(category_id, "politics".to_string())].into_iter().collect();
    let page_translations = vec![PageTranslation {
        page_id,
        locale: Locale::Az,
        title: "Haqqımızda".to_string(),
        slug: "haqqimizda".to_string(),
        content: String::new(),
    }];

    let tree = build_menu_tree(
        &menus,
        &translations,
        &category_slugs,
        &page_translations,
        Locale::En,
    );

    assert_eq!(tree.len(), 1);
    let root = &tree[0];
    assert_eq!(root.label, "Politics");
    assert_eq!(root.url, "/en/category/politics");
    assert_eq!(root.children.len(), 1);
    // The child has no English row anywhere, so both label and page slug
    // fall back to the default locale.
    assert_eq!(root.children[0].label, "Haqqımızda");
    assert_eq!(root.children[0].url, "/en/page/haqqimizda");
}
