pub mod access;
pub mod articles;
pub mod content;

use serde::Deserialize;
use utoipa::IntoParams;

use crate::models::{ArticleStatus, Locale};

pub const DEFAULT_LIST_LIMIT: i64 = 20;
pub const MAX_LIST_LIMIT: i64 = 100;

/// Shared `?locale=` query parameter; defaults to the primary locale.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct LocaleQuery {
    pub locale: Option<Locale>,
}

/// `?locale=&limit=` pair used by the public listing endpoints.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListQuery {
    pub locale: Option<Locale>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchQuery {
    pub q: String,
    pub locale: Option<Locale>,
    pub limit: Option<i64>,
}

/// `?position=` names the placement slot; `?locale=` localizes creatives.
#[derive(Debug, Deserialize, IntoParams)]
pub struct PlacementQuery {
    pub position: String,
    pub locale: Option<Locale>,
}

/// Optional back-office filters on the admin article listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ArticleAdminQuery {
    pub status: Option<ArticleStatus>,
    pub search: Option<String>,
}

pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT)
}
