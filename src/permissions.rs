use std::collections::HashSet;

use crate::{error::ApiError, repository::RepositoryState};

/// Role key granted the full catalog implicitly.
pub const ADMIN_ROLE: &str = "admin";

/// Effective permission set of a request, resolved fresh from the database
/// on every request. Flat keys, no hierarchy, no caching.
#[derive(Debug, Clone, Default)]
pub struct PermissionSet {
    admin: bool,
    keys: HashSet<String>,
}

impl PermissionSet {
    /// Superuser set; every check is true.
    pub fn admin() -> Self {
        Self {
            admin: true,
            keys: HashSet::new(),
        }
    }

    pub fn from_keys(keys: impl IntoIterator<Item = String>) -> Self {
        Self {
            admin: false,
            keys: keys.into_iter().collect(),
        }
    }

    /// Resolves the set for a role key.
    ///
    /// The `admin` sentinel short-circuits to the superuser set; any other
    /// key is looked up against `roles.key`, and an unknown key resolves to
    /// the empty set (fail-closed).
    pub async fn resolve(repo: &RepositoryState, role_key: &str) -> Self {
        if role_key == ADMIN_ROLE {
            return Self::admin();
        }
        Self::from_keys(repo.resolve_permission_keys(role_key).await)
    }

    pub fn is_admin(&self) -> bool {
        self.admin
    }

    pub fn has(&self, key: &str) -> bool {
        self.admin || self.keys.contains(key)
    }

    pub fn has_any(&self, keys: &[&str]) -> bool {
        self.admin || keys.iter().any(|key| self.keys.contains(*key))
    }

    pub fn has_all(&self, keys: &[&str]) -> bool {
        self.admin || keys.iter().all(|key| self.keys.contains(*key))
    }

    /// Guard used by handlers; authorization failures are always a bare 401.
    pub fn require(&self, key: &str) -> Result<(), ApiError> {
        if self.has(key) {
            Ok(())
        } else {
            Err(ApiError::unauthorized())
        }
    }

    /// Guard for admin-only surfaces (user/role/permission management).
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.admin {
            Ok(())
        } else {
            Err(ApiError::unauthorized())
        }
    }
}
