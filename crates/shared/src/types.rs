//! Common types used across sitegate

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// =============================================================================
// ID Wrappers
// =============================================================================

/// Site ID wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct SiteId(pub Uuid);

impl SiteId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SiteId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for SiteId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for SiteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// =============================================================================
// Site
// =============================================================================

/// A site in the multi-tenant content tree.
///
/// A site is identified by the set of domains bound to it and mounts a
/// subtree of the content tree at `root_path`. When `redirect_to_main_domain`
/// is set, requests arriving on any bound domain other than `main_domain`
/// are permanently redirected to `main_domain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Site {
    pub id: SiteId,
    /// Domains bound to this site, matched by exact normalized host.
    pub domains: Vec<String>,
    /// Mount point of the site within the content tree, e.g. "/sites/shop".
    pub root_path: String,
    /// Canonical domain for this site.
    pub main_domain: String,
    /// Redirect non-canonical hosts to `main_domain`.
    pub redirect_to_main_domain: bool,
}

impl Site {
    /// Whether `host` (already normalized) is one of this site's bound domains.
    pub fn matches_domain(&self, host: &str) -> bool {
        self.domains.iter().any(|d| d == host)
    }
}

/// Failure while looking a site up by domain.
///
/// "Not found" is NOT an error: backends return `Ok(None)` for an unknown
/// host so callers and tests can tell a miss from an infrastructure failure.
#[derive(Debug, thiserror::Error)]
pub enum SiteLookupError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Site fixture error: {0}")]
    Fixture(String),
}
