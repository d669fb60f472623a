//! Site directory backends
//!
//! The gateway looks sites up by exact normalized host. Two backends are
//! registered: `postgres` (the production site directory) and `fixture`
//! (an in-memory list loaded from a JSON file, for development and tests).

mod fixture;
mod pg;

pub use fixture::FixtureSiteBackend;
pub use pg::PgSiteBackend;

use async_trait::async_trait;
use sitegate_shared::{Site, SiteLookupError};

/// Capability interface for site lookup.
///
/// `Ok(None)` means the host is bound to no site; `Err` is reserved for
/// infrastructure failures so callers can tell the two apart.
#[async_trait]
pub trait SiteBackend: Send + Sync {
    /// Look up the site whose domain set contains `host` (already normalized).
    async fn find_by_domain(&self, host: &str) -> Result<Option<Site>, SiteLookupError>;

    /// Whether the backend can currently serve lookups (readiness probe).
    async fn healthy(&self) -> bool;
}
