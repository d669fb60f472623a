//! In-memory site cache with TTL
//!
//! Caches host-to-site lookups (including negative results) so the site
//! directory is not hit on every request.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use sitegate_shared::{Site, SiteId};

/// Default cache TTL (5 minutes)
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Cache entry with expiration. `None` records a host with no site.
struct CacheEntry {
    site: Option<Arc<Site>>,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(site: Option<Arc<Site>>, ttl: Duration) -> Self {
        Self {
            site,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }
}

/// Thread-safe host-to-site cache.
pub struct SiteCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl Default for SiteCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_CACHE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Cached result for a normalized host.
    ///
    /// `Some(Some(site))` is a positive hit, `Some(None)` a cached miss,
    /// `None` means the host is unknown to the cache (or expired).
    pub fn get(&self, host: &str) -> Option<Option<Arc<Site>>> {
        let entries = self.entries.read().ok()?;
        let entry = entries.get(host)?;

        if entry.is_expired() {
            None
        } else {
            Some(entry.site.clone())
        }
    }

    pub fn set(&self, host: &str, site: Option<Arc<Site>>) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(host.to_string(), CacheEntry::new(site, self.ttl));
        }
    }

    /// Drop the entry for a specific host.
    pub fn invalidate(&self, host: &str) {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(host);
        }
    }

    /// Drop every host cached for a site (after its domains change).
    pub fn invalidate_site(&self, site_id: SiteId) {
        if let Ok(mut entries) = self.entries.write() {
            entries.retain(|_, entry| {
                entry.site.as_ref().map(|s| s.id) != Some(site_id)
            });
        }
    }

    /// Clear expired entries (call periodically for memory management)
    pub fn cleanup(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.retain(|_, entry| !entry.is_expired());
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sitegate_shared::SiteId;
    use std::thread::sleep;

    fn site(host: &str) -> Arc<Site> {
        Arc::new(Site {
            id: SiteId::new(),
            domains: vec![host.to_string()],
            root_path: "/sites/test".to_string(),
            main_domain: host.to_string(),
            redirect_to_main_domain: false,
        })
    }

    #[test]
    fn test_cache_get_set() {
        let cache = SiteCache::new();
        let s = site("shop.example.com");

        assert!(cache.get("shop.example.com").is_none());

        cache.set("shop.example.com", Some(s.clone()));
        let hit = cache.get("shop.example.com").unwrap().unwrap();
        assert_eq!(hit.id, s.id);
    }

    #[test]
    fn test_cache_negative() {
        let cache = SiteCache::new();

        cache.set("unknown.example.com", None);
        assert!(matches!(cache.get("unknown.example.com"), Some(None)));
    }

    #[test]
    fn test_cache_expiration() {
        let cache = SiteCache::with_ttl(Duration::from_millis(50));
        cache.set("shop.example.com", Some(site("shop.example.com")));
        assert!(cache.get("shop.example.com").is_some());

        sleep(Duration::from_millis(60));
        assert!(cache.get("shop.example.com").is_none());
    }

    #[test]
    fn test_cache_invalidate_site() {
        let cache = SiteCache::new();
        let a = site("a.example.com");
        let b = site("b.example.com");

        cache.set("a.example.com", Some(a.clone()));
        cache.set("a-alias.example.com", Some(a.clone()));
        cache.set("b.example.com", Some(b.clone()));
        cache.set("gone.example.com", None);

        cache.invalidate_site(a.id);

        assert!(cache.get("a.example.com").is_none());
        assert!(cache.get("a-alias.example.com").is_none());
        assert!(cache.get("b.example.com").is_some());
        // Negative entries belong to no site and survive
        assert!(matches!(cache.get("gone.example.com"), Some(None)));
    }

    #[test]
    fn test_cleanup_drops_expired() {
        let cache = SiteCache::with_ttl(Duration::from_millis(10));
        cache.set("x.example.com", None);
        sleep(Duration::from_millis(20));
        cache.cleanup();
        assert!(cache.get("x.example.com").is_none());
    }
}
