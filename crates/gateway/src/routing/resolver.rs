//! Host-to-Site Resolution
//!
//! Resolves the incoming Host header to a site and rewrites the effective
//! content path to be relative to that site's root. Lookup failures never
//! fail the request: an unmatched or unresolvable host simply leaves the
//! request unbound.

use std::sync::Arc;
use std::time::Duration;

use percent_encoding::percent_decode_str;

use sitegate_shared::Site;

use super::SiteCache;
use crate::sites::SiteBackend;

/// Per-request site binding, stored as a request extension.
///
/// A request carries at most one of these: the resolved site (if any) and
/// the effective path within the content tree.
#[derive(Clone)]
pub struct SiteContext {
    pub site: Option<Arc<Site>>,
    /// Site root path + decoded request path, or the decoded request path
    /// when no site is bound.
    pub site_path: String,
}

/// Site resolver with caching.
#[derive(Clone)]
pub struct SiteResolver {
    backend: Arc<dyn SiteBackend>,
    cache: Arc<SiteCache>,
}

impl SiteResolver {
    pub fn new(backend: Arc<dyn SiteBackend>, cache_ttl: Duration) -> Self {
        Self {
            backend,
            cache: Arc::new(SiteCache::with_ttl(cache_ttl)),
        }
    }

    /// Resolve a request's host and raw path to a site binding.
    ///
    /// The effective path is the site's root path concatenated with the
    /// URL-decoded request path; without a site it is the decoded path
    /// unchanged.
    pub async fn resolve(&self, host: &str, raw_path: &str) -> SiteContext {
        let path = decode_path(raw_path);

        match self.lookup(host).await {
            Some(site) => {
                let site_path = format!("{}{}", site.root_path, path);
                SiteContext {
                    site: Some(site),
                    site_path,
                }
            }
            None => SiteContext {
                site: None,
                site_path: path,
            },
        }
    }

    /// Cached host lookup. Backend errors are swallowed here: the backend
    /// has already logged the cause, and an infrastructure failure must
    /// degrade to "no site", never to a failed request.
    async fn lookup(&self, host: &str) -> Option<Arc<Site>> {
        let host = normalize_host(host);

        if let Some(cached) = self.cache.get(&host) {
            return cached;
        }

        match self.backend.find_by_domain(&host).await {
            Ok(Some(site)) => {
                let site = Arc::new(site);
                self.cache.set(&host, Some(site.clone()));
                Some(site)
            }
            Ok(None) => {
                self.cache.set(&host, None);
                None
            }
            // Transient failures are not cached; the next request retries.
            Err(_) => None,
        }
    }

    pub async fn backend_healthy(&self) -> bool {
        self.backend.healthy().await
    }

    pub fn cache(&self) -> &SiteCache {
        &self.cache
    }
}

/// Normalize a host header value: strip the port, lowercase.
pub fn normalize_host(host: &str) -> String {
    let host = host.split(':').next().unwrap_or(host);
    host.to_lowercase()
}

/// URL-decode a raw request path.
fn decode_path(raw_path: &str) -> String {
    percent_decode_str(raw_path).decode_utf8_lossy().into_owned()
}
