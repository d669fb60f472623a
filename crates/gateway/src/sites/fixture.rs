//! JSON-fixture site backend
//!
//! Loads the full site list from a JSON file at startup and serves lookups
//! from memory. Used for local development and tests; the file format is a
//! plain array of `Site` records.

use std::path::Path;

use async_trait::async_trait;

use sitegate_shared::{Site, SiteLookupError};

use super::SiteBackend;

/// In-memory site directory loaded from a fixture file.
pub struct FixtureSiteBackend {
    sites: Vec<Site>,
}

impl FixtureSiteBackend {
    /// Load sites from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SiteLookupError> {
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|e| SiteLookupError::Fixture(format!("read {:?}: {}", path.as_ref(), e)))?;
        let sites: Vec<Site> = serde_json::from_str(&raw)
            .map_err(|e| SiteLookupError::Fixture(format!("parse {:?}: {}", path.as_ref(), e)))?;
        Ok(Self { sites })
    }

    /// Build a backend from an already-constructed site list.
    pub fn from_sites(sites: Vec<Site>) -> Self {
        Self { sites }
    }
}

#[async_trait]
impl SiteBackend for FixtureSiteBackend {
    async fn find_by_domain(&self, host: &str) -> Result<Option<Site>, SiteLookupError> {
        Ok(self.sites.iter().find(|s| s.matches_domain(host)).cloned())
    }

    async fn healthy(&self) -> bool {
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sitegate_shared::SiteId;
    use std::io::Write;

    fn shop_site() -> Site {
        Site {
            id: SiteId::new(),
            domains: vec!["shop.example.com".to_string(), "example.com".to_string()],
            root_path: "/sites/shop".to_string(),
            main_domain: "shop.example.com".to_string(),
            redirect_to_main_domain: true,
        }
    }

    #[tokio::test]
    async fn test_find_by_domain() {
        let backend = FixtureSiteBackend::from_sites(vec![shop_site()]);

        let hit = backend.find_by_domain("example.com").await.unwrap();
        assert_eq!(hit.unwrap().root_path, "/sites/shop");

        let miss = backend.find_by_domain("other.example.com").await.unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = serde_json::to_string(&vec![shop_site()]).unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let backend = FixtureSiteBackend::from_file(file.path()).unwrap();
        let hit = backend.find_by_domain("shop.example.com").await.unwrap();
        assert!(hit.is_some());
    }

    #[tokio::test]
    async fn test_from_file_missing() {
        let err = FixtureSiteBackend::from_file("/nonexistent/sites.json");
        assert!(matches!(err, Err(SiteLookupError::Fixture(_))));
    }
}
