//! Shared application state

use std::sync::Arc;
use std::time::Duration;

use crate::audit::AuditSink;
use crate::config::Config;
use crate::registry::{RegistryError, SubsystemRegistry};
use crate::routing::{RequestClassifier, SiteResolver};

/// State shared by all request handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub resolver: SiteResolver,
    pub classifier: RequestClassifier,
    pub audit: Arc<dyn AuditSink>,
}

impl AppState {
    /// Build the state from configured subsystems.
    pub fn from_registry(
        config: Arc<Config>,
        registry: &SubsystemRegistry,
    ) -> Result<Self, RegistryError> {
        let resolver = SiteResolver::new(
            registry.site_backend()?,
            Duration::from_secs(config.site_cache_ttl_secs),
        );
        let classifier = RequestClassifier::new(config.admin_path_prefixes.clone());
        let audit = registry.audit_sink()?;

        Ok(Self {
            config,
            resolver,
            classifier,
            audit,
        })
    }
}

#[cfg(test)]
impl AppState {
    /// Fixture-backed state for unit tests.
    pub fn for_tests(sites: Vec<sitegate_shared::Site>, config: Config) -> Self {
        use crate::audit::TracingAuditSink;
        use crate::sites::FixtureSiteBackend;

        let config = Arc::new(config);
        let resolver = SiteResolver::new(
            Arc::new(FixtureSiteBackend::from_sites(sites)),
            Duration::from_secs(config.site_cache_ttl_secs),
        );
        let classifier = RequestClassifier::new(config.admin_path_prefixes.clone());

        Self {
            config,
            resolver,
            classifier,
            audit: Arc::new(TracingAuditSink),
        }
    }
}
