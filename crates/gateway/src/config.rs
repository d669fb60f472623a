//! Application configuration

use std::env;

use crate::registry::{AuditSinkKind, RegistryError, SiteBackendKind};

/// Form field whose mere presence (any value) suppresses a host redirect.
pub const DISABLE_HOST_REDIRECT_FIELD: &str = "disable_host_redirect";

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub bind_address: String,
    /// Path prefix the gateway is mounted under, preserved in redirect URLs.
    pub base_path: String,

    // Site directory
    pub site_backend: SiteBackendKind,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub sites_file: Option<String>,
    pub site_cache_ttl_secs: u64,

    // Request classification
    pub admin_path_prefixes: Vec<String>,

    // Canonical-host redirect (global fallback when no site is bound)
    pub redirect_to_main_domain: bool,
    pub main_domain: Option<String>,

    // Redirect audit
    pub audit_sink: AuditSinkKind,
    pub redirect_log_path: Option<String>,
    pub anonymize_client_ip: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Subsystem keys and their required settings are validated here, at
    /// load time; a bad key never survives to first use.
    pub fn from_env() -> Result<Self, ConfigError> {
        let site_backend: SiteBackendKind = env::var("SITE_BACKEND")
            .unwrap_or_else(|_| "postgres".to_string())
            .parse()?;
        let audit_sink: AuditSinkKind = env::var("AUDIT_SINK")
            .unwrap_or_else(|_| "tracing".to_string())
            .parse()?;

        let database_url = env::var("DATABASE_URL").ok();
        let sites_file = env::var("SITES_FILE").ok();
        let redirect_log_path = env::var("REDIRECT_LOG_PATH").ok();

        if site_backend == SiteBackendKind::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }
        if site_backend == SiteBackendKind::Fixture && sites_file.is_none() {
            return Err(ConfigError::Missing("SITES_FILE"));
        }
        if audit_sink == AuditSinkKind::File && redirect_log_path.is_none() {
            return Err(ConfigError::Missing("REDIRECT_LOG_PATH"));
        }

        Ok(Self {
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            base_path: env::var("BASE_PATH").unwrap_or_default(),

            site_backend,
            database_url,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            sites_file,
            site_cache_ttl_secs: env::var("SITE_CACHE_TTL_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .unwrap_or(300),

            admin_path_prefixes: env::var("ADMIN_PATH_PREFIXES")
                .unwrap_or_else(|_| "/admin".to_string())
                .split(',')
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect(),

            redirect_to_main_domain: env::var("REDIRECT_TO_MAIN_DOMAIN")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            main_domain: env::var("MAIN_DOMAIN").ok().filter(|d| !d.is_empty()),

            audit_sink,
            redirect_log_path,
            anonymize_client_ip: env::var("ANONYMIZE_CLIENT_IP")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
        })
    }
}

#[cfg(test)]
impl Config {
    /// Minimal fixture-backed configuration for unit tests.
    pub fn for_tests() -> Self {
        Self {
            bind_address: "127.0.0.1:0".to_string(),
            base_path: String::new(),
            site_backend: SiteBackendKind::Fixture,
            database_url: None,
            database_max_connections: 2,
            sites_file: None,
            site_cache_ttl_secs: 300,
            admin_path_prefixes: vec!["/admin".to_string()],
            redirect_to_main_domain: false,
            main_domain: None,
            audit_sink: AuditSinkKind::Tracing,
            redirect_log_path: None,
            anonymize_client_ip: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
