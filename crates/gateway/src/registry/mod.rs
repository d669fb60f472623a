//! Subsystem registry
//!
//! Wires the gateway's pluggable subsystems (site backend, audit sink) from
//! configuration. Keys map to a fixed set of statically known constructors,
//! each satisfying its capability trait by construction; unknown keys are
//! rejected when configuration is loaded, not on first use.
//!
//! Subsystems are built lazily and memoized: at most one instance per
//! process, with concurrent first use serialized by an init lock.

use std::str::FromStr;
use std::sync::{Arc, Mutex, OnceLock};

use sqlx::PgPool;

use crate::audit::{AuditSink, FileAuditSink, TracingAuditSink};
use crate::config::Config;
use crate::sites::{FixtureSiteBackend, PgSiteBackend, SiteBackend};

/// Errors raised while wiring subsystems.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Unknown {subsystem} implementation: {key:?}")]
    UnknownKey {
        subsystem: &'static str,
        key: String,
    },

    #[error("Subsystem {subsystem} requires {setting} to be configured")]
    MissingSetting {
        subsystem: &'static str,
        setting: &'static str,
    },

    #[error("Failed to initialize {subsystem}: {message}")]
    Init {
        subsystem: &'static str,
        message: String,
    },
}

/// Registered site directory backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteBackendKind {
    Postgres,
    Fixture,
}

impl FromStr for SiteBackendKind {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "postgres" => Ok(Self::Postgres),
            "fixture" => Ok(Self::Fixture),
            other => Err(RegistryError::UnknownKey {
                subsystem: "site backend",
                key: other.to_string(),
            }),
        }
    }
}

/// Registered redirect audit sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditSinkKind {
    Tracing,
    File,
}

impl FromStr for AuditSinkKind {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tracing" => Ok(Self::Tracing),
            "file" => Ok(Self::File),
            other => Err(RegistryError::UnknownKey {
                subsystem: "audit sink",
                key: other.to_string(),
            }),
        }
    }
}

/// Lazily constructed, process-wide subsystem instances.
pub struct SubsystemRegistry {
    config: Arc<Config>,
    pool: Option<PgPool>,
    site_backend: OnceLock<Arc<dyn SiteBackend>>,
    audit_sink: OnceLock<Arc<dyn AuditSink>>,
    // Serializes first-use construction so a subsystem is built at most once.
    init_lock: Mutex<()>,
}

impl SubsystemRegistry {
    /// `pool` must be present when the configured site backend is `postgres`.
    pub fn new(config: Arc<Config>, pool: Option<PgPool>) -> Self {
        Self {
            config,
            pool,
            site_backend: OnceLock::new(),
            audit_sink: OnceLock::new(),
            init_lock: Mutex::new(()),
        }
    }

    /// The configured site backend, built on first use and memoized.
    pub fn site_backend(&self) -> Result<Arc<dyn SiteBackend>, RegistryError> {
        if let Some(backend) = self.site_backend.get() {
            return Ok(backend.clone());
        }

        let _guard = self.init_lock.lock().map_err(|_| RegistryError::Init {
            subsystem: "site backend",
            message: "init lock poisoned".to_string(),
        })?;
        // Another worker may have finished construction while we waited.
        if let Some(backend) = self.site_backend.get() {
            return Ok(backend.clone());
        }

        let backend: Arc<dyn SiteBackend> = match self.config.site_backend {
            SiteBackendKind::Postgres => {
                let pool = self.pool.clone().ok_or(RegistryError::MissingSetting {
                    subsystem: "site backend",
                    setting: "DATABASE_URL",
                })?;
                Arc::new(PgSiteBackend::new(pool))
            }
            SiteBackendKind::Fixture => {
                let path =
                    self.config
                        .sites_file
                        .as_deref()
                        .ok_or(RegistryError::MissingSetting {
                            subsystem: "site backend",
                            setting: "SITES_FILE",
                        })?;
                let backend =
                    FixtureSiteBackend::from_file(path).map_err(|e| RegistryError::Init {
                        subsystem: "site backend",
                        message: e.to_string(),
                    })?;
                Arc::new(backend)
            }
        };

        let _ = self.site_backend.set(backend.clone());
        Ok(backend)
    }

    /// The configured redirect audit sink, built on first use and memoized.
    pub fn audit_sink(&self) -> Result<Arc<dyn AuditSink>, RegistryError> {
        if let Some(sink) = self.audit_sink.get() {
            return Ok(sink.clone());
        }

        let _guard = self.init_lock.lock().map_err(|_| RegistryError::Init {
            subsystem: "audit sink",
            message: "init lock poisoned".to_string(),
        })?;
        if let Some(sink) = self.audit_sink.get() {
            return Ok(sink.clone());
        }

        let sink: Arc<dyn AuditSink> = match self.config.audit_sink {
            AuditSinkKind::Tracing => Arc::new(TracingAuditSink),
            AuditSinkKind::File => {
                let path = self.config.redirect_log_path.as_deref().ok_or(
                    RegistryError::MissingSetting {
                        subsystem: "audit sink",
                        setting: "REDIRECT_LOG_PATH",
                    },
                )?;
                let sink = FileAuditSink::open(path).map_err(|e| RegistryError::Init {
                    subsystem: "audit sink",
                    message: e.to_string(),
                })?;
                Arc::new(sink)
            }
        };

        let _ = self.audit_sink.set(sink.clone());
        Ok(sink)
    }
}
