//! Sitegate Gateway Library
//!
//! This crate contains the edge gateway components for sitegate: host-based
//! site resolution, canonical-host redirects, and the subsystem registry.

pub mod audit;
pub mod config;
pub mod error;
pub mod registry;
pub mod routes;
pub mod routing;
pub mod sites;
pub mod state;

pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use routing::{RequestClassifier, SiteCache, SiteContext, SiteResolver};
pub use state::AppState;
