//! Sitegate gateway entry point

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use sitegate_gateway::registry::{SiteBackendKind, SubsystemRegistry};
use sitegate_gateway::routes::create_router;
use sitegate_gateway::{AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Arc::new(Config::from_env()?);

    let pool = match config.site_backend {
        SiteBackendKind::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required"))?;
            let pool = sitegate_shared::create_pool(url, config.database_max_connections).await?;
            sitegate_shared::run_migrations(&pool).await?;
            Some(pool)
        }
        SiteBackendKind::Fixture => None,
    };

    let registry = SubsystemRegistry::new(config.clone(), pool);
    let state = AppState::from_registry(config.clone(), &registry)?;
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    tracing::info!(address = %config.bind_address, backend = ?config.site_backend, "sitegate listening");

    axum::serve(listener, router).await?;

    Ok(())
}
