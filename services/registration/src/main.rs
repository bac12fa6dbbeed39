use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod error;
mod models;
mod routes;
mod service;
mod settings;
mod state;
mod validation;

use common::{KeyValueStore, MemoryStore, RedisConfig, RedisPool};

use crate::{
    service::RegistrationService,
    settings::{Settings, StoreBackend},
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting registration service");

    let settings = Settings::load()?;

    let store: Arc<dyn KeyValueStore> = match settings.store_backend {
        StoreBackend::Redis => {
            let redis_config = RedisConfig::from_env()?;
            let pool = RedisPool::new(&redis_config).await?;

            // Check store connectivity
            if pool.health_check().await? {
                info!("Redis connection successful");
            } else {
                anyhow::bail!("Failed to connect to Redis");
            }
            Arc::new(pool)
        }
        StoreBackend::Memory => {
            warn!("Using in-memory store; registrations are lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let registration = RegistrationService::new(store, settings.check_in_max_attempts);
    let app = routes::create_router(AppState { registration });

    let listener = tokio::net::TcpListener::bind(&settings.bind_address).await?;
    info!("Registration service listening on {}", settings.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
