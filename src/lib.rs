pub mod api;
pub mod config;
pub mod logic;
pub mod model;
pub mod seed;
pub mod store;

// Export API types
pub use api::routes;

// Export the core services and error taxonomy
pub use logic::{
    EntityService, ExistenceResolver, ServiceError, ServiceResult, TaskService, TeamService,
};

// Export all model types
pub use model::*;

// Export store types
pub use store::{MemoryStore, PostgresStore, Store};

use std::sync::Arc;

use crate::config::{AppConfig, StorageBackend};

/// Serve the API on an already-bound listener.
pub async fn serve_with_store<S: Store + 'static>(
    listener: tokio::net::TcpListener,
    store: Arc<S>,
) -> anyhow::Result<()> {
    let app = crate::api::routes::create_router().with_state(store);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn serve_store<S: Store + 'static>(store: Arc<S>, config: &AppConfig) -> anyhow::Result<()> {
    if std::env::var("LOAD_SEED_DATA").unwrap_or_default() == "true" {
        log::info!("Loading seed data...");
        crate::seed::load_seed_data(store.clone()).await?;
    }

    let bind_address = config.server_address();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    log::info!("Task tracker running on http://{}", bind_address);

    serve_with_store(listener, store).await
}

/// Load configuration, open the configured store and serve until shutdown.
pub async fn run_server() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    log::info!(
        "Configuration loaded: server={}:{} storage={:?}",
        config.server.host,
        config.server.port,
        config.storage.backend
    );

    match config.storage.backend {
        StorageBackend::Memory => serve_store(Arc::new(MemoryStore::new()), &config).await,
        StorageBackend::Postgres => {
            log::info!("Connecting to PostgreSQL...");
            let database_url = config.database_url()?;
            let store = PostgresStore::new(&database_url, config.max_connections()).await?;

            log::info!("Running database migrations...");
            store.migrate().await?;

            serve_store(Arc::new(store), &config).await
        }
    }
}
