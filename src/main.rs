use std::sync::Arc;

use anyhow::Context;
use axum::extract::Request;
use axum::ServiceExt;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::normalize_path::NormalizePath;
use tracing::info;

use asset_manager_backend::app_state::AppState;
use asset_manager_backend::build_router;
use asset_manager_backend::config::{Config, StoreBackend};
use asset_manager_backend::db::pool::get_db_pool;
use asset_manager_backend::db::store::{DocumentStore, InMemoryStore, PgDocumentStore};
use asset_manager_backend::logging::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let config = Config::from_env().context("Invalid configuration")?;

    let _guard = init_logging(&config.log_dir).context("Failed to create log directory")?;

    let store: Arc<dyn DocumentStore> = match config.store_backend {
        StoreBackend::Memory => {
            info!("Using in-memory document store");
            Arc::new(InMemoryStore::new())
        }
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set")?;
            let pool = get_db_pool(database_url)
                .await
                .context("Failed to connect to the database")?;
            let store = PgDocumentStore::new(pool);
            store.migrate().await.context("Failed to run migrations")?;
            info!("Using PostgreSQL document store");
            Arc::new(store)
        }
    };

    info!("Seat policy: {}", config.seat_policy);
    let addr = config.bind_addr;
    let state = AppState::new(store.clone(), config);
    let app = NormalizePath::trim_trailing_slash(build_router(state));

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal(store))
        .await
        .context("Server encountered an error")?;

    info!("Shutdown complete.");
    Ok(())
}

async fn shutdown_signal(store: Arc<dyn DocumentStore>) {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
    }
    info!("Received Ctrl+C, shutting down...");
    info!("🛠️ Closing document store...");
    store.close().await;
    info!("✅ Document store closed.");
}
