use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dilshan_api::config::Config;
use dilshan_api::storage::{FsObjectStore, ObjectStore};
use dilshan_api::{build_router, connect_database, AppContext};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dilshan_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    tracing::info!(
        environment = %config.environment(),
        "Starting Dilshan Music edge API on port {}",
        config.port
    );

    tracing::info!("Connecting to database...");
    let pool = connect_database(config.database()).await?;
    tracing::info!("Database ready, migrations applied");

    let object_store: Option<Arc<dyn ObjectStore>> = match &config.common.object_store.path {
        Some(path) => Some(Arc::new(FsObjectStore::open(path).await?)),
        None => {
            tracing::warn!(
                "OBJECT_STORE_PATH not set, object uploads and downloads will fail until configured"
            );
            None
        }
    };

    let app = build_router(AppContext::from_config(&config, pool, object_store));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
