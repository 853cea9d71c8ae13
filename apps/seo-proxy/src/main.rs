use std::net::SocketAddr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dilshan_catalog_client::EdgeClient;
use dilshan_seo_proxy::config::Config;
use dilshan_seo_proxy::{build_router, ProxyState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    "dilshan_seo_proxy=debug,dilshan_catalog_client=info,tower_http=debug".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    tracing::info!(
        environment = %config.environment,
        origin = %config.origin_url,
        edge_api = %config.edge.api_url,
        "Starting Dilshan Music SEO proxy on port {}",
        config.port
    );

    let catalog = EdgeClient::new(config.edge.clone())?;
    let state = ProxyState::new(&config.origin_url, &config.site_name, catalog)?;
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
