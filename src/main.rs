use activity_log::{config::DEFAULT_API_KEY, router, AppState, ServerConfig, Store};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = ServerConfig::from_env()?;
    if config.api_key == DEFAULT_API_KEY {
        warn!("API_KEY not set, using the development key");
    }

    let store = Store::connect(&config.database_url).await?;
    let state = AppState::new(store, config.api_key, config.client);
    let app = router(state);

    info!("activity log listening on http://{}", config.addr);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
