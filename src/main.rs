use carbon_tracker::{client::HttpCarbonApi, router, AppState, Config, FileActivityCache};
use std::{net::SocketAddr, sync::Arc};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env()?;
    let api = HttpCarbonApi::new(config.api_url.clone(), config.api_timeout)?;
    let cache = FileActivityCache::new(config.cache_path.clone());
    info!(
        api_url = api.base_url(),
        cache_path = %cache.path().display(),
        "starting carbon tracker"
    );

    let state = AppState::new(Arc::new(api), Arc::new(cache));
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
