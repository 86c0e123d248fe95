use anyhow::Result;
use clap::Parser;
use gallery_core::ensure_bucket;
use gallery_web::{AppState, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.default_log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let port = config.port;
    let region = config.region.clone();

    // Create app state; a broken storage config degrades, it does not abort
    let state = AppState::new(config).await;

    let outcome = ensure_bucket(&state.storage, &region).await;
    tracing::debug!("Bucket bootstrap finished: {:?}", outcome);

    let app = gallery_web::router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Gallery web server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
