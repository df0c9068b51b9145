use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cartoonizer::{create_router, AppState, Cartoonizer, Config};

fn init_tracing(json: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("cartoonizer=info,tower_http=info"));

    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(true).with_target(true))
            .with(env_filter)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let config = Config::from_env().context("invalid configuration")?;
    init_tracing(config.log_json);

    let addr = config.bind_addr()?;
    info!(
        clip = %config.clip_endpoint,
        sd = %config.sd_endpoint,
        "starting cartoonizer"
    );

    let cartoonizer =
        Cartoonizer::from_config(&config).context("failed to build inference clients")?;
    let state = Arc::new(AppState { cartoonizer });

    let app = create_router(state, &config.assets_dir, config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("🚀 Server running on http://{addr}");
    info!("📸 Open in your browser to start cartoonizing!");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install Ctrl-C handler: {e}");
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}
