//! Server entry point.

use std::net::SocketAddr;

use tracing_subscriber::EnvFilter;

use leadflow_config::{load_settings, Settings};
use leadflow_server::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = std::env::var("LEADFLOW_ENV").ok();
    let settings = match load_settings(env.as_deref()) {
        Ok(settings) => settings,
        Err(err) => {
            // Tracing is not up yet.
            eprintln!("warning: failed to load config: {err}. Using defaults.");
            Settings::default()
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting leadflow server");

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    let router = create_router(AppState::new(settings.server.clone()));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, router).await?;
    Ok(())
}
