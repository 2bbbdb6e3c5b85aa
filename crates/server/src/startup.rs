use std::net::SocketAddr;

use axum::Router;
use common::utils::logging::init_logging_from_env;
use configs::AppConfig;
use dotenvy::dotenv;
use service::{runtime, ResourceStores};
use tokio::net::TcpListener;
use tracing::info;

use crate::errors::StartupError;
use crate::routes;

/// Initialize logging via shared common utils
fn init_logging() {
    init_logging_from_env();
}

/// Load and validate configuration from `CONFIG_PATH` or the environment.
pub fn load_config() -> Result<AppConfig, StartupError> {
    AppConfig::load_and_validate().map_err(|e| StartupError::InvalidConfig(e.to_string()))
}

/// Public entry: load configuration, build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();
    let cfg = load_config()?;
    run_with_config(cfg).await
}

/// Serve with an already loaded configuration until Ctrl+C.
/// Logging is set up by the caller.
pub async fn run_with_config(cfg: AppConfig) -> anyhow::Result<()> {
    runtime::ensure_env(&cfg.storage).await?;
    let stores = ResourceStores::open(&cfg.storage);
    let app: Router = routes::build_router(stores, routes::build_cors());

    let addr: SocketAddr = cfg
        .server
        .bind_addr()
        .parse()
        .map_err(|e: std::net::AddrParseError| StartupError::InvalidConfig(e.to_string()))?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| StartupError::Bind { addr: addr.to_string(), message: e.to_string() })?;
    info!(%addr, data_dir = %cfg.storage.data_dir.display(), "starting server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("received Ctrl+C, shutting down");
    }
}
