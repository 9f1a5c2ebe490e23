use std::net::SocketAddr;

use axum::Router;
use configs::{AppConfig, StorageBackend};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes::{self, AppState};
use service::issues::IssueService;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn parse_bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    let raw = cfg.server.bind_addr();
    raw.parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address {raw}: {e}")))
}

/// Open the configured store and wrap it in the handler state.
pub async fn build_state(cfg: &AppConfig) -> Result<AppState, StartupError> {
    let memory = cfg.storage.backend == StorageBackend::Memory;
    let repo = service::open_repository(memory, &cfg.storage.path)
        .await
        .map_err(|e| StartupError::Runtime(e.to_string()))?;
    info!(backend = ?cfg.storage.backend, path = %cfg.storage.path, "issue store ready");
    Ok(AppState { issues: IssueService::new(repo) })
}

/// Public entry: build the app and run the HTTP server until it fails.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let state = build_state(&cfg).await?;
    let app: Router = routes::build_router(state, build_cors());

    let addr = parse_bind_addr(&cfg)?;
    info!(%addr, "starting issue tracker server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
