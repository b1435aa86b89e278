use std::sync::Arc;

use anyhow::Context;
use batches_server::config::AppConfig;
use batches_server::state::AppState;
use batches_server::store::DatabaseStore;
use batches_server::{build_router, database};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let config = AppConfig::load().context("Failed to load config")?;

    let db = database::init_db(&config.database.url)
        .await
        .context("Failed to initialize database")?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(Arc::new(DatabaseStore::new(db)), config);
    info!(
        policy = ?state.config.mount.policy,
        max_upload_size = state.config.mount.max_upload_size,
        executor_routes = state.config.executor.token.is_some(),
        "Mount handler configured"
    );

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, build_router(state)).await?;

    Ok(())
}
