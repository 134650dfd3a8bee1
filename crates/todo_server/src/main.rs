//! `todo-server` entry point.

use anyhow::Context;
use log::info;
use todo_core::{core_version, init_logging};
use todo_server::{create_router, open_service, ServerConfig};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = ServerConfig::from_env().context("failed to load server configuration")?;

    init_logging(config.log_level, config.log_dir.as_deref())
        .map_err(anyhow::Error::msg)
        .context("failed to initialize logging")?;

    let service = open_service(&config.database).context("failed to open task database")?;
    let app = create_router(service);

    let bind_address = config.bind_address();
    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;
    info!(
        "event=server_start module=server status=ok address={bind_address} core_version={}",
        core_version()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated unexpectedly")?;

    info!("event=server_stop module=server status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("event=shutdown_signal module=server status=error error={err}");
        std::future::pending::<()>().await;
    }
    info!("event=shutdown_signal module=server status=ok");
}
