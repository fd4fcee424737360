mod ipc;
mod rotation;

use tokio::sync::{mpsc, watch};
use tracing::info;

use carousel_core::config::Config;
use carousel_core::paths::CarouselPaths;

use rotation::engine::RotationEngine;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "carousel_daemon=info,carousel_core=info".into()),
        )
        .init();

    let paths = CarouselPaths::new()?;
    paths.ensure_dirs()?;

    let config = Config::load_or_default(&paths);
    info!(
        catalog = %config.catalog_path(&paths).display(),
        interval = %config.rotation.interval,
        "starting carousel-daemon"
    );

    let (cmd_tx, cmd_rx) = mpsc::channel(32);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // spawn IPC server
    let socket = CarouselPaths::socket_path();
    let ipc_shutdown = shutdown_rx.clone();
    let ipc_socket = socket.clone();
    tokio::spawn(async move {
        if let Err(e) = ipc::serve_ipc(ipc_socket, cmd_tx, ipc_shutdown).await {
            tracing::error!("IPC server error: {e}");
        }
    });

    // spawn rotation engine
    let engine = RotationEngine::new(config, paths);
    let mut engine_handle = tokio::spawn(engine.run(cmd_rx, shutdown_rx));

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            info!("received ctrl+c, shutting down");
        }
        _ = &mut engine_handle => {
            info!("rotation engine stopped");
        }
    }
    let _ = shutdown_tx.send(true);

    // wait for engine to finish
    if !engine_handle.is_finished() {
        let _ = engine_handle.await;
    }

    if socket.exists() {
        let _ = std::fs::remove_file(socket);
    }

    info!("carousel-daemon stopped");
    Ok(())
}
