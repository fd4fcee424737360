use std::path::PathBuf;

use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use carousel_core::ipc::{IpcRequest, IpcResponse};

use crate::rotation::DaemonCommand;

/// Accept newline-delimited JSON requests on `socket_path` until shutdown.
pub async fn serve_ipc(
    socket_path: PathBuf,
    cmd_tx: mpsc::Sender<DaemonCommand>,
    mut shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    if socket_path.exists() {
        debug!(path = %socket_path.display(), "removing stale socket");
        std::fs::remove_file(&socket_path)?;
    }

    let listener = UnixListener::bind(&socket_path)?;
    info!(path = %socket_path.display(), "IPC socket listening");

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, _)) => {
                    let tx = cmd_tx.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, tx).await {
                            warn!("IPC connection error: {e}");
                        }
                    });
                }
                Err(e) => warn!("IPC accept error: {e}"),
            },
            _ = shutdown.changed() => {
                info!("IPC server shutting down");
                let _ = std::fs::remove_file(&socket_path);
                return Ok(());
            }
        }
    }
}

async fn handle_connection(
    stream: UnixStream,
    cmd_tx: mpsc::Sender<DaemonCommand>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut line = String::new();
    BufReader::new(reader).read_line(&mut line).await?;

    let response = match serde_json::from_str::<IpcRequest>(line.trim()) {
        Ok(request) => {
            debug!(?request, "IPC request");
            dispatch_request(request, &cmd_tx).await
        }
        Err(e) => IpcResponse::error(format!("invalid request: {e}")),
    };
    write_response(&mut writer, &response).await
}

async fn write_response<W>(writer: &mut W, response: &IpcResponse) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut line = serde_json::to_string(response)?;
    line.push('\n');
    writer.write_all(line.as_bytes()).await?;
    Ok(())
}

async fn dispatch_request(
    request: IpcRequest,
    cmd_tx: &mpsc::Sender<DaemonCommand>,
) -> IpcResponse {
    match request {
        IpcRequest::Status => {
            let (tx, rx) = oneshot::channel();
            if cmd_tx.send(DaemonCommand::Status { respond: tx }).await.is_err() {
                return IpcResponse::error("engine unavailable");
            }
            match rx.await {
                Ok(status) => {
                    IpcResponse::ok_with_data(serde_json::to_value(status).unwrap_or_default())
                }
                Err(_) => IpcResponse::error("engine dropped response"),
            }
        }
        IpcRequest::Current => {
            let (tx, rx) = oneshot::channel();
            if cmd_tx.send(DaemonCommand::Current { respond: tx }).await.is_err() {
                return IpcResponse::error("engine unavailable");
            }
            match rx.await {
                Ok(Ok(item)) => {
                    IpcResponse::ok_with_data(serde_json::to_value(item).unwrap_or_default())
                }
                Ok(Err(msg)) => IpcResponse::error(msg),
                Err(_) => IpcResponse::error("engine dropped response"),
            }
        }
        IpcRequest::Next => forward(cmd_tx, DaemonCommand::Next).await,
        IpcRequest::Like { id } => forward(cmd_tx, DaemonCommand::Like { id }).await,
        IpcRequest::Reload => forward(cmd_tx, DaemonCommand::Reload).await,
        IpcRequest::Evict => forward(cmd_tx, DaemonCommand::Evict).await,
        IpcRequest::Quit => forward(cmd_tx, DaemonCommand::Quit).await,
    }
}

async fn forward(cmd_tx: &mpsc::Sender<DaemonCommand>, cmd: DaemonCommand) -> IpcResponse {
    match cmd_tx.send(cmd).await {
        Ok(()) => IpcResponse::ok(),
        Err(_) => IpcResponse::error("engine unavailable"),
    }
}
