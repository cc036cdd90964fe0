use anyhow::{Context, Result};
use common::{BackdropError, Command, Response};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{mpsc, oneshot, watch};

use crate::page::PageRequest;

/// Accept control clients until shutdown is signalled
pub async fn start(
    page_tx: mpsc::UnboundedSender<PageRequest>,
    shutdown_tx: watch::Sender<bool>,
) -> Result<()> {
    let socket_path = common::get_socket_path();

    // Remove old socket if it exists
    if socket_path.exists() {
        std::fs::remove_file(&socket_path)
            .with_context(|| format!("Failed to remove stale socket {}", socket_path.display()))?;
    }

    let listener = UnixListener::bind(&socket_path)
        .with_context(|| format!("Failed to bind {}", socket_path.display()))?;
    log::info!("IPC server listening on: {}", socket_path.display());

    let mut shutdown_rx = shutdown_tx.subscribe();

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, _addr)) => {
                    let page_tx = page_tx.clone();
                    let shutdown_tx = shutdown_tx.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_client(stream, page_tx, shutdown_tx).await {
                            log::error!("Error handling client: {}", e);
                        }
                    });
                }
                Err(e) => {
                    log::error!("Error accepting connection: {}", e);
                }
            },
        }
    }

    // Clean up socket
    let _ = std::fs::remove_file(&socket_path);
    log::info!("IPC server stopped");
    Ok(())
}

async fn handle_client(
    stream: UnixStream,
    page_tx: mpsc::UnboundedSender<PageRequest>,
    shutdown_tx: watch::Sender<bool>,
) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    while reader.read_line(&mut line).await? > 0 {
        let response = match serde_json::from_str::<Command>(&line) {
            Ok(command) => handle_command(command, &page_tx, &shutdown_tx).await,
            Err(e) => {
                log::warn!("Invalid command: {}", e);
                Response::Error(BackdropError::Ipc(format!("Invalid command: {}", e)))
            }
        };

        // Send response
        let response_json = serde_json::to_string(&response)?;
        writer.write_all(response_json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;

        line.clear();
    }

    Ok(())
}

async fn handle_command(
    command: Command,
    page_tx: &mpsc::UnboundedSender<PageRequest>,
    shutdown_tx: &watch::Sender<bool>,
) -> Response {
    match command {
        Command::Ping => Response::Pong,

        Command::Kill => {
            log::info!("Received kill command");
            shutdown_tx.send_replace(true);
            Response::Ok
        }

        command => {
            let (reply, response) = oneshot::channel();
            if let Err(e) = page_tx.send(PageRequest { command, reply }) {
                return Response::Error(BackdropError::Ipc(format!(
                    "Failed to send command to page: {}",
                    e
                )));
            }

            match response.await {
                Ok(response) => response,
                Err(_) => Response::Error(BackdropError::Ipc(
                    "Page stopped before answering".to_string(),
                )),
            }
        }
    }
}
