//! The ghostnote daemon.
//!
//! Owns the single `NoteStore` and its `ExpiryReaper` for the lifetime of
//! the process and answers requests on a Unix socket.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use ghostnote_core::storage::validation::MAX_CONTENT_CHARS;
use ghostnote_core::{
    AccessGate, Argon2Gate, ExpiryReaper, GhostError, HasherParams, NewNote, NoteStore,
};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, error, info, warn};

use crate::protocol::{ErrorKind, Request, Response, MAX_REQUEST_BYTES};

/// Message returned for any internal failure; details stay in the log.
const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

pub struct DaemonConfig {
    pub socket_path: PathBuf,
    pub sweep_interval: Duration,
    pub hasher: HasherParams,
}

/// Run the daemon until SIGINT or SIGTERM.
pub async fn run_daemon(config: DaemonConfig) -> anyhow::Result<()> {
    let gate: Arc<dyn AccessGate> = Arc::new(
        Argon2Gate::new(config.hasher).map_err(|e| anyhow::anyhow!("Invalid hasher config: {}", e))?,
    );
    let store = Arc::new(NoteStore::new(gate));

    let listener = bind_socket(&config.socket_path).await?;
    let reaper = ExpiryReaper::new(store.clone(), config.sweep_interval).spawn();

    info!(socket = %config.socket_path.display(), "Ghostnote daemon listening");

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, _addr)) => {
                    let store = store.clone();
                    tokio::spawn(async move {
                        if let Err(err) = handle_connection(stream, store).await {
                            debug!(error = %err, "Connection closed with error");
                        }
                    });
                }
                Err(err) => {
                    warn!(error = %err, "Accept failed");
                }
            },
            _ = &mut shutdown => {
                info!("Shutdown requested");
                break;
            }
        }
    }

    reaper.shutdown().await;
    drop(listener);
    if let Err(err) = std::fs::remove_file(&config.socket_path) {
        warn!(error = %err, "Failed to remove socket file");
    }
    let stats = store.stats();
    info!(
        total_notes = stats.total_notes,
        total_views = stats.total_views,
        active_notes = stats.active_notes,
        "Ghostnote daemon stopped; active notes discarded"
    );
    Ok(())
}

async fn bind_socket(socket_path: &Path) -> anyhow::Result<UnixListener> {
    let parent = socket_path.parent().ok_or_else(|| {
        anyhow::anyhow!(
            "Socket path has no parent directory: {}",
            socket_path.display()
        )
    })?;
    std::fs::create_dir_all(parent).map_err(|e| {
        anyhow::anyhow!(
            "Failed to create socket directory {}: {}",
            parent.display(),
            e
        )
    })?;

    if socket_path.exists() {
        if UnixStream::connect(socket_path).await.is_ok() {
            return Err(anyhow::anyhow!(
                "A ghostnote daemon is already listening on {}",
                socket_path.display()
            ));
        }
        let _ = std::fs::remove_file(socket_path);
    }

    let listener = UnixListener::bind(socket_path)
        .map_err(|e| anyhow::anyhow!("Socket bind failed: {}", e))?;
    set_socket_permissions(socket_path)?;
    Ok(listener)
}

async fn handle_connection(stream: UnixStream, store: Arc<NoteStore>) -> anyhow::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    loop {
        let mut line = Vec::new();
        let read = (&mut reader)
            .take(MAX_REQUEST_BYTES as u64)
            .read_until(b'\n', &mut line)
            .await?;
        if read == 0 {
            return Ok(());
        }

        let response = if line.last() != Some(&b'\n') && read >= MAX_REQUEST_BYTES {
            discard_line(&mut reader).await?;
            oversize_response(&line)
        } else {
            match std::str::from_utf8(&line) {
                Ok(text) => dispatch(&store, text.trim()).await,
                Err(_) => Response::error(ErrorKind::Protocol, "Request is not valid UTF-8"),
            }
        };
        write_response(&mut writer, &response).await?;
    }
}

/// Skip the rest of an over-long request so the connection stays usable.
async fn discard_line<R: tokio::io::AsyncBufRead + Unpin>(reader: &mut R) -> std::io::Result<()> {
    loop {
        let buf = reader.fill_buf().await?;
        if buf.is_empty() {
            return Ok(());
        }
        match buf.iter().position(|b| *b == b'\n') {
            Some(pos) => {
                reader.consume(pos + 1);
                return Ok(());
            }
            None => {
                let len = buf.len();
                reader.consume(len);
            }
        }
    }
}

/// An over-long `CREATE` can only be carrying too much content.
fn oversize_response(head: &[u8]) -> Response {
    if head.starts_with(b"CREATE ") {
        Response::error(
            ErrorKind::Validation,
            format!("Content must be at most {} characters", MAX_CONTENT_CHARS),
        )
    } else {
        Response::error(ErrorKind::Protocol, "Request too large")
    }
}

async fn write_response(
    writer: &mut tokio::net::unix::OwnedWriteHalf,
    response: &Response,
) -> anyhow::Result<()> {
    let mut line = response.to_line()?;
    line.push('\n');
    writer.write_all(line.as_bytes()).await?;
    Ok(())
}

/// Execute one request line against the store.
pub async fn dispatch(store: &Arc<NoteStore>, line: &str) -> Response {
    let request = match Request::parse(line) {
        Ok(request) => request,
        Err(err) => return err.into(),
    };
    debug!(request = ?request, "Handling request");

    match request {
        Request::Ping => Response::Pong,
        Request::Stats => Response::Stats(store.stats()),
        Request::Peek { id } => store.peek(&id).into(),
        Request::Delete { id } => store.delete(&id).into(),
        Request::Create {
            ttl_hours,
            content,
            password,
        } => {
            let mut new_note = NewNote::new(content).with_ttl_hours(ttl_hours);
            new_note.password = password;
            let store = store.clone();
            match run_blocking(move || store.put(new_note)).await {
                Ok(created) => Response::Created(created),
                Err(err) => error_response(err),
            }
        }
        Request::Read { id, password } => {
            let store = store.clone();
            let outcome = run_blocking(move || {
                store.take(&id, password.as_ref().map(|p| p.as_str()))
            })
            .await;
            match outcome {
                Ok(outcome) => outcome.into(),
                Err(err) => error_response(err),
            }
        }
    }
}

/// Password hashing is CPU bound; keep it off the async workers.
async fn run_blocking<T, F>(work: F) -> ghostnote_core::Result<T>
where
    F: FnOnce() -> ghostnote_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| GhostError::Internal(format!("blocking task failed: {}", e)))?
}

fn error_response(err: GhostError) -> Response {
    match err {
        GhostError::Validation(message) => Response::error(ErrorKind::Validation, message),
        GhostError::Internal(message) => {
            error!(error = %message, "Request failed");
            Response::error(ErrorKind::Internal, INTERNAL_ERROR_MESSAGE)
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

fn set_socket_permissions(path: &Path) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(0o600);
    std::fs::set_permissions(path, perms)?;
    Ok(())
}
