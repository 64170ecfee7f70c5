use std::path::Path;

use tracing::info;

use crate::config::{load_config, resolve_socket_path};
use crate::daemon::{run_daemon, DaemonConfig};
use crate::logging::init_tracing;

pub fn handle_serve(socket: Option<&Path>, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    init_tracing(&config.server.log_level, config.server.json_logs)?;

    let socket_path = resolve_socket_path(socket, &config)?;
    info!(
        sweep_interval_seconds = config.server.sweep_interval_seconds,
        memory_kib = config.hasher.memory_kib,
        "Starting ghostnote daemon"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to start async runtime: {}", e))?;

    runtime.block_on(run_daemon(DaemonConfig {
        socket_path,
        sweep_interval: config.sweep_interval(),
        hasher: config.hasher,
    }))
}
