//! Ghostnote CLI - one-time, self-destructing notes
//!
//! `ghostnote serve` runs the daemon that owns the note store. Every other
//! command is a thin client talking to it over a Unix socket.

mod cli;
mod client;
mod commands;
mod config;
mod constants;
mod daemon;
mod errors;
mod helpers;
mod logging;
mod output;
mod protocol;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::{misc, notes, serve};
use crate::config::{load_config, resolve_socket_path};
use crate::errors::CliError;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        if let Some(cli_error) = e.downcast_ref::<CliError>() {
            cli_error.exit();
        }
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        socket,
        config,
        command,
        quiet,
    } = cli;

    let client_socket = || -> anyhow::Result<std::path::PathBuf> {
        let settings = load_config(config.as_deref())?;
        resolve_socket_path(socket.as_deref(), &settings)
    };

    match command {
        Commands::Serve => serve::handle_serve(socket.as_deref(), config.as_deref()),
        Commands::Create(args) => notes::handle_create(&client_socket()?, args, quiet),
        Commands::Read(args) => notes::handle_read(&client_socket()?, args, quiet),
        Commands::Peek(args) => notes::handle_peek(&client_socket()?, args),
        Commands::Delete(args) => notes::handle_delete(&client_socket()?, args, quiet),
        Commands::Stats(args) => misc::handle_stats(&client_socket()?, args.json),
        Commands::Ping(args) => misc::handle_ping(&client_socket()?, args.json, quiet),
        Commands::Completions { shell } => misc::handle_completions(shell),
    }
}
