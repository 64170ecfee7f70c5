use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;

use crate::cli::Cli;
use crate::client::Client;
use crate::output::{print_json, stats_table, Mode};
use crate::protocol::{Request, Response};

use super::unexpected;

pub fn handle_stats(socket_path: &Path, json: bool) -> anyhow::Result<()> {
    let mut client = Client::connect(socket_path)?;
    match client.request(&Request::Stats)? {
        Response::Stats(stats) => {
            if json {
                print_json(&stats)?;
            } else {
                println!("{}", stats_table(Mode::detect(), &stats));
            }
            Ok(())
        }
        other => Err(unexpected(None, other)),
    }
}

pub fn handle_ping(socket_path: &Path, json: bool, quiet: bool) -> anyhow::Result<()> {
    let mut client = Client::connect(socket_path)?;
    match client.request(&Request::Ping)? {
        Response::Pong => {
            if json {
                print_json(&Response::Pong)?;
            } else if !quiet {
                println!("ghostnote daemon is running at {}", socket_path.display());
            }
            Ok(())
        }
        other => Err(unexpected(None, other)),
    }
}

pub fn handle_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "ghostnote", &mut std::io::stdout());
    Ok(())
}
