use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use ghostnote_core::VERSION;

use crate::constants::{CONFIG_ENV, SOCKET_ENV};

/// Ghostnote - one-time, self-destructing notes held in memory
#[derive(Parser)]
#[command(name = "ghostnote")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the daemon socket
    #[arg(short, long, global = true, env = SOCKET_ENV)]
    pub socket: Option<PathBuf>,

    /// Path to the config file
    #[arg(short, long, global = true, env = CONFIG_ENV)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Arguments for the `create` command
#[derive(Args)]
pub struct CreateArgs {
    /// Hours until the note expires (clamped to 1..=72)
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    pub ttl_hours: i64,

    /// Require this password to read the note
    #[arg(long, conflicts_with = "prompt_password")]
    pub password: Option<String>,

    /// Prompt for a password to gate the note
    #[arg(long)]
    pub prompt_password: bool,

    /// Note body (overrides stdin)
    #[arg(long)]
    pub body: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `read` command
#[derive(Args)]
pub struct ReadArgs {
    /// Note ID
    #[arg(value_name = "ID")]
    pub id: String,

    /// Password for a gated note
    #[arg(long)]
    pub password: Option<String>,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments shared by commands that address one note
#[derive(Args)]
pub struct NoteArgs {
    /// Note ID
    #[arg(value_name = "ID")]
    pub id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct JsonArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the note daemon in the foreground
    Serve,

    /// Store a new note and print its ID
    Create(CreateArgs),

    /// Reveal a note and destroy it
    Read(ReadArgs),

    /// Show a note's metadata without consuming it
    Peek(NoteArgs),

    /// Destroy a note without reading it
    Delete(NoteArgs),

    /// Show store counters
    Stats(JsonArgs),

    /// Check that the daemon is running
    Ping(JsonArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_name = "SHELL")]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_create_accepts_negative_ttl() {
        let cli = Cli::try_parse_from(["ghostnote", "create", "--ttl-hours", "-5"]).unwrap();
        match cli.command {
            Commands::Create(args) => assert_eq!(args.ttl_hours, -5),
            _ => panic!("expected create"),
        }
    }

    #[test]
    fn test_password_flags_conflict() {
        let result = Cli::try_parse_from([
            "ghostnote",
            "create",
            "--password",
            "pw",
            "--prompt-password",
        ]);
        assert!(result.is_err());
    }
}
