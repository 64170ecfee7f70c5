//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// Note not found, already read, or expired.
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// Password missing or wrong.
    pub const AUTH_FAILED: i32 = 5;
}

/// How long the client waits on the daemon before giving up.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Interactive password attempts before `read` gives up.
pub const MAX_PASSWORD_ATTEMPTS: u32 = 3;

/// Environment variable naming the daemon socket.
pub const SOCKET_ENV: &str = "GHOSTNOTE_SOCKET";

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "GHOSTNOTE_CONFIG";

/// Environment variable supplying a note password non-interactively.
pub const PASSWORD_ENV: &str = "GHOSTNOTE_PASSWORD";
