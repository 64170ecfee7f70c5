//! Input helpers: note bodies and password prompts.

use std::io::{self, IsTerminal, Read};

use dialoguer::Password;
use ghostnote_core::storage::validation::validate_content;
use ghostnote_core::GhostError;
use zeroize::Zeroizing;

use crate::errors::CliError;

/// Resolve the note body from `--body` or stdin.
///
/// Content is kept as written apart from the single newline a shell pipe
/// appends. It is checked against the store's content rules before any
/// request is made, so oversized notes never reach the socket.
pub fn read_note_body(body: Option<String>) -> anyhow::Result<String> {
    if let Some(value) = body {
        if value.trim().is_empty() {
            return Err(CliError::invalid_input("--body cannot be empty").into());
        }
        check_content(&value)?;
        return Ok(value);
    }

    let stdin = io::stdin();
    if stdin.is_terminal() {
        eprintln!("Enter the note, then press Ctrl-D:");
    }
    let mut buffer = String::new();
    stdin
        .lock()
        .read_to_string(&mut buffer)
        .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;

    let body = strip_trailing_newline(buffer);
    if body.trim().is_empty() {
        return Err(CliError::invalid_input("No note content provided on stdin").into());
    }
    check_content(&body)?;
    Ok(body)
}

fn check_content(content: &str) -> anyhow::Result<()> {
    validate_content(content).map_err(|err| match err {
        GhostError::Validation(message) => CliError::invalid_input(message).into(),
        other => anyhow::anyhow!(other),
    })
}

fn strip_trailing_newline(mut value: String) -> String {
    if value.ends_with('\n') {
        value.pop();
        if value.ends_with('\r') {
            value.pop();
        }
    }
    value
}

/// Prompt for a new note password with confirmation.
pub fn prompt_new_password() -> anyhow::Result<Zeroizing<String>> {
    if !io::stdin().is_terminal() {
        return Err(CliError::invalid_input(
            "--prompt-password needs a terminal; use --password instead",
        )
        .into());
    }
    Password::new()
        .with_prompt("Note password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()
        .map(Zeroizing::new)
        .map_err(|e| anyhow::anyhow!("Failed to read password: {}", e))
}

/// Prompt for the password of a gated note.
pub fn prompt_read_password() -> anyhow::Result<Zeroizing<String>> {
    Password::new()
        .with_prompt("Password")
        .allow_empty_password(true)
        .interact()
        .map(Zeroizing::new)
        .map_err(|e| anyhow::anyhow!("Failed to read password: {}", e))
}

/// Password from an environment variable, if set and not blank.
pub fn password_from_env(var: &str) -> Option<Zeroizing<String>> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Some(Zeroizing::new(value)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ghostnote_core::storage::validation::MAX_CONTENT_CHARS;

    #[test]
    fn test_strip_trailing_newline() {
        assert_eq!(strip_trailing_newline("hi\n".to_string()), "hi");
        assert_eq!(strip_trailing_newline("hi\r\n".to_string()), "hi");
        assert_eq!(strip_trailing_newline("hi\n\n".to_string()), "hi\n");
        assert_eq!(strip_trailing_newline("  hi  ".to_string()), "  hi  ");
    }

    #[test]
    fn test_empty_body_flag_rejected() {
        let err = read_note_body(Some("   ".to_string())).unwrap_err();
        assert!(err.downcast_ref::<CliError>().is_some());
    }

    #[test]
    fn test_oversized_body_rejected_as_invalid_input() {
        let err = read_note_body(Some("x".repeat(MAX_CONTENT_CHARS + 1))).unwrap_err();
        let cli_error = err.downcast_ref::<CliError>().expect("cli error");
        assert_eq!(
            cli_error.exit_code(),
            crate::constants::exit_codes::INVALID_INPUT
        );
        assert!(read_note_body(Some("x".repeat(MAX_CONTENT_CHARS))).is_ok());
    }

    #[test]
    fn test_body_flag_kept_verbatim() {
        let body = read_note_body(Some("  keep spacing \n".to_string())).unwrap();
        assert_eq!(body, "  keep spacing \n");
    }
}
