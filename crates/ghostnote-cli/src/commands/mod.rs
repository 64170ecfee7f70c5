//! Command handlers.

pub mod misc;
pub mod notes;
pub mod serve;

use crate::errors::CliError;
use crate::protocol::{ErrorKind, Response};

/// Turn a response that is not the one a command hoped for into an error
/// carrying the right exit code.
pub(crate) fn unexpected(id: Option<&str>, response: Response) -> anyhow::Error {
    let subject = id
        .map(|id| format!("Note {}", id))
        .unwrap_or_else(|| "Note".to_string());
    match response {
        Response::NotFound => CliError::not_found(
            format!("{} not found", subject),
            "Hint: It may have been read, deleted, or never existed.",
        )
        .into(),
        Response::Expired => CliError::not_found(
            format!("{} has expired", subject),
            "Hint: Expired notes are destroyed unread.",
        )
        .into(),
        Response::PasswordRequired => CliError::auth_failed_with_hint(
            format!("{} is password protected", subject),
            "Hint: Pass --password or run `ghostnote read` on a terminal.",
        )
        .into(),
        Response::InvalidPassword => CliError::auth_failed("Wrong password").into(),
        Response::Error {
            kind: ErrorKind::Validation,
            message,
        } => CliError::invalid_input(message).into(),
        Response::Error { message, .. } => anyhow::anyhow!("Daemon error: {}", message),
        other => anyhow::anyhow!("Unexpected daemon response: {:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::exit_codes;

    fn exit_code(response: Response) -> Option<i32> {
        unexpected(Some("abc"), response)
            .downcast_ref::<CliError>()
            .map(CliError::exit_code)
    }

    #[test]
    fn test_outcomes_map_to_exit_codes() {
        assert_eq!(exit_code(Response::NotFound), Some(exit_codes::NOT_FOUND));
        assert_eq!(exit_code(Response::Expired), Some(exit_codes::NOT_FOUND));
        assert_eq!(
            exit_code(Response::PasswordRequired),
            Some(exit_codes::AUTH_FAILED)
        );
        assert_eq!(
            exit_code(Response::InvalidPassword),
            Some(exit_codes::AUTH_FAILED)
        );
        assert_eq!(
            exit_code(Response::error(ErrorKind::Validation, "bad ttl")),
            Some(exit_codes::INVALID_INPUT)
        );
        assert_eq!(
            exit_code(Response::error(ErrorKind::Internal, "Internal server error")),
            None
        );
    }
}
