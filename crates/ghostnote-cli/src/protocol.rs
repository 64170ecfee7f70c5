//! Line protocol spoken over the daemon socket.
//!
//! Each request is one line of space separated tokens. Free-form payloads
//! (content, passwords) are base64 encoded so they never contain spaces or
//! newlines:
//!
//! ```text
//! PING
//! CREATE <ttl_hours> <content_b64> [<password_b64>]
//! PEEK <id>
//! READ <id> [<password_b64>]
//! DELETE <id>
//! STATS
//! ```
//!
//! Each response is one line of JSON tagged by `status`.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use ghostnote_core::{
    log_id, CreatedNote, DeleteOutcome, NoteMetadata, PeekOutcome, RevealedNote, StatsSnapshot,
    TakeOutcome,
};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Largest request line the daemon accepts, in bytes.
pub const MAX_REQUEST_BYTES: usize = 64 * 1024;

/// A parsed request.
#[derive(Clone, PartialEq, Eq)]
pub enum Request {
    Ping,
    Create {
        ttl_hours: i64,
        content: String,
        password: Option<Zeroizing<String>>,
    },
    Peek {
        id: String,
    },
    Read {
        id: String,
        password: Option<Zeroizing<String>>,
    },
    Delete {
        id: String,
    },
    Stats,
}

/// Why a request line could not be turned into a [`Request`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// Not a well-formed request at all
    Malformed(String),
    /// Well-formed, but a field value is unacceptable
    Invalid(String),
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::Malformed(message) | RequestError::Invalid(message) => {
                write!(f, "{}", message)
            }
        }
    }
}

impl std::error::Error for RequestError {}

impl Request {
    /// Parse a single request line (without the trailing newline).
    pub fn parse(line: &str) -> Result<Self, RequestError> {
        let mut parts = line.split_whitespace();
        let command = parts
            .next()
            .ok_or_else(|| RequestError::Malformed("Empty request".to_string()))?;

        let request = match command {
            "PING" => Request::Ping,
            "STATS" => Request::Stats,
            "CREATE" => {
                let ttl = required(parts.next(), "ttl_hours")?;
                let ttl_hours = ttl.parse::<i64>().map_err(|_| {
                    RequestError::Invalid(format!("ttl_hours must be an integer (got {})", ttl))
                })?;
                let content = decode_text(required(parts.next(), "content")?, "content")?;
                let password = parts
                    .next()
                    .map(|value| decode_text(value, "password").map(Zeroizing::new))
                    .transpose()?;
                Request::Create {
                    ttl_hours,
                    content,
                    password,
                }
            }
            "PEEK" => Request::Peek {
                id: required(parts.next(), "id")?.to_string(),
            },
            "READ" => {
                let id = required(parts.next(), "id")?.to_string();
                let password = parts
                    .next()
                    .map(|value| decode_text(value, "password").map(Zeroizing::new))
                    .transpose()?;
                Request::Read { id, password }
            }
            "DELETE" => Request::Delete {
                id: required(parts.next(), "id")?.to_string(),
            },
            other => {
                return Err(RequestError::Malformed(format!(
                    "Unknown command: {}",
                    other
                )))
            }
        };

        if parts.next().is_some() {
            return Err(RequestError::Malformed(format!(
                "Too many arguments for {}",
                command
            )));
        }
        Ok(request)
    }

    /// Encode as a request line (without the trailing newline).
    pub fn to_line(&self) -> String {
        match self {
            Request::Ping => "PING".to_string(),
            Request::Stats => "STATS".to_string(),
            Request::Create {
                ttl_hours,
                content,
                password,
            } => {
                let mut line = format!("CREATE {} {}", ttl_hours, STANDARD.encode(content));
                if let Some(password) = password {
                    line.push(' ');
                    line.push_str(&STANDARD.encode(password.as_bytes()));
                }
                line
            }
            Request::Peek { id } => format!("PEEK {}", id),
            Request::Read { id, password } => {
                let mut line = format!("READ {}", id);
                if let Some(password) = password {
                    line.push(' ');
                    line.push_str(&STANDARD.encode(password.as_bytes()));
                }
                line
            }
            Request::Delete { id } => format!("DELETE {}", id),
        }
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Request::Ping => write!(f, "Ping"),
            Request::Stats => write!(f, "Stats"),
            Request::Create {
                ttl_hours,
                password,
                ..
            } => f
                .debug_struct("Create")
                .field("ttl_hours", ttl_hours)
                .field("has_password", &password.is_some())
                .finish_non_exhaustive(),
            Request::Peek { id } => f.debug_struct("Peek").field("id", &log_id(id)).finish(),
            Request::Read { id, password } => f
                .debug_struct("Read")
                .field("id", &log_id(id))
                .field("has_password", &password.is_some())
                .finish(),
            Request::Delete { id } => f
                .debug_struct("Delete")
                .field("id", &log_id(id))
                .finish(),
        }
    }
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, RequestError> {
    value.ok_or_else(|| RequestError::Malformed(format!("Missing {}", field)))
}

fn decode_text(value: &str, field: &str) -> Result<String, RequestError> {
    let bytes = STANDARD
        .decode(value.as_bytes())
        .map_err(|_| RequestError::Malformed(format!("{} is not valid base64", field)))?;
    String::from_utf8(bytes)
        .map_err(|_| RequestError::Invalid(format!("{} is not valid UTF-8", field)))
}

/// Error category carried by [`Response::Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Protocol,
    Internal,
}

/// Body of a successful read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealedBody {
    pub content: String,
    pub expires_at: DateTime<Utc>,
    pub preview: Option<String>,
    pub has_password: bool,
    pub time_remaining: String,
    pub destroyed_at: DateTime<Utc>,
}

impl From<RevealedNote> for RevealedBody {
    fn from(note: RevealedNote) -> Self {
        Self {
            content: note.content.as_str().to_string(),
            expires_at: note.metadata.expires_at,
            preview: note.preview,
            has_password: note.metadata.has_password,
            time_remaining: note.metadata.time_remaining_label(),
            destroyed_at: note.destroyed_at,
        }
    }
}

/// A daemon response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Pong,
    Created(CreatedNote),
    Ready(NoteMetadata),
    Revealed(RevealedBody),
    NotFound,
    Expired,
    PasswordRequired,
    InvalidPassword,
    Deleted,
    Stats(StatsSnapshot),
    Error { kind: ErrorKind, message: String },
}

impl Response {
    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        Response::Error {
            kind,
            message: message.into(),
        }
    }

    /// Encode as a response line (without the trailing newline).
    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn parse(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }
}

impl From<RequestError> for Response {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::Malformed(message) => Response::error(ErrorKind::Protocol, message),
            RequestError::Invalid(message) => Response::error(ErrorKind::Validation, message),
        }
    }
}

impl From<PeekOutcome> for Response {
    fn from(outcome: PeekOutcome) -> Self {
        match outcome {
            PeekOutcome::NotFound => Response::NotFound,
            PeekOutcome::Expired => Response::Expired,
            PeekOutcome::PasswordRequired => Response::PasswordRequired,
            PeekOutcome::Ready(metadata) => Response::Ready(metadata),
        }
    }
}

impl From<TakeOutcome> for Response {
    fn from(outcome: TakeOutcome) -> Self {
        match outcome {
            TakeOutcome::NotFound => Response::NotFound,
            TakeOutcome::Expired => Response::Expired,
            TakeOutcome::PasswordRequired => Response::PasswordRequired,
            TakeOutcome::InvalidPassword => Response::InvalidPassword,
            TakeOutcome::Revealed(note) => Response::Revealed(note.into()),
        }
    }
}

impl From<DeleteOutcome> for Response {
    fn from(outcome: DeleteOutcome) -> Self {
        match outcome {
            DeleteOutcome::NotFound => Response::NotFound,
            DeleteOutcome::Deleted => Response::Deleted,
        }
    }
}
