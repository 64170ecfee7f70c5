//! Core data types for the note store.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Request to store a new note.
#[derive(Clone)]
pub struct NewNote {
    /// Secret content, stored verbatim
    pub content: String,

    /// Requested time-to-live (clamped by the store)
    pub ttl: Duration,

    /// Optional plaintext password gating the reveal
    pub password: Option<Zeroizing<String>>,
}

impl NewNote {
    /// A note with the default one hour ttl and no password.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ttl: Duration::hours(super::validation::DEFAULT_TTL_HOURS),
            password: None,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_ttl_hours(mut self, hours: i64) -> Self {
        self.ttl = super::validation::ttl_from_hours(hours);
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(Zeroizing::new(password.into()));
        self
    }
}

impl std::fmt::Debug for NewNote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewNote")
            .field("content", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// A stored note. Never mutated after creation.
pub(crate) struct Note {
    pub(crate) id: String,
    pub(crate) content: Zeroizing<String>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) expires_at: DateTime<Utc>,
    pub(crate) password_digest: Option<String>,
    pub(crate) preview: Option<String>,
}

impl Note {
    pub(crate) fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub(crate) fn metadata(&self, now: DateTime<Utc>) -> NoteMetadata {
        NoteMetadata {
            id: self.id.clone(),
            created_at: self.created_at,
            expires_at: self.expires_at,
            ttl_hours: (self.expires_at - self.created_at).num_hours(),
            has_password: self.password_digest.is_some(),
            time_remaining_seconds: (self.expires_at - now).num_seconds().max(0),
        }
    }

    /// Consume the note into its revealed form.
    pub(crate) fn reveal(self, now: DateTime<Utc>) -> RevealedNote {
        let metadata = self.metadata(now);
        RevealedNote {
            content: self.content,
            preview: self.preview,
            metadata,
            destroyed_at: now,
        }
    }
}

impl std::fmt::Debug for Note {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Note")
            .field("id", &self.id)
            .field("content", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .field("password_digest", &self.password_digest.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Non-secret view of a note.
///
/// Carries no content and no preview, so handing it out never reveals
/// anything the reader has not yet earned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteMetadata {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub ttl_hours: i64,
    pub has_password: bool,

    /// Seconds left before expiry at the time of observation
    pub time_remaining_seconds: i64,
}

impl NoteMetadata {
    /// Remaining lifetime as `"<h>h <m>m"`.
    pub fn time_remaining_label(&self) -> String {
        let hours = self.time_remaining_seconds / 3600;
        let minutes = (self.time_remaining_seconds % 3600) / 60;
        format!("{}h {}m", hours, minutes)
    }
}

/// Receipt returned by a successful create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedNote {
    pub id: String,
    pub expires_at: DateTime<Utc>,
    pub ttl_hours: i64,
    pub has_password: bool,
}

/// A note whose content has been revealed. The note no longer exists in
/// the store by the time this value is observed.
pub struct RevealedNote {
    pub content: Zeroizing<String>,
    pub preview: Option<String>,
    pub metadata: NoteMetadata,
    pub destroyed_at: DateTime<Utc>,
}

impl std::fmt::Debug for RevealedNote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevealedNote")
            .field("content", &"[REDACTED]")
            .field("metadata", &self.metadata)
            .field("destroyed_at", &self.destroyed_at)
            .finish()
    }
}

/// Outcome of a non-consuming inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeekOutcome {
    NotFound,
    Expired,
    PasswordRequired,
    Ready(NoteMetadata),
}

/// Outcome of a one-shot read.
#[derive(Debug)]
pub enum TakeOutcome {
    NotFound,
    Expired,
    PasswordRequired,
    InvalidPassword,
    Revealed(RevealedNote),
}

impl TakeOutcome {
    pub fn is_revealed(&self) -> bool {
        matches!(self, TakeOutcome::Revealed(_))
    }
}

/// Outcome of an owner-initiated cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    NotFound,
    Deleted,
}
