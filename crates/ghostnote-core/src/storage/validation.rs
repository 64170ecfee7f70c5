//! Input validation and derived fields for new notes.

use chrono::Duration;

use crate::error::{GhostError, Result};

/// Maximum content length in characters.
pub const MAX_CONTENT_CHARS: usize = 10_000;

/// Content longer than this gets a preview of exactly this many characters.
pub const PREVIEW_CHARS: usize = 50;

pub const MIN_TTL_HOURS: i64 = 1;
pub const MAX_TTL_HOURS: i64 = 72;
pub const DEFAULT_TTL_HOURS: i64 = 1;

/// Validate note content.
///
/// - Not empty or only whitespace
/// - At most `MAX_CONTENT_CHARS` characters
pub fn validate_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(GhostError::Validation(
            "Content is required and must be a non-empty string".to_string(),
        ));
    }

    let chars = content.chars().count();
    if chars > MAX_CONTENT_CHARS {
        return Err(GhostError::Validation(format!(
            "Content must be at most {} characters (got {})",
            MAX_CONTENT_CHARS, chars
        )));
    }

    Ok(())
}

/// Clamp a ttl into `[MIN_TTL_HOURS, MAX_TTL_HOURS]`.
pub fn clamp_ttl(ttl: Duration) -> Duration {
    ttl.clamp(Duration::hours(MIN_TTL_HOURS), Duration::hours(MAX_TTL_HOURS))
}

/// Ttl for a whole number of hours, clamped.
pub fn ttl_from_hours(hours: i64) -> Duration {
    Duration::hours(hours.clamp(MIN_TTL_HOURS, MAX_TTL_HOURS))
}

/// First `PREVIEW_CHARS` characters, only for content longer than that.
pub fn derive_preview(content: &str) -> Option<String> {
    let mut chars = content.chars();
    let preview: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        Some(preview)
    } else {
        None
    }
}

/// Trim a supplied password; blank means no password at all.
pub fn normalize_password(password: Option<&str>) -> Option<&str> {
    password.map(str::trim).filter(|p| !p.is_empty())
}
