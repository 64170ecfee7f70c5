//! Note id generation.

use uuid::Uuid;

/// Characters of an id that may appear in logs.
pub const LOG_ID_CHARS: usize = 8;

/// Produces opaque, unguessable note ids.
///
/// Implementations must return fixed-length tokens with enough entropy that
/// collisions are negligible at expected load, and must never return an id
/// they have returned before. The store only rejects ids that collide with
/// a live note; it keeps no record of consumed ones, so a generator that
/// repeats itself would reissue a spent id.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Random UUID v4 rendered in simple (32 hex chars) form.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

/// Leading characters of an id, for log fields.
///
/// A full id is enough to read its note, so logs only ever carry this prefix.
pub fn log_id(id: &str) -> &str {
    match id.char_indices().nth(LOG_ID_CHARS) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}
