//! In-memory note store.
//!
//! All notes and counters live behind one mutex. Every removal of a note
//! happens while that mutex is held, which is what makes each id removable
//! exactly once no matter how many readers, cancellers and sweeps race on it.
//! Password hashing and verification never run under the mutex.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use super::stats::{StatsCounter, StatsSnapshot};
use super::types::{
    CreatedNote, DeleteOutcome, NewNote, Note, PeekOutcome, RevealedNote, TakeOutcome,
};
use super::validation::{clamp_ttl, derive_preview, normalize_password, validate_content};
use crate::clock::{Clock, SystemClock};
use crate::error::{GhostError, Result};
use crate::gate::AccessGate;
use crate::id::{log_id, IdGenerator, UuidIdGenerator};

/// How many fresh ids to try before giving up on a create.
const MAX_ID_ATTEMPTS: usize = 8;

#[derive(Default)]
struct StoreState {
    notes: HashMap<String, Note>,
    stats: StatsCounter,
}

impl StoreState {
    fn expire(&mut self, id: &str) {
        if self.notes.remove(id).is_some() {
            self.stats.record_expired(1);
            debug!(id = log_id(id), "Note expired on access");
        }
    }

    fn reveal(&mut self, id: &str, now: DateTime<Utc>) -> Option<RevealedNote> {
        let note = self.notes.remove(id)?;
        self.stats.record_viewed();
        debug!(id = log_id(id), "Note revealed and destroyed");
        Some(note.reveal(now))
    }
}

/// The canonical store of ephemeral notes.
///
/// Construct one per service and share it behind an `Arc`.
pub struct NoteStore {
    state: Mutex<StoreState>,
    gate: Arc<dyn AccessGate>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl NoteStore {
    /// Create an empty store using the system clock and UUID ids.
    pub fn new(gate: Arc<dyn AccessGate>) -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
            gate,
            clock: Arc::new(SystemClock),
            ids: Arc::new(UuidIdGenerator),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Store a new note.
    ///
    /// The ttl is clamped into the supported range. A blank password means
    /// the note is not gated.
    ///
    /// # Errors
    ///
    /// Returns `GhostError::Validation` if the content is empty, blank or too
    /// long, and `GhostError::Internal` if hashing the password fails or no
    /// unused id could be generated.
    pub fn put(&self, new: NewNote) -> Result<CreatedNote> {
        let NewNote {
            content,
            ttl,
            password,
        } = new;

        validate_content(&content)?;
        let ttl = clamp_ttl(ttl);
        let preview = derive_preview(&content);

        let password_digest = match normalize_password(password.as_deref().map(String::as_str)) {
            Some(plain) => Some(self.gate.hash(plain)?),
            None => None,
        };
        let has_password = password_digest.is_some();

        let mut state = self.state.lock();
        let id = self.unused_id(&state.notes)?;
        let created_at = self.clock.now();
        let expires_at = created_at + ttl;

        state.notes.insert(
            id.clone(),
            Note {
                id: id.clone(),
                content: Zeroizing::new(content),
                created_at,
                expires_at,
                password_digest,
                preview,
            },
        );
        state.stats.record_created();

        debug!(id = log_id(&id), ttl_hours = ttl.num_hours(), has_password, "Note stored");

        Ok(CreatedNote {
            id,
            expires_at,
            ttl_hours: ttl.num_hours(),
            has_password,
        })
    }

    /// Inspect a note without consuming it.
    ///
    /// Detecting expiry is destructive: an expired note is removed and
    /// counted as expired.
    pub fn peek(&self, id: &str) -> PeekOutcome {
        let mut state = self.state.lock();
        let now = self.clock.now();

        let outcome = match state.notes.get(id) {
            None => PeekOutcome::NotFound,
            Some(note) if note.is_expired(now) => PeekOutcome::Expired,
            Some(note) if note.password_digest.is_some() => PeekOutcome::PasswordRequired,
            Some(note) => PeekOutcome::Ready(note.metadata(now)),
        };
        if outcome == PeekOutcome::Expired {
            state.expire(id);
        }
        outcome
    }

    /// Reveal a note's content exactly once.
    ///
    /// On success the note is gone before this returns. `PasswordRequired`
    /// and `InvalidPassword` leave the note in place. A password supplied
    /// for an ungated note is ignored.
    ///
    /// # Errors
    ///
    /// Returns `GhostError::Internal` only if password verification itself
    /// fails; the note is left in place in that case.
    pub fn take(&self, id: &str, password: Option<&str>) -> Result<TakeOutcome> {
        let password = normalize_password(password);

        let digest = {
            let mut state = self.state.lock();
            let now = self.clock.now();

            let (expired, digest) = match state.notes.get(id) {
                Some(note) => (note.is_expired(now), note.password_digest.clone()),
                None => return Ok(TakeOutcome::NotFound),
            };
            if expired {
                state.expire(id);
                return Ok(TakeOutcome::Expired);
            }
            match digest {
                None => {
                    return Ok(state
                        .reveal(id, now)
                        .map_or(TakeOutcome::NotFound, TakeOutcome::Revealed));
                }
                Some(_) if password.is_none() => return Ok(TakeOutcome::PasswordRequired),
                Some(digest) => digest,
            }
        };

        let Some(plain) = password else {
            return Ok(TakeOutcome::PasswordRequired);
        };
        if !self.gate.verify(plain, &digest)? {
            debug!(id = log_id(id), "Rejected note password");
            return Ok(TakeOutcome::InvalidPassword);
        }

        // The note may have been consumed, cancelled or swept while the
        // password was being checked; only the holder of the lock decides.
        let mut state = self.state.lock();
        let now = self.clock.now();
        let expired = match state.notes.get(id) {
            Some(note) => note.is_expired(now),
            None => return Ok(TakeOutcome::NotFound),
        };
        if expired {
            state.expire(id);
            return Ok(TakeOutcome::Expired);
        }
        Ok(state
            .reveal(id, now)
            .map_or(TakeOutcome::NotFound, TakeOutcome::Revealed))
    }

    /// Cancel a note unconditionally. Idempotent.
    pub fn delete(&self, id: &str) -> DeleteOutcome {
        let mut state = self.state.lock();
        if state.notes.remove(id).is_none() {
            return DeleteOutcome::NotFound;
        }
        state.stats.record_cancelled();
        debug!(id = log_id(id), "Note cancelled");
        DeleteOutcome::Deleted
    }

    /// Remove every note whose expiry has passed, as one batch.
    ///
    /// Driven by [`crate::ExpiryReaper`]; request paths rely on lazy expiry
    /// detection instead.
    pub fn sweep(&self) -> usize {
        let mut state = self.state.lock();
        let now = self.clock.now();

        let before = state.notes.len();
        state.notes.retain(|_, note| !note.is_expired(now));
        let removed = before - state.notes.len();
        state.stats.record_expired(removed as u64);

        removed
    }

    /// Counter snapshot, consistent with the store contents at one instant.
    pub fn stats(&self) -> StatsSnapshot {
        let state = self.state.lock();
        state.stats.snapshot(state.notes.len())
    }

    /// Number of live notes.
    pub fn len(&self) -> usize {
        self.state.lock().notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn unused_id(&self, notes: &HashMap<String, Note>) -> Result<String> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.ids.generate();
            if !notes.contains_key(&id) {
                return Ok(id);
            }
            warn!("Generated note id collided with a live note; retrying");
        }
        Err(GhostError::Internal(
            "Could not generate an unused note id".to_string(),
        ))
    }
}

impl std::fmt::Debug for NoteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteStore")
            .field("notes", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::gate::{Argon2Gate, HasherParams};
    use chrono::Duration;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn cheap_gate() -> Arc<dyn AccessGate> {
        Arc::new(
            Argon2Gate::new(HasherParams {
                memory_kib: 256,
                iterations: 1,
                parallelism: 1,
            })
            .unwrap(),
        )
    }

    /// Always returns the same id.
    struct FixedIds;

    impl IdGenerator for FixedIds {
        fn generate(&self) -> String {
            "fixed".to_string()
        }
    }

    /// Yields "dup" for the first three calls, then "id-<n>".
    #[derive(Default)]
    struct CollidingIds(AtomicUsize);

    impl IdGenerator for CollidingIds {
        fn generate(&self) -> String {
            let n = self.0.fetch_add(1, Ordering::SeqCst);
            if n < 3 {
                "dup".to_string()
            } else {
                format!("id-{}", n)
            }
        }
    }

    #[test]
    fn test_put_reports_receipt() {
        let store = NoteStore::new(cheap_gate());
        let created = store
            .put(NewNote::new("hello").with_ttl_hours(5).with_password("pw"))
            .unwrap();

        assert_eq!(created.ttl_hours, 5);
        assert!(created.has_password);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_put_rejects_bad_content_without_counting() {
        let store = NoteStore::new(cheap_gate());
        let err = store.put(NewNote::new("   ")).unwrap_err();
        assert!(err.is_validation());

        let err = store
            .put(NewNote::new("a".repeat(10_001)))
            .unwrap_err();
        assert!(err.is_validation());

        assert_eq!(store.stats().total_notes, 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_blank_password_means_no_gate() {
        let store = NoteStore::new(cheap_gate());
        let created = store
            .put(NewNote::new("open").with_password("   "))
            .unwrap();
        assert!(!created.has_password);
        assert!(matches!(store.peek(&created.id), PeekOutcome::Ready(_)));
    }

    #[test]
    fn test_content_stored_verbatim() {
        let store = NoteStore::new(cheap_gate());
        let created = store.put(NewNote::new("  padded\n")).unwrap();

        match store.take(&created.id, None).unwrap() {
            TakeOutcome::Revealed(note) => assert_eq!(note.content.as_str(), "  padded\n"),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_password_is_trimmed_on_both_sides() {
        let store = NoteStore::new(cheap_gate());
        let created = store
            .put(NewNote::new("gated").with_password("  pw "))
            .unwrap();

        assert!(store.take(&created.id, Some("pw  ")).unwrap().is_revealed());
    }

    #[test]
    fn test_password_ignored_for_ungated_note() {
        let store = NoteStore::new(cheap_gate());
        let created = store.put(NewNote::new("open")).unwrap();
        assert!(store
            .take(&created.id, Some("anything"))
            .unwrap()
            .is_revealed());
    }

    #[test]
    fn test_blank_password_on_gated_note_is_password_required() {
        let store = NoteStore::new(cheap_gate());
        let created = store
            .put(NewNote::new("gated").with_password("pw"))
            .unwrap();

        assert!(matches!(
            store.take(&created.id, Some("  ")).unwrap(),
            TakeOutcome::PasswordRequired
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_reveal_carries_preview_and_metadata() {
        let clock = Arc::new(ManualClock::default());
        let store = NoteStore::new(cheap_gate()).with_clock(clock.clone());
        let content = "z".repeat(60);
        let created = store
            .put(NewNote::new(content.clone()).with_ttl_hours(3))
            .unwrap();

        clock.advance(Duration::minutes(90));
        match store.take(&created.id, None).unwrap() {
            TakeOutcome::Revealed(note) => {
                assert_eq!(note.content.as_str(), content);
                assert_eq!(note.preview, Some("z".repeat(50)));
                assert_eq!(note.metadata.id, created.id);
                assert_eq!(note.metadata.expires_at, created.expires_at);
                assert_eq!(note.metadata.time_remaining_label(), "1h 30m");
                assert_eq!(note.destroyed_at, clock.now());
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_peek_ready_has_no_content() {
        let store = NoteStore::new(cheap_gate());
        let created = store.put(NewNote::new("x".repeat(80))).unwrap();

        match store.peek(&created.id) {
            PeekOutcome::Ready(meta) => {
                assert_eq!(meta.id, created.id);
                assert!(!meta.has_password);
                let json = serde_json::to_string(&meta).unwrap();
                assert!(!json.contains("xxxx"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(store.stats().total_views, 0);
    }

    #[test]
    fn test_id_collision_retries() {
        let store =
            NoteStore::new(cheap_gate()).with_id_generator(Arc::new(CollidingIds::default()));
        let first = store.put(NewNote::new("a")).unwrap();
        let second = store.put(NewNote::new("b")).unwrap();

        assert_eq!(first.id, "dup");
        assert_eq!(second.id, "id-3");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_id_exhaustion_is_internal_error() {
        let store = NoteStore::new(cheap_gate()).with_id_generator(Arc::new(FixedIds));
        store.put(NewNote::new("a")).unwrap();

        let err = store.put(NewNote::new("b")).unwrap_err();
        assert!(matches!(err, GhostError::Internal(_)));

        let stats = store.stats();
        assert_eq!(stats.total_notes, 1);
        assert!(stats.is_balanced());
    }

    #[test]
    fn test_delete_counts_cancellation() {
        let store = NoteStore::new(cheap_gate());
        let created = store.put(NewNote::new("bye")).unwrap();

        assert_eq!(store.delete(&created.id), DeleteOutcome::Deleted);
        assert_eq!(store.delete(&created.id), DeleteOutcome::NotFound);

        let stats = store.stats();
        assert_eq!(stats.cancelled_notes, 1);
        assert_eq!(stats.total_views, 0);
        assert_eq!(stats.expired_notes, 0);
        assert!(stats.is_balanced());
    }
}
