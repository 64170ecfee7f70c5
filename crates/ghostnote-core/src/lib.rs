//! # Ghostnote Core
//!
//! Core library for Ghostnote - self-destructing secret notes.
//!
//! A note can be read exactly once, or never, before its time-to-live runs
//! out. This crate holds everything with real correctness hazards: the
//! in-memory store, its expiry rules, password gating and usage counters.
//! Transport and presentation live in `ghostnote-cli`.
//!
//! ## Architecture
//!
//! - **storage**: `NoteStore`, note types, validation and stats
//! - **gate**: password hashing and verification (Argon2id)
//! - **reaper**: background sweep of expired notes
//! - **clock**: time sources
//! - **id**: opaque note id generation

pub mod clock;
pub mod error;
pub mod gate;
pub mod id;
pub mod reaper;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{GhostError, Result};
pub use gate::{AccessGate, Argon2Gate, HasherParams};
pub use id::{log_id, IdGenerator, UuidIdGenerator};
pub use reaper::{ExpiryReaper, ReaperHandle, DEFAULT_SWEEP_INTERVAL};
pub use storage::{
    CreatedNote, DeleteOutcome, NewNote, NoteMetadata, NoteStore, PeekOutcome, RevealedNote,
    StatsSnapshot, TakeOutcome,
};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
