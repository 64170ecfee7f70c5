//! Ephemeral note storage.
//!
//! Notes live only in process memory. Each one is removed exactly once, by
//! whichever of a successful read, expiry detection, a reaper sweep or an
//! explicit cancel gets to it first.
//!
//! ## Layout
//!
//! - **memory**: the `NoteStore` itself
//! - **types**: notes, metadata and operation outcomes
//! - **validation**: content limits, ttl clamping, previews
//! - **stats**: usage counters

pub mod memory;
pub mod stats;
pub mod types;
pub mod validation;

// Re-export public types
pub use memory::NoteStore;
pub use stats::StatsSnapshot;
pub use types::{
    CreatedNote, DeleteOutcome, NewNote, NoteMetadata, PeekOutcome, RevealedNote, TakeOutcome,
};
