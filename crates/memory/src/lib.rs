//! # VANA Memory
//!
//! Knowledge memory recall for the first search tier. Entries are plain text with optional
//! tags; recall is lexical and deterministic so the tier stays cheap enough to query first.

mod error;
mod store;

pub use error::{MemoryError, Result};
pub use store::{MemoryEntry, MemoryHit, MemoryStore};
