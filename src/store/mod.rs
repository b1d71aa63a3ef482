//! Store Module
//!
//! In-memory key-value state rebuilt from the transaction log.
//!
//! ## Responsibilities
//! - Immediate, synchronous reads and writes
//! - Many concurrent readers, a single writer
//! - No durability of its own; the transaction log is replayed into it
//!
//! ## Data Structure Choice
//! HashMap wrapped in a parking_lot RwLock:
//! - No ordering across keys is required
//! - Last write wins per key

mod map;

pub use map::MapStore;

use crate::error::Result;

/// The capability set the transaction log and the service layer need
///
/// Replay drives a store through `put`/`delete` only, so any implementation
/// can be rebuilt from a log.
pub trait Store: Send + Sync {
    /// Insert or overwrite a key
    fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Look up a key, failing with `KeyNotFound` when absent
    fn get(&self, key: &str) -> Result<String>;

    /// Remove a key; removing an absent key succeeds
    fn delete(&self, key: &str) -> Result<()>;
}
