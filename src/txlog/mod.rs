//! Transaction Log Module
//!
//! Provides durability through an append-only log of store mutations.
//!
//! ## Responsibilities
//! - Replay every record into the store before accepting writes
//! - Reject any sequence regression or duplicate (the only corruption signal)
//! - Append queued records asynchronously, in enqueue order
//! - Report the first append failure on a one-shot error channel
//!
//! ## File Format
//! One UTF-8 line per record, fields separated by a tab:
//! ```text
//! ┌────────────┬──────────┬───────┬─────────┐
//! │ sequence   │ kind     │ key   │ value   │\n
//! │ (u64)      │ 1=Put    │       │ empty   │
//! │            │ 2=Delete │       │ on del  │
//! └────────────┴──────────┴───────┴─────────┘
//! ```
//! The file is only ever appended to; nothing is rewritten or truncated.

mod entry;
mod handle;
mod reader;
pub mod recovery;
mod writer;

pub use entry::{EventKind, EventRecord, FIELD_COUNT, FIELD_SEPARATOR};
pub use handle::{LogState, TransactionLog};
pub use reader::EventReader;
pub use recovery::{replay, replay_into, verify, ReplaySummary};

#[cfg(test)]
pub(crate) use writer::testing;
