//! # TabKV
//!
//! A single-node key-value store with:
//! - An append-only, tab-separated transaction log for durability
//! - Replay on startup with strict sequence-number checking
//! - Asynchronous, order-preserving appends from a single background thread
//! - An HTTP API (`/v1/{key}`)
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     HTTP Server (axum)                       │
//! │                 PUT / GET / DELETE /v1/{key}                 │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        Engine                                │
//! │          (store first, then enqueue log record)              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌────────────────┐
//!   │  MapStore   │          │ TransactionLog │
//!   │  (RwLock)   │          │ (bounded queue)│
//!   └─────────────┘          └───────┬────────┘
//!                                    │
//!                                    ▼
//!                            ┌──────────────┐
//!                            │   Appender   │
//!                            │   (thread)   │
//!                            └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod store;
pub mod txlog;
pub mod network;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{TabError, Result};
pub use config::{Config, LogOptions, SyncStrategy};
pub use engine::Engine;
pub use store::{MapStore, Store};
pub use txlog::{EventKind, EventRecord, LogState, TransactionLog};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of TabKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
