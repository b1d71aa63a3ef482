//! Engine Module
//!
//! The service boundary that coordinates the store and the transaction log.
//!
//! ## Responsibilities
//! - Open the log, replaying it into the store, before serving anything
//! - Apply each mutation to the store first, then enqueue its log record
//! - Hand the log's error channel to whoever must escalate failures

use std::sync::Arc;

use crossbeam::channel::Receiver;

use crate::config::Config;
use crate::error::{Result, TabError};
use crate::store::{MapStore, Store};
use crate::txlog::{LogState, ReplaySummary, TransactionLog};

/// The main service engine
///
/// ## Durability Model
///
/// Mutations are visible in the store as soon as `put`/`delete` return, but
/// their log records are only queued. A crash before the appender writes a
/// record loses that mutation on restart even though callers already saw it
/// succeed.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// In-memory state (internal RwLock)
    store: Arc<dyn Store>,

    /// Durable record of every mutation
    log: TransactionLog,
}

impl Engine {
    /// Open an engine over a fresh `MapStore`
    pub fn open(config: Config) -> Result<Self> {
        Self::with_store(config, Arc::new(MapStore::new()))
    }

    /// Open an engine over a caller-supplied store
    ///
    /// The store should be empty; the log's history is replayed on top of
    /// whatever it already holds.
    pub fn with_store(config: Config, store: Arc<dyn Store>) -> Result<Self> {
        config.validate()?;

        if let Some(parent) = config.log_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let log = TransactionLog::open(&config.log_path, store.as_ref(), config.log_options())?;

        Ok(Self { config, store, log })
    }

    #[cfg(test)]
    pub(crate) fn from_parts(config: Config, store: Arc<dyn Store>, log: TransactionLog) -> Self {
        Self { config, store, log }
    }

    /// Get a value by key
    pub fn get(&self, key: &str) -> Result<String> {
        Self::check_key(key)?;
        self.store.get(key)
    }

    /// Put a key-value pair
    ///
    /// Steps:
    /// 1. Write to the store
    /// 2. Enqueue a Put record (may block while the queue is full)
    pub fn put(&self, key: &str, value: &str) -> Result<()> {
        Self::check_key(key)?;
        self.store.put(key, value)?;
        self.log.write_put(key, value)
    }

    /// Delete a key
    ///
    /// Steps:
    /// 1. Remove from the store
    /// 2. Enqueue a Delete record
    pub fn delete(&self, key: &str) -> Result<()> {
        Self::check_key(key)?;
        self.store.delete(key)?;
        self.log.write_delete(key)
    }

    fn check_key(key: &str) -> Result<()> {
        if key.is_empty() {
            return Err(TabError::InvalidKey);
        }
        Ok(())
    }

    /// Receiver that yields the log's append failure, if one ever happens
    pub fn failures(&self) -> Receiver<TabError> {
        self.log.errors()
    }

    /// Close the transaction log, draining queued records
    pub fn close(&self) -> Result<()> {
        self.log.close()
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub fn log_state(&self) -> LogState {
        self.log.state()
    }

    /// Last sequence number replayed or appended
    pub fn current_sequence(&self) -> u64 {
        self.log.current_sequence()
    }

    pub fn replay_summary(&self) -> ReplaySummary {
        self.log.replay_summary()
    }
}
