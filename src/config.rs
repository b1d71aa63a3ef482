//! Configuration for TabKV
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Result, TabError};

/// Main configuration for a TabKV instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Transaction Log Configuration
    // -------------------------------------------------------------------------
    /// Path of the append-only transaction log
    pub log_path: PathBuf,

    /// Capacity of the pending-write queue in front of the appender
    pub queue_capacity: usize,

    /// Sync strategy: how often to fsync the log
    pub sync_strategy: SyncStrategy,

    /// How long `close` waits for queued records to drain (milliseconds)
    pub close_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// HTTP listen address
    pub listen_addr: String,
}

/// Log sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// Hand records to the OS, never fsync
    OsBuffered,

    /// fsync after every record (safest, slowest)
    EveryWrite,

    /// fsync after N appended records (balanced durability/performance)
    EveryNEntries { count: usize },
}

impl FromStr for SyncStrategy {
    type Err = TabError;

    /// Parses `os`, `every-write` or `every-n:<N>`
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "os" => Ok(SyncStrategy::OsBuffered),
            "every-write" => Ok(SyncStrategy::EveryWrite),
            other => {
                let count = other
                    .strip_prefix("every-n:")
                    .and_then(|n| n.parse::<usize>().ok())
                    .filter(|n| *n > 0)
                    .ok_or_else(|| TabError::Config(format!("unknown sync strategy '{}'", other)))?;
                Ok(SyncStrategy::EveryNEntries { count })
            }
        }
    }
}

/// The subset of configuration the transaction log itself consumes
#[derive(Debug, Clone, Copy)]
pub struct LogOptions {
    pub queue_capacity: usize,
    pub sync_strategy: SyncStrategy,
    pub close_timeout: Duration,
}

impl Default for LogOptions {
    fn default() -> Self {
        Config::default().log_options()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("./transactions.log"),
            queue_capacity: 16,
            sync_strategy: SyncStrategy::OsBuffered,
            close_timeout_ms: 5000,
            listen_addr: "127.0.0.1:8080".to_string(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject values the log cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(TabError::Config("queue capacity must be at least 1".into()));
        }
        if let SyncStrategy::EveryNEntries { count: 0 } = self.sync_strategy {
            return Err(TabError::Config("sync entry count must be at least 1".into()));
        }
        Ok(())
    }

    pub fn log_options(&self) -> LogOptions {
        LogOptions {
            queue_capacity: self.queue_capacity,
            sync_strategy: self.sync_strategy,
            close_timeout: Duration::from_millis(self.close_timeout_ms),
        }
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the transaction log path
    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.log_path = path.into();
        self
    }

    /// Set the pending-write queue capacity
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    /// Set the log sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    /// Set the close drain timeout (in milliseconds)
    pub fn close_timeout_ms(mut self, ms: u64) -> Self {
        self.config.close_timeout_ms = ms;
        self
    }

    /// Set the HTTP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
