//! Transaction log handle
//!
//! Ties together the file, replay and the background appender.

use std::fmt;
use std::fs::OpenOptions;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam::channel::{Receiver, Sender};
use parking_lot::{Mutex, RwLock};

use super::recovery::{self, ReplaySummary};
use super::writer::{self, Appender, LogSink};
use super::EventRecord;
use crate::config::LogOptions;
use crate::error::{Result, TabError};
use crate::store::Store;

/// Lifecycle of a transaction log
///
/// `Opening` and `Replaying` only exist inside [`TransactionLog::open`]; a
/// handle is never observed in them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogState {
    Closed,
    Opening,
    Replaying,
    Running,
}

impl fmt::Display for LogState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogState::Closed => "closed",
            LogState::Opening => "opening",
            LogState::Replaying => "replaying",
            LogState::Running => "running",
        };
        f.write_str(name)
    }
}

/// Append-only, replayable log of store mutations
///
/// ## Concurrency Model
///
/// - Any number of callers enqueue through `write_put` / `write_delete`
/// - One appender thread owns the file and the sequence counter
/// - Enqueue blocks only while the bounded queue is full
///
/// Enqueueing is fire-and-forget: returning `Ok` means the record is queued,
/// not that it is on disk. Append failures arrive once on [`errors`].
///
/// [`errors`]: TransactionLog::errors
pub struct TransactionLog {
    path: PathBuf,

    /// `None` once closed
    events: RwLock<Option<Sender<EventRecord>>>,

    errors: Receiver<TabError>,

    appender: Mutex<Option<Appender>>,

    /// Last sequence written by replay or the appender
    sequence: Arc<AtomicU64>,

    replayed: ReplaySummary,

    close_timeout: Duration,
}

impl TransactionLog {
    /// Open (or create) the log at `path` and replay it into `store`
    ///
    /// Fails without returning a handle if any line is malformed, out of
    /// sequence, or unreadable; the store may then hold a partial replay
    /// and should be discarded.
    pub fn open(path: &Path, store: &dyn Store, options: LogOptions) -> Result<Self> {
        if options.queue_capacity == 0 {
            return Err(TabError::Config("queue capacity must be at least 1".into()));
        }

        tracing::info!("Transaction log {}: {}", LogState::Opening, path.display());
        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)?;

        tracing::info!("Transaction log {}: {}", LogState::Replaying, path.display());
        let replayed = match recovery::replay_into(BufReader::new(&file), store) {
            Ok(summary) => summary,
            Err(e) => {
                tracing::error!("Replay of {} failed: {}", path.display(), e);
                return Err(e);
            }
        };
        tracing::info!(
            "Replayed {} records ({} puts, {} deletes), last sequence {}",
            replayed.records,
            replayed.puts,
            replayed.deletes,
            replayed.last_sequence
        );

        Self::start(path, file, replayed, options)
    }

    /// Run the appender over `sink`, continuing after `replayed`
    pub(crate) fn start<S: LogSink>(
        path: &Path,
        sink: S,
        replayed: ReplaySummary,
        options: LogOptions,
    ) -> Result<Self> {
        let sequence = Arc::new(AtomicU64::new(replayed.last_sequence));
        let handles = writer::spawn(sink, replayed.last_sequence, &options, Arc::clone(&sequence))?;

        tracing::info!("Transaction log {}: {}", LogState::Running, path.display());
        Ok(Self {
            path: path.to_path_buf(),
            events: RwLock::new(Some(handles.events)),
            errors: handles.errors,
            appender: Mutex::new(Some(handles.appender)),
            sequence,
            replayed,
            close_timeout: options.close_timeout,
        })
    }

    /// Queue a Put record
    pub fn write_put(&self, key: &str, value: &str) -> Result<()> {
        self.enqueue(EventRecord::put(key, value))
    }

    /// Queue a Delete record
    pub fn write_delete(&self, key: &str) -> Result<()> {
        self.enqueue(EventRecord::delete(key))
    }

    fn enqueue(&self, record: EventRecord) -> Result<()> {
        // An empty key would be written fine but could never be replayed
        if record.key.is_empty() {
            return Err(TabError::InvalidKey);
        }

        let events = self.events.read();
        let sender = events.as_ref().ok_or(TabError::AlreadyClosed)?;
        sender.send(record).map_err(|_| TabError::LogHalted)
    }

    /// Receiver for the single append failure this log can report
    pub fn errors(&self) -> Receiver<TabError> {
        self.errors.clone()
    }

    /// Stop accepting writes, drain the queue and release the file
    ///
    /// Waits up to the configured close timeout. A second call returns
    /// `AlreadyClosed`.
    pub fn close(&self) -> Result<()> {
        let sender = self.events.write().take().ok_or(TabError::AlreadyClosed)?;
        drop(sender);

        if let Some(appender) = self.appender.lock().take() {
            appender.wait(self.close_timeout);
        }

        tracing::info!(
            "Transaction log {} at sequence {}: {}",
            LogState::Closed,
            self.current_sequence(),
            self.path.display()
        );
        Ok(())
    }

    pub fn state(&self) -> LogState {
        if self.events.read().is_some() {
            LogState::Running
        } else {
            LogState::Closed
        }
    }

    /// Last sequence number replayed or appended
    pub fn current_sequence(&self) -> u64 {
        self.sequence.load(Ordering::Acquire)
    }

    /// What replay found when the log was opened
    pub fn replay_summary(&self) -> ReplaySummary {
        self.replayed
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TransactionLog {
    fn drop(&mut self) {
        if self.state() == LogState::Running {
            let _ = self.close();
        }
    }
}
