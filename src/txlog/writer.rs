//! Log appender
//!
//! The single background thread that owns the log file while the log is
//! running. It drains the pending-write queue in FIFO order, assigns each
//! record the next sequence number and appends it.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};

use super::EventRecord;
use crate::config::{LogOptions, SyncStrategy};
use crate::error::TabError;

/// Destination the appender writes into
pub(crate) trait LogSink: Write + Send + 'static {
    /// Push written bytes to stable storage
    fn sync(&mut self) -> io::Result<()>;
}

impl LogSink for File {
    fn sync(&mut self) -> io::Result<()> {
        self.sync_data()
    }
}

/// Producer-side handles returned by [`spawn`]
pub(crate) struct AppenderHandles {
    pub events: Sender<EventRecord>,
    pub errors: Receiver<TabError>,
    pub appender: Appender,
}

/// Join handle plus an exit signal, so shutdown can wait with a deadline
pub(crate) struct Appender {
    handle: JoinHandle<()>,
    exited: Receiver<()>,
}

impl Appender {
    /// Wait for the thread to exit; false if it is still running at `timeout`
    ///
    /// The caller must have dropped every event sender first, otherwise the
    /// thread keeps waiting for more records.
    pub fn wait(self, timeout: Duration) -> bool {
        match self.exited.recv_timeout(timeout) {
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(
                    "Appender did not drain within {:?}, detaching it",
                    timeout
                );
                false
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if self.handle.join().is_err() {
                    tracing::error!("Appender thread panicked");
                }
                true
            }
        }
    }
}

/// Start the appender thread
///
/// `last_sequence` is the sequence established by replay; the first
/// appended record gets `last_sequence + 1`. `published` mirrors the last
/// sequence flushed out of the appender's buffer to the sink.
pub(crate) fn spawn<S: LogSink>(
    sink: S,
    last_sequence: u64,
    options: &LogOptions,
    published: Arc<AtomicU64>,
) -> io::Result<AppenderHandles> {
    let (events_tx, events_rx) = channel::bounded(options.queue_capacity);
    let (errors_tx, errors_rx) = channel::bounded(1);
    let (exited_tx, exited_rx) = channel::bounded::<()>(0);

    published.store(last_sequence, Ordering::Release);

    let worker = Worker {
        writer: BufWriter::new(sink),
        events: events_rx,
        errors: errors_tx,
        sync_strategy: options.sync_strategy,
        current: last_sequence,
        unsynced: 0,
        published,
    };

    let handle = thread::Builder::new()
        .name("txlog-appender".into())
        .spawn(move || {
            // Dropped on every exit path, which is what `Appender::wait` observes
            let _exited = exited_tx;
            worker.run();
        })?;

    Ok(AppenderHandles {
        events: events_tx,
        errors: errors_rx,
        appender: Appender {
            handle,
            exited: exited_rx,
        },
    })
}

struct Worker<S: LogSink> {
    writer: BufWriter<S>,
    events: Receiver<EventRecord>,
    errors: Sender<TabError>,
    sync_strategy: SyncStrategy,
    current: u64,
    unsynced: usize,
    published: Arc<AtomicU64>,
}

impl<S: LogSink> Worker<S> {
    fn run(mut self) {
        tracing::debug!("Appender started at sequence {}", self.current);

        while let Ok(record) = self.events.recv() {
            let Some(sequence) = self.current.checked_add(1) else {
                let source = io::Error::new(io::ErrorKind::Other, "sequence space exhausted");
                let sequence = self.current;
                self.fail(sequence, source);
                return;
            };
            if let Err(source) = self.append(record.with_sequence(sequence)) {
                self.fail(sequence, source);
                return;
            }
        }

        // All senders are gone and the queue is drained
        if let Err(source) = self.flush(true) {
            let sequence = self.current;
            self.fail(sequence, source);
            return;
        }
        tracing::debug!("Appender drained at sequence {}", self.current);
    }

    fn append(&mut self, record: EventRecord) -> io::Result<()> {
        self.writer.write_all(record.encode().as_bytes())?;
        self.current = record.sequence;
        self.unsynced += 1;
        tracing::trace!(sequence = record.sequence, key = %record.key, "Appended record");

        let sync = match self.sync_strategy {
            SyncStrategy::OsBuffered => false,
            SyncStrategy::EveryWrite => true,
            SyncStrategy::EveryNEntries { count } => self.unsynced >= count,
        };

        // Batch into one write while more records are already queued
        if sync || self.events.is_empty() {
            self.flush(sync)?;
        }
        Ok(())
    }

    /// Hand buffered bytes to the OS (and to disk when `sync`), then publish
    fn flush(&mut self, sync: bool) -> io::Result<()> {
        self.writer.flush()?;
        if sync && self.unsynced > 0 {
            self.writer.get_mut().sync()?;
            self.unsynced = 0;
        }
        self.published.store(self.current, Ordering::Release);
        Ok(())
    }

    /// Publish the one and only error and stop consuming
    fn fail(&mut self, sequence: u64, source: io::Error) {
        let err = TabError::LogWrite { sequence, source };
        tracing::error!("Transaction log halted: {}", err);
        let _ = self.errors.try_send(err);
    }
}
