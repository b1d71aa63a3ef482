//! Log Recovery
//!
//! Rebuilds state by replaying the transaction log from the beginning.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::{EventKind, EventReader, EventRecord};
use crate::error::{Result, TabError};
use crate::store::Store;

/// Result of a replay or verify pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Number of records accepted
    pub records: u64,

    pub puts: u64,

    pub deletes: u64,

    /// Highest (and last) sequence seen, 0 for an empty log
    pub last_sequence: u64,
}

/// Scan `source` front to back, handing each accepted record to `apply`
///
/// Every record must carry a sequence strictly greater than the one before
/// it (the first must exceed 0). The first decode, read, sequence or apply
/// error aborts the scan; records after it are never applied.
pub fn replay<R, F>(source: R, mut apply: F) -> Result<ReplaySummary>
where
    R: BufRead,
    F: FnMut(&EventRecord) -> Result<()>,
{
    let mut summary = ReplaySummary::default();
    let mut reader = EventReader::new(source);

    while let Some((line, record)) = reader.next_record()? {
        if record.sequence <= summary.last_sequence {
            return Err(TabError::OutOfSequence {
                line,
                previous: summary.last_sequence,
                found: record.sequence,
            });
        }

        apply(&record)?;

        summary.last_sequence = record.sequence;
        summary.records += 1;
        match record.kind {
            EventKind::Put => summary.puts += 1,
            EventKind::Delete => summary.deletes += 1,
        }
    }

    Ok(summary)
}

/// Replay `source` into `store`
pub fn replay_into<R: BufRead>(source: R, store: &dyn Store) -> Result<ReplaySummary> {
    replay(source, |record| apply_record(store, record))
}

/// Apply one record to a store
pub fn apply_record(store: &dyn Store, record: &EventRecord) -> Result<()> {
    match record.kind {
        EventKind::Put => store.put(&record.key, &record.value),
        EventKind::Delete => store.delete(&record.key),
    }
}

/// Check a log file without applying anything
///
/// Runs the same decode and sequence checks as replay. A missing file is
/// an I/O error here; `TransactionLog::open` would create it instead.
pub fn verify(path: &Path) -> Result<ReplaySummary> {
    let file = File::open(path)?;
    replay(BufReader::new(file), |_| Ok(()))
}
