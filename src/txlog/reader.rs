//! Event reader
//!
//! Decodes event records line by line from the transaction log.

use std::io::BufRead;

use super::EventRecord;
use crate::error::{Result, TabError};

/// Reads records from any buffered source
pub struct EventReader<R> {
    source: R,
    line: u64,
    buf: Vec<u8>,
    finished: bool,
}

impl<R: BufRead> EventReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            line: 0,
            buf: Vec::new(),
            finished: false,
        }
    }

    /// Number of lines consumed so far
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Read the next record together with its 1-based line number
    ///
    /// I/O failures surface as `LogRead`, undecodable lines (including
    /// invalid UTF-8 and a last line missing its `\n`) as `MalformedRecord`.
    pub fn next_record(&mut self) -> Result<Option<(u64, EventRecord)>> {
        self.buf.clear();
        let read = self
            .source
            .read_until(b'\n', &mut self.buf)
            .map_err(|source| TabError::LogRead {
                line: self.line + 1,
                source,
            })?;
        if read == 0 {
            return Ok(None);
        }
        self.line += 1;

        // A torn final append; accepting it would let the next append run on
        // from the partial line
        if self.buf.last() != Some(&b'\n') {
            return Err(TabError::MalformedRecord {
                line: self.line,
                reason: "unterminated record".into(),
            });
        }

        let text = std::str::from_utf8(&self.buf).map_err(|e| TabError::MalformedRecord {
            line: self.line,
            reason: format!("invalid UTF-8: {}", e),
        })?;
        let record = EventRecord::decode(self.line, text)?;
        Ok(Some((self.line, record)))
    }
}

impl<R: BufRead> Iterator for EventReader<R> {
    type Item = Result<(u64, EventRecord)>;

    /// Stops after the first error
    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_record() {
            Ok(Some(item)) => Some(Ok(item)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}
