//! Event record definitions
//!
//! Defines the durable unit of the transaction log and its one-line text
//! encoding: `<sequence>\t<kind>\t<key>\t<value>\n`.

use crate::error::{Result, TabError};

/// Field separator inside a record line
pub const FIELD_SEPARATOR: char = '\t';

/// Number of fields in every record line
pub const FIELD_COUNT: usize = 4;

/// Operations that can be logged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Put a key-value pair
    Put,

    /// Delete a key
    Delete,
}

impl EventKind {
    /// On-disk code. 0 is reserved and never written.
    pub fn code(self) -> u32 {
        match self {
            EventKind::Put => 1,
            EventKind::Delete => 2,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(EventKind::Put),
            2 => Some(EventKind::Delete),
            _ => None,
        }
    }
}

/// A single record in the transaction log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    /// Assigned by the log's appender; 0 until then
    pub sequence: u64,

    /// The operation to perform
    pub kind: EventKind,

    pub key: String,

    /// Empty for deletes
    pub value: String,
}

impl EventRecord {
    /// Build an unsequenced Put record
    pub fn put(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            sequence: 0,
            kind: EventKind::Put,
            key: key.into(),
            value: value.into(),
        }
    }

    /// Build an unsequenced Delete record
    pub fn delete(key: impl Into<String>) -> Self {
        Self {
            sequence: 0,
            kind: EventKind::Delete,
            key: key.into(),
            value: String::new(),
        }
    }

    /// Same record with the given sequence number
    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    /// Encode as one newline-terminated line
    pub fn encode(&self) -> String {
        let mut line = String::with_capacity(24 + self.key.len() + self.value.len());
        line.push_str(&self.sequence.to_string());
        line.push(FIELD_SEPARATOR);
        line.push_str(&self.kind.code().to_string());
        line.push(FIELD_SEPARATOR);
        escape_into(&mut line, &self.key);
        line.push(FIELD_SEPARATOR);
        if self.kind == EventKind::Put {
            escape_into(&mut line, &self.value);
        }
        line.push('\n');
        line
    }

    /// Decode one line; `line_number` is 1-based and only used for errors
    pub fn decode(line_number: u64, line: &str) -> Result<Self> {
        let malformed = |reason: String| TabError::MalformedRecord {
            line: line_number,
            reason,
        };

        let line = line
            .strip_suffix('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .unwrap_or(line);

        let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
        if fields.len() != FIELD_COUNT {
            return Err(malformed(format!(
                "expected {} fields, found {}",
                FIELD_COUNT,
                fields.len()
            )));
        }

        let sequence = parse_digits::<u64>(fields[0])
            .ok_or_else(|| malformed(format!("invalid sequence '{}'", fields[0])))?;

        let code = parse_digits::<u32>(fields[1])
            .ok_or_else(|| malformed(format!("invalid kind '{}'", fields[1])))?;
        let kind = EventKind::from_code(code)
            .ok_or_else(|| malformed(format!("unknown kind {}", code)))?;

        let key = unescape(fields[2]).map_err(&malformed)?;
        if key.is_empty() {
            return Err(malformed("empty key".into()));
        }

        let value = match kind {
            EventKind::Put => unescape(fields[3]).map_err(&malformed)?,
            EventKind::Delete => String::new(),
        };

        Ok(Self {
            sequence,
            kind,
            key,
            value,
        })
    }
}

/// Unsigned integer written as plain ASCII digits (no sign, no spaces)
fn parse_digits<T: std::str::FromStr>(field: &str) -> Option<T> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

// =============================================================================
// Field Escaping
// =============================================================================

fn escape_into(out: &mut String, field: &str) {
    for c in field.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
}

fn unescape(field: &str) -> std::result::Result<String, String> {
    if !field.contains('\\') {
        return Ok(field.to_owned());
    }

    let mut out = String::with_capacity(field.len());
    let mut chars = field.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => return Err(format!("unknown escape '\\{}'", other)),
            None => return Err("dangling escape at end of field".into()),
        }
    }
    Ok(out)
}
