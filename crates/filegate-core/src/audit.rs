//! Audit log of completed operations.
//!
//! Each completed read or write produces exactly one line:
//!
//! ```text
//! Client <id> <Action> file <name> at timestamp <ts>
//! ```
//!
//! Lines are appended in completion order, which is also timestamp order
//! because accesses are serialized by the ledger.

use std::{
    fmt,
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
};

use crate::{ClientId, clock::Timestamp, error::AuditError};

/// Kind of file access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Content observed.
    Read,
    /// Content replaced.
    Write,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => f.write_str("Read"),
            Self::Write => f.write_str("Write"),
        }
    }
}

/// One completed operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    /// Client that performed the access.
    pub client_id: ClientId,
    /// Access kind.
    pub action: Action,
    /// File accessed.
    pub file_name: String,
    /// Timestamp allocated at admission.
    pub timestamp: Timestamp,
}

impl fmt::Display for AuditEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Client {} {} file {} at timestamp {}",
            self.client_id, self.action, self.file_name, self.timestamp
        )
    }
}

/// Append-only line sink.
pub trait AuditSink: Send + Sync + 'static {
    /// Append one line. `line` carries no trailing newline.
    fn append_line(&self, line: &str) -> Result<(), AuditError>;
}

/// Sink that keeps lines in memory.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    lines: Mutex<Vec<String>>,
}

impl MemoryAuditSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines appended so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl AuditSink for MemoryAuditSink {
    fn append_line(&self, line: &str) -> Result<(), AuditError> {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner).push(line.to_string());
        Ok(())
    }
}

/// Formats entries and forwards them to a sink.
#[derive(Debug)]
pub struct AuditLog<A> {
    sink: A,
    appended: AtomicUsize,
}

impl<A: AuditSink> AuditLog<A> {
    /// Create a log writing to `sink`.
    pub fn new(sink: A) -> Self {
        Self { sink, appended: AtomicUsize::new(0) }
    }

    /// Record a completed operation.
    ///
    /// A sink failure is logged and otherwise ignored; the operation it
    /// describes has already completed.
    pub fn append(&self, entry: &AuditEntry) {
        self.appended.fetch_add(1, Ordering::AcqRel);
        if let Err(e) = self.sink.append_line(&entry.to_string()) {
            tracing::error!("Failed to append audit entry: {}", e);
        }
    }

    /// Number of entries appended, including ones the sink failed to store.
    pub fn len(&self) -> usize {
        self.appended.load(Ordering::Acquire)
    }

    /// Whether nothing has been appended.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Underlying sink.
    pub fn sink(&self) -> &A {
        &self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenSink;

    impl AuditSink for BrokenSink {
        fn append_line(&self, _line: &str) -> Result<(), AuditError> {
            Err(AuditError::Io(std::io::Error::other("disk full")))
        }
    }

    #[test]
    fn entry_line_format() {
        let entry = AuditEntry {
            client_id: 3,
            action: Action::Write,
            file_name: "file1.txt".to_string(),
            timestamp: 17,
        };
        assert_eq!(entry.to_string(), "Client 3 Write file file1.txt at timestamp 17");
    }

    #[test]
    fn entries_appended_in_call_order() {
        let log = AuditLog::new(MemoryAuditSink::new());
        log.append(&AuditEntry {
            client_id: 1,
            action: Action::Write,
            file_name: "a".to_string(),
            timestamp: 2,
        });
        log.append(&AuditEntry {
            client_id: 2,
            action: Action::Read,
            file_name: "a".to_string(),
            timestamp: 1,
        });

        assert_eq!(log.len(), 2);
        assert_eq!(
            log.sink().lines(),
            vec!["Client 1 Write file a at timestamp 2", "Client 2 Read file a at timestamp 1"]
        );
    }

    #[test]
    fn sink_failure_does_not_panic() {
        let log = AuditLog::new(BrokenSink);
        log.append(&AuditEntry {
            client_id: 1,
            action: Action::Read,
            file_name: "a".to_string(),
            timestamp: 1,
        });
        assert_eq!(log.len(), 1);
    }
}
