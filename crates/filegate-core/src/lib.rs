//! Filegate coordination engine.
//!
//! Simulates distributed mutual exclusion over shared files inside a single
//! process. Clients open a file, write, read and close it; every read and
//! write passes through the same admission protocol before it may touch the
//! file.
//!
//! ## Architecture
//!
//! ```text
//! filegate-core
//!   ├─ Coordinator             (admission protocol for read/write)
//!   │    ├─ LogicalClock       (unique, increasing timestamps)
//!   │    ├─ RequestLedger      (append-only request log, admission lock)
//!   │    ├─ AcknowledgmentGate (per-client notification slots)
//!   │    ├─ FileRegistry       (name -> FileHandle)
//!   │    ├─ AuditLog           (completed operations, one line each)
//!   │    └─ DeferredOperations (labels reported at shutdown)
//!   ├─ Storage                 (load/save collaborator)
//!   └─ Environment             (time source)
//! ```
//!
//! ## Lock domains
//!
//! Four independent locks: the registry map, each file handle, the ledger
//! and the gate. The ledger lock is always the outermost one and is held for
//! the whole of a read or write, so accesses are totally ordered.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod audit;
pub mod clock;
pub mod coordinator;
pub mod deferred;
pub mod env;
pub mod error;
pub mod gate;
pub mod ledger;
pub mod registry;
pub mod storage;

pub use audit::{Action, AuditEntry, AuditLog, AuditSink, MemoryAuditSink};
pub use clock::{LogicalClock, Timestamp};
pub use coordinator::{AckPolicy, Coordinator, CoordinatorConfig, ReadOutcome};
pub use deferred::DeferredOperationQueue;
pub use env::Environment;
pub use error::{AuditError, CoordinatorError, StorageError};
pub use gate::AcknowledgmentGate;
pub use ledger::{Admission, Request, RequestLedger, RequestSummary};
pub use registry::{FileHandle, FileRegistry};
pub use storage::{ChaoticStorage, MemoryStorage, Storage};

/// Caller-assigned client identifier.
pub type ClientId = u64;
