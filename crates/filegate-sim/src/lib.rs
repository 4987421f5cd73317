//! Filegate simulation runner.
//!
//! Drives the coordination engine through the shared-file scenario: one task
//! per client, every client opening the same file, writing its own content,
//! reading it back and closing it. Provides the I/O collaborators
//! the engine leaves external:
//!
//! ```text
//! filegate-sim
//!   ├─ Simulation        (spawns client tasks, collects spans)
//!   ├─ FsStorage         (files under a data directory)
//!   ├─ FileAuditSink     (append-only audit log file)
//!   ├─ SpaceTimeDiagram  (per-client timing report)
//!   ├─ report            (deferred operation listing, client count prompt)
//!   └─ SystemEnv         (wall-clock Environment)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod audit_file;
mod diagram;
mod error;
mod fs_storage;
pub mod report;
mod runner;
mod system_env;

pub use audit_file::FileAuditSink;
pub use diagram::{ClientSpan, SpaceTimeDiagram};
pub use error::SimError;
use filegate_core::{AckPolicy, ClientId, CoordinatorConfig};
pub use fs_storage::FsStorage;
pub use runner::{RunReport, Simulation};
pub use system_env::SystemEnv;

/// Default shared file every client targets.
pub const DEFAULT_FILE_NAME: &str = "file1.txt";

/// Simulation configuration.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Number of clients; ids are `1..=client_count`.
    pub client_count: usize,
    /// File every client opens.
    pub file_name: String,
    /// Acknowledgment policy passed to the coordinator.
    pub ack_policy: AckPolicy,
}

impl SimConfig {
    /// Coordinator configuration for this run.
    pub fn coordinator_config(&self) -> CoordinatorConfig {
        CoordinatorConfig { client_count: self.client_count, ack_policy: self.ack_policy }
    }

    /// Content written by `client_id`.
    pub fn content_for(client_id: ClientId) -> String {
        format!("Content written by Client {client_id}")
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            client_count: 3,
            file_name: DEFAULT_FILE_NAME.to_string(),
            ack_policy: AckPolicy::default(),
        }
    }
}
