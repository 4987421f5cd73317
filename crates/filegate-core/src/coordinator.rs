//! Access Coordinator
//!
//! Runs the admission protocol in front of every read and write.
//!
//! ## Responsibilities
//!
//! - File Lifecycle: open (first open loads from storage) and close
//! - Admission: timestamp and record each access in the ledger
//! - Peer Notification: notify every other client with a request in the
//!   ledger, then poll the acknowledgment gate once per such request
//! - Mutation: replace content under the file lock, then persist
//! - Bookkeeping: audit line and deferred label for each completed access
//!
//! ## Protocol
//!
//! ```text
//! read/write(client, file)
//!   1. lock ledger                  (held until step 7)
//!   2. ts = clock.next(); ledger.append(client, file, ts)
//!   3. for each request r with r.client != client: spawn notify(r.client)
//!   4. for each such request:       gate.all_acknowledged(ledger.len())
//!   5. write: lock file, replace content, unlock, storage.save
//!      read:  lock file, copy content, unlock
//!   6. audit.append; deferred.append
//!   7. unlock ledger
//! ```
//!
//! Because the ledger lock spans the whole call, accesses are serialized and
//! the notifications in step 3 never race another client's admission. The
//! polls in step 4 are single checks. Under `AckPolicy::FireAndForget` they
//! usually run before the notify tasks have been scheduled, so they rarely
//! observe a full gate; the protocol exercises the bookkeeping rather than
//! gating progress.

use std::{sync::Arc, time::Duration};

use bytes::Bytes;
use tokio::task::JoinHandle;

use crate::{
    ClientId,
    audit::{Action, AuditEntry, AuditLog, AuditSink},
    clock::{LogicalClock, Timestamp},
    deferred::DeferredOperationQueue,
    error::CoordinatorError,
    gate::AcknowledgmentGate,
    ledger::{Admission, Request, RequestLedger},
    registry::{FileHandle, FileRegistry},
    storage::Storage,
};

/// How an access waits on the notify tasks it spawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AckPolicy {
    /// Detach notify tasks and poll the gate immediately.
    #[default]
    FireAndForget,

    /// Wait for every notify task spawned by this access before polling.
    ///
    /// The wait is bounded; on timeout the access logs a warning and polls
    /// anyway.
    AwaitNotifications {
        /// Upper bound on the wait.
        timeout: Duration,
    },
}

/// Coordinator configuration.
#[derive(Debug, Clone, Default)]
pub struct CoordinatorConfig {
    /// Number of registered clients (initial gate size).
    pub client_count: usize,
    /// Notification wait policy.
    pub ack_policy: AckPolicy,
}

/// Result of a completed read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOutcome {
    /// Timestamp allocated at admission.
    pub timestamp: Timestamp,
    /// Content observed.
    pub content: Bytes,
}

/// Owns all shared coordination state for one run.
pub struct Coordinator<S, A> {
    config: CoordinatorConfig,
    clock: LogicalClock,
    registry: FileRegistry,
    ledger: RequestLedger,
    gate: Arc<AcknowledgmentGate>,
    audit: AuditLog<A>,
    deferred: DeferredOperationQueue,
    storage: S,
}

impl<S, A> Coordinator<S, A>
where
    S: Storage,
    A: AuditSink,
{
    /// Create a coordinator with an empty ledger and a gate sized to
    /// `config.client_count`.
    pub fn new(config: CoordinatorConfig, storage: S, audit_sink: A) -> Self {
        let gate = Arc::new(AcknowledgmentGate::new(config.client_count));
        Self {
            config,
            clock: LogicalClock::new(),
            registry: FileRegistry::new(),
            ledger: RequestLedger::new(),
            gate,
            audit: AuditLog::new(audit_sink),
            deferred: DeferredOperationQueue::new(),
            storage,
        }
    }

    /// Open `name` for `client_id`.
    ///
    /// # Errors
    ///
    /// Returns `CoordinatorError::Storage` if this is the first open of
    /// `name` and its content cannot be loaded. The client has no handle
    /// and cannot read, write or close the file.
    pub fn open_file(
        &self,
        client_id: ClientId,
        name: &str,
    ) -> Result<Arc<FileHandle>, CoordinatorError> {
        Ok(self.registry.open(client_id, name, &self.storage)?)
    }

    /// Mark `file` closed.
    pub fn close_file(&self, file: &FileHandle) {
        self.registry.close(file);
    }

    /// Read `file` through the admission protocol.
    pub async fn read_file(
        &self,
        client_id: ClientId,
        file: &Arc<FileHandle>,
    ) -> Result<ReadOutcome, CoordinatorError> {
        let (_admission, timestamp) = self.admit(client_id, file).await;

        let content = file.content();
        tracing::info!(
            "Client {} read file {}: {}",
            client_id,
            file.name(),
            String::from_utf8_lossy(&content)
        );

        self.complete(client_id, Action::Read, file, timestamp);
        Ok(ReadOutcome { timestamp, content })
    }

    /// Replace the content of `file` through the admission protocol and
    /// persist it.
    ///
    /// # Errors
    ///
    /// Returns `CoordinatorError::Storage` if the save fails. The in-memory
    /// content has already been replaced by then and is not rolled back; no
    /// audit entry or deferred label is recorded for the attempt.
    pub async fn write_file(
        &self,
        client_id: ClientId,
        file: &Arc<FileHandle>,
        content: impl Into<Bytes>,
    ) -> Result<Timestamp, CoordinatorError> {
        let content = content.into();
        let (_admission, timestamp) = self.admit(client_id, file).await;

        file.replace_content(content.clone());
        if let Err(e) = self.storage.save(file.name(), &content) {
            tracing::error!("Error writing to file {}: {}", file.name(), e);
            return Err(e.into());
        }

        tracing::info!(
            "Client {} wrote to file {}: {}",
            client_id,
            file.name(),
            String::from_utf8_lossy(&content)
        );

        self.complete(client_id, Action::Write, file, timestamp);
        Ok(timestamp)
    }

    /// Steps 1-4: take the admission lock, record the request, notify peers
    /// and poll the gate. The returned admission keeps the lock.
    async fn admit(
        &self,
        client_id: ClientId,
        file: &Arc<FileHandle>,
    ) -> (Admission<'_>, Timestamp) {
        let mut admission = self.ledger.admit().await;

        let timestamp = self.clock.next();
        admission.append(Request { client_id, file: Arc::clone(file), timestamp });

        let peers = admission.peers_of(client_id);
        let notifications = self.notify_peers(client_id, &peers);

        if let AckPolicy::AwaitNotifications { timeout } = self.config.ack_policy {
            await_notifications(notifications, timeout).await;
        }

        let ledger_len = admission.len();
        for _ in &peers {
            self.gate.all_acknowledged(ledger_len);
        }

        (admission, timestamp)
    }

    /// Spawn one notify task per peer request.
    ///
    /// Dropping the returned handles detaches the tasks; they still run.
    fn notify_peers(&self, client_id: ClientId, peers: &[ClientId]) -> Vec<JoinHandle<()>> {
        peers
            .iter()
            .map(|&peer_id| {
                let gate = Arc::clone(&self.gate);
                tokio::spawn(async move {
                    tracing::debug!("Client {} sent request to client {}", client_id, peer_id);
                    gate.set_acknowledged(peer_id);
                })
            })
            .collect()
    }

    /// Step 6: record a completed access.
    fn complete(&self, client_id: ClientId, action: Action, file: &FileHandle, ts: Timestamp) {
        self.audit.append(&AuditEntry {
            client_id,
            action,
            file_name: file.name().to_string(),
            timestamp: ts,
        });
        self.deferred.append(format!("{action} by Client {client_id}"));
    }

    /// Take all deferred labels for the shutdown report.
    pub fn drain_deferred(&self) -> Vec<String> {
        self.deferred.drain()
    }

    /// Coordinator configuration.
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Logical clock.
    pub fn clock(&self) -> &LogicalClock {
        &self.clock
    }

    /// File registry.
    pub fn registry(&self) -> &FileRegistry {
        &self.registry
    }

    /// Request ledger.
    pub fn ledger(&self) -> &RequestLedger {
        &self.ledger
    }

    /// Acknowledgment gate.
    pub fn gate(&self) -> &AcknowledgmentGate {
        &self.gate
    }

    /// Audit log.
    pub fn audit(&self) -> &AuditLog<A> {
        &self.audit
    }

    /// Deferred operation queue.
    pub fn deferred(&self) -> &DeferredOperationQueue {
        &self.deferred
    }

    /// Storage collaborator.
    pub fn storage(&self) -> &S {
        &self.storage
    }
}

async fn await_notifications(notifications: Vec<JoinHandle<()>>, timeout: Duration) {
    let pending = notifications.len();
    let all_done = async {
        for notification in notifications {
            if let Err(e) = notification.await {
                tracing::warn!("notify task failed: {}", e);
            }
        }
    };

    if tokio::time::timeout(timeout, all_done).await.is_err() {
        tracing::warn!("timed out after {:?} waiting for {} notifications", timeout, pending);
    }
}

impl<S, A> std::fmt::Debug for Coordinator<S, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("config", &self.config)
            .field("clock", &self.clock)
            .field("registry", &self.registry)
            .field("gate", &self.gate)
            .field("deferred", &self.deferred)
            .finish_non_exhaustive()
    }
}
