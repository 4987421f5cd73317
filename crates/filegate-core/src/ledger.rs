//! Request ledger.
//!
//! Append-only log of every admitted read/write request. The ledger's lock
//! is the single admission gate: a coordinator call holds it from timestamp
//! allocation until its audit entry is written. Requests are never pruned.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::{ClientId, clock::Timestamp, registry::FileHandle};

/// A submitted read or write.
#[derive(Debug, Clone)]
pub struct Request {
    /// Submitting client.
    pub client_id: ClientId,
    /// Target file.
    pub file: Arc<FileHandle>,
    /// Logical timestamp at submission.
    pub timestamp: Timestamp,
}

/// Owned view of a request, for inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSummary {
    /// Submitting client.
    pub client_id: ClientId,
    /// Target file name.
    pub file_name: String,
    /// Logical timestamp at submission.
    pub timestamp: Timestamp,
}

impl From<&Request> for RequestSummary {
    fn from(request: &Request) -> Self {
        Self {
            client_id: request.client_id,
            file_name: request.file.name().to_string(),
            timestamp: request.timestamp,
        }
    }
}

/// Append-only request log behind the admission lock.
#[derive(Debug, Default)]
pub struct RequestLedger {
    requests: Mutex<Vec<Request>>,
}

/// Exclusive access to the ledger for one admission.
///
/// Dropping the guard releases the admission lock.
pub struct Admission<'a> {
    requests: MutexGuard<'a, Vec<Request>>,
}

impl RequestLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for the admission lock.
    pub async fn admit(&self) -> Admission<'_> {
        Admission { requests: self.requests.lock().await }
    }

    /// Number of requests ever admitted.
    pub async fn len(&self) -> usize {
        self.requests.lock().await.len()
    }

    /// Whether no request has been admitted.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Snapshot of all requests in admission order.
    pub async fn summaries(&self) -> Vec<RequestSummary> {
        self.requests.lock().await.iter().map(RequestSummary::from).collect()
    }
}

impl Admission<'_> {
    /// Append a request.
    pub fn append(&mut self, request: Request) {
        self.requests.push(request);
    }

    /// Ledger length including anything appended under this admission.
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Whether the ledger is empty.
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Client ids of every request not submitted by `client_id`, in ledger
    /// order. Ids repeat once per request.
    pub fn peers_of(&self, client_id: ClientId) -> Vec<ClientId> {
        self.requests.iter().filter(|r| r.client_id != client_id).map(|r| r.client_id).collect()
    }
}

impl std::fmt::Debug for Admission<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Admission").field("len", &self.requests.len()).finish()
    }
}
