//! Model world - the reference implementation of the admission protocol.
//!
//! Applies operations one at a time with no concurrency. Notifications are
//! delivered before the gate is polled, which matches the real coordinator
//! running with `AckPolicy::AwaitNotifications`.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::operation::{
    ClientId, MISSING_FILE, ModelFileId, NUM_FILES, Operation, OperationError, OperationResult,
    file_name,
};

/// Observable state for oracle comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservableState {
    /// In-memory handles: name, open flag, content. Sorted by name.
    pub handles: Vec<(String, bool, Vec<u8>)>,
    /// Backing store contents. Sorted by name.
    pub stored: Vec<(String, Vec<u8>)>,
    /// Audit lines in append order.
    pub audit: Vec<String>,
    /// Deferred labels in append order.
    pub deferred: Vec<String>,
    /// Ledger requests: client, file name, timestamp.
    pub ledger: Vec<(u64, String, u64)>,
    /// Gate slots.
    pub gate: Vec<bool>,
}

#[derive(Debug, Clone)]
struct ModelHandle {
    open: bool,
    content: Vec<u8>,
}

/// Model world.
#[derive(Debug, Clone)]
pub struct ModelWorld {
    num_clients: usize,
    /// Handle held by each client (file name).
    client_handles: HashMap<ClientId, String>,
    handles: BTreeMap<String, ModelHandle>,
    stored: BTreeMap<String, Vec<u8>>,
    broken: BTreeSet<String>,
    clock: u64,
    ledger: Vec<(u64, String, u64)>,
    gate: Vec<bool>,
    audit: Vec<String>,
    deferred: Vec<String>,
}

/// Initial backing store shared by the model and the real system.
///
/// Every file except `MISSING_FILE` exists.
pub fn initial_files() -> Vec<(String, Vec<u8>)> {
    (0..NUM_FILES)
        .filter(|file| *file != MISSING_FILE)
        .map(|file| (file_name(file), format!("initial-{file}").into_bytes()))
        .collect()
}

impl ModelWorld {
    /// Create a world with `num_clients` clients and a gate of `gate_size`
    /// slots.
    pub fn new(num_clients: usize, gate_size: usize) -> Self {
        Self {
            num_clients,
            client_handles: HashMap::new(),
            handles: BTreeMap::new(),
            stored: initial_files().into_iter().collect(),
            broken: BTreeSet::new(),
            clock: 0,
            ledger: Vec::new(),
            gate: vec![false; gate_size],
            audit: Vec::new(),
            deferred: Vec::new(),
        }
    }

    /// Number of clients in the world.
    pub fn num_clients(&self) -> usize {
        self.num_clients
    }

    /// Last timestamp issued.
    pub fn clock(&self) -> u64 {
        self.clock
    }

    /// Apply an operation and return the result.
    pub fn apply(&mut self, op: &Operation) -> OperationResult {
        match op {
            Operation::Open { client_id, file } => self.apply_open(*client_id, *file),
            Operation::Write { client_id, content } => {
                self.apply_write(*client_id, content.to_bytes())
            },
            Operation::Read { client_id } => self.apply_read(*client_id),
            Operation::Close { client_id } => self.apply_close(*client_id),
            Operation::BreakStorage { file } => {
                self.broken.insert(file_name(*file));
                OperationResult::Ok
            },
            Operation::HealStorage { file } => {
                self.broken.remove(&file_name(*file));
                OperationResult::Ok
            },
        }
    }

    /// Extract observable state for comparison.
    pub fn observable_state(&self) -> ObservableState {
        ObservableState {
            handles: self
                .handles
                .iter()
                .map(|(name, h)| (name.clone(), h.open, h.content.clone()))
                .collect(),
            stored: self.stored.iter().map(|(n, c)| (n.clone(), c.clone())).collect(),
            audit: self.audit.clone(),
            deferred: self.deferred.clone(),
            ledger: self.ledger.clone(),
            gate: self.gate.clone(),
        }
    }

    fn check_client(&self, client_id: ClientId) -> Result<(), OperationError> {
        if (client_id as usize) < self.num_clients {
            Ok(())
        } else {
            Err(OperationError::InvalidClient)
        }
    }

    fn handle_of(&self, client_id: ClientId) -> Result<String, OperationError> {
        self.check_client(client_id)?;
        self.client_handles.get(&client_id).cloned().ok_or(OperationError::NoHandle)
    }

    fn apply_open(&mut self, client_id: ClientId, file: ModelFileId) -> OperationResult {
        if let Err(e) = self.check_client(client_id) {
            return OperationResult::Error(e);
        }

        let name = file_name(file);
        if let Some(handle) = self.handles.get_mut(&name) {
            handle.open = true;
        } else if let Some(content) = self.stored.get(&name) {
            let handle = ModelHandle { open: true, content: content.clone() };
            self.handles.insert(name.clone(), handle);
        } else {
            return OperationResult::Error(OperationError::NotFound);
        }

        self.client_handles.insert(client_id, name);
        OperationResult::Ok
    }

    fn apply_write(&mut self, client_id: ClientId, content: Vec<u8>) -> OperationResult {
        let name = match self.handle_of(client_id) {
            Ok(name) => name,
            Err(e) => return OperationResult::Error(e),
        };

        let ts = self.admit(client_id, &name);

        if let Some(handle) = self.handles.get_mut(&name) {
            handle.content.clone_from(&content);
        }
        if self.broken.contains(&name) {
            return OperationResult::Error(OperationError::SaveFailed);
        }
        self.stored.insert(name.clone(), content);

        self.complete(client_id, "Write", &name, ts);
        OperationResult::Ok
    }

    fn apply_read(&mut self, client_id: ClientId) -> OperationResult {
        let name = match self.handle_of(client_id) {
            Ok(name) => name,
            Err(e) => return OperationResult::Error(e),
        };

        let ts = self.admit(client_id, &name);
        self.complete(client_id, "Read", &name, ts);
        OperationResult::Ok
    }

    fn apply_close(&mut self, client_id: ClientId) -> OperationResult {
        if let Err(e) = self.check_client(client_id) {
            return OperationResult::Error(e);
        }
        let Some(name) = self.client_handles.remove(&client_id) else {
            return OperationResult::Error(OperationError::NoHandle);
        };

        if let Some(handle) = self.handles.get_mut(&name) {
            handle.open = false;
        }
        OperationResult::Ok
    }

    /// Timestamp, record, notify every peer request, poll once per peer.
    fn admit(&mut self, client_id: ClientId, name: &str) -> u64 {
        self.clock += 1;
        let client = u64::from(client_id);
        self.ledger.push((client, name.to_string(), self.clock));

        let peers: Vec<u64> =
            self.ledger.iter().map(|(c, _, _)| *c).filter(|c| *c != client).collect();

        for peer in &peers {
            if let Some(slot) = usize::try_from(*peer).ok().and_then(|i| self.gate.get_mut(i)) {
                *slot = true;
            }
        }

        for _ in &peers {
            if self.gate.iter().all(|acked| *acked) {
                self.gate = vec![false; self.ledger.len()];
            }
        }

        self.clock
    }

    fn complete(&mut self, client_id: ClientId, action: &str, name: &str, ts: u64) {
        self.audit.push(format!("Client {client_id} {action} file {name} at timestamp {ts}"));
        self.deferred.push(format!("{action} by Client {client_id}"));
    }
}
