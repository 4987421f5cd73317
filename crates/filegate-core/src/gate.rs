//! Acknowledgment gate.
//!
//! One slot per known client, indexed by client id. Notify tasks mark slots;
//! the coordinator polls for the all-marked state. Observing the gate full
//! resets it to all-false, sized to the ledger length at that moment, so the
//! gate's capacity follows ledger growth rather than the client count.
//!
//! Client ids are used as indices as-is. With ids `1..=n` and a gate of size
//! `n`, id `n` is out of bounds; such acknowledgments are reported and
//! dropped.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::ClientId;

/// Per-client notification slots.
#[derive(Debug)]
pub struct AcknowledgmentGate {
    slots: Mutex<Vec<bool>>,
}

impl AcknowledgmentGate {
    /// Create a gate with `size` unset slots.
    pub fn new(size: usize) -> Self {
        Self { slots: Mutex::new(vec![false; size]) }
    }

    /// Record that `peer_id` has been notified.
    ///
    /// Returns `false` if `peer_id` is outside the current slot range. The
    /// slot count is never changed here.
    pub fn set_acknowledged(&self, peer_id: ClientId) -> bool {
        let mut slots = self.lock();
        match usize::try_from(peer_id).ok().and_then(|i| slots.get_mut(i)) {
            Some(slot) => {
                *slot = true;
                true
            },
            None => {
                tracing::warn!(
                    "invalid client id {} in acknowledgment (gate size {})",
                    peer_id,
                    slots.len()
                );
                false
            },
        }
    }

    /// Poll once for every slot being set.
    ///
    /// If any slot is unset, returns `false` and leaves the gate untouched.
    /// Otherwise replaces the slots with `ledger_len` unset slots and returns
    /// `true`. An empty gate counts as full.
    pub fn all_acknowledged(&self, ledger_len: usize) -> bool {
        let mut slots = self.lock();
        if slots.iter().any(|acked| !acked) {
            return false;
        }

        *slots = vec![false; ledger_len];
        tracing::debug!("All acknowledgments received");
        true
    }

    /// Current number of slots.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the gate has no slots.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the current slots.
    pub fn snapshot(&self) -> Vec<bool> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<bool>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
