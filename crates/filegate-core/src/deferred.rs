//! Deferred operation queue.
//!
//! Labels of completed operations, reported once when the run ends.

use std::sync::{Mutex, PoisonError};

/// Ordered list of operation labels.
#[derive(Debug, Default)]
pub struct DeferredOperationQueue {
    labels: Mutex<Vec<String>>,
}

impl DeferredOperationQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a label.
    pub fn append(&self, label: impl Into<String>) {
        self.labels.lock().unwrap_or_else(PoisonError::into_inner).push(label.into());
    }

    /// Take every label in append order, leaving the queue empty.
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.labels.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Copy of the pending labels.
    pub fn snapshot(&self) -> Vec<String> {
        self.labels.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Number of pending labels.
    pub fn len(&self) -> usize {
        self.labels.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether no label is pending.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
