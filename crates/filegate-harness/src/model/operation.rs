//! Operations for model-based testing.
//!
//! Operations represent every client action plus storage fault toggles.
//! They are generated randomly by proptest and applied to both the model and
//! the real coordinator.

use arbitrary::Arbitrary;

/// Client identifier (small to keep the test space manageable).
pub type ClientId = u8;

/// File identifier, mapped to a file name by `file_name`.
pub type ModelFileId = u8;

/// Number of distinct file names operations can target.
pub const NUM_FILES: u8 = 4;

/// File id whose backing data never exists.
pub const MISSING_FILE: ModelFileId = NUM_FILES - 1;

/// File name for a model file id.
pub fn file_name(file: ModelFileId) -> String {
    format!("file{}.txt", file % NUM_FILES)
}

/// Operations that can be applied to the system.
///
/// Each client holds at most one handle at a time: the one from its latest
/// successful open.
#[derive(Debug, Clone, Arbitrary)]
pub enum Operation {
    /// Client opens a file.
    Open {
        /// Client performing the operation.
        client_id: ClientId,
        /// File to open.
        file: ModelFileId,
    },

    /// Client writes through its handle.
    Write {
        /// Client performing the operation.
        client_id: ClientId,
        /// Content to write.
        content: SmallContent,
    },

    /// Client reads through its handle.
    Read {
        /// Client performing the operation.
        client_id: ClientId,
    },

    /// Client closes its handle and drops it.
    Close {
        /// Client performing the operation.
        client_id: ClientId,
    },

    /// Every later save of the file fails.
    BreakStorage {
        /// Affected file.
        file: ModelFileId,
    },

    /// Saves of the file succeed again.
    HealStorage {
        /// Affected file.
        file: ModelFileId,
    },
}

/// Small content for testing.
#[derive(Debug, Clone, Arbitrary)]
pub struct SmallContent {
    /// Content seed.
    pub seed: u8,
}

impl SmallContent {
    /// Expand to content bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        format!("content-{}", self.seed).into_bytes()
    }
}

/// Result of applying an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationResult {
    /// Operation succeeded.
    Ok,

    /// Operation failed with expected error.
    Error(OperationError),
}

/// Expected errors that can occur during operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationError {
    /// First open could not load the file.
    NotFound,

    /// Write reached storage but the save failed.
    SaveFailed,

    /// Client has no open handle.
    NoHandle,

    /// Invalid client ID.
    InvalidClient,
}

impl OperationResult {
    /// Check if operation succeeded.
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Check if operation failed.
    pub fn is_err(&self) -> bool {
        !self.is_ok()
    }
}
