//! Error types for the coordination engine.

use thiserror::Error;

/// Errors from the storage collaborator.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No backing data exists for the file.
    #[error("file not found: {name}")]
    NotFound {
        /// File name that could not be loaded.
        name: String,
    },

    /// Underlying I/O failed.
    #[error("I/O error on {name}: {source}")]
    Io {
        /// File being loaded or saved.
        name: String,
        /// Cause.
        #[source]
        source: std::io::Error,
    },

    /// Failure injected by `ChaoticStorage`.
    #[error("injected failure on {name}")]
    Injected {
        /// File the failure was injected for.
        name: String,
    },
}

/// Errors from an audit sink.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Writing the audit line failed.
    #[error("audit sink I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from coordinator operations.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// Loading or saving file content failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl CoordinatorError {
    /// Returns true if the client cannot make further progress.
    ///
    /// A file that cannot be loaded leaves the client without a handle.
    /// A failed save only loses that one write.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Storage(StorageError::NotFound { .. }) => true,
            Self::Storage(StorageError::Io { .. } | StorageError::Injected { .. }) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_fatal() {
        let err = CoordinatorError::from(StorageError::NotFound { name: "a.txt".to_string() });
        assert!(err.is_fatal());
    }

    #[test]
    fn injected_is_transient() {
        let err = CoordinatorError::from(StorageError::Injected { name: "a.txt".to_string() });
        assert!(!err.is_fatal());
    }

    #[test]
    fn error_display() {
        let err = StorageError::NotFound { name: "file1.txt".to_string() };
        assert_eq!(err.to_string(), "file not found: file1.txt");

        let err = CoordinatorError::from(err);
        assert_eq!(err.to_string(), "storage error: file not found: file1.txt");
    }
}
