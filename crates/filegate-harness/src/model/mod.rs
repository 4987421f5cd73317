//! Reference model for model-based testing.
//!
//! The model is a sequential, lock-free restatement of the admission
//! protocol. It serves as the oracle against which the real coordinator is
//! verified.
//!
//! # Design Principles
//!
//! - Simplicity: The model should be obviously correct
//! - Behavior not mechanism: no tasks, no locks, same observable outcome
//! - Deterministic: Same inputs produce same outputs

pub mod operation;
mod world;

pub use operation::{
    ClientId, MISSING_FILE, ModelFileId, NUM_FILES, Operation, OperationError, OperationResult,
    SmallContent, file_name,
};
pub use world::{ModelWorld, ObservableState, initial_files};
