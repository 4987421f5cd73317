//! Deterministic simulation harness for Filegate testing.
//!
//! A seeded virtual clock (`SimEnv`) and a current-thread runtime make runs
//! reproducible: the same seed yields the same interleaving and the same
//! timing report.
//!
//! # Model-Based Testing
//!
//! The `model` module provides a reference implementation of the admission
//! protocol. Operations are applied to both the model and the real
//! coordinator, and their observable states are compared.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod model;
pub mod sim_env;

pub use model::{
    ClientId, ModelFileId, ModelWorld, ObservableState, Operation, OperationError,
    OperationResult, SmallContent,
};
pub use sim_env::SimEnv;

/// Build the current-thread runtime used by deterministic runs.
pub fn deterministic_runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread().enable_time().build()
}
