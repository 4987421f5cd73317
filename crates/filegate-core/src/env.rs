//! Environment abstraction for deterministic testing.
//!
//! The `Environment` trait decouples timing reports from the system clock.
//! The coordinator never reads time itself (ordering comes from the logical
//! clock); only the drivers that measure client spans do.
//!
//! - Simulation: the harness provides a seeded virtual clock so timing
//!   reports are reproducible.
//! - Production: the simulation binary uses `Instant::now()`.
//!
//! # Invariants
//!
//! - Monotonicity: `env.now()` must never go backwards
//! - Isolation: implementations must not share global state

use std::time::Instant;

/// Abstract time source.
pub trait Environment: Clone + Send + Sync + 'static {
    /// Returns the current time.
    ///
    /// # Invariants
    ///
    /// - Monotonicity: subsequent calls must return times >= previous calls.
    fn now(&self) -> Instant;
}
