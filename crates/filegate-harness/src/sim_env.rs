//! Simulated environment with a seeded virtual clock.
//!
//! Every `now()` call advances the clock by 1-5 ms drawn from a ChaCha RNG,
//! so spans have non-zero, seed-determined widths without real sleeping.

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, Instant},
};

use filegate_core::Environment;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(Debug)]
struct SimClock {
    now: Instant,
    rng: ChaCha8Rng,
}

/// Deterministic environment. Clones share one clock.
#[derive(Debug, Clone)]
pub struct SimEnv {
    clock: Arc<Mutex<SimClock>>,
}

impl SimEnv {
    /// Create an environment whose clock jitter is drawn from `seed`.
    pub fn with_seed(seed: u64) -> Self {
        // Logged so a failing run can be replayed
        tracing::info!("SimEnv seed: {}", seed);
        Self {
            clock: Arc::new(Mutex::new(SimClock {
                now: Instant::now(),
                rng: ChaCha8Rng::seed_from_u64(seed),
            })),
        }
    }

    /// Move the clock forward without consuming randomness.
    pub fn advance(&self, duration: Duration) {
        self.clock.lock().unwrap_or_else(PoisonError::into_inner).now += duration;
    }
}

impl Environment for SimEnv {
    fn now(&self) -> Instant {
        let mut clock = self.clock.lock().unwrap_or_else(PoisonError::into_inner);
        let step = clock.rng.gen_range(1..=5);
        clock.now += Duration::from_millis(step);
        clock.now
    }
}
