//! Deterministic context for tests: virtual clock plus seeded RNG.

use crate::CellContext;
use async_trait::async_trait;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Test context backed by a virtual clock and a fixed-seed RNG.
///
/// `sleep` advances the virtual clock instead of suspending, so a sequence
/// of ticks runs instantly. The same seed always replays the same noise
/// sequence; `quiet` builds a variant whose jitter is identically zero,
/// which makes every derived quantity exact.
pub struct SimContext {
    /// Master seed for this context
    seed: u64,

    /// Current virtual time (nanoseconds since creation)
    virtual_time_ns: Arc<Mutex<u64>>,

    /// Deterministic noise source
    rng: Arc<Mutex<ChaCha8Rng>>,

    /// When true, `jitter` returns 0.0 regardless of sigma
    zero_jitter: bool,
}

impl SimContext {
    /// Creates a new SimContext with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            virtual_time_ns: Arc::new(Mutex::new(0)),
            rng: Arc::new(Mutex::new(ChaCha8Rng::seed_from_u64(seed))),
            zero_jitter: false,
        }
    }

    /// Creates a context whose jitter is always zero.
    ///
    /// Coin flips (`chance`) remain seeded and deterministic.
    pub fn quiet(seed: u64) -> Self {
        Self {
            zero_jitter: true,
            ..Self::new(seed)
        }
    }

    /// Creates an Arc-wrapped context for sharing.
    pub fn shared(seed: u64) -> Arc<Self> {
        Arc::new(Self::new(seed))
    }

    /// Advances virtual time by the given duration.
    pub fn advance_time(&self, duration: Duration) {
        let mut time = self.virtual_time_ns.lock().unwrap();
        *time += duration.as_nanos() as u64;
    }

    /// Returns the context's seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Clone for SimContext {
    fn clone(&self) -> Self {
        Self {
            seed: self.seed,
            virtual_time_ns: Arc::clone(&self.virtual_time_ns),
            rng: Arc::clone(&self.rng),
            zero_jitter: self.zero_jitter,
        }
    }
}

#[async_trait]
impl CellContext for SimContext {
    fn now(&self) -> Duration {
        Duration::from_nanos(*self.virtual_time_ns.lock().unwrap())
    }

    async fn sleep(&self, duration: Duration) {
        // Virtual sleep: advance the clock and yield once so concurrent
        // tasks get a chance to observe cancellation.
        self.advance_time(duration);
        tokio::task::yield_now().await;
    }

    fn jitter(&self, sigma: f32) -> f32 {
        if self.zero_jitter {
            return 0.0;
        }
        let mut rng = self.rng.lock().unwrap();
        (rng.gen::<f32>() * 2.0 - 1.0) * sigma
    }

    fn chance(&self, probability: f64) -> bool {
        let mut rng = self.rng.lock().unwrap();
        rng.gen_bool(probability.clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sim_context_time() {
        let ctx = SimContext::new(42);
        assert_eq!(ctx.now(), Duration::ZERO);

        ctx.advance_time(Duration::from_secs(1));
        assert_eq!(ctx.now(), Duration::from_secs(1));

        ctx.advance_time(Duration::from_millis(500));
        assert_eq!(ctx.now(), Duration::from_millis(1500));
    }

    #[test]
    fn test_sim_context_deterministic_jitter() {
        let ctx1 = SimContext::new(42);
        let ctx2 = SimContext::new(42);

        for _ in 0..100 {
            assert_eq!(ctx1.jitter(6.0), ctx2.jitter(6.0));
        }
    }

    #[test]
    fn test_sim_context_jitter_bounded() {
        let ctx = SimContext::new(7);
        for _ in 0..10_000 {
            let j = ctx.jitter(20.0);
            assert!((-20.0..=20.0).contains(&j));
        }
    }

    #[test]
    fn test_quiet_context_has_no_noise() {
        let ctx = SimContext::quiet(42);
        for _ in 0..100 {
            assert_eq!(ctx.jitter(6.0), 0.0);
        }
    }

    #[test]
    fn test_sim_context_clone_shares_time() {
        let ctx1 = SimContext::new(42);
        let ctx2 = ctx1.clone();

        ctx1.advance_time(Duration::from_secs(5));

        assert_eq!(ctx1.now(), ctx2.now());
    }
}
