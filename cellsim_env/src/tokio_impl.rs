//! Production implementation of CellContext using Tokio.

use crate::CellContext;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Production context backed by Tokio and OS entropy.
///
/// Time comes from the monotonic clock, randomness from an `StdRng`
/// re-seeded from the OS on every construction. Two processes (or two
/// contexts) never share a noise sequence.
pub struct TokioContext {
    /// Start time for monotonic duration calculations
    start: Instant,

    /// Process-local RNG behind a mutex so the context is `Sync`
    rng: Mutex<StdRng>,
}

impl TokioContext {
    /// Creates a new TokioContext seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Creates an Arc-wrapped context for sharing across tasks.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl Default for TokioContext {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CellContext for TokioContext {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn jitter(&self, sigma: f32) -> f32 {
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

    #[tokio::test]
    async fn test_tokio_context_time() {
        let ctx = TokioContext::new();
        let t1 = ctx.now();
        ctx.sleep(Duration::from_millis(10)).await;
        let t2 = ctx.now();

        assert!(t2 > t1);
        assert!(t2 - t1 >= Duration::from_millis(10));
    }

    #[test]
    fn test_jitter_stays_bounded() {
        let ctx = TokioContext::new();
        for _ in 0..10_000 {
            let j = ctx.jitter(0.2);
            assert!((-0.2..=0.2).contains(&j));
        }
    }

    #[test]
    fn test_jitter_zero_sigma() {
        let ctx = TokioContext::new();
        assert_eq!(ctx.jitter(0.0), 0.0);
    }

    #[test]
    fn test_chance_extremes() {
        let ctx = TokioContext::new();
        assert!(ctx.chance(1.0));
        assert!(!ctx.chance(0.0));
    }
}
