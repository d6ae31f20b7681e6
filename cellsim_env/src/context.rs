//! Core environment context trait for the simulation engine.

use async_trait::async_trait;
use std::time::Duration;

/// The central interface for environment interaction.
///
/// Abstracts time and entropy so the step function and loop controller can
/// run against the real clock in production and a virtual, seeded
/// environment in tests.
///
/// # Implementations
///
/// - **Production**: `TokioContext` - wraps `tokio::time`, `StdRng` seeded
///   from OS entropy (re-seeded per process, no reproducibility guarantee)
/// - **Test**: `SimContext` - virtual clock plus `ChaCha8Rng(seed)`
#[async_trait]
pub trait CellContext: Send + Sync + 'static {
    /// Returns the current monotonic time since context creation.
    ///
    /// In tests this is the virtual clock time.
    fn now(&self) -> Duration;

    /// Suspends execution for the given duration.
    ///
    /// In production: wraps `tokio::time::sleep`.
    /// In tests: advances the virtual clock without blocking.
    async fn sleep(&self, duration: Duration);

    /// Returns a uniformly distributed value in `[-sigma, +sigma]`.
    ///
    /// Every derived sensor quantity is perturbed through this single
    /// entry point. No side effects beyond internal generator state.
    fn jitter(&self, sigma: f32) -> f32;

    /// Draws `true` with the given probability.
    ///
    /// Used for the one-time fault decision at start and the per-tick
    /// battery-low flag.
    fn chance(&self, probability: f64) -> bool;
}
