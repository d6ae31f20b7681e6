//! Controller configuration.

use cellsim_env::CellContext;
use std::time::Duration;

/// How the one-time fault decision at start is made.
///
/// The default is a weighted random draw. `Forced` exists as an explicit
/// seam for tests and for hosts that want to stage a faulty asset; it
/// replaces editing the probability in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FaultPolicy {
    /// Draw faulty with the given probability
    Random { probability: f64 },

    /// Always produce this decision
    Forced(bool),
}

impl FaultPolicy {
    /// Evaluates the policy against the context's entropy source.
    pub fn decide<C: CellContext + ?Sized>(&self, ctx: &C) -> bool {
        match *self {
            FaultPolicy::Random { probability } => ctx.chance(probability),
            FaultPolicy::Forced(faulty) => faulty,
        }
    }
}

impl Default for FaultPolicy {
    fn default() -> Self {
        FaultPolicy::Random { probability: 0.10 }
    }
}

/// Tuning knobs for one controller instance.
#[derive(Debug, Clone)]
pub struct CellConfig {
    /// Time between ticks (2 Hz by default)
    pub tick_interval: Duration,

    /// How long `stop()` waits for the loop to observe cancellation
    pub stop_grace: Duration,

    /// One-time fault decision at start
    pub fault_policy: FaultPolicy,

    /// Per-tick probability of the battery-low flag
    pub battery_low_probability: f64,

    /// Inference endpoint URL
    pub endpoint: String,

    /// Optional address for the startup connectivity probe; `None` skips it
    pub probe_addr: Option<String>,

    /// Connect timeout for the probe
    pub probe_timeout: Duration,
}

impl Default for CellConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(500),
            stop_grace: Duration::from_millis(250),
            fault_policy: FaultPolicy::default(),
            battery_low_probability: 0.30,
            endpoint: "http://127.0.0.1:8000/predict".to_string(),
            probe_addr: None,
            probe_timeout: Duration::from_secs(2),
        }
    }
}
