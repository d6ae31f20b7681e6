//! Cellsim Core - Synthetic Telemetry for a Simulated Machining Cell
//!
//! This library fabricates plausible sensor readings for one industrial
//! asset and publishes them to a shared variable store:
//! 1. **Physical model**: temperatures, torque, rotational speed, tool wear
//!    and load advance once per tick, each derived quantity bounded by its
//!    domain constraints (`step`)
//! 2. **Lifecycle**: a cancellable background loop with a fault-halted path
//!    decided once at start (`controller`)
//! 3. **Prediction**: an on-demand inference call that snapshots published
//!    values and writes back a failure verdict (`predict`)

pub mod config;
pub mod controller;
pub mod error;
pub mod predict;
pub mod probe;
pub mod state;
pub mod step;
pub mod store;

// Re-export key types for convenience
pub use config::{CellConfig, FaultPolicy};
pub use controller::{CellController, StartMode};
pub use error::{CellError, PredictError, StoreError};
pub use predict::{PredictionClient, PredictionResult, PredictionSnapshot};
pub use state::{AssetState, ProductType};
pub use store::{keys, MemoryStore, Value, VariableStore};
