//! Cellsim Environment Abstraction Layer
//!
//! This crate isolates the simulation engine from the "real world" so the
//! same tick logic runs in both **Production** (tokio time, OS entropy) and
//! **Test** (virtual clock, seeded RNG) environments.
//!
//! All non-determinism flows through [`CellContext`]:
//! - Time (`now()`, `sleep()`)
//! - Bounded noise (`jitter()`)
//! - Weighted coin flips (`chance()`)
//!
//! Production code uses [`TokioContext`]; tests inject [`SimContext`] with a
//! fixed seed (or a quiet variant with zero jitter) to make every derived
//! reading reproducible.

mod context;
mod sim_impl;
mod tokio_impl;

pub use context::CellContext;
pub use sim_impl::SimContext;
pub use tokio_impl::TokioContext;
