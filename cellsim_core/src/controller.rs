//! Simulation loop controller: lifecycle, scheduling and publishing.

use crate::config::CellConfig;
use crate::error::CellError;
use crate::probe;
use crate::state::{AssetState, ProductType};
use crate::step;
use crate::store::{keys, VariableStore};

use cellsim_env::CellContext;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Outcome of a successful `start()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartMode {
    /// The tick loop is running in the background
    Running,

    /// The asset was marked faulty; no loop was started
    FaultHalted,
}

enum Lifecycle {
    Idle,
    FaultHalted,
    Running {
        token: CancellationToken,
        handle: JoinHandle<()>,
    },
}

/// Owns the asset lifecycle: `Idle -> start -> {Running | FaultHalted}`,
/// and back to `Idle` via `stop()`. A fault-halted asset never resumes
/// ticking without a fresh `start()`.
///
/// The spawned tick task is the sole writer of [`AssetState`]; everything
/// the outside world sees goes through the variable store, field by field
/// in dependency order.
pub struct CellController<C, S> {
    ctx: Arc<C>,
    store: Arc<S>,
    config: CellConfig,
    lifecycle: Lifecycle,
}

impl<C, S> CellController<C, S>
where
    C: CellContext,
    S: VariableStore,
{
    /// Creates an idle controller.
    pub fn new(ctx: Arc<C>, store: Arc<S>, config: CellConfig) -> Self {
        Self {
            ctx,
            store,
            config,
            lifecycle: Lifecycle::Idle,
        }
    }

    /// True while a tick loop is active.
    pub fn is_running(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Running { .. })
    }

    /// True when the last start marked the asset faulty.
    pub fn is_fault_halted(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::FaultHalted)
    }

    /// Seeds the asset state, draws the fault decision and, unless the
    /// asset came up faulty, launches the tick loop.
    ///
    /// The product type is taken from the argument, else from a non-empty
    /// store slot, else defaults to Medium. Any store failure here is fatal:
    /// a missing slot means the host binding is misconfigured.
    pub async fn start(
        &mut self,
        product_type: Option<ProductType>,
    ) -> Result<StartMode, CellError> {
        if self.is_running() {
            return Err(CellError::AlreadyRunning);
        }

        // One-shot reachability check; logged, never fatal.
        if let Some(addr) = &self.config.probe_addr {
            probe::check(addr, self.config.probe_timeout).await;
        }

        let product_type = match product_type {
            Some(pt) => pt,
            None => ProductType::parse(&self.store.get_text(keys::PRODUCT_TYPE)?)
                .unwrap_or_default(),
        };
        self.store.set(keys::PRODUCT_TYPE, product_type.as_str().into())?;

        let state = AssetState::seeded(product_type);
        publish_seed(&*self.store, &state)?;

        let faulty = self.config.fault_policy.decide(&*self.ctx);
        self.store.set(keys::FAULTY, faulty.into())?;

        if faulty {
            self.store.set(keys::CONNECTED, false.into())?;
            self.store.set(keys::RUNNING, false.into())?;
            self.store.set(keys::BATTERY_LOW, false.into())?;
            info!(%product_type, "asset marked faulty at start, tick loop withheld");
            self.lifecycle = Lifecycle::FaultHalted;
            return Ok(StartMode::FaultHalted);
        }

        let token = CancellationToken::new();
        let handle = tokio::spawn(tick_loop(
            Arc::clone(&self.ctx),
            Arc::clone(&self.store),
            state,
            self.config.tick_interval,
            self.config.battery_low_probability,
            token.clone(),
        ));

        info!(%product_type, interval_ms = self.config.tick_interval.as_millis() as u64,
            "tick loop started");
        self.lifecycle = Lifecycle::Running { token, handle };
        Ok(StartMode::Running)
    }

    /// Signals cancellation and waits up to the grace period for the loop
    /// to exit. A loop that misses the grace period is abandoned, never
    /// forcibly terminated; it observes cancellation on its next check.
    /// Idempotent and safe in every lifecycle state.
    pub async fn stop(&mut self) {
        match std::mem::replace(&mut self.lifecycle, Lifecycle::Idle) {
            Lifecycle::Running { token, handle } => {
                token.cancel();
                if tokio::time::timeout(self.config.stop_grace, handle)
                    .await
                    .is_err()
                {
                    warn!("tick loop missed the stop grace period, abandoning it");
                }
            }
            Lifecycle::FaultHalted | Lifecycle::Idle => {}
        }
    }
}

async fn tick_loop<C, S>(
    ctx: Arc<C>,
    store: Arc<S>,
    mut state: AssetState,
    interval: Duration,
    battery_low_probability: f64,
    token: CancellationToken,
) where
    C: CellContext,
    S: VariableStore,
{
    while !token.is_cancelled() {
        step::advance(&mut state, &*ctx, battery_low_probability);

        if let Err(e) = publish_tick(&*store, &state) {
            // Slots were verified at start; a failure here is a host-side
            // change and must not kill the loop.
            error!("failed to publish tick: {e}");
        }

        tokio::select! {
            _ = token.cancelled() => break,
            _ = ctx.sleep(interval) => {}
        }
    }
    info!("tick loop stopped");
}

fn publish_seed<S: VariableStore + ?Sized>(
    store: &S,
    state: &AssetState,
) -> Result<(), CellError> {
    store.set(keys::AIR_TEMPERATURE, state.air_temperature.into())?;
    store.set(keys::PROCESS_TEMPERATURE, state.process_temperature.into())?;
    store.set(keys::TORQUE, state.torque.into())?;
    store.set(keys::ROTATIONAL_SPEED, state.rotational_speed.into())?;
    store.set(keys::VELOCITY, state.velocity.into())?;
    store.set(keys::TOOL_WEAR, state.tool_wear.into())?;
    store.set(keys::LOAD, state.load.into())?;
    Ok(())
}

/// Publishes one tick, field by field in dependency order.
fn publish_tick<S: VariableStore + ?Sized>(
    store: &S,
    state: &AssetState,
) -> Result<(), crate::error::StoreError> {
    store.set(keys::AIR_TEMPERATURE, state.air_temperature.into())?;
    store.set(keys::PROCESS_TEMPERATURE, state.process_temperature.into())?;
    store.set(keys::TEMPERATURE, state.process_temperature.into())?;
    store.set(keys::TORQUE, state.torque.into())?;
    store.set(keys::ROTATIONAL_SPEED, state.rotational_speed.into())?;
    store.set(keys::VELOCITY, state.velocity.into())?;
    store.set(keys::LOAD, state.load.into())?;
    store.set(keys::TOOL_WEAR, state.tool_wear.into())?;
    store.set(keys::CONNECTED, state.connected.into())?;
    store.set(keys::RUNNING, state.running.into())?;
    store.set(keys::BATTERY_LOW, state.battery_low.into())?;
    store.set(keys::DISCONNECTED, state.disconnected().into())?;
    store.set(keys::BUSY, state.busy().into())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FaultPolicy;
    use crate::store::MemoryStore;
    use cellsim_env::TokioContext;

    fn controller(policy: FaultPolicy) -> (CellController<TokioContext, MemoryStore>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let config = CellConfig {
            fault_policy: policy,
            ..CellConfig::default()
        };
        let controller = CellController::new(TokioContext::shared(), Arc::clone(&store), config);
        (controller, store)
    }

    #[tokio::test(start_paused = true)]
    async fn test_faulty_start_never_ticks() {
        let (mut controller, store) = controller(FaultPolicy::Forced(true));

        let mode = controller.start(Some(ProductType::Medium)).await.unwrap();
        assert_eq!(mode, StartMode::FaultHalted);
        assert!(controller.is_fault_halted());

        tokio::time::sleep(Duration::from_secs(3)).await;

        // Tick-only slots keep their seed values
        assert_eq!(store.get_f32(keys::TOOL_WEAR).unwrap(), 0.0);
        assert_eq!(store.get_f32(keys::AIR_TEMPERATURE).unwrap(), 300.0);
        assert!(store.get_bool(keys::FAULTY).unwrap());
        assert!(!store.get_bool(keys::CONNECTED).unwrap());
        assert!(!store.get_bool(keys::RUNNING).unwrap());
        assert!(!store.get_bool(keys::BATTERY_LOW).unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_healthy_start_ticks_at_cadence() {
        let (mut controller, store) = controller(FaultPolicy::Forced(false));

        let mode = controller.start(Some(ProductType::Medium)).await.unwrap();
        assert_eq!(mode, StartMode::Running);
        assert!(controller.is_running());

        // Ticks land at t = 0, 500, 1000, 1500 ms
        tokio::time::sleep(Duration::from_millis(1600)).await;

        assert_eq!(store.get_f32(keys::TOOL_WEAR).unwrap(), 12.0);
        assert!(store.get_bool(keys::CONNECTED).unwrap());
        assert!(store.get_bool(keys::RUNNING).unwrap());
        assert!(!store.get_bool(keys::DISCONNECTED).unwrap());
        assert!(!store.get_bool(keys::BUSY).unwrap());
        assert!(!store.get_bool(keys::FAULTY).unwrap());

        controller.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_publishing() {
        let (mut controller, store) = controller(FaultPolicy::Forced(false));
        controller.start(Some(ProductType::High)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(1200)).await;
        controller.stop().await;
        assert!(!controller.is_running());

        let frozen = store.get_f32(keys::TOOL_WEAR).unwrap();
        assert!(frozen > 0.0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(store.get_f32(keys::TOOL_WEAR).unwrap(), frozen);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_idempotent() {
        let (mut controller, _store) = controller(FaultPolicy::Forced(false));

        // Safe with no loop running at all
        controller.stop().await;

        controller.start(None).await.unwrap();
        controller.stop().await;
        controller.stop().await;
        assert!(!controller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_while_running_is_rejected() {
        let (mut controller, _store) = controller(FaultPolicy::Forced(false));
        controller.start(None).await.unwrap();

        let err = controller.start(None).await.unwrap_err();
        assert!(matches!(err, CellError::AlreadyRunning));

        controller.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_fault_halted_restarts_only_via_start() {
        let (mut controller, _store) = controller(FaultPolicy::Forced(true));
        controller.start(None).await.unwrap();
        assert!(controller.is_fault_halted());

        controller.stop().await;
        assert!(!controller.is_fault_halted());
        assert!(!controller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_fails_fast_on_missing_slot() {
        let store = Arc::new(MemoryStore::with_slots([keys::PRODUCT_TYPE]));
        let config = CellConfig {
            fault_policy: FaultPolicy::Forced(false),
            ..CellConfig::default()
        };
        let mut controller = CellController::new(TokioContext::shared(), store, config);

        let err = controller.start(None).await.unwrap_err();
        assert!(matches!(err, CellError::Store(_)));
        assert!(!controller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_product_type_resolution() {
        // Store slot wins over the Medium default
        let (mut controller, store) = controller(FaultPolicy::Forced(false));
        store.set(keys::PRODUCT_TYPE, "H".into()).unwrap();
        controller.start(None).await.unwrap();
        assert_eq!(store.get_text(keys::PRODUCT_TYPE).unwrap(), "H");
        controller.stop().await;

        // Explicit argument wins over the store slot
        let (mut controller, store) = self::controller(FaultPolicy::Forced(false));
        store.set(keys::PRODUCT_TYPE, "H".into()).unwrap();
        controller.start(Some(ProductType::Low)).await.unwrap();
        assert_eq!(store.get_text(keys::PRODUCT_TYPE).unwrap(), "L");
        controller.stop().await;

        // Empty slot falls back to Medium
        let (mut controller, store) = self::controller(FaultPolicy::Forced(false));
        controller.start(None).await.unwrap();
        assert_eq!(store.get_text(keys::PRODUCT_TYPE).unwrap(), "M");
        controller.stop().await;
    }
}
