//! The simulation step function: advances the asset state by one tick.

use crate::state::AssetState;
use cellsim_env::CellContext;

/// Spindle power (W); rotational speed follows P = τω.
const POWER_W: f32 = 2860.0;

const AIR_MIN: f32 = 296.0;
const AIR_MAX: f32 = 304.0;
const PROCESS_OFFSET: f32 = 10.0;
const TORQUE_BASE: f32 = 40.0;
const TORQUE_FLOOR: f32 = 5.0;
pub(crate) const RPM_MIN: f32 = 500.0;
pub(crate) const RPM_MAX: f32 = 1800.0;
const LOAD_BASE: f32 = 20.0;
const LOAD_PER_TORQUE: f32 = 0.6;

const AIR_SIGMA: f32 = 0.2;
const PROCESS_SIGMA: f32 = 0.3;
const TORQUE_SIGMA: f32 = 6.0;
const RPM_SIGMA: f32 = 20.0;
const LOAD_SIGMA: f32 = 2.0;

/// Advances the state by one tick.
///
/// The model is short-memory: only the previous air temperature and tool
/// wear carry over; everything else is rederived in dependency order. The
/// torque floor keeps the P/τ division away from a blow-up. Total over its
/// domain, no side effects beyond the state itself.
pub fn advance<C: CellContext + ?Sized>(
    state: &mut AssetState,
    ctx: &C,
    battery_low_probability: f64,
) {
    state.air_temperature =
        (state.air_temperature + ctx.jitter(AIR_SIGMA)).clamp(AIR_MIN, AIR_MAX);

    state.process_temperature =
        state.air_temperature + PROCESS_OFFSET + ctx.jitter(PROCESS_SIGMA);

    state.torque = (TORQUE_BASE + ctx.jitter(TORQUE_SIGMA)).max(TORQUE_FLOOR);

    let rpm = (POWER_W / state.torque) * (60.0 / (2.0 * std::f32::consts::PI))
        + ctx.jitter(RPM_SIGMA);
    state.rotational_speed = rpm.clamp(RPM_MIN, RPM_MAX);

    state.velocity =
        ((state.rotational_speed - RPM_MIN) / (RPM_MAX - RPM_MIN)).clamp(0.0, 1.0);

    state.load =
        (LOAD_BASE + LOAD_PER_TORQUE * state.torque + ctx.jitter(LOAD_SIGMA)).clamp(0.0, 100.0);

    state.tool_wear += state.product_type.wear_increment();

    state.connected = true;
    state.running = true;
    state.battery_low = ctx.chance(battery_low_probability);
}
