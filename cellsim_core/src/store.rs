//! Variable store seam: named, typed slots shared with the host process.
//!
//! The engine never hardcodes lookup mechanics. It publishes through the
//! [`VariableStore`] trait and only fixes the set of slot names ([`keys`])
//! and their types. The store guarantees single-key atomicity and nothing
//! more; readers may observe a mid-tick mix of old and new fields.

use crate::error::StoreError;
use std::collections::HashMap;
use std::sync::RwLock;

/// Slot names published by the engine.
pub mod keys {
    pub const PRODUCT_TYPE: &str = "product_type";
    pub const AIR_TEMPERATURE: &str = "air_temperature";
    pub const PROCESS_TEMPERATURE: &str = "process_temperature";
    /// Mirror of the process temperature, kept for display consumers.
    pub const TEMPERATURE: &str = "temperature";
    pub const TORQUE: &str = "torque";
    pub const ROTATIONAL_SPEED: &str = "rotational_speed";
    pub const VELOCITY: &str = "velocity";
    pub const LOAD: &str = "load";
    pub const TOOL_WEAR: &str = "tool_wear";
    pub const CONNECTED: &str = "connected";
    pub const DISCONNECTED: &str = "disconnected";
    pub const RUNNING: &str = "running";
    pub const BUSY: &str = "busy";
    pub const BATTERY_LOW: &str = "battery_low";
    pub const FAULTY: &str = "faulty";
    pub const FAILURE: &str = "failure";
    pub const FAILURE_REASON: &str = "failure_reason";

    /// Every slot the engine reads or writes.
    pub const ALL: &[&str] = &[
        PRODUCT_TYPE,
        AIR_TEMPERATURE,
        PROCESS_TEMPERATURE,
        TEMPERATURE,
        TORQUE,
        ROTATIONAL_SPEED,
        VELOCITY,
        LOAD,
        TOOL_WEAR,
        CONNECTED,
        DISCONNECTED,
        RUNNING,
        BUSY,
        BATTERY_LOW,
        FAULTY,
        FAILURE,
        FAILURE_REASON,
    ];
}

/// A typed slot value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Float(f32),
    Bool(bool),
    Text(String),
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// Named read/write slots with single-key atomicity.
///
/// Implementations must be safe to call from the tick task and the
/// prediction requester concurrently.
pub trait VariableStore: Send + Sync + 'static {
    /// Writes a slot. Fails if the store does not know the slot.
    fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;

    /// Reads a slot. Fails if the store does not know the slot.
    fn get(&self, key: &str) -> Result<Value, StoreError>;

    /// Reads a float slot.
    fn get_f32(&self, key: &str) -> Result<f32, StoreError> {
        match self.get(key)? {
            Value::Float(v) => Ok(v),
            _ => Err(StoreError::TypeMismatch {
                slot: key.to_string(),
                expected: "float",
            }),
        }
    }

    /// Reads a boolean slot.
    fn get_bool(&self, key: &str) -> Result<bool, StoreError> {
        match self.get(key)? {
            Value::Bool(v) => Ok(v),
            _ => Err(StoreError::TypeMismatch {
                slot: key.to_string(),
                expected: "bool",
            }),
        }
    }

    /// Reads a text slot.
    fn get_text(&self, key: &str) -> Result<String, StoreError> {
        match self.get(key)? {
            Value::Text(v) => Ok(v),
            _ => Err(StoreError::TypeMismatch {
                slot: key.to_string(),
                expected: "text",
            }),
        }
    }
}

/// In-memory store backed by a `RwLock<HashMap>`.
///
/// `new()` pre-declares every engine slot (initialized to empty text, the
/// "unset" state) and accepts writes to arbitrary extra keys. `with_slots()`
/// builds a strict store that rejects any key outside the given set, which
/// is how a misconfigured host binding surfaces as a fail-fast start error.
pub struct MemoryStore {
    slots: RwLock<HashMap<String, Value>>,
    strict: bool,
}

impl MemoryStore {
    /// Creates an open store with all engine slots declared.
    pub fn new() -> Self {
        Self::from_keys(keys::ALL, false)
    }

    /// Creates a strict store exposing only the given slots.
    pub fn with_slots<'a>(slots: impl IntoIterator<Item = &'a str>) -> Self {
        let slots: Vec<&str> = slots.into_iter().collect();
        Self::from_keys(&slots, true)
    }

    fn from_keys(names: &[&str], strict: bool) -> Self {
        let slots = names
            .iter()
            .map(|k| (k.to_string(), Value::Text(String::new())))
            .collect();
        Self {
            slots: RwLock::new(slots),
            strict,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl VariableStore for MemoryStore {
    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut slots = self.slots.write().unwrap();
        if self.strict && !slots.contains_key(key) {
            return Err(StoreError::UnknownSlot(key.to_string()));
        }
        slots.insert(key.to_string(), value);
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Value, StoreError> {
        self.slots
            .read()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::UnknownSlot(key.to_string()))
    }
}
