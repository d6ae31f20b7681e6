//! Asset state: the mutable physical model plus status flags.

use std::fmt;

/// Product quality class of the part currently being machined.
///
/// The wire form is the single letter "L" / "M" / "H" used by the
/// variable store and the inference payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductType {
    Low,
    #[default]
    Medium,
    High,
}

impl ProductType {
    /// Tool wear accumulated per tick for this product class.
    pub fn wear_increment(&self) -> f32 {
        match self {
            ProductType::High => 5.0,
            ProductType::Medium => 3.0,
            ProductType::Low => 2.0,
        }
    }

    /// Single-letter wire form.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Low => "L",
            ProductType::Medium => "M",
            ProductType::High => "H",
        }
    }

    /// Parses the wire form.
    ///
    /// Empty input means "unset" and yields `None` so the caller can apply
    /// the Medium default. Any other unrecognized letter is treated as Low,
    /// matching the wear table's fallback arm.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "" => None,
            "H" | "h" => Some(ProductType::High),
            "M" | "m" => Some(ProductType::Medium),
            _ => Some(ProductType::Low),
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The full physical-model state of the asset.
///
/// Owned exclusively by the tick loop while it runs; the prediction
/// requester only ever sees the values published to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetState {
    pub product_type: ProductType,

    /// Ambient temperature (K), kept in [296, 304]
    pub air_temperature: f32,

    /// Process temperature (K) = air + 10 + noise, no independent clamp
    pub process_temperature: f32,

    /// Spindle torque (Nm), floored at 5
    pub torque: f32,

    /// Spindle speed (rpm), kept in [500, 1800]
    pub rotational_speed: f32,

    /// Linear normalization of rotational speed into [0, 1]
    pub velocity: f32,

    /// Machine load (%), kept in [0, 100]
    pub load: f32,

    /// Monotone non-decreasing wear accumulator (min)
    pub tool_wear: f32,

    pub connected: bool,
    pub running: bool,
    pub battery_low: bool,
    pub faulty: bool,
}

impl AssetState {
    /// Builds the documented start-of-run state.
    pub fn seeded(product_type: ProductType) -> Self {
        Self {
            product_type,
            air_temperature: 300.0,
            process_temperature: 310.0,
            torque: 40.0,
            rotational_speed: 1000.0,
            velocity: 0.4,
            load: 30.0,
            tool_wear: 0.0,
            connected: false,
            running: false,
            battery_low: false,
            faulty: false,
        }
    }

    /// Negation of `connected`, recomputed on every publish.
    pub fn disconnected(&self) -> bool {
        !self.connected
    }

    /// Negation of `running`, recomputed on every publish.
    pub fn busy(&self) -> bool {
        !self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_type_parse() {
        assert_eq!(ProductType::parse("H"), Some(ProductType::High));
        assert_eq!(ProductType::parse("m"), Some(ProductType::Medium));
        assert_eq!(ProductType::parse("L"), Some(ProductType::Low));
        assert_eq!(ProductType::parse(""), None);
        assert_eq!(ProductType::parse("  "), None);
        // Unknown letters fall into the Low wear arm
        assert_eq!(ProductType::parse("X"), Some(ProductType::Low));
    }

    #[test]
    fn test_product_type_default_is_medium() {
        assert_eq!(ProductType::default(), ProductType::Medium);
    }

    #[test]
    fn test_wear_increments() {
        assert_eq!(ProductType::High.wear_increment(), 5.0);
        assert_eq!(ProductType::Medium.wear_increment(), 3.0);
        assert_eq!(ProductType::Low.wear_increment(), 2.0);
    }

    #[test]
    fn test_seeded_defaults() {
        let state = AssetState::seeded(ProductType::Medium);
        assert_eq!(state.air_temperature, 300.0);
        assert_eq!(state.process_temperature, 310.0);
        assert_eq!(state.torque, 40.0);
        assert_eq!(state.rotational_speed, 1000.0);
        assert_eq!(state.velocity, 0.4);
        assert_eq!(state.load, 30.0);
        assert_eq!(state.tool_wear, 0.0);
        assert!(!state.faulty);
    }

    #[test]
    fn test_derived_flags_are_negations() {
        let mut state = AssetState::seeded(ProductType::Medium);
        assert!(state.disconnected());
        assert!(state.busy());

        state.connected = true;
        state.running = true;
        assert!(!state.disconnected());
        assert!(!state.busy());
    }
}
