pub mod clay;
pub mod engine;
pub mod loam;
pub mod sand;

pub use engine::CropRulesEngine;

/// Inputs shared by every crop rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowingConditions {
    /// Expected rainfall in mm
    pub rainfall_mm: f64,
    pub temperature_c: f64,
}

impl GrowingConditions {
    pub fn new(rainfall_mm: f64, temperature_c: f64) -> Self {
        Self {
            rainfall_mm,
            temperature_c,
        }
    }
}

/// Trait for soil-specific crop rules
pub trait CropRule: Send + Sync {
    /// Unique identifier for this rule
    fn id(&self) -> &'static str;

    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Whether this rule covers the (lowercased) soil description
    fn applies_to(&self, soil_type: &str) -> bool;

    /// Crops suited to the conditions, best match first
    fn evaluate(&self, conditions: &GrowingConditions) -> Vec<&'static str>;
}
