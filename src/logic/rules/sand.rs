use super::{CropRule, GrowingConditions};

/// Sandy soils: drought-tolerant root crops regardless of conditions
pub struct SandRule;

impl CropRule for SandRule {
    fn id(&self) -> &'static str {
        "sand"
    }

    fn name(&self) -> &'static str {
        "Sandy Soil Crops"
    }

    fn applies_to(&self, soil_type: &str) -> bool {
        soil_type.contains("sand")
    }

    fn evaluate(&self, _conditions: &GrowingConditions) -> Vec<&'static str> {
        vec!["Cassava", "Sweet Potatoes", "Groundnuts", "Millet"]
    }
}
