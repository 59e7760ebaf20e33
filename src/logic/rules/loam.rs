use super::{CropRule, GrowingConditions};

/// Loam soils
///
/// Tiered on warmth and rainfall:
/// - Hot and wet (>25°C, >50mm): warm-season grains and cotton
/// - Warm and moderately wet (>20°C, >30mm): grains and legumes
/// - Otherwise: cool-season cereals
pub struct LoamRule;

impl CropRule for LoamRule {
    fn id(&self) -> &'static str {
        "loam"
    }

    fn name(&self) -> &'static str {
        "Loam Soil Crops"
    }

    fn applies_to(&self, soil_type: &str) -> bool {
        soil_type.contains("loam")
    }

    fn evaluate(&self, conditions: &GrowingConditions) -> Vec<&'static str> {
        let GrowingConditions {
            rainfall_mm,
            temperature_c,
        } = *conditions;

        if temperature_c > 25.0 && rainfall_mm > 50.0 {
            vec!["Maize", "Beans", "Sorghum", "Cotton"]
        } else if temperature_c > 20.0 && rainfall_mm > 30.0 {
            vec!["Maize", "Beans", "Millet", "Groundnuts"]
        } else {
            vec!["Wheat", "Barley", "Chickpeas"]
        }
    }
}
