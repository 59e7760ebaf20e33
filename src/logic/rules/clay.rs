use super::{CropRule, GrowingConditions};

/// Clay soils hold water; only rainfall above 60mm changes the pick.
pub struct ClayRule;

impl CropRule for ClayRule {
    fn id(&self) -> &'static str {
        "clay"
    }

    fn name(&self) -> &'static str {
        "Clay Soil Crops"
    }

    fn applies_to(&self, soil_type: &str) -> bool {
        soil_type.contains("clay")
    }

    fn evaluate(&self, conditions: &GrowingConditions) -> Vec<&'static str> {
        if conditions.rainfall_mm > 60.0 {
            vec!["Rice", "Sugarcane", "Soybeans"]
        } else {
            vec!["Cotton", "Sunflower", "Maize"]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wet_clay() {
        let crops = ClayRule.evaluate(&GrowingConditions::new(70.0, 15.0));
        assert_eq!(crops, vec!["Rice", "Sugarcane", "Soybeans"]);
    }

    #[test]
    fn dry_clay_ignores_temperature() {
        let cold = ClayRule.evaluate(&GrowingConditions::new(60.0, 5.0));
        let hot = ClayRule.evaluate(&GrowingConditions::new(60.0, 40.0));
        assert_eq!(cold, vec!["Cotton", "Sunflower", "Maize"]);
        assert_eq!(cold, hot);
    }
}
