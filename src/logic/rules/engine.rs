use super::{clay::ClayRule, loam::LoamRule, sand::SandRule, CropRule, GrowingConditions};

/// Returned when no soil rule matches
pub const GENERIC_CROPS: [&str; 3] = ["Maize", "Beans", "Vegetables"];

pub struct CropRulesEngine {
    rules: Vec<Box<dyn CropRule>>,
}

impl CropRulesEngine {
    pub fn new() -> Self {
        // First match wins, so "sandy loam" is treated as loam
        let rules: Vec<Box<dyn CropRule>> =
            vec![Box::new(LoamRule), Box::new(ClayRule), Box::new(SandRule)];

        Self { rules }
    }

    /// Crop names for a soil description, matched case-insensitively by substring
    pub fn evaluate(&self, soil_type: &str, conditions: &GrowingConditions) -> Vec<String> {
        let soil = soil_type.to_lowercase();

        let crops = match self.rules.iter().find(|rule| rule.applies_to(&soil)) {
            Some(rule) => {
                tracing::debug!(rule = rule.id(), soil = %soil_type, "Matched crop rule");
                rule.evaluate(conditions)
            }
            None => GENERIC_CROPS.to_vec(),
        };

        crops.into_iter().map(String::from).collect()
    }

    pub fn list_rules(&self) -> Vec<(&'static str, &'static str)> {
        self.rules.iter().map(|r| (r.id(), r.name())).collect()
    }
}

impl Default for CropRulesEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crops(soil: &str, rainfall: f64, temperature: f64) -> Vec<String> {
        CropRulesEngine::new().evaluate(soil, &GrowingConditions::new(rainfall, temperature))
    }

    #[test]
    fn reference_cases() {
        assert_eq!(crops("loam", 60.0, 28.0), ["Maize", "Beans", "Sorghum", "Cotton"]);
        assert_eq!(crops("clay", 70.0, 15.0), ["Rice", "Sugarcane", "Soybeans"]);
        assert_eq!(
            crops("sandy", 5.0, 40.0),
            ["Cassava", "Sweet Potatoes", "Groundnuts", "Millet"]
        );
        assert_eq!(crops("peat", 10.0, 10.0), ["Maize", "Beans", "Vegetables"]);
    }

    #[test]
    fn soil_match_is_case_insensitive_substring() {
        assert_eq!(crops("Silty LOAM", 60.0, 28.0), crops("loam", 60.0, 28.0));
        assert_eq!(crops("Heavy Clay", 70.0, 15.0), crops("clay", 70.0, 15.0));
    }

    #[test]
    fn loam_takes_precedence_over_sand() {
        assert_eq!(crops("sandy loam", 10.0, 10.0), ["Wheat", "Barley", "Chickpeas"]);
    }

    #[test]
    fn evaluation_is_deterministic() {
        assert_eq!(crops("clay", 61.0, 20.0), crops("clay", 61.0, 20.0));
    }

    #[test]
    fn lists_rules_in_match_order() {
        let ids: Vec<&str> = CropRulesEngine::new()
            .list_rules()
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(ids, vec!["loam", "clay", "sand"]);
    }
}
