use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of a crop recommendation request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    pub soil_type: String,
    pub rainfall: f64,
    pub temperature: f64,
    #[serde(default)]
    pub farmer_id: Option<String>,
}

impl RecommendationRequest {
    pub fn new(soil_type: impl Into<String>, rainfall: f64, temperature: f64) -> Self {
        Self {
            soil_type: soil_type.into(),
            rainfall,
            temperature,
            farmer_id: None,
        }
    }

    pub fn with_farmer(mut self, farmer_id: impl Into<String>) -> Self {
        self.farmer_id = Some(farmer_id.into());
        self
    }
}

/// A logged recommendation, as stored in the recommendation log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropRecommendation {
    pub id: String,
    pub farmer_id: Option<String>,
    pub soil_type: String,
    pub rainfall: f64,
    pub temperature: f64,
    pub recommended_crops: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Success envelope returned by the recommendation endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub success: bool,
    pub recommendations: Vec<String>,
    pub data: CropRecommendation,
}

impl From<CropRecommendation> for RecommendationResponse {
    fn from(record: CropRecommendation) -> Self {
        Self {
            success: true,
            recommendations: record.recommended_crops.clone(),
            data: record,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_accepts_camel_case_without_farmer() {
        let req: RecommendationRequest =
            serde_json::from_str(r#"{"soilType":"loam","rainfall":60,"temperature":28}"#)
                .unwrap();
        assert_eq!(req.soil_type, "loam");
        assert_eq!(req.rainfall, 60.0);
        assert!(req.farmer_id.is_none());
    }

    #[test]
    fn response_mirrors_record_crops() {
        let record = CropRecommendation {
            id: "abc".into(),
            farmer_id: Some("farmer-1".into()),
            soil_type: "clay".into(),
            rainfall: 70.0,
            temperature: 15.0,
            recommended_crops: vec!["Rice".into(), "Sugarcane".into()],
            created_at: Utc::now(),
        };
        let response = RecommendationResponse::from(record);
        assert!(response.success);
        assert_eq!(response.recommendations, vec!["Rice", "Sugarcane"]);
        assert_eq!(response.data.id, "abc");
    }
}
