use crate::db::Database;
use crate::error::{FarmcastError, Result};
use crate::logic::rules::{CropRulesEngine, GrowingConditions};
use crate::models::{CropRecommendation, RecommendationRequest};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Runs the crop rules and records every answer in the recommendation log.
///
/// A recommendation only counts as given once it is stored: if the write
/// fails, the caller gets the error and no crops.
#[derive(Clone)]
pub struct RecommendationService {
    db: Database,
    engine: Arc<CropRulesEngine>,
}

impl RecommendationService {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            engine: Arc::new(CropRulesEngine::new()),
        }
    }

    pub fn recommend(&self, request: &RecommendationRequest) -> Result<CropRecommendation> {
        validate(request)?;

        let conditions = GrowingConditions::new(request.rainfall, request.temperature);
        let crops = self.engine.evaluate(&request.soil_type, &conditions);

        let record = CropRecommendation {
            id: Uuid::new_v4().to_string(),
            farmer_id: request.farmer_id.clone(),
            soil_type: request.soil_type.clone(),
            rainfall: request.rainfall,
            temperature: request.temperature,
            recommended_crops: crops,
            created_at: Utc::now(),
        };

        self.db.insert_crop_recommendation(&record)?;

        info!(
            id = %record.id,
            soil = %record.soil_type,
            crops = record.recommended_crops.len(),
            "Recorded crop recommendation"
        );

        Ok(record)
    }

    pub fn history(&self, farmer_id: &str) -> Result<Vec<CropRecommendation>> {
        self.db.recommendations_for_farmer(farmer_id)
    }
}

fn validate(request: &RecommendationRequest) -> Result<()> {
    if request.soil_type.trim().is_empty() {
        return Err(FarmcastError::InvalidData("soilType must not be empty".into()));
    }
    if !request.rainfall.is_finite() {
        return Err(FarmcastError::InvalidData(
            "rainfall must be a finite number".into(),
        ));
    }
    if !request.temperature.is_finite() {
        return Err(FarmcastError::InvalidData(
            "temperature must be a finite number".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> RecommendationService {
        RecommendationService::new(Database::open_in_memory().unwrap())
    }

    #[test]
    fn recommendation_is_logged_with_id() {
        let service = service();
        let request = RecommendationRequest::new("loam", 60.0, 28.0).with_farmer("farmer-1");

        let record = service.recommend(&request).unwrap();
        assert_eq!(
            record.recommended_crops,
            vec!["Maize", "Beans", "Sorghum", "Cotton"]
        );
        assert!(Uuid::parse_str(&record.id).is_ok());

        let history = service.history("farmer-1").unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, record.id);
        assert_eq!(history[0].recommended_crops, record.recommended_crops);
    }

    #[test]
    fn anonymous_requests_are_logged_too() {
        let service = service();
        let record = service
            .recommend(&RecommendationRequest::new("peat", 10.0, 10.0))
            .unwrap();
        assert!(record.farmer_id.is_none());

        let count: i64 = service
            .db
            .with_conn(|conn| {
                Ok(conn.query_row("SELECT COUNT(*) FROM crop_recommendations", [], |r| r.get(0))?)
            })
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn storage_failure_aborts_recommendation() {
        let service = service();
        service
            .db
            .with_conn(|conn| {
                conn.execute_batch("DROP TABLE crop_recommendations;")?;
                Ok(())
            })
            .unwrap();

        let err = service
            .recommend(&RecommendationRequest::new("clay", 70.0, 15.0))
            .unwrap_err();
        assert!(matches!(err, FarmcastError::Database(_)));
    }

    #[test]
    fn rejects_non_finite_and_empty_input() {
        let service = service();
        let err = service
            .recommend(&RecommendationRequest::new("loam", f64::NAN, 20.0))
            .unwrap_err();
        assert!(matches!(err, FarmcastError::InvalidData(_)));

        let err = service
            .recommend(&RecommendationRequest::new("  ", 10.0, 20.0))
            .unwrap_err();
        assert!(matches!(err, FarmcastError::InvalidData(_)));
    }
}
