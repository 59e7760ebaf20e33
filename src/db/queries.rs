use crate::db::Database;
use crate::error::Result;
use crate::models::{CropRecommendation, DailyAggregate, HistoryEntry, InsightItem, InsightLogEntry};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Row};
use tracing::warn;

/// Fixed-width UTC timestamps so text ordering matches time ordering
fn timestamp_to_sql(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_json<T: serde::de::DeserializeOwned>(idx: usize, value: &str) -> rusqlite::Result<T> {
    serde_json::from_str(value)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn keep_valid<T>(table: &str, row: rusqlite::Result<T>) -> Option<T> {
    match row {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(table = %table, error = %e, "Skipping unreadable row");
            None
        }
    }
}

// Forecast Snapshot Queries

impl Database {
    /// Store one forecast snapshot. Every cycle is a new independent entry.
    pub fn insert_forecast_snapshot(
        &self,
        region: &str,
        forecast: &[DailyAggregate],
        captured_at: DateTime<Utc>,
    ) -> Result<i64> {
        let forecast_json = serde_json::to_string(forecast)?;
        self.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO forecast_snapshots (region, forecast, captured_at)
                VALUES (?1, ?2, ?3)
                "#,
                params![region, forecast_json, timestamp_to_sql(&captured_at)],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// All snapshots, newest first, optionally restricted to one region
    pub fn forecast_history(&self, region: Option<&str>) -> Result<Vec<HistoryEntry>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                r#"
                SELECT id, region, forecast, captured_at FROM forecast_snapshots
                WHERE ?1 IS NULL OR region = ?1
                ORDER BY captured_at DESC, id DESC
                "#,
            )?;
            let entries = stmt
                .query_map([region], row_to_history_entry)?
                .filter_map(|r| keep_valid("forecast_snapshots", r))
                .collect();
            Ok(entries)
        })
    }
}

fn row_to_history_entry(row: &Row) -> rusqlite::Result<HistoryEntry> {
    let forecast_str: String = row.get("forecast")?;
    let captured_at_str: String = row.get("captured_at")?;

    Ok(HistoryEntry {
        id: row.get("id")?,
        region: row.get("region")?,
        forecast: parse_json(2, &forecast_str)?,
        captured_at: parse_timestamp(3, &captured_at_str)?,
    })
}

// Crop Recommendation Queries

impl Database {
    pub fn insert_crop_recommendation(&self, record: &CropRecommendation) -> Result<()> {
        let crops_json = serde_json::to_string(&record.recommended_crops)?;
        self.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO crop_recommendations
                    (id, farmer_id, soil_type, rainfall, temperature, recommended_crops, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    record.id,
                    record.farmer_id,
                    record.soil_type,
                    record.rainfall,
                    record.temperature,
                    crops_json,
                    timestamp_to_sql(&record.created_at),
                ],
            )?;
            Ok(())
        })
    }

    pub fn recommendations_for_farmer(&self, farmer_id: &str) -> Result<Vec<CropRecommendation>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                r#"
                SELECT id, farmer_id, soil_type, rainfall, temperature, recommended_crops, created_at
                FROM crop_recommendations
                WHERE farmer_id = ?1
                ORDER BY created_at DESC, rowid DESC
                "#,
            )?;
            let records = stmt
                .query_map([farmer_id], row_to_crop_recommendation)?
                .filter_map(|r| keep_valid("crop_recommendations", r))
                .collect();
            Ok(records)
        })
    }
}

fn row_to_crop_recommendation(row: &Row) -> rusqlite::Result<CropRecommendation> {
    let crops_str: String = row.get("recommended_crops")?;
    let created_at_str: String = row.get("created_at")?;

    Ok(CropRecommendation {
        id: row.get("id")?,
        farmer_id: row.get("farmer_id")?,
        soil_type: row.get("soil_type")?,
        rainfall: row.get("rainfall")?,
        temperature: row.get("temperature")?,
        recommended_crops: parse_json(5, &crops_str)?,
        created_at: parse_timestamp(6, &created_at_str)?,
    })
}

// Insight Log Queries

impl Database {
    pub fn insert_insight_log(
        &self,
        region: &str,
        insights: &[InsightItem],
        created_at: DateTime<Utc>,
    ) -> Result<i64> {
        let insights_json = serde_json::to_string(insights)?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO insight_logs (region, insights, created_at) VALUES (?1, ?2, ?3)",
                params![region, insights_json, timestamp_to_sql(&created_at)],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn recent_insight_logs(
        &self,
        region: Option<&str>,
        limit: usize,
    ) -> Result<Vec<InsightLogEntry>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                r#"
                SELECT id, region, insights, created_at FROM insight_logs
                WHERE ?1 IS NULL OR region = ?1
                ORDER BY created_at DESC, id DESC
                LIMIT ?2
                "#,
            )?;
            let entries = stmt
                .query_map(params![region, limit as i64], row_to_insight_log)?
                .filter_map(|r| keep_valid("insight_logs", r))
                .collect();
            Ok(entries)
        })
    }
}

fn row_to_insight_log(row: &Row) -> rusqlite::Result<InsightLogEntry> {
    let insights_str: String = row.get("insights")?;
    let created_at_str: String = row.get("created_at")?;

    Ok(InsightLogEntry {
        id: row.get("id")?,
        region: row.get("region")?,
        insights: parse_json(2, &insights_str)?,
        created_at: parse_timestamp(3, &created_at_str)?,
    })
}
