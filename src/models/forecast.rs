use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A single sub-daily observation from the weather provider (3-hour steps)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    /// Instant of the sample, carrying the region's UTC offset
    pub timestamp: DateTime<FixedOffset>,
    pub temperature_c: f64,
    /// Absent when the provider reports no precipitation for the step
    pub precipitation_mm: Option<f64>,
}

impl RawSample {
    pub fn new(
        timestamp: DateTime<FixedOffset>,
        temperature_c: f64,
        precipitation_mm: Option<f64>,
    ) -> Self {
        Self {
            timestamp,
            temperature_c,
            precipitation_mm,
        }
    }

    /// Short weekday name in a fixed (English) locale, e.g. "Mon"
    pub fn day_label(&self) -> String {
        self.timestamp.format("%a").to_string()
    }

    /// Calendar date in the region's local time
    pub fn local_date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// How raw samples are grouped into daily buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketKey {
    /// Repeating weekday label. Windows longer than 7 days merge non-adjacent
    /// days that share a weekday name.
    #[default]
    Weekday,
    /// Absolute local calendar date
    CalendarDate,
}

impl BucketKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            BucketKey::Weekday => "weekday",
            BucketKey::CalendarDate => "calendar_date",
        }
    }
}

impl std::fmt::Display for BucketKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One calendar-day summary produced by the daily aggregator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAggregate {
    pub day_label: String,
    /// Local date of the first sample folded into this bucket
    pub first_date: NaiveDate,
    pub total_precipitation: f64,
    /// Rounded to one decimal place
    pub mean_temperature: f64,
    pub sample_count: u32,
    pub soil_moisture_estimate: f64,
}

impl DailyAggregate {
    /// Line used in the insight prompt summary
    pub fn summary_line(&self) -> String {
        format!(
            "{}: {:.1}°C, {:.1}mm rainfall, {:.1}% soil moisture",
            self.day_label,
            self.mean_temperature,
            self.total_precipitation,
            self.soil_moisture_estimate
        )
    }
}

/// Up to seven daily aggregates for one region, in bucketing encounter order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastSet {
    pub region: String,
    pub days: Vec<DailyAggregate>,
}

impl ForecastSet {
    pub fn new(region: impl Into<String>, days: Vec<DailyAggregate>) -> Self {
        Self {
            region: region.into(),
            days,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn total_precipitation(&self) -> f64 {
        self.days.iter().map(|d| d.total_precipitation).sum()
    }

    /// Newline-joined per-day summary lines
    pub fn summary(&self) -> String {
        self.days
            .iter()
            .map(DailyAggregate::summary_line)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A previously captured forecast snapshot read back from the history store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: i64,
    pub region: String,
    pub forecast: Vec<DailyAggregate>,
    pub captured_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(label: &str, temp: f64, rain: f64, moisture: f64) -> DailyAggregate {
        DailyAggregate {
            day_label: label.to_string(),
            first_date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            total_precipitation: rain,
            mean_temperature: temp,
            sample_count: 8,
            soil_moisture_estimate: moisture,
        }
    }

    #[test]
    fn day_label_uses_local_offset() {
        let nairobi = FixedOffset::east_opt(3 * 3600).unwrap();
        // 2024-06-02 22:00 UTC is already Monday in Nairobi
        let ts = Utc
            .with_ymd_and_hms(2024, 6, 2, 22, 0, 0)
            .unwrap()
            .with_timezone(&nairobi);
        let sample = RawSample::new(ts, 18.0, None);
        assert_eq!(sample.day_label(), "Mon");
        assert_eq!(
            sample.local_date(),
            NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
        );
    }

    #[test]
    fn summary_line_format() {
        let line = day("Tue", 22.4, 3.0, 66.0).summary_line();
        assert_eq!(line, "Tue: 22.4°C, 3.0mm rainfall, 66.0% soil moisture");
    }

    #[test]
    fn forecast_summary_joins_lines() {
        let set = ForecastSet::new(
            "Kisumu",
            vec![day("Mon", 20.0, 0.0, 60.0), day("Tue", 21.5, 12.3, 84.6)],
        );
        assert_eq!(
            set.summary(),
            "Mon: 20.0°C, 0.0mm rainfall, 60.0% soil moisture\n\
             Tue: 21.5°C, 12.3mm rainfall, 84.6% soil moisture"
        );
        assert!((set.total_precipitation() - 12.3).abs() < 1e-9);
    }

    #[test]
    fn bucket_key_uses_snake_case() {
        let key: BucketKey = serde_json::from_str(r#""calendar_date""#).unwrap();
        assert_eq!(key, BucketKey::CalendarDate);
        assert_eq!(BucketKey::default().to_string(), "weekday");
    }
}
