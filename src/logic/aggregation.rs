use crate::models::{BucketKey, DailyAggregate, RawSample};
use chrono::NaiveDate;
use std::collections::HashMap;

pub const MAX_FORECAST_DAYS: usize = 7;

pub const SOIL_MOISTURE_MIN: f64 = 40.0;
pub const SOIL_MOISTURE_MAX: f64 = 100.0;
const SOIL_MOISTURE_BASELINE: f64 = 80.0;
const SOIL_MOISTURE_PIVOT_MM: f64 = 10.0;
const SOIL_MOISTURE_GAIN: f64 = 2.0;

/// Heuristic soil moisture (%) from a day's total precipitation.
///
/// Linear response around 10 mm, saturating at 40% and 100%.
pub fn soil_moisture_estimate(total_precipitation_mm: f64) -> f64 {
    if total_precipitation_mm.is_nan() {
        return SOIL_MOISTURE_MIN;
    }
    (SOIL_MOISTURE_BASELINE
        + (total_precipitation_mm - SOIL_MOISTURE_PIVOT_MM) * SOIL_MOISTURE_GAIN)
        .clamp(SOIL_MOISTURE_MIN, SOIL_MOISTURE_MAX)
}

/// Round to one decimal place
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

struct Bucket {
    label: String,
    first_date: NaiveDate,
    precipitation: f64,
    temperature_sum: f64,
    count: u32,
}

impl Bucket {
    fn open(sample: &RawSample) -> Self {
        Self {
            label: sample.day_label(),
            first_date: sample.local_date(),
            precipitation: 0.0,
            temperature_sum: 0.0,
            count: 0,
        }
    }

    fn fold(&mut self, sample: &RawSample) {
        self.precipitation += sample
            .precipitation_mm
            .filter(|p| p.is_finite())
            .unwrap_or(0.0);
        self.temperature_sum += sample.temperature_c;
        self.count += 1;
    }

    fn finish(self) -> DailyAggregate {
        DailyAggregate {
            day_label: self.label,
            first_date: self.first_date,
            total_precipitation: self.precipitation,
            mean_temperature: round_tenth(self.temperature_sum / self.count as f64),
            sample_count: self.count,
            soil_moisture_estimate: soil_moisture_estimate(self.precipitation),
        }
    }
}

/// Groups sub-daily samples into per-day summaries
#[derive(Debug, Clone, Copy)]
pub struct DailyAggregator {
    key: BucketKey,
    max_days: usize,
}

impl DailyAggregator {
    pub fn new(key: BucketKey, max_days: usize) -> Self {
        Self { key, max_days }
    }

    fn bucket_key(&self, sample: &RawSample) -> String {
        match self.key {
            BucketKey::Weekday => sample.day_label(),
            BucketKey::CalendarDate => sample.local_date().to_string(),
        }
    }

    /// Fold samples into buckets in encounter order and keep the first
    /// `max_days`. Buckets are never re-sorted by date.
    pub fn aggregate(&self, samples: &[RawSample]) -> Vec<DailyAggregate> {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut buckets: Vec<Bucket> = Vec::new();

        for sample in samples {
            let slot = *index.entry(self.bucket_key(sample)).or_insert_with(|| {
                buckets.push(Bucket::open(sample));
                buckets.len() - 1
            });
            buckets[slot].fold(sample);
        }

        buckets
            .into_iter()
            .take(self.max_days)
            .map(Bucket::finish)
            .collect()
    }
}

impl Default for DailyAggregator {
    fn default() -> Self {
        Self::new(BucketKey::Weekday, MAX_FORECAST_DAYS)
    }
}
