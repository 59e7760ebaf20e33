use crate::config::ForecastConfig;
use crate::datasources::{InsightGenerator, SampleSource};
use crate::db::Database;
use crate::error::{FarmcastError, Result};
use crate::logic::aggregation::DailyAggregator;
use crate::logic::insights;
use crate::models::{DailyAggregate, ForecastSet, InsightItem};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::{debug, info, warn};

/// Result of one fetch → aggregate → insight run for a region
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleReport {
    pub region: String,
    pub captured_at: DateTime<Utc>,
    pub forecast: Vec<DailyAggregate>,
    pub insights: Vec<InsightItem>,
    /// Row id of the stored snapshot, if the write succeeded
    #[serde(skip)]
    pub snapshot_id: Option<i64>,
}

/// How a cycle ended.
///
/// `Degraded` still carries a full forecast; only the insights came from the
/// local fallback list.
#[derive(Debug)]
pub enum CycleOutcome {
    Complete(CycleReport),
    Degraded { report: CycleReport, reason: String },
    Failed(FarmcastError),
}

impl CycleOutcome {
    pub fn report(&self) -> Option<&CycleReport> {
        match self {
            CycleOutcome::Complete(report) | CycleOutcome::Degraded { report, .. } => Some(report),
            CycleOutcome::Failed(_) => None,
        }
    }

    /// Report plus the degradation reason, or the hard failure
    pub fn into_result(self) -> Result<(CycleReport, Option<String>)> {
        match self {
            CycleOutcome::Complete(report) => Ok((report, None)),
            CycleOutcome::Degraded { report, reason } => Ok((report, Some(reason))),
            CycleOutcome::Failed(e) => Err(e),
        }
    }
}

/// Runs aggregate cycles.
///
/// Starting a cycle supersedes any cycle still in flight: the older one is
/// dropped at its next await point and returns `FarmcastError::Superseded`.
/// Only the newest cycle may replace the published report, and a failed cycle
/// leaves the previous report in place.
pub struct ForecastService {
    db: Database,
    samples: Arc<dyn SampleSource>,
    insights: Arc<dyn InsightGenerator>,
    aggregator: DailyAggregator,
    generation: watch::Sender<u64>,
    current: Arc<RwLock<Option<CycleReport>>>,
}

impl ForecastService {
    pub fn new(
        config: &ForecastConfig,
        db: Database,
        samples: Arc<dyn SampleSource>,
        insights: Arc<dyn InsightGenerator>,
    ) -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            db,
            samples,
            insights,
            aggregator: DailyAggregator::new(config.bucket_key, config.max_days),
            generation,
            current: Arc::new(RwLock::new(None)),
        }
    }

    /// Most recent successfully published report
    pub async fn current(&self) -> Option<CycleReport> {
        self.current.read().await.clone()
    }

    pub async fn run_cycle(&self, region: &str) -> CycleOutcome {
        let mut ticket = 0;
        self.generation.send_modify(|g| {
            *g += 1;
            ticket = *g;
        });
        let watcher = self.generation.subscribe();

        info!(region = %region, cycle = ticket, "Starting forecast cycle");

        let outcome = tokio::select! {
            outcome = self.execute(region) => outcome,
            _ = superseded(watcher, ticket) => {
                info!(region = %region, cycle = ticket, "Forecast cycle superseded");
                return CycleOutcome::Failed(FarmcastError::Superseded(region.to_string()));
            }
        };

        if let Some(report) = outcome.report() {
            let mut current = self.current.write().await;
            if *self.generation.borrow() == ticket {
                *current = Some(report.clone());
            } else {
                debug!(cycle = ticket, "Newer cycle started, not publishing report");
            }
        }

        match &outcome {
            CycleOutcome::Complete(report) => {
                info!(region = %region, days = report.forecast.len(), "Forecast cycle complete")
            }
            CycleOutcome::Degraded { reason, .. } => {
                warn!(region = %region, reason = %reason, "Forecast cycle degraded, using fallback insights")
            }
            CycleOutcome::Failed(e) => {
                warn!(region = %region, error = %e, "Forecast cycle failed")
            }
        }

        outcome
    }

    async fn execute(&self, region: &str) -> CycleOutcome {
        let samples = match self.samples.fetch_samples(region).await {
            Ok(samples) => samples,
            Err(e) => return CycleOutcome::Failed(e),
        };
        debug!(region = %region, samples = samples.len(), "Fetched raw samples");

        let captured_at = Utc::now();
        let forecast = ForecastSet::new(region, self.aggregator.aggregate(&samples));

        // Last await point; nothing is stored for a cycle dropped before it returns
        let generated = self.generate_insights(&forecast).await;

        let snapshot_id = match self
            .db
            .insert_forecast_snapshot(region, &forecast.days, captured_at)
        {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(region = %region, error = %e, "Failed to store forecast snapshot");
                None
            }
        };

        let report = |insights: Vec<InsightItem>| CycleReport {
            region: region.to_string(),
            captured_at,
            forecast: forecast.days.clone(),
            insights,
            snapshot_id,
        };

        match generated {
            Ok(parsed) => {
                if let Err(e) = self.db.insert_insight_log(region, &parsed, Utc::now()) {
                    warn!(region = %region, error = %e, "Failed to store insight log");
                }
                if parsed.len() < insights::INSIGHT_COUNT {
                    debug!(
                        parsed = parsed.len(),
                        "Insight text had fewer items than expected, padding from fallback"
                    );
                }
                CycleOutcome::Complete(report(insights::complete_insights(parsed, region)))
            }
            Err(reason) => CycleOutcome::Degraded {
                report: report(insights::fallback_insights(region)),
                reason,
            },
        }
    }

    async fn generate_insights(
        &self,
        forecast: &ForecastSet,
    ) -> std::result::Result<Vec<InsightItem>, String> {
        let prompt = insights::build_prompt(forecast);
        debug!(prompt = %prompt, "Requesting insights");

        let response = self
            .insights
            .generate(&prompt)
            .await
            .map_err(|e| e.to_string())?;

        insights::interpret_response(&response)
            .ok_or_else(|| "Insight response contained no usable text".to_string())
    }
}

/// Resolves once a cycle newer than `ticket` has started
async fn superseded(mut watcher: watch::Receiver<u64>, ticket: u64) {
    loop {
        if *watcher.borrow_and_update() != ticket {
            return;
        }
        if watcher.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
