//! Ingestion pipeline: registry → normalise → dedupe/aggregate → detect against the baseline.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate};
use dongne_core::{
    Aggregation, ApartmentAggregate, Clock, Deal, FlaggedDeal, MarketSummary,
    dedupe_and_aggregate, detect_new, normalize, recent_year_months,
};
use dongne_store::{BaselineRepository, BaselineSnapshot};
use dongne_sync::{RetryPolicy, TransactionSource, fetch_raw_records};
use tracing::{info, warn};

/// Largest month window a caller may request.
pub const MAX_MONTHS: u32 = 12;

/// What to ingest and how.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Administrative area code (`LAWD_CD`), e.g. `28200` for 인천 남동구.
    pub area_code: String,
    /// Only deals in this neighborhood are kept.
    pub neighborhood: String,
    /// Display label for the covered area.
    pub location_label: String,
    /// Default month window.
    pub months: u32,
    /// Write the first successful ingestion as the baseline when none exists.
    pub seed_baseline: bool,
    pub retry: RetryPolicy,
}

/// Deals collected for one window.
#[derive(Debug)]
pub struct Collected {
    pub aggregation: Aggregation,
    /// Months whose pagination stopped on an error.
    pub failed_months: Vec<String>,
}

/// Detection result ready for presentation.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub deals: Vec<FlaggedDeal>,
    pub statistics: MarketSummary,
    pub apartment_stats: Vec<ApartmentAggregate>,
    pub new_deals: Vec<FlaggedDeal>,
    /// Capture date of the baseline compared against, if any.
    pub baseline_date: Option<NaiveDate>,
    pub location: String,
    pub generated_at: DateTime<FixedOffset>,
}

impl IngestReport {
    pub fn new_count(&self) -> usize {
        self.new_deals.len()
    }
}

/// State of the stored baseline.
#[derive(Debug, Clone)]
pub struct BaselineStatus {
    pub snapshot: Option<BaselineSnapshot>,
    pub refresh_due: bool,
}

pub struct IngestService {
    source: Arc<dyn TransactionSource>,
    baseline: Arc<dyn BaselineRepository>,
    clock: Arc<dyn Clock>,
    config: IngestConfig,
}

impl IngestService {
    pub fn new(
        source: Arc<dyn TransactionSource>,
        baseline: Arc<dyn BaselineRepository>,
        clock: Arc<dyn Clock>,
        config: IngestConfig,
    ) -> Self {
        Self {
            source,
            baseline,
            clock,
            config,
        }
    }

    /// Requested window clamped to `1..=MAX_MONTHS`; the configured default otherwise.
    pub fn months_or_default(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.config.months)
            .clamp(1, MAX_MONTHS)
    }

    /// Fetch, normalise and aggregate the trailing `months` window.
    pub async fn collect(&self, months: u32) -> Collected {
        let year_months = recent_year_months(self.clock.today(), months);
        let outcome = fetch_raw_records(
            self.source.as_ref(),
            &self.config.area_code,
            &year_months,
            &self.config.retry,
        )
        .await;

        let fetched = outcome.records.len();
        let deals: Vec<Deal> = outcome
            .records
            .iter()
            .filter_map(|raw| normalize(raw, &self.config.neighborhood))
            .collect();
        info!(
            fetched,
            kept = deals.len(),
            neighborhood = %self.config.neighborhood,
            "normalised registry records"
        );

        Collected {
            aggregation: dedupe_and_aggregate(deals, months),
            failed_months: outcome.failed_months,
        }
    }

    /// Run the pipeline and flag deals missing from the stored baseline.
    ///
    /// An existing baseline is never modified here. When none exists and
    /// seeding is enabled, a complete non-empty ingestion becomes the first one.
    pub async fn report(&self, months: Option<u32>) -> IngestReport {
        let collected = self.collect(self.months_or_default(months)).await;
        let baseline = self.baseline.read().await;

        let report = self.build_report(
            collected.aggregation,
            baseline.as_ref().map(|b| b.deals.as_slice()),
            baseline.as_ref().map(|b| b.captured_date),
        );
        info!(
            total = report.deals.len(),
            new = report.new_count(),
            baseline = ?report.baseline_date,
            "new-deal detection complete"
        );

        if baseline.is_none()
            && self.config.seed_baseline
            && collected.failed_months.is_empty()
            && !report.deals.is_empty()
        {
            let clean: Vec<Deal> = report
                .deals
                .iter()
                .cloned()
                .map(FlaggedDeal::into_deal)
                .collect();
            match self.baseline.write(&clean).await {
                Ok(snap) => info!(deals = snap.deals.len(), "seeded initial baseline"),
                Err(e) => warn!(error = %e, "could not seed initial baseline"),
            }
        }

        report
    }

    /// Flag deals missing from a caller-supplied previous list. The store is not consulted.
    pub async fn compare(&self, previous: &[Deal], months: Option<u32>) -> IngestReport {
        let collected = self.collect(self.months_or_default(months)).await;
        let report = self.build_report(collected.aggregation, Some(previous), None);
        info!(
            previous = previous.len(),
            new = report.new_count(),
            "compared against supplied deals"
        );
        report
    }

    /// Checkpoint the current clean deal list as the new baseline.
    ///
    /// Refuses to checkpoint when any month failed to download, since the
    /// missing deals would all show up as new afterwards.
    pub async fn update_baseline(&self) -> anyhow::Result<BaselineSnapshot> {
        let collected = self.collect(self.months_or_default(None)).await;
        if !collected.failed_months.is_empty() {
            anyhow::bail!(
                "registry fetch incomplete for {}; baseline not updated",
                collected.failed_months.join(", ")
            );
        }
        let snapshot = self.baseline.write(&collected.aggregation.deals).await?;
        Ok(snapshot)
    }

    pub async fn baseline_status(&self) -> BaselineStatus {
        BaselineStatus {
            snapshot: self.baseline.read().await,
            refresh_due: self.baseline.is_refresh_due().await,
        }
    }

    fn build_report(
        &self,
        aggregation: Aggregation,
        baseline: Option<&[Deal]>,
        baseline_date: Option<NaiveDate>,
    ) -> IngestReport {
        let Aggregation {
            deals,
            mut stats,
            summary,
        } = aggregation;
        let detection = detect_new(&deals, baseline);
        detection.apply_new_counts(&mut stats);

        IngestReport {
            deals: detection.deals,
            statistics: summary,
            apartment_stats: stats,
            new_deals: detection.new_deals,
            baseline_date,
            location: self.config.location_label.clone(),
            generated_at: self.clock.now(),
        }
    }
}
