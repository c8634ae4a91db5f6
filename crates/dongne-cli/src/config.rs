//! Command-line and environment settings.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use dongne_core::{Clock, DEFAULT_NEIGHBORHOOD, SystemClock};
use dongne_store::JsonFileBaseline;
use dongne_sync::{MOLIT_APT_TRADE_URL, RegistryClient, RetryPolicy};

use crate::ingest::{IngestConfig, IngestService};

#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// data.go.kr service key for the apartment trade API
    #[arg(long, env = "MOLIT_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Registry endpoint
    #[arg(long, env = "MOLIT_BASE_URL", default_value = MOLIT_APT_TRADE_URL, global = true)]
    pub base_url: String,

    /// Administrative area code (LAWD_CD)
    #[arg(long, env = "DONGNE_AREA_CODE", default_value = "28200", global = true)]
    pub area_code: String,

    /// Neighborhood to keep; everything else is dropped
    #[arg(long, env = "DONGNE_NEIGHBORHOOD", default_value = DEFAULT_NEIGHBORHOOD, global = true)]
    pub neighborhood: String,

    /// Display label for the covered area
    #[arg(long, env = "DONGNE_LOCATION_LABEL", default_value = "인천 남동구 논현동", global = true)]
    pub location_label: String,

    /// Default month window (1-12)
    #[arg(long, env = "DONGNE_MONTHS", default_value_t = 3, global = true)]
    pub months: u32,

    /// Directory holding the baseline snapshot
    #[arg(long, env = "DONGNE_DATA_DIR", default_value = "data", global = true)]
    pub data_dir: PathBuf,

    /// Extra attempts for transient registry failures
    #[arg(long, env = "DONGNE_RETRIES", default_value_t = 0, global = true)]
    pub retries: u32,

    /// First retry delay in milliseconds; doubles per attempt
    #[arg(long, env = "DONGNE_RETRY_BASE_MS", default_value_t = 500, global = true)]
    pub retry_base_ms: u64,

    /// Per-request timeout in seconds
    #[arg(long, env = "DONGNE_TIMEOUT_SECS", global = true)]
    pub timeout_secs: Option<u64>,

    /// Do not write the first ingestion as the baseline when none exists
    #[arg(long, global = true)]
    pub no_seed_baseline: bool,
}

impl Settings {
    pub fn retry_policy(&self) -> RetryPolicy {
        if self.retries == 0 {
            RetryPolicy::none()
        } else {
            RetryPolicy::exponential(self.retries, Duration::from_millis(self.retry_base_ms))
        }
    }

    pub fn ingest_config(&self) -> IngestConfig {
        IngestConfig {
            area_code: self.area_code.clone(),
            neighborhood: self.neighborhood.clone(),
            location_label: self.location_label.clone(),
            months: self.months,
            seed_baseline: !self.no_seed_baseline,
            retry: self.retry_policy(),
        }
    }

    pub fn baseline(&self, clock: Arc<dyn Clock>) -> JsonFileBaseline {
        JsonFileBaseline::in_dir(&self.data_dir, clock)
    }

    pub fn registry_client(&self) -> anyhow::Result<RegistryClient> {
        let key = self
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .context("no registry service key; set MOLIT_API_KEY or pass --api-key")?;
        match self.timeout_secs {
            Some(secs) => Ok(RegistryClient::with_timeout(
                self.base_url.clone(),
                key,
                Duration::from_secs(secs),
            )?),
            None => Ok(RegistryClient::new(self.base_url.clone(), key)),
        }
    }

    /// Wire the registry client, file baseline and KST clock together.
    pub fn build_service(&self) -> anyhow::Result<IngestService> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock::kst());
        let client = self.registry_client()?;
        Ok(IngestService::new(
            Arc::new(client),
            Arc::new(self.baseline(clock.clone())),
            clock,
            self.ingest_config(),
        ))
    }
}
