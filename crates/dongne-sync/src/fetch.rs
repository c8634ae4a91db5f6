//! Month-window pagination over a [`TransactionSource`].

use async_trait::async_trait;
use dongne_core::RawRegistryRecord;
use tracing::{debug, info, warn};

use crate::xml::RegistryPage;
use crate::{RegistryError, RetryPolicy};

/// Registry page size. A page with fewer items is the last one.
pub const PAGE_SIZE: u32 = 100;

/// Upper bound on pages per month in case the registry never returns a short page.
const MAX_PAGES_PER_MONTH: u32 = 200;

/// One page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery<'a> {
    pub area_code: &'a str,
    /// `YYYYMM`.
    pub year_month: &'a str,
    /// 1-based.
    pub page_no: u32,
    pub page_size: u32,
}

/// Anything that can serve registry pages.
#[async_trait]
pub trait TransactionSource: Send + Sync {
    async fn fetch_page(&self, query: PageQuery<'_>) -> Result<RegistryPage, RegistryError>;
}

/// Everything collected over a month window.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub records: Vec<RawRegistryRecord>,
    pub pages: u32,
    /// Months whose pagination stopped on an error.
    pub failed_months: Vec<String>,
}

/// Fetch every record for `area_code` over `year_months`.
///
/// Months and pages are requested one at a time. A page that fails (after
/// `retry` is exhausted) ends that month's pagination; the next month is still
/// fetched.
pub async fn fetch_raw_records(
    source: &dyn TransactionSource,
    area_code: &str,
    year_months: &[String],
    retry: &RetryPolicy,
) -> FetchOutcome {
    let mut outcome = FetchOutcome::default();

    for year_month in year_months {
        info!(area_code, year_month = %year_month, "collecting registry month");
        let mut page_no = 1;
        loop {
            let query = PageQuery {
                area_code,
                year_month,
                page_no,
                page_size: PAGE_SIZE,
            };
            let page = match retry.run("registry page", || source.fetch_page(query)).await {
                Ok(page) => page,
                Err(e) => {
                    warn!(year_month = %year_month, page_no, error = %e, "registry page failed, skipping rest of month");
                    outcome.failed_months.push(year_month.clone());
                    break;
                }
            };
            outcome.pages += 1;

            let item_count = page.item_count;
            debug!(year_month = %year_month, page_no, item_count, "registry page");
            if item_count == 0 {
                break;
            }
            outcome.records.extend(page.records);

            if item_count < PAGE_SIZE as usize {
                break;
            }
            if let Some(total) = page.total_count {
                if page_no.saturating_mul(PAGE_SIZE) >= total {
                    break;
                }
            }
            if page_no >= MAX_PAGES_PER_MONTH {
                warn!(year_month = %year_month, page_no, "page limit reached");
                break;
            }
            page_no += 1;
        }
    }

    info!(
        records = outcome.records.len(),
        pages = outcome.pages,
        failed_months = outcome.failed_months.len(),
        "registry fetch complete"
    );
    outcome
}
