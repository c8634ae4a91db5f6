//! HTTP client for the MOLIT apartment trade registry on data.go.kr.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::fetch::{PageQuery, TransactionSource};
use crate::xml::{RegistryPage, parse_page};
use crate::RegistryError;

/// Apartment trade endpoint (국토교통부 아파트 매매 실거래가).
pub const MOLIT_APT_TRADE_URL: &str =
    "https://apis.data.go.kr/1613000/RTMSDataSvcAptTrade/getRTMSDataSvcAptTrade";

/// HTTP client for the registry.
pub struct RegistryClient {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl RegistryClient {
    /// Create a client for `base_url` authenticating with `service_key`.
    ///
    /// `service_key` is the decoded key as issued by data.go.kr; it is
    /// URL-encoded on every request.
    pub fn new(base_url: String, service_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key,
        }
    }

    /// Like [`new`](Self::new) but with a per-request timeout.
    pub fn with_timeout(
        base_url: String,
        service_key: String,
        timeout: Duration,
    ) -> Result<Self, RegistryError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key,
        })
    }
}

#[async_trait]
impl TransactionSource for RegistryClient {
    async fn fetch_page(&self, query: PageQuery<'_>) -> Result<RegistryPage, RegistryError> {
        let page_no = query.page_no.to_string();
        let page_size = query.page_size.to_string();

        debug!(
            url = %self.base_url,
            year_month = query.year_month,
            page_no = query.page_no,
            "requesting registry page"
        );
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("serviceKey", self.service_key.as_str()),
                ("LAWD_CD", query.area_code),
                ("DEAL_YMD", query.year_month),
                ("numOfRows", page_size.as_str()),
                ("pageNo", page_no.as_str()),
            ])
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RegistryError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let xml = resp.text().await?;
        parse_page(&xml)
    }
}
