//! The baseline snapshot and the repository seam around it.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};
use dongne_core::Deal;
use serde::{Deserialize, Serialize};

use crate::StoreError;

/// The last operator-confirmed deal list.
///
/// Serialized as `{ "deals": [...], "timestamp": RFC3339, "lastUpdateDate": "YYYY-MM-DD" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineSnapshot {
    pub deals: Vec<Deal>,
    #[serde(rename = "timestamp")]
    pub captured_at: DateTime<FixedOffset>,
    /// Date part of `captured_at`, drives the once-a-day refresh check.
    #[serde(rename = "lastUpdateDate")]
    pub captured_date: NaiveDate,
}

impl BaselineSnapshot {
    pub fn capture(deals: Vec<Deal>, now: DateTime<FixedOffset>) -> Self {
        Self {
            deals,
            captured_at: now,
            captured_date: now.date_naive(),
        }
    }
}

/// Whether a snapshot should be refreshed on `today`.
pub fn refresh_due(snapshot: Option<&BaselineSnapshot>, today: NaiveDate) -> bool {
    snapshot.is_none_or(|s| s.captured_date != today)
}

/// Storage for the single baseline snapshot.
///
/// Reads never fail outward: a missing or unreadable snapshot is `None`.
/// Writes replace the snapshot wholesale.
#[async_trait]
pub trait BaselineRepository: Send + Sync {
    async fn read(&self) -> Option<BaselineSnapshot>;

    async fn write(&self, deals: &[Deal]) -> Result<BaselineSnapshot, StoreError>;

    /// True when no snapshot exists or it was not captured today.
    ///
    /// Advisory only; nothing in the store enforces it.
    async fn is_refresh_due(&self) -> bool;
}
