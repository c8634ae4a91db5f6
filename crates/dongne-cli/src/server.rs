//! HTTP boundary: `/api/realestate` and `/api/realestate/baseline`.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{NaiveDate, SecondsFormat, Utc};
use dongne_core::{ApartmentAggregate, Deal, FlaggedDeal, MarketSummary};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::ingest::{IngestReport, IngestService};

const CACHE_REPORT: &str = "public, max-age=1800";
const CACHE_NONE: &str = "no-cache, no-store, must-revalidate";

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<IngestService>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/realestate", get(get_report).post(post_action))
        .route("/api/realestate/baseline", get(get_baseline))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ── Errors ──

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Internal(e) => {
                error!(error = %e, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    e.to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "error": code,
            "message": message,
            "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }));

        (status, [(header::CACHE_CONTROL, CACHE_NONE)], body).into_response()
    }
}

// ── Wire types ──

#[derive(Debug, Deserialize)]
struct ReportQuery {
    /// Kept as text so a malformed value falls back to the default window.
    months: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum PostAction {
    UpdateBaseline,
    Compare {
        #[serde(rename = "previousData")]
        previous_data: Vec<Deal>,
        #[serde(default)]
        months: Option<u32>,
    },
}

#[derive(Debug, Serialize)]
struct ReportData {
    deals: Vec<FlaggedDeal>,
    statistics: MarketSummary,
    apartment_stats: Vec<ApartmentAggregate>,
}

#[derive(Debug, Serialize)]
struct ReportBody {
    success: bool,
    data: ReportData,
    #[serde(rename = "newTransactions")]
    new_transactions: Vec<FlaggedDeal>,
    #[serde(rename = "newCount")]
    new_count: usize,
    #[serde(rename = "baselineDate")]
    baseline_date: Option<NaiveDate>,
    location: String,
    timestamp: String,
}

impl From<IngestReport> for ReportBody {
    fn from(report: IngestReport) -> Self {
        let new_count = report.new_count();
        Self {
            success: true,
            data: ReportData {
                deals: report.deals,
                statistics: report.statistics,
                apartment_stats: report.apartment_stats,
            },
            new_transactions: report.new_deals,
            new_count,
            baseline_date: report.baseline_date,
            location: report.location,
            timestamp: report
                .generated_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

// ── Handlers ──

async fn get_report(State(state): State<AppState>, Query(query): Query<ReportQuery>) -> Response {
    let months = query.months.and_then(|m| m.trim().parse::<i64>().ok());
    // Clamp before narrowing so negative and huge values land on the bounds.
    let months = months.map(|m| m.clamp(1, i64::from(crate::ingest::MAX_MONTHS)) as u32);

    let report = state.service.report(months).await;
    (
        [(header::CACHE_CONTROL, CACHE_REPORT)],
        Json(ReportBody::from(report)),
    )
        .into_response()
}

async fn post_action(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let action: PostAction =
        serde_json::from_slice(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let body = match action {
        PostAction::UpdateBaseline => {
            let snapshot = state.service.update_baseline().await?;
            json!({
                "success": true,
                "message": "baseline updated",
                "baselineSize": snapshot.deals.len(),
                "timestamp": snapshot.captured_at.to_rfc3339_opts(SecondsFormat::Millis, true),
                "lastUpdateDate": snapshot.captured_date,
            })
        }
        PostAction::Compare {
            previous_data,
            months,
        } => {
            let report = state.service.compare(&previous_data, months).await;
            let compared_at = report
                .generated_at
                .to_rfc3339_opts(SecondsFormat::Millis, true);
            let mut body =
                serde_json::to_value(ReportBody::from(report)).map_err(anyhow::Error::from)?;
            if let Some(fields) = body.as_object_mut() {
                fields.insert("comparisonTime".into(), json!(compared_at));
            }
            body
        }
    };

    Ok(([(header::CACHE_CONTROL, CACHE_NONE)], Json(body)).into_response())
}

async fn get_baseline(State(state): State<AppState>) -> Response {
    let status = state.service.baseline_status().await;
    let body = match &status.snapshot {
        Some(snap) => json!({
            "success": true,
            "exists": true,
            "lastUpdateDate": snap.captured_date,
            "timestamp": snap.captured_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            "size": snap.deals.len(),
            "refreshDue": status.refresh_due,
        }),
        None => json!({
            "success": true,
            "exists": false,
            "lastUpdateDate": null,
            "timestamp": null,
            "size": 0,
            "refreshDue": status.refresh_due,
        }),
    };
    ([(header::CACHE_CONTROL, CACHE_NONE)], Json(body)).into_response()
}
