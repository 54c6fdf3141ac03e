use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use probe_core::{QueryError, RangeQuery};
use probe_model::MetricPoint;
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::PromError;

const RANGE_PATH: &str = "/api/v1/query_range";

/// Where the Prometheus server lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromConfig {
    /// Base URL, e.g. `http://localhost:9090`.
    pub endpoint: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for PromConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9090".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Range queries against a Prometheus server.
#[derive(Debug, Clone)]
pub struct PromClient {
    http: reqwest::Client,
    cfg: PromConfig,
}

impl PromClient {
    pub fn new(cfg: PromConfig) -> Result<Self, PromError> {
        let http = reqwest::Client::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(|e| PromError::Client(e.to_string()))?;
        Ok(Self { http, cfg })
    }

    pub fn config(&self) -> &PromConfig {
        &self.cfg
    }
}

#[async_trait]
impl RangeQuery for PromClient {
    #[instrument(level = "debug", skip(self, start, end, step), fields(endpoint = %self.cfg.endpoint))]
    async fn range_query(
        &self,
        query: &str,
        start: SystemTime,
        end: SystemTime,
        step: Duration,
        label: &str,
    ) -> Result<Vec<MetricPoint>, QueryError> {
        let url = range_url(&self.cfg.endpoint, query, start, end, step)?;

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| QueryError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| QueryError::Transport(e.to_string()))?;

        if !status.is_success() {
            // Prometheus explains rejected queries in a JSON body; fall back to the raw status.
            return Err(match parse_range(&body, label) {
                Err(rejected @ QueryError::Rejected(_)) => rejected,
                _ => QueryError::Status(status.as_u16(), body),
            });
        }

        let points = parse_range(&body, label)?;
        debug!(points = points.len(), "range query answered");
        Ok(points)
    }
}

fn range_url(
    endpoint: &str,
    query: &str,
    start: SystemTime,
    end: SystemTime,
    step: Duration,
) -> Result<Url, QueryError> {
    let base = format!("{}{RANGE_PATH}", endpoint.trim_end_matches('/'));
    Url::parse_with_params(
        &base,
        &[
            ("query", query.to_string()),
            ("start", unix_secs(start)),
            ("end", unix_secs(end)),
            ("step", step.as_secs_f64().to_string()),
        ],
    )
    .map_err(|e| QueryError::Transport(format!("invalid endpoint {endpoint:?}: {e}")))
}

fn unix_secs(t: SystemTime) -> String {
    let secs = t
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default();
    format!("{secs:.3}")
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RangeResponse {
    status: String,
    #[serde(default)]
    data: Option<RangeData>,
    #[serde(default)]
    error_type: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RangeData {
    result_type: String,
    #[serde(default)]
    result: Vec<RangeSeries>,
}

#[derive(Debug, Deserialize)]
struct RangeSeries {
    #[serde(default)]
    values: Vec<(f64, String)>,
}

/// Decode a `query_range` body into points labelled `label`, series after series.
fn parse_range(body: &str, label: &str) -> Result<Vec<MetricPoint>, QueryError> {
    let resp: RangeResponse =
        serde_json::from_str(body).map_err(|e| QueryError::Decode(e.to_string()))?;

    if resp.status != "success" {
        return Err(QueryError::Rejected(format!(
            "{}: {}",
            resp.error_type.as_deref().unwrap_or("error"),
            resp.error.as_deref().unwrap_or("no reason given"),
        )));
    }
    let data = resp
        .data
        .ok_or_else(|| QueryError::Decode("missing data".into()))?;
    if data.result_type != "matrix" {
        return Err(QueryError::Decode(format!(
            "expected matrix result, got {}",
            data.result_type
        )));
    }

    let mut points = Vec::new();
    for series in data.result {
        for (ts, raw) in series.values {
            let timestamp = Duration::try_from_secs_f64(ts)
                .ok()
                .and_then(|offset| UNIX_EPOCH.checked_add(offset))
                .ok_or_else(|| QueryError::Decode(format!("bad timestamp {ts}")))?;
            let value = raw
                .parse::<f64>()
                .map_err(|_| QueryError::Decode(format!("bad sample value {raw:?}")))?;
            points.push(MetricPoint {
                label: label.to_string(),
                timestamp,
                value,
            });
        }
    }
    Ok(points)
}
