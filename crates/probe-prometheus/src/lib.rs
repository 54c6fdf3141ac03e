//! Prometheus integration for the probe control plane.
//!
//! - [`PromClient`]: a [`probe_core::RangeQuery`] backend over the Prometheus HTTP API
//!   (`/api/v1/query_range`), used by the metrics aggregator.
//! - [`PrometheusMetrics`]: a lifecycle [`probe_core::Subscribe`]r that counts task outcomes.
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use probe_core::Subscribe;
//! use probe_prometheus::{PromClient, PromConfig, PrometheusMetrics};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(PromClient::new(PromConfig {
//!     endpoint: "http://prometheus:9090".into(),
//!     ..PromConfig::default()
//! })?);
//! let counters: Arc<dyn Subscribe> = Arc::new(PrometheusMetrics::new()?);
//! // pass `client` and `counters` to `TaskOrchestrator::builder`
//! # let _ = (client, counters);
//! # Ok(())
//! # }
//! ```
//!
//! ## Metrics
//! - `probe_tasks_started_total` - Counter
//! - `probe_tasks_completed_total{outcome}` - Counter
//! - `probe_step_failures_total{step}` - Counter
//! - `probe_tasks_running` - Gauge
//!
//! ## HTTP Server
//! This crate does NOT serve `/metrics`. Encode [`PrometheusMetrics::gather`] with
//! [`TextEncoder`] from whatever HTTP framework the host process uses.

mod client;
pub use client::{PromClient, PromConfig};

mod error;
pub use error::PromError;

mod metrics;
pub use metrics::PrometheusMetrics;

pub use prometheus::{Encoder, Registry, TextEncoder};
