//! Seam to the program loader that loads, attaches and runs a workload.

use std::{collections::HashMap, path::PathBuf, sync::Arc, time::Duration};

use async_trait::async_trait;
use probe_model::TaskStatus;
use tracing::{Span, debug};

use crate::error::LoaderError;

/// Attach outcome of one program, keyed by program name in [`AttachMap`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachStatus {
    pub status: TaskStatus,
    pub attach_id: Option<u64>,
    pub error: Option<String>,
}

impl AttachStatus {
    pub fn attached(attach_id: u64) -> Self {
        Self {
            status: TaskStatus::Succeeded,
            attach_id: Some(attach_id),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: TaskStatus::Failed,
            attach_id: None,
            error: Some(error.into()),
        }
    }
}

pub type AttachMap = HashMap<String, AttachStatus>;

/// Stage API of a loaded workload.
///
/// Stages are called strictly in order `init`, `load`, `start`, `stats`, `metrics` and, after a complete run, `stop`.
/// Calls may block for as long as the loader needs; the orchestrator adds no timeout.
#[async_trait]
pub trait Loader: Send + Sync + 'static {
    async fn init(&self) -> Result<(), LoaderError>;

    async fn load(&self) -> Result<(), LoaderError>;

    /// Attach the programs and report the outcome per program name.
    async fn start(&self) -> Result<AttachMap, LoaderError>;

    async fn stats(&self) -> Result<(), LoaderError>;

    async fn metrics(&self) -> Result<(), LoaderError>;

    async fn stop(&self) -> Result<(), LoaderError>;
}

/// Builds a [`Loader`] for one task run.
pub trait LoaderFactory: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    fn build(&self, cfg: LoaderConfig) -> Arc<dyn Loader>;
}

/// Per-run loader configuration.
#[derive(Clone)]
pub struct LoaderConfig {
    /// Object file of the component.
    pub object_path: PathBuf,
    /// Span of the owning task; loader logs should be recorded inside it.
    pub span: Span,
    /// Poll interval of the loader's event readers.
    pub poll_timeout: Duration,
    pub stats: StatsConfig,
}

/// Runtime statistics collection settings.
#[derive(Clone)]
pub struct StatsConfig {
    pub interval: Duration,
    pub handler: Arc<dyn StatsHandler>,
}

/// Runtime statistics of one program, sampled by the loader.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgramStats {
    pub program_name: String,
    pub avg_run_time_ns: u64,
    pub total_avg_run_time_ns: u64,
    pub period_ns: u64,
    pub events_per_second: f64,
    pub cpu_usage: f64,
}

/// Sink for [`ProgramStats`] samples.
pub trait StatsHandler: Send + Sync + 'static {
    fn handle(&self, stats: &ProgramStats);
}

/// Writes every sample to the log at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogStatsHandler;

impl StatsHandler for LogStatsHandler {
    fn handle(&self, stats: &ProgramStats) {
        debug!(
            program = %stats.program_name,
            avg_run_time_ns = stats.avg_run_time_ns,
            total_avg_run_time_ns = stats.total_avg_run_time_ns,
            period_ns = stats.period_ns,
            events_per_second = stats.events_per_second,
            cpu_usage = stats.cpu_usage,
            "program stats"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_status_constructors() {
        let ok = AttachStatus::attached(42);
        assert_eq!(ok.status, TaskStatus::Succeeded);
        assert_eq!(ok.attach_id, Some(42));
        assert!(ok.error.is_none());

        let failed = AttachStatus::failed("no such kprobe");
        assert_eq!(failed.status, TaskStatus::Failed);
        assert!(failed.attach_id.is_none());
        assert_eq!(failed.error.as_deref(), Some("no such kprobe"));
    }

    #[test]
    fn io_errors_convert() {
        let err: LoaderError = std::io::Error::other("permission denied").into();
        assert_eq!(err, LoaderError::Io("permission denied".into()));
    }

    #[test]
    fn log_handler_accepts_samples() {
        LogStatsHandler.handle(&ProgramStats {
            program_name: "tcp_v4_connect".into(),
            ..Default::default()
        });
    }
}
