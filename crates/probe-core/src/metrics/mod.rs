//! Correlates backend time series with a task's program units.

use std::{
    sync::Arc,
    time::{Duration, SystemTime},
};

use async_trait::async_trait;
use probe_model::{MetricPoint, MetricSeries, ProgramId, Task, TaskId, TaskMetrics};
use tracing::{instrument, trace};

use crate::error::QueryError;

/// Range query API of a time-series backend.
#[async_trait]
pub trait RangeQuery: Send + Sync + 'static {
    /// Evaluate `query` over `[start, end]` at `step` resolution.
    ///
    /// Every returned point carries `label`.
    async fn range_query(
        &self,
        query: &str,
        start: SystemTime,
        end: SystemTime,
        step: Duration,
        label: &str,
    ) -> Result<Vec<MetricPoint>, QueryError>;
}

/// Trailing window queried for each series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsWindow {
    pub range: Duration,
    pub step: Duration,
}

impl Default for MetricsWindow {
    fn default() -> Self {
        Self {
            range: Duration::from_secs(10 * 60),
            step: Duration::from_secs(60),
        }
    }
}

/// Queries the fixed series set for a task's programs.
#[derive(Clone)]
pub struct MetricsAggregator {
    backend: Arc<dyn RangeQuery>,
    window: MetricsWindow,
}

impl MetricsAggregator {
    pub fn new(backend: Arc<dyn RangeQuery>) -> Self {
        Self {
            backend,
            window: MetricsWindow::default(),
        }
    }

    pub fn with_window(mut self, window: MetricsWindow) -> Self {
        self.window = window;
        self
    }

    pub fn window(&self) -> MetricsWindow {
        self.window
    }

    /// Series selector scoped to one program of one task.
    pub fn selector(series: MetricSeries, task_id: TaskId, program_id: ProgramId) -> String {
        format!(
            "{}{{task_id=\"{}\",program_id=\"{}\"}}",
            series.name(),
            task_id,
            program_id
        )
    }

    /// Metrics of one program; the first failing series aborts the call.
    #[instrument(level = "debug", skip(self, task_id), fields(task = %task_id))]
    pub async fn query_program_metrics(
        &self,
        task_id: TaskId,
        program_id: ProgramId,
        program_name: &str,
    ) -> Result<TaskMetrics, QueryError> {
        let mut metrics = TaskMetrics::default();
        let end = SystemTime::now();
        let start = end.checked_sub(self.window.range).unwrap_or(SystemTime::UNIX_EPOCH);

        for series in MetricSeries::ALL {
            let query = Self::selector(series, task_id, program_id);
            let points = self
                .backend
                .range_query(&query, start, end, self.window.step, program_name)
                .await?;
            trace!(%series, points = points.len(), "series fetched");
            *metrics.series_mut(series) = points;
        }
        Ok(metrics)
    }

    /// Metrics of every program of `task`, concatenated per series in program order.
    pub async fn query_task_metrics(&self, task: &Task) -> Result<TaskMetrics, QueryError> {
        let mut metrics = TaskMetrics::default();
        for prog in &task.prog_status {
            let prog_metrics = self
                .query_program_metrics(task.id, prog.program_id, &prog.program_name)
                .await?;
            metrics.append(prog_metrics);
        }
        Ok(metrics)
    }
}
