use probe_core::{EventKind, Subscribe, TaskEvent};
use prometheus::{
    Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder, proto::MetricFamily,
};
use tracing::warn;

use crate::error::PromError;

/// Task lifecycle counters fed from orchestrator events.
#[derive(Clone)]
pub struct PrometheusMetrics {
    registry: Registry,
    started: IntCounter,
    completed: IntCounterVec,
    step_failures: IntCounterVec,
    running: IntGauge,
}

impl PrometheusMetrics {
    /// Counters on a fresh registry.
    pub fn new() -> Result<Self, PromError> {
        Self::with_registry(Registry::new())
    }

    /// Counters on an existing registry, next to the host's own metrics.
    pub fn with_registry(registry: Registry) -> Result<Self, PromError> {
        let started = IntCounter::with_opts(Opts::new(
            "probe_tasks_started_total",
            "Tasks that reached the running state",
        ))?;
        let completed = IntCounterVec::new(
            Opts::new("probe_tasks_completed_total", "Tasks finished, by outcome"),
            &["outcome"],
        )?;
        let step_failures = IntCounterVec::new(
            Opts::new("probe_step_failures_total", "Pipeline stage failures, by step"),
            &["step"],
        )?;
        let running = IntGauge::with_opts(Opts::new(
            "probe_tasks_running",
            "Tasks currently present in the running registry",
        ))?;

        registry.register(Box::new(started.clone()))?;
        registry.register(Box::new(completed.clone()))?;
        registry.register(Box::new(step_failures.clone()))?;
        registry.register(Box::new(running.clone()))?;

        Ok(Self {
            registry,
            started,
            completed,
            step_failures,
            running,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Text exposition format of everything in the registry.
    pub fn encode_text(&self) -> Result<String, PromError> {
        let mut buf = Vec::new();
        TextEncoder::new()
            .encode(&self.gather(), &mut buf)
            .map_err(|e| PromError::Encode(e.to_string()))?;
        String::from_utf8(buf).map_err(|e| PromError::Encode(e.to_string()))
    }
}

impl Subscribe for PrometheusMetrics {
    fn on_event(&self, event: &TaskEvent) {
        match event.kind {
            EventKind::TaskRunning => self.started.inc(),
            EventKind::TaskRegistered => self.running.inc(),
            EventKind::TaskRemoved => self.running.dec(),
            EventKind::TaskSucceeded => self.completed.with_label_values(&["succeeded"]).inc(),
            EventKind::StepFailed => {
                self.completed.with_label_values(&["failed"]).inc();
                match event.step {
                    Some(step) => self.step_failures.with_label_values(&[step.as_str()]).inc(),
                    None => warn!(task = %event.task_id, "step failure without a step"),
                }
            }
            _ => {}
        }
    }

    fn name(&self) -> &'static str {
        "prometheus"
    }
}
