use std::{
    sync::Arc,
    time::{Duration, SystemTime},
};

use probe_model::{Component, ProgStatus, Task, TaskId, TaskMetrics, TaskStatus, TaskStep};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::{
    error::CoreError,
    event::{EventBus, EventKind, Subscribe, TaskEvent},
    loader::{LoaderFactory, LogStatsHandler, StatsHandler},
    metrics::{MetricsAggregator, MetricsWindow, RangeQuery},
    registry::TaskRegistry,
    shutdown::ShutdownSignal,
    store::TaskStore,
};

mod reconcile;
mod run;


/// Loader settings applied to every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorConfig {
    pub poll_timeout: Duration,
    pub stats_interval: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            poll_timeout: Duration::from_millis(100),
            stats_interval: Duration::from_secs(1),
        }
    }
}

/// Creates tasks and drives each one through `init → load → start → stats → metrics → stop`.
///
/// Every task runs in its own tokio task; there is no limit on how many run at once.
/// Cheap to clone.
#[derive(Clone)]
pub struct TaskOrchestrator {
    inner: Arc<Inner>,
}

pub(crate) struct Inner {
    store: Arc<dyn TaskStore>,
    loaders: Arc<dyn LoaderFactory>,
    registry: TaskRegistry,
    metrics: MetricsAggregator,
    shutdown: ShutdownSignal,
    events: EventBus,
    stats: Arc<dyn StatsHandler>,
    config: OrchestratorConfig,
}

impl TaskOrchestrator {
    pub fn builder(
        store: Arc<dyn TaskStore>,
        loaders: Arc<dyn LoaderFactory>,
        metrics: Arc<dyn RangeQuery>,
    ) -> OrchestratorBuilder {
        OrchestratorBuilder {
            store,
            loaders,
            metrics,
            registry: TaskRegistry::new(),
            shutdown: ShutdownSignal::new(),
            subscribers: Vec::new(),
            stats: Arc::new(LogStatsHandler),
            window: MetricsWindow::default(),
            config: OrchestratorConfig::default(),
        }
    }

    /// Registry of the tasks currently executing.
    pub fn registry(&self) -> &TaskRegistry {
        &self.inner.registry
    }

    pub fn shutdown_signal(&self) -> &ShutdownSignal {
        &self.inner.shutdown
    }

    /// Persist a new task for `component` and start executing it in the background.
    ///
    /// Returns as soon as the task is stored; launch failures show up later in the task's own status.
    #[instrument(level = "debug", skip(self, component), fields(component = %component.name))]
    pub async fn create_and_run(&self, component: &Component) -> Result<Task, CoreError> {
        let task = self.inner.store.create_task(new_task(component)).await?;
        info!(task = %task.id, name = %task.name, programs = task.prog_status.len(), "task created");
        self.inner
            .events
            .emit(TaskEvent::new(task.id, EventKind::TaskCreated));

        let inner = Arc::clone(&self.inner);
        let spawned = task.clone();
        let component = component.clone();
        tokio::spawn(async move { inner.execute(spawned, component).await });

        Ok(task)
    }

    /// Ask a running task to stop. Does not wait for it to finish.
    pub fn stop_task(&self, id: TaskId) -> Result<(), CoreError> {
        let handle = self
            .inner
            .registry
            .get(&id)
            .ok_or(CoreError::NotRunning(id))?;

        handle.cancel();
        debug!(task = %id, "cancellation requested");
        self.inner
            .events
            .emit(TaskEvent::new(id, EventKind::CancelRequested));
        Ok(())
    }

    /// Latest state of every task in the registry.
    pub fn list_running(&self) -> Vec<Task> {
        let mut tasks = Vec::with_capacity(self.inner.registry.len());
        self.inner
            .registry
            .for_each(|_, handle| tasks.push(handle.task()));
        tasks
    }

    /// Metrics of every program of a stored task.
    #[instrument(level = "debug", skip(self))]
    pub async fn get_task_metrics(&self, id: TaskId) -> Result<TaskMetrics, CoreError> {
        let task = self.inner.store.get_task(id).await?;
        let metrics = self.inner.metrics.query_task_metrics(&task).await?;
        Ok(metrics)
    }
}

/// Configures a [`TaskOrchestrator`].
pub struct OrchestratorBuilder {
    store: Arc<dyn TaskStore>,
    loaders: Arc<dyn LoaderFactory>,
    metrics: Arc<dyn RangeQuery>,
    registry: TaskRegistry,
    shutdown: ShutdownSignal,
    subscribers: Vec<Arc<dyn Subscribe>>,
    stats: Arc<dyn StatsHandler>,
    window: MetricsWindow,
    config: OrchestratorConfig,
}

impl OrchestratorBuilder {
    /// Share an existing registry instead of a fresh one.
    pub fn with_registry(mut self, registry: TaskRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Process-wide stop signal; defaults to one that only fires on [`ShutdownSignal::trigger`].
    pub fn with_shutdown(mut self, shutdown: ShutdownSignal) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    pub fn with_stats_handler(mut self, stats: Arc<dyn StatsHandler>) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_metrics_window(mut self, window: MetricsWindow) -> Self {
        self.window = window;
        self
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> TaskOrchestrator {
        info!(loader = self.loaders.name(), "task orchestrator ready");
        TaskOrchestrator {
            inner: Arc::new(Inner {
                store: self.store,
                loaders: self.loaders,
                registry: self.registry,
                metrics: MetricsAggregator::new(self.metrics).with_window(self.window),
                shutdown: self.shutdown,
                events: EventBus::new(self.subscribers),
                stats: self.stats,
                config: self.config,
            }),
        }
    }
}

/// `Pending`/`Init` task with one pending program status per program.
fn new_task(component: &Component) -> Task {
    let suffix = Uuid::new_v4().simple().to_string();
    let now = SystemTime::now();
    Task {
        id: TaskId::default(),
        component_id: component.id,
        component_name: component.name.clone(),
        name: format!("{}-{}", component.name, &suffix[..8]),
        description: format!("run component {}", component.name),
        status: TaskStatus::Pending,
        step: TaskStep::Init,
        prog_status: component
            .programs
            .iter()
            .map(|prog| ProgStatus::pending(component, prog))
            .collect(),
        error: None,
        created_at: now,
        updated_at: now,
    }
}
