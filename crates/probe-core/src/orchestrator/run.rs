//! Body of the execution unit spawned for every task.

use std::sync::Arc;

use probe_model::{Component, Task, TaskId, TaskStatus, TaskStep};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span, debug, error, info, info_span, warn};

use super::{Inner, reconcile::reconcile};
use crate::{
    error::{LoaderError, StoreError},
    event::{EventBus, EventKind, TaskEvent},
    loader::{Loader, LoaderConfig, StatsConfig},
    registry::{RunningTask, TaskRegistry},
};

/// Why the pipeline stopped before the wait point.
enum RunError {
    /// Writing the task failed; nothing more is attempted.
    Persist { step: TaskStep, source: StoreError },
    /// A loader stage failed; the task becomes `Failed`.
    Stage { step: TaskStep, source: LoaderError },
}

impl RunError {
    fn stage(step: TaskStep) -> impl FnOnce(LoaderError) -> RunError {
        move |source| RunError::Stage { step, source }
    }
}

/// What woke the unit after `metrics`.
#[derive(Debug, Clone, Copy)]
enum Wake {
    Cancelled,
    Shutdown,
}

/// Removes the registry entry when the unit ends, whichever way it ends.
struct Registration {
    registry: TaskRegistry,
    events: EventBus,
    id: TaskId,
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.registry.remove(&self.id);
        self.events
            .emit(TaskEvent::new(self.id, EventKind::TaskRemoved));
        debug!(task = %self.id, "removed from registry");
    }
}

impl Inner {
    pub(super) async fn execute(self: Arc<Self>, task: Task, component: Component) {
        let token = CancellationToken::new();
        let span = info_span!(parent: None, "task", id = %task.id, component = %component.name);
        self.drive(task, component, token, span.clone())
            .instrument(span)
            .await
    }

    async fn drive(&self, mut task: Task, component: Component, token: CancellationToken, span: Span) {
        task.status = TaskStatus::Running;
        task.touch();
        if let Err(e) = self.store.update_task(&task).await {
            error!(error = %e, "failed to persist running status");
            self.persist_failed(&task, e);
            return;
        }
        self.emit(TaskEvent::new(task.id, EventKind::TaskRunning));

        let loader = self.loaders.build(self.loader_config(&component, &span));
        let handle = Arc::new(RunningTask::new(
            task.clone(),
            token.clone(),
            span,
            Arc::clone(&loader),
        ));
        self.registry.put(task.id, Arc::clone(&handle));
        let _registration = Registration {
            registry: self.registry.clone(),
            events: self.events.clone(),
            id: task.id,
        };
        self.emit(TaskEvent::new(task.id, EventKind::TaskRegistered));

        match self.run_stages(&mut task, &handle, loader.as_ref()).await {
            Ok(()) => {}
            Err(RunError::Persist { step, source }) => {
                error!(%step, error = %source, "failed to persist task step");
                self.persist_failed(&task, source);
                return;
            }
            Err(RunError::Stage { step, source }) => {
                self.fail(&mut task, &handle, step, source).await;
                return;
            }
        }

        let wake = tokio::select! {
            _ = token.cancelled() => Wake::Cancelled,
            _ = self.shutdown.triggered() => Wake::Shutdown,
        };
        match wake {
            Wake::Cancelled => info!("task cancelled"),
            Wake::Shutdown => {
                info!("shutdown signal received");
                self.emit(TaskEvent::new(task.id, EventKind::ShutdownObserved));
            }
        }

        if let Err(e) = loader.stop().await {
            warn!(error = %e, "loader stop failed");
            self.emit(
                TaskEvent::new(task.id, EventKind::StopFailed)
                    .with_step(TaskStep::Stop)
                    .with_reason(e.to_string()),
            );
        }

        task.succeed();
        match self.store.update_task(&task).await {
            Ok(()) => {
                handle.publish(&task);
                self.emit(TaskEvent::new(task.id, EventKind::TaskSucceeded).with_step(TaskStep::Stop));
                info!(?wake, "task completed");
            }
            Err(e) => {
                error!(error = %e, "failed to persist final status");
                self.persist_failed(&task, e);
            }
        }
    }

    async fn run_stages(
        &self,
        task: &mut Task,
        handle: &RunningTask,
        loader: &dyn Loader,
    ) -> Result<(), RunError> {
        self.enter(task, handle, TaskStep::Init).await?;
        loader.init().await.map_err(RunError::stage(TaskStep::Init))?;

        self.enter(task, handle, TaskStep::Load).await?;
        loader.load().await.map_err(RunError::stage(TaskStep::Load))?;

        self.enter(task, handle, TaskStep::Start).await?;
        let attached = loader
            .start()
            .await
            .map_err(RunError::stage(TaskStep::Start))?;
        let failed = reconcile(&mut task.prog_status, &attached);
        task.touch();
        self.persist(task, handle, TaskStep::Start).await?;
        self.emit(
            TaskEvent::new(task.id, EventKind::ProgramsReconciled)
                .with_step(TaskStep::Start)
                .with_reason(format!(
                    "{} of {} programs attached",
                    task.prog_status.len() - failed,
                    task.prog_status.len()
                )),
        );

        self.enter(task, handle, TaskStep::Stats).await?;
        loader.stats().await.map_err(RunError::stage(TaskStep::Stats))?;

        self.enter(task, handle, TaskStep::Metrics).await?;
        loader
            .metrics()
            .await
            .map_err(RunError::stage(TaskStep::Metrics))?;

        Ok(())
    }

    /// Persist `step` before its loader stage runs.
    async fn enter(&self, task: &mut Task, handle: &RunningTask, step: TaskStep) -> Result<(), RunError> {
        task.advance(step);
        self.persist(task, handle, step).await?;
        debug!(%step, "step entered");
        self.emit(TaskEvent::new(task.id, EventKind::StepEntered).with_step(step));
        Ok(())
    }

    async fn persist(&self, task: &Task, handle: &RunningTask, step: TaskStep) -> Result<(), RunError> {
        self.store
            .update_task(task)
            .await
            .map_err(|source| RunError::Persist { step, source })?;
        handle.publish(task);
        Ok(())
    }

    async fn fail(&self, task: &mut Task, handle: &RunningTask, step: TaskStep, source: LoaderError) {
        error!(%step, error = %source, "step failed");
        task.fail(format!("{step} failed: {source}"));
        handle.publish(task);
        self.emit(
            TaskEvent::new(task.id, EventKind::StepFailed)
                .with_step(step)
                .with_reason(source.to_string()),
        );
        if let Err(e) = self.store.update_task(task).await {
            error!(error = %e, "failed to persist failed status");
            self.persist_failed(task, e);
        }
    }

    fn loader_config(&self, component: &Component, span: &Span) -> LoaderConfig {
        LoaderConfig {
            object_path: component.binary_path.clone(),
            span: span.clone(),
            poll_timeout: self.config.poll_timeout,
            stats: StatsConfig {
                interval: self.config.stats_interval,
                handler: Arc::clone(&self.stats),
            },
        }
    }

    fn persist_failed(&self, task: &Task, source: StoreError) {
        self.emit(
            TaskEvent::new(task.id, EventKind::PersistFailed)
                .with_step(task.step)
                .with_reason(source.to_string()),
        );
    }

    #[inline]
    fn emit(&self, event: TaskEvent) {
        self.events.emit(event);
    }
}
