//! Task lifecycle core of the probe control plane.
//!
//! - [`TaskRegistry`]: live execution contexts, keyed by task id.
//! - [`TaskOrchestrator`]: creates tasks and drives each one through its pipeline in its own tokio task.
//! - [`MetricsAggregator`]: correlates backend time series with a task's program units.
//!
//! External collaborators are reached through [`Loader`], [`TaskStore`] and [`RangeQuery`].

pub mod error;
pub use error::{CoreError, LoaderError, QueryError, StoreError};

pub mod event;
pub use event::{EventKind, Subscribe, TaskEvent};

pub mod loader;
pub use loader::{
    AttachMap, AttachStatus, LogStatsHandler, Loader, LoaderConfig, LoaderFactory, ProgramStats,
    StatsConfig, StatsHandler,
};

pub mod metrics;
pub use metrics::{MetricsAggregator, MetricsWindow, RangeQuery};

pub mod orchestrator;
pub use orchestrator::{OrchestratorBuilder, OrchestratorConfig, TaskOrchestrator};

pub mod registry;
pub use registry::{RunningTask, TaskRegistry};

mod shutdown;
pub use shutdown::ShutdownSignal;

pub mod store;
pub use store::{MemoryTaskStore, TaskStore};
