mod error;
pub use error::ModelError;

mod time_serde;

mod task_id;
pub use task_id::TaskId;

mod task_status;
pub use task_status::TaskStatus;

mod task_step;
pub use task_step::TaskStep;

mod component;
pub use component::{Component, Program};

mod prog_status;
pub use prog_status::ProgStatus;

mod task;
pub use task::Task;

mod metrics;
pub use metrics::{MetricPoint, MetricSeries, TaskMetrics};

/// Identifier of a stored component.
pub type ComponentId = u64;

/// Identifier of a program unit inside a component.
pub type ProgramId = u64;
