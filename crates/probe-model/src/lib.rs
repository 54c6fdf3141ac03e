//! Data model shared by the probe control plane.
//!
//! Plain, serializable records: tasks, per-program statuses, components and metric series.
//! No behavior beyond small invariants lives here.

mod domain;
pub use domain::*;
