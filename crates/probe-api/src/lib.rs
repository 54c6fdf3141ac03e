//! Caller-facing surface of the probe control plane.
//!
//! Transports (HTTP, gRPC, CLI) sit on top of [`ApiHandler`]; [`OrchestratorAdapter`]
//! is the stock implementation backed by a [`probe_core::TaskOrchestrator`].

mod error;
pub use error::ApiError;

mod handler;
pub use handler::ApiHandler;

mod adapter;
pub use adapter::OrchestratorAdapter;
