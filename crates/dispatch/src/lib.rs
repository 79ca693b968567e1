//! The Herald dispatch controller.
//!
//! [`DispatchController`] drains a recipient snapshot through a
//! [`DynTransport`](herald_transport::DynTransport) one recipient at a time,
//! waiting a fixed delay between sends. A failing recipient is counted and
//! reported but never aborts the run, and [`DispatchController::request_stop`]
//! ends a run at the next recipient boundary (waking a pending delay).

pub mod controller;
pub mod error;
pub mod metrics;
pub mod run;
pub mod status;

pub use controller::{DEFAULT_EVENT_CAPACITY, DispatchController, RunOutcome, StartOutcome};
pub use error::ValidationError;
pub use metrics::{DispatchMetrics, MetricsSnapshot};
pub use run::ActiveRun;
pub use status::{DispatchRun, DispatchState, DispatchStatus};
