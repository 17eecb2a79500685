//! Observability: in-process counters and the sink abstraction every
//! engine reports through.
//!
//! Structured log lines go through `tracing`; counters go through
//! [`sink::record`]. Neither path can fail a caller's operation.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EventOps, EventReport, EventState};
pub use sink::{MetricsEvent, MetricsSink, metrics_report, metrics_reset_all, with_metrics_sink};
