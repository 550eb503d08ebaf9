//! Metrics export service.
//!
//! Provides the [`MetricsSink`] trait used by the synchronizer and a
//! Pushgateway-backed implementation.

mod error;
mod push;

pub use error::PushError;
pub use push::{MetricsSink, PushGatewayExporter, DIFFICULTY_GAUGE, PUSH_JOB};
