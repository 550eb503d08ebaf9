//! Metrics export error types.

use thiserror::Error;

/// Errors produced when setting up or pushing metrics.
#[derive(Debug, Error)]
pub enum PushError {
	/// Registry or encoder failure.
	#[error("failed to encode metrics: {0}")]
	Encode(#[from] prometheus::Error),

	/// HTTP-level failure reaching the gateway.
	#[error("failed to reach pushgateway: {0}")]
	Http(#[from] reqwest::Error),

	/// The gateway answered with a non-success status.
	#[error("pushgateway returned status {status}")]
	Gateway { status: reqwest::StatusCode },
}
