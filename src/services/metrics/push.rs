//! Pushgateway exporter.
//!
//! Owns its own registry and gauge rather than registering into any global
//! collector, and pushes the encoded registry to the gateway over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use prometheus::{Encoder, Gauge, Registry, TextEncoder};

use crate::services::metrics::error::PushError;

/// Name of the exported gauge.
pub const DIFFICULTY_GAUGE: &str = "chain_block_difficulty";

/// Job name used as the Pushgateway grouping label.
pub const PUSH_JOB: &str = "difficulty_monitor";

/// Interface for metrics sinks.
///
/// A push failure is reported to the caller but is expected to be logged and
/// ignored there; it never affects control flow.
#[async_trait]
pub trait MetricsSink: Send + Sync {
	/// Sets the difficulty gauge to the given value.
	fn set_difficulty(&self, difficulty: u64);

	/// Pushes the current metric values to the sink.
	async fn push(&self) -> Result<(), PushError>;
}

/// Metrics sink backed by a Prometheus Pushgateway.
pub struct PushGatewayExporter {
	registry: Registry,
	difficulty: Gauge,
	http: reqwest::Client,
	push_url: String,
}

impl PushGatewayExporter {
	/// Creates an exporter pushing to `gateway` under the [`PUSH_JOB`] job.
	///
	/// `timeout` is the deadline applied to every push; a gateway that
	/// accepts the connection but never answers must not stall the caller.
	pub fn new(gateway: &str, timeout: Duration) -> Result<Self, PushError> {
		let registry = Registry::new();
		let difficulty = Gauge::new(
			DIFFICULTY_GAUGE,
			"Difficulty of the most recently observed block",
		)?;
		registry.register(Box::new(difficulty.clone()))?;

		let push_url = format!(
			"{}/metrics/job/{}",
			gateway.trim_end_matches('/'),
			PUSH_JOB
		);

		let http = reqwest::Client::builder().timeout(timeout).build()?;

		Ok(Self {
			registry,
			difficulty,
			http,
			push_url,
		})
	}

	/// Encodes the registry in the Prometheus text exposition format.
	fn encode(&self) -> Result<Vec<u8>, PushError> {
		let encoder = TextEncoder::new();
		let mut buffer = Vec::new();
		encoder.encode(&self.registry.gather(), &mut buffer)?;
		Ok(buffer)
	}
}

#[async_trait]
impl MetricsSink for PushGatewayExporter {
	fn set_difficulty(&self, difficulty: u64) {
		self.difficulty.set(difficulty as f64);
	}

	async fn push(&self) -> Result<(), PushError> {
		let body = self.encode()?;
		let response = self
			.http
			.put(&self.push_url)
			.header(reqwest::header::CONTENT_TYPE, "text/plain; version=0.0.4")
			.body(body)
			.send()
			.await?;

		let status = response.status();
		if !status.is_success() {
			return Err(PushError::Gateway { status });
		}
		Ok(())
	}
}
