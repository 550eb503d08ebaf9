//! JSON-RPC chain reader for EVM-style nodes.
//!
//! Speaks JSON-RPC 2.0 over HTTP with a per-request deadline. Only the two
//! calls the monitor needs are implemented.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
	models::{hex_quantity, BlockHeader},
	services::blockchain::{client::ChainReader, error::ClientError},
};

/// RPC method constants
pub mod rpc_methods {
	/// Get the current tip height
	pub const BLOCK_NUMBER: &str = "eth_blockNumber";
	/// Get a block (header only, no transaction bodies) by number
	pub const GET_BLOCK_BY_NUMBER: &str = "eth_getBlockByNumber";
}

/// JSON-RPC 2.0 response envelope.
#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
	result: Option<Value>,
	error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Deserialize)]
struct JsonRpcError {
	code: i64,
	message: String,
}

/// Chain reader backed by an EVM JSON-RPC endpoint.
///
/// Holds one HTTP client reused across all calls; the client-level timeout
/// is the per-call deadline.
#[derive(Debug)]
pub struct EvmChainReader {
	http: reqwest::Client,
	url: String,
}

impl EvmChainReader {
	/// Creates a reader for `url` without probing the endpoint.
	///
	/// # Arguments
	/// * `url` - JSON-RPC endpoint URL
	/// * `timeout` - deadline applied to every request
	pub fn new(url: &str, timeout: Duration) -> Result<Self, ClientError> {
		let http = reqwest::Client::builder().timeout(timeout).build()?;
		Ok(Self {
			http,
			url: url.to_string(),
		})
	}

	/// Creates a reader and verifies the endpoint is reachable.
	///
	/// Probes the endpoint with `eth_blockNumber` up to `max_attempts` times
	/// with a fixed `retry_delay` between attempts, failing with
	/// [`ClientError::Connection`] once exhausted.
	pub async fn connect(
		url: &str,
		timeout: Duration,
		max_attempts: u32,
		retry_delay: Duration,
	) -> Result<Self, ClientError> {
		let reader = Self::new(url, timeout)?;

		let mut last_error = None;
		for attempt in 1..=max_attempts {
			match reader.latest_block_number().await {
				Ok(height) => {
					tracing::info!(url, height, "connected to chain endpoint");
					return Ok(reader);
				}
				Err(e) => {
					tracing::warn!(
						url,
						attempt,
						max_attempts,
						error = %e,
						"connection probe failed"
					);
					last_error = Some(e);
					if attempt < max_attempts {
						tokio::time::sleep(retry_delay).await;
					}
				}
			}
		}

		Err(ClientError::Connection {
			url: url.to_string(),
			attempts: max_attempts,
			source: last_error.map(Box::new),
		})
	}

	/// Sends one JSON-RPC request and returns the raw `result` value.
	async fn send(&self, method: &str, params: Value) -> Result<Value, ClientError> {
		let body = json!({
			"jsonrpc": "2.0",
			"id": 1,
			"method": method,
			"params": params,
		});

		let response = self
			.http
			.post(&self.url)
			.json(&body)
			.send()
			.await
			.map_err(|e| ClientError::from_reqwest(method, e))?
			.error_for_status()
			.map_err(|e| ClientError::from_reqwest(method, e))?;

		let envelope: JsonRpcResponse = response
			.json()
			.await
			.map_err(|e| ClientError::from_reqwest(method, e))?;

		if let Some(error) = envelope.error {
			return Err(ClientError::Rpc {
				method: method.to_string(),
				code: error.code,
				message: error.message,
			});
		}

		Ok(envelope.result.unwrap_or(Value::Null))
	}
}

#[async_trait]
impl ChainReader for EvmChainReader {
	async fn latest_block_number(&self) -> Result<u64, ClientError> {
		let result = self.send(rpc_methods::BLOCK_NUMBER, json!([])).await?;
		let quantity = result.as_str().ok_or_else(|| ClientError::Decode {
			method: rpc_methods::BLOCK_NUMBER.to_string(),
			message: format!("expected hex quantity, got {result}"),
		})?;
		hex_quantity::parse(quantity).map_err(|message| ClientError::Decode {
			method: rpc_methods::BLOCK_NUMBER.to_string(),
			message,
		})
	}

	async fn header_by_number(&self, number: u64) -> Result<BlockHeader, ClientError> {
		// Second parameter false: header only, no transaction bodies.
		let params = json!([format!("0x{number:x}"), false]);
		let result = self.send(rpc_methods::GET_BLOCK_BY_NUMBER, params).await?;

		if result.is_null() {
			return Err(ClientError::NotFound { height: number });
		}

		serde_json::from_value(result).map_err(|e| ClientError::Decode {
			method: rpc_methods::GET_BLOCK_BY_NUMBER.to_string(),
			message: e.to_string(),
		})
	}
}
