//! Chain client error types.

use thiserror::Error;

/// Errors produced by chain RPC operations.
#[derive(Debug, Error)]
pub enum ClientError {
	/// Could not establish a connection at startup, after bounded retries.
	#[error("failed to connect to {url} after {attempts} attempts")]
	Connection {
		url: String,
		attempts: u32,
		#[source]
		source: Option<Box<ClientError>>,
	},

	/// The node answered with a JSON-RPC error object.
	#[error("RPC call {method} returned error {code}: {message}")]
	Rpc {
		method: String,
		code: i64,
		message: String,
	},

	/// The requested block does not exist on the node.
	#[error("block {height} not found")]
	NotFound { height: u64 },

	/// The call exceeded its deadline.
	#[error("RPC call {method} timed out")]
	Timeout { method: String },

	/// HTTP-level failure talking to the node.
	#[error("transport error: {0}")]
	Transport(#[from] reqwest::Error),

	/// The response did not match the expected shape.
	#[error("failed to decode {method} response: {message}")]
	Decode { method: String, message: String },
}

impl ClientError {
	/// Checks if this is a block-not-found error.
	pub fn is_not_found(&self) -> bool {
		matches!(self, Self::NotFound { .. })
	}

	/// Maps a reqwest failure for `method`, distinguishing deadline expiry.
	pub(crate) fn from_reqwest(method: &str, error: reqwest::Error) -> Self {
		if error.is_timeout() {
			Self::Timeout {
				method: method.to_string(),
			}
		} else {
			Self::Transport(error)
		}
	}
}
