//! Core chain reader interface.
//!
//! Defines the interface the synchronizer needs from a chain endpoint,
//! keeping the loop independent of any particular RPC flavor.

use async_trait::async_trait;

use crate::{models::BlockHeader, services::blockchain::error::ClientError};

/// Read-only view of a chain endpoint.
///
/// Implementations are expected to bound every call with a deadline; a call
/// that exceeds it fails with [`ClientError::Timeout`], which callers treat
/// like any other transient failure.
#[async_trait]
pub trait ChainReader: Send + Sync {
	/// Returns the chain's current tip height.
	async fn latest_block_number(&self) -> Result<u64, ClientError>;

	/// Returns the header at the given height.
	///
	/// Fails with [`ClientError::NotFound`] when the node has not (or no
	/// longer) produced that height, which can happen in the race between
	/// observing the tip and fetching it.
	async fn header_by_number(&self, number: u64) -> Result<BlockHeader, ClientError>;
}
