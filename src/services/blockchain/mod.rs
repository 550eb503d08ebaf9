//! Chain access service.
//!
//! Provides the [`ChainReader`] trait used by the synchronizer and its
//! JSON-RPC implementation for EVM-style nodes.

mod client;
mod error;
mod evm;

pub use client::ChainReader;
pub use error::ClientError;
pub use evm::EvmChainReader;
