//! Block difficulty monitor.
//!
//! A small sidecar that follows the tip of a chain over JSON-RPC, fetches the
//! header of every newly produced block, records each block's difficulty into
//! a durable ledger, and optionally pushes the latest value to a Prometheus
//! Pushgateway.
//!
//! The crate is organized as:
//! - [`models`] - shared data types (block headers, observations)
//! - [`services`] - the RPC client, the ledger, the metrics exporter, and the
//!   height synchronizer that drives them

pub mod models;
pub mod services;
