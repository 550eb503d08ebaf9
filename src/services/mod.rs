//! Service layer.
//!
//! Each submodule wraps one external collaborator behind a small trait, plus
//! the synchronizer that drives them:
//! - `blockchain` - JSON-RPC access to the chain node
//! - `ledger` - durable storage for difficulty observations
//! - `metrics` - Pushgateway export of the latest difficulty
//! - `synchronizer` - the poll/fetch/persist/advance loop

pub mod blockchain;
pub mod ledger;
pub mod metrics;
pub mod synchronizer;
