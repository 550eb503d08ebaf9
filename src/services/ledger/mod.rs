//! Observation ledger service.
//!
//! Provides the [`Ledger`] trait used by the synchronizer and its SQL-backed
//! implementation.

mod error;
mod sql;

pub use error::LedgerError;
pub use sql::{Ledger, SqlLedger};
