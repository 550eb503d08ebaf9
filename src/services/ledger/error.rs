//! Ledger error types.

use thiserror::Error;

/// Errors produced by ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
	/// Could not open the database or prepare its schema at startup.
	#[error("failed to open ledger database: {0}")]
	Open(#[source] sqlx::Error),

	/// A query against an open ledger failed.
	#[error("ledger query failed: {0}")]
	Query(#[from] sqlx::Error),
}
