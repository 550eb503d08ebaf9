//! SQL-backed observation storage.
//!
//! One append-style table keyed by block number. The insert is
//! insert-or-ignore so that re-walking an already-recorded range after a
//! restart leaves exactly one logical row per height.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};

use crate::{models::Observation, services::ledger::error::LedgerError};

/// Interface for observation storage implementations.
#[async_trait]
pub trait Ledger: Send + Sync {
	/// Persists one observation.
	///
	/// Must tolerate being called twice with the same height: the second
	/// call is a no-op, not an error.
	async fn record_observation(&self, observation: &Observation) -> Result<(), LedgerError>;

	/// Returns the highest block number recorded so far, if any.
	///
	/// Used at startup to resume the watermark where persistence left off.
	async fn last_recorded_height(&self) -> Result<Option<u64>, LedgerError>;
}

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS block_difficulty ( \
	block_number INTEGER PRIMARY KEY, \
	difficulty INTEGER NOT NULL, \
	timestamp TEXT NOT NULL \
)";

/// SQLite implementation of the observation ledger.
///
/// The pool is owned here and reused across all cycles; heights and
/// difficulties are stored as INTEGER (i64 on the wire).
pub struct SqlLedger {
	pool: SqlitePool,
}

impl SqlLedger {
	/// Opens the database at `database_url` and ensures the schema exists.
	///
	/// Creates the database file when missing.
	pub async fn connect(database_url: &str) -> Result<Self, LedgerError> {
		let options = SqliteConnectOptions::from_str(database_url)
			.map_err(LedgerError::Open)?
			.create_if_missing(true);
		let pool = SqlitePool::connect_with(options)
			.await
			.map_err(LedgerError::Open)?;

		sqlx::query(SCHEMA)
			.execute(&pool)
			.await
			.map_err(LedgerError::Open)?;

		Ok(Self { pool })
	}
}

#[async_trait]
impl Ledger for SqlLedger {
	async fn record_observation(&self, observation: &Observation) -> Result<(), LedgerError> {
		sqlx::query(
			"INSERT INTO block_difficulty (block_number, difficulty, timestamp) \
			 VALUES (?1, ?2, ?3) ON CONFLICT(block_number) DO NOTHING",
		)
		.bind(observation.height as i64)
		.bind(observation.difficulty as i64)
		.bind(observation.observed_at)
		.execute(&self.pool)
		.await?;
		Ok(())
	}

	async fn last_recorded_height(&self) -> Result<Option<u64>, LedgerError> {
		let max: Option<i64> =
			sqlx::query_scalar("SELECT MAX(block_number) FROM block_difficulty")
				.fetch_one(&self.pool)
				.await?;
		Ok(max.map(|height| height as u64))
	}
}
