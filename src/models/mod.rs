//! Shared data types.
//!
//! Defines the header-level view of a block as returned by the chain RPC and
//! the observation record persisted by the ledger.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Decoding helpers for JSON-RPC `0x`-prefixed hex quantities.
pub(crate) mod hex_quantity {
	use serde::{Deserialize, Deserializer};

	/// Parses a hex quantity string (with or without `0x` prefix) into a u64.
	pub(crate) fn parse(value: &str) -> Result<u64, String> {
		let digits = value
			.strip_prefix("0x")
			.or_else(|| value.strip_prefix("0X"))
			.unwrap_or(value);
		if digits.is_empty() {
			return Err(format!("empty hex quantity: {value:?}"));
		}
		u64::from_str_radix(digits, 16)
			.map_err(|e| format!("invalid hex quantity {value:?}: {e}"))
	}

	pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
	where
		D: Deserializer<'de>,
	{
		let value = String::deserialize(deserializer)?;
		parse(&value).map_err(serde::de::Error::custom)
	}

	pub(crate) fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
	where
		D: Deserializer<'de>,
	{
		let value = Option::<String>::deserialize(deserializer)?;
		value
			.map(|v| parse(&v).map_err(serde::de::Error::custom))
			.transpose()
	}
}

/// Header-level view of a block.
///
/// Only the fields the monitor cares about are decoded; everything else in
/// the RPC response is ignored. Heights and difficulties are `u64`, which is
/// wide enough for realistic chains.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockHeader {
	/// Block height as reported by the node.
	#[serde(deserialize_with = "hex_quantity::deserialize")]
	pub number: u64,
	/// Block difficulty. `None` when the header carries no difficulty field,
	/// which the synchronizer treats as a per-height failure.
	#[serde(default, deserialize_with = "hex_quantity::deserialize_opt")]
	pub difficulty: Option<u64>,
}

/// One persisted record of a block's difficulty.
///
/// Produced once per successfully fetched height and written once to the
/// ledger; never updated or deleted by this process.
#[derive(Debug, Clone)]
pub struct Observation {
	/// Block height the difficulty belongs to.
	pub height: u64,
	/// Difficulty extracted from the block header.
	pub difficulty: u64,
	/// Capture time, in UTC.
	pub observed_at: DateTime<Utc>,
}

impl Observation {
	/// Creates an observation timestamped with the current time.
	pub fn new(height: u64, difficulty: u64) -> Self {
		Self {
			height,
			difficulty,
			observed_at: Utc::now(),
		}
	}
}
