//! Height synchronizer implementation.
//!
//! Drives the poll/fetch/persist/advance cycle: on every tick, query the
//! chain tip, walk each height in `(watermark, tip]` in strictly increasing
//! order, persist one observation per height, and advance the watermark to
//! the tip once the whole range has been attempted.
//!
//! Failure isolation is the point of this loop. A failed tip query skips the
//! cycle; a failed height (fetch, missing difficulty, or write) is logged
//! and never blocks the heights after it or the advancement of the
//! watermark; a failed metrics push is logged and ignored.

use std::{sync::Arc, time::Duration};

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::{
	models::Observation,
	services::{blockchain::ChainReader, ledger::Ledger, metrics::MetricsSink},
};

/// Summary of one poll cycle, for logging and tests.
#[derive(Debug, Clone, Default)]
pub struct CycleOutcome {
	/// Tip reported by the chain, or `None` when the tip query failed.
	pub tip: Option<u64>,
	/// Heights attempted this cycle.
	pub attempted: u64,
	/// Heights whose observation was persisted.
	pub recorded: u64,
	/// Heights that failed (fetch, missing difficulty, or write).
	pub failed: u64,
}

/// Drives the poll/fetch/persist/advance cycle.
///
/// Owns the watermark: the highest height already attempted. The watermark
/// only moves forward, and only after the full gap of a cycle has been
/// attempted. Exactly one cycle runs at a time; ticks that fire while a
/// cycle is in progress collapse into a single following cycle.
///
/// # Type Parameters
/// * `C` - chain reader
/// * `L` - observation ledger
/// * `M` - metrics sink (optional at runtime)
pub struct HeightSynchronizer<C, L, M> {
	reader: Arc<C>,
	ledger: Arc<L>,
	metrics: Option<Arc<M>>,
	watermark: u64,
	poll_interval: Duration,
}

impl<C, L, M> HeightSynchronizer<C, L, M>
where
	C: ChainReader,
	L: Ledger,
	M: MetricsSink,
{
	/// Creates a synchronizer starting from `start_height`.
	///
	/// `start_height` is the initial watermark: the first height processed
	/// will be `start_height + 1`.
	pub fn new(
		reader: Arc<C>,
		ledger: Arc<L>,
		metrics: Option<Arc<M>>,
		start_height: u64,
		poll_interval: Duration,
	) -> Self {
		Self {
			reader,
			ledger,
			metrics,
			watermark: start_height,
			poll_interval,
		}
	}

	/// Returns the current watermark.
	pub fn watermark(&self) -> u64 {
		self.watermark
	}

	/// Runs the synchronization loop until `cancel` fires.
	///
	/// Cancellation is cooperative: it is observed while idle between cycles
	/// and between per-height iterations inside a cycle, never mid-write.
	pub async fn run(mut self, cancel: CancellationToken) {
		let mut ticker = tokio::time::interval(self.poll_interval);
		// A tick that fires while a cycle is still running must not cause a
		// burst of back-to-back cycles.
		ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

		tracing::info!(
			watermark = self.watermark,
			interval_secs = self.poll_interval.as_secs(),
			"height synchronizer started"
		);

		loop {
			tokio::select! {
				_ = cancel.cancelled() => break,
				_ = ticker.tick() => {}
			}

			let outcome = self.run_cycle(&cancel).await;
			if outcome.attempted > 0 {
				tracing::info!(
					tip = outcome.tip,
					attempted = outcome.attempted,
					recorded = outcome.recorded,
					failed = outcome.failed,
					watermark = self.watermark,
					"cycle complete"
				);
			}
		}

		tracing::info!(watermark = self.watermark, "height synchronizer stopped");
	}

	/// Executes one poll cycle.
	///
	/// Queries the tip, walks the gap `(watermark, tip]` in ascending order,
	/// and advances the watermark to the tip once every height in the gap
	/// has been attempted. A cancellation observed mid-gap abandons the
	/// remaining heights without advancing the watermark; the process is
	/// exiting and nothing observes the watermark afterwards.
	pub async fn run_cycle(&mut self, cancel: &CancellationToken) -> CycleOutcome {
		let mut outcome = CycleOutcome::default();

		let tip = match self.reader.latest_block_number().await {
			Ok(tip) => tip,
			Err(e) => {
				tracing::warn!(
					watermark = self.watermark,
					error = %e,
					"failed to query chain tip; retrying next tick"
				);
				return outcome;
			}
		};
		outcome.tip = Some(tip);

		if tip <= self.watermark {
			tracing::debug!(tip, watermark = self.watermark, "no new blocks");
			return outcome;
		}

		for height in self.watermark + 1..=tip {
			if cancel.is_cancelled() {
				tracing::info!(height, tip, "cancelled mid-gap; abandoning remaining heights");
				return outcome;
			}
			outcome.attempted += 1;
			if self.process_height(height).await {
				outcome.recorded += 1;
			} else {
				outcome.failed += 1;
			}
		}

		// The full gap was attempted; failed heights are not retried.
		self.watermark = tip;
		outcome
	}

	/// Fetches, persists, and exports one height.
	///
	/// Returns whether the observation was persisted. All failure paths log
	/// and return instead of propagating.
	async fn process_height(&self, height: u64) -> bool {
		let header = match self.reader.header_by_number(height).await {
			Ok(header) => header,
			Err(e) => {
				tracing::warn!(height, error = %e, "failed to fetch block header");
				return false;
			}
		};

		if header.number != height {
			tracing::warn!(
				height,
				reported = header.number,
				"header reports a different block number than requested"
			);
		}

		let difficulty = match header.difficulty {
			Some(difficulty) => difficulty,
			None => {
				tracing::warn!(height, "header carries no difficulty");
				return false;
			}
		};

		let observation = Observation::new(header.number, difficulty);
		if let Err(e) = self.ledger.record_observation(&observation).await {
			tracing::warn!(height, error = %e, "failed to record observation");
			return false;
		}
		tracing::debug!(height, difficulty, "recorded observation");

		if let Some(metrics) = &self.metrics {
			metrics.set_difficulty(difficulty);
			if let Err(e) = metrics.push().await {
				tracing::warn!(height, error = %e, "failed to push metrics");
			}
		}

		true
	}
}
