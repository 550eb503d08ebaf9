//! Block difficulty monitor entrypoint.
//!
//! Wires up the chain reader, ledger, and optional Pushgateway exporter,
//! determines the starting watermark, and runs the height synchronizer until
//! the process is asked to shut down.

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use difficulty_monitor::services::{
	blockchain::{ChainReader, EvmChainReader},
	ledger::{Ledger, SqlLedger},
	metrics::PushGatewayExporter,
	synchronizer::HeightSynchronizer,
};

#[derive(Debug, Parser)]
#[command(name = "difficulty-monitor", about = "Records per-block difficulty from a chain RPC endpoint")]
struct Args {
	/// JSON-RPC endpoint of the chain node.
	#[arg(long, default_value = "http://127.0.0.1:8545")]
	rpc_url: String,

	/// Database the observations are written to.
	#[arg(long, default_value = "sqlite://difficulty.db")]
	database_url: String,

	/// Seconds between chain tip polls.
	#[arg(long, default_value_t = 3)]
	poll_interval: u64,

	/// Height to start after. When omitted, resumes after the highest
	/// recorded height, falling back to the current chain tip.
	#[arg(long)]
	start_height: Option<u64>,

	/// Prometheus Pushgateway base URL. Metrics export is disabled when
	/// omitted.
	#[arg(long)]
	push_gateway: Option<String>,

	/// Per-request deadline in seconds, for RPC calls and metrics pushes.
	#[arg(long, default_value_t = 10)]
	rpc_timeout: u64,

	/// Connection probes attempted against the RPC endpoint at startup.
	#[arg(long, default_value_t = 5)]
	connect_attempts: u32,

	/// Seconds between startup connection probes.
	#[arg(long, default_value_t = 2)]
	connect_retry_delay: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
		)
		.init();

	let reader = EvmChainReader::connect(
		&args.rpc_url,
		Duration::from_secs(args.rpc_timeout),
		args.connect_attempts,
		Duration::from_secs(args.connect_retry_delay),
	)
	.await
	.with_context(|| format!("failed to connect to RPC endpoint {}", args.rpc_url))?;
	let reader = Arc::new(reader);

	let ledger = Arc::new(
		SqlLedger::connect(&args.database_url)
			.await
			.with_context(|| format!("failed to open database {}", args.database_url))?,
	);

	let metrics = match &args.push_gateway {
		Some(gateway) => Some(Arc::new(
			PushGatewayExporter::new(gateway, Duration::from_secs(args.rpc_timeout))
				.with_context(|| format!("failed to set up pushgateway exporter for {gateway}"))?,
		)),
		None => {
			tracing::info!("no pushgateway configured; metrics export disabled");
			None
		}
	};

	let start_height = match args.start_height {
		Some(height) => {
			tracing::info!(height, "starting after explicitly configured height");
			height
		}
		None => match ledger
			.last_recorded_height()
			.await
			.context("failed to read last recorded height")?
		{
			Some(height) => {
				tracing::info!(height, "resuming after last recorded height");
				height
			}
			None => {
				let tip = reader
					.latest_block_number()
					.await
					.context("failed to query chain tip for initial height")?;
				tracing::info!(tip, "empty ledger; starting at current chain tip");
				tip
			}
		},
	};

	let cancel = CancellationToken::new();
	tokio::spawn({
		let cancel = cancel.clone();
		async move {
			shutdown_signal().await;
			tracing::info!("shutdown signal received");
			cancel.cancel();
		}
	});

	let synchronizer = HeightSynchronizer::new(
		reader,
		ledger,
		metrics,
		start_height,
		Duration::from_secs(args.poll_interval),
	);
	synchronizer.run(cancel).await;

	Ok(())
}

/// Completes when the process receives SIGINT or SIGTERM.
async fn shutdown_signal() {
	#[cfg(unix)]
	{
		use tokio::signal::unix::{signal, SignalKind};

		let mut sigterm = match signal(SignalKind::terminate()) {
			Ok(sigterm) => sigterm,
			Err(e) => {
				tracing::error!(error = %e, "failed to install SIGTERM handler");
				// Fall back to ctrl-c only.
				if let Err(e) = tokio::signal::ctrl_c().await {
					tracing::error!(error = %e, "failed to listen for ctrl-c");
				}
				return;
			}
		};

		tokio::select! {
			result = tokio::signal::ctrl_c() => {
				if let Err(e) = result {
					tracing::error!(error = %e, "failed to listen for ctrl-c");
				}
			}
			_ = sigterm.recv() => {}
		}
	}

	#[cfg(not(unix))]
	{
		if let Err(e) = tokio::signal::ctrl_c().await {
			tracing::error!(error = %e, "failed to listen for ctrl-c");
		}
	}
}
