//! Height synchronization service.
//!
//! The core of the monitor: owns the watermark, drives the poll cadence,
//! and walks the gap between the watermark and the observed chain tip.

mod service;

pub use service::{CycleOutcome, HeightSynchronizer};
