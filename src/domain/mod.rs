//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the fixed metric table (`Metric`)
//! - per-day records and per-region series (`MetricRecord`, `RegionSeries`)
//! - the "last updated" marker per region (`LastUpdate`)

pub mod types;

pub use types::*;
