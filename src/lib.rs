//! `ozh-covid` library crate.
//!
//! The binary (`ozh`) is a thin wrapper around this library so that:
//!
//! - the alignment and aggregation logic is testable without spawning processes
//! - feed sources can be swapped (HTTP, local files, in-memory fixtures)

pub mod align;
pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod report;
