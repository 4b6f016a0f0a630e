//! Input/output helpers.
//!
//! - CSV ingest of region feeds (`ingest`)
//! - delimited-text and summary exports (`export`)
//! - nested JSON tables (`json`)
//! - the combined spreadsheet (`workbook`)

pub mod export;
pub mod ingest;
pub mod json;
pub mod workbook;

pub use export::*;
pub use ingest::*;
pub use json::*;
pub use workbook::*;
