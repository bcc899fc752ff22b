//! Input/output helpers.
//!
//! - CSV ingest into a raw table (`ingest`)
//! - canonical CSV, feature-order manifest and report exports (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
