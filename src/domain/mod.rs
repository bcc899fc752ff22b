//! Domain types used throughout the normalization pipeline.
//!
//! This module defines:
//!
//! - the source tag (`SourceKind`)
//! - the loaded input table (`RawTable`, `RawColumn`, `Cell`)
//! - the canonical output schema (`CanonicalRow`, `CanonicalTable`)

pub mod table;
pub mod types;

pub use table::*;
pub use types::*;
