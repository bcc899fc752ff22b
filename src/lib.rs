//! `credit-prep` library crate.
//!
//! Normalizes heterogeneous credit-risk source tables (Taiwan card default,
//! LendingClub accepted loans, or an already-canonical custom table) into one
//! five-column training schema.
//!
//! The binary (`cprep`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - other readers (databases, other file formats) can build a `RawTable` and reuse the core

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod normalize;
pub mod report;

pub use domain::{CanonicalRow, CanonicalTable, RawTable, SourceKind, FEATURE_ORDER};
pub use error::{ConfigError, NormalizeError, SchemaError};
pub use normalize::{NormalizeOptions, Normalized, normalize, normalize_named};
