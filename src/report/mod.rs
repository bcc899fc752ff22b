//! Terminal reporting for normalization runs.

pub mod format;

pub use format::*;
