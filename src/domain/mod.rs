//! Shared domain types for the series pipeline.

pub mod types;

pub use types::*;
