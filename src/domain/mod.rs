//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the raw tabular input handed over by I/O adapters (`RawTable`)
//! - extracted survey records (`RawRecord`) and parsed periods (`Period`)
//! - the analysis-ready row (`AnalysisRow`) produced by the transformer

pub mod columns;
pub mod types;

pub use types::*;
