//! `ene-labour` library crate.
//!
//! Analysis core for quarterly labour-force survey extracts (INE "ENE"
//! series), restricted to a single administrative region:
//!
//! - `ingest` normalizes a raw in-memory table (either source column scheme)
//! - `validate` gates the table (hard checks) and reports quality (soft checks)
//! - `transform` produces the analysis-ready row set
//! - `stats` is a general-purpose statistics toolbox over numeric series
//! - `analysis` composes stats into labour-market / demographic result trees
//!
//! File I/O, chart rendering and report templating live outside this crate;
//! callers hand in a [`domain::RawTable`] and receive serializable results.

pub mod analysis;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod ingest;
pub mod report;
pub mod stats;
pub mod transform;
pub mod validate;
