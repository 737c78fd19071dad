//! The statistics engine.
//!
//! Pure numeric routines over `&[f64]` slices; every function filters
//! non-finite values and degrades to `None` (or an explanatory result) when
//! the series is too short, so callers never have to pre-screen.

pub mod changepoint;
pub mod correlation;
pub mod descriptive;
pub mod normality;
pub mod ols;
pub mod trend;

pub use changepoint::{detect_change_points, ChangePoint};
pub use correlation::{correlation_matrix, CorrelationMatrix, CorrelationPair};
pub use descriptive::{descriptive, DescriptiveStats};
pub use normality::{normality_tests, NormalityReport};
pub use trend::{trend_analysis, MannKendall, TrendAnalysis};
