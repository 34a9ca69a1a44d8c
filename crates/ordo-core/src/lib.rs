//! # ordo-core
//!
//! Statistics layer for Ordo: the histogram model, per-column selectivity
//! estimation, and relation-level statistics propagation.
//!
//! This crate holds every floating-point selectivity computation in the
//! system; the planner in `ordo-engine` is a pure consumer. It depends only
//! on `ordo-common`.
//!
//! ## Modules
//!
//! - [`statistics`] - Column/relation statistics and the join/semijoin model

pub mod statistics;

// Re-export commonly used types
pub use statistics::{
    ColumnSelectivity, ColumnStatistics, HistogramRange, RawColumnStatistics, RelationStatistics,
};
