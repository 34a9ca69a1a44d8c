//! Statistical summaries and selectivity estimation.
//!
//! This module provides the model the planner costs joins with:
//! - [`HistogramRange`] - equi-depth buckets with fractional splitting
//! - [`ColumnStatistics`] - null fraction, distinct count, most-common values,
//!   and the join/semijoin selectivity derivations
//! - [`RelationStatistics`] - row count plus per-column statistics
//! - [`RawColumnStatistics`] - the catalog-row form statistics arrive in

mod catalog;
mod column;
mod histogram;
mod relation;

pub use catalog::RawColumnStatistics;
pub use column::{ColumnSelectivity, ColumnStatistics};
pub use histogram::HistogramRange;
pub use relation::RelationStatistics;
