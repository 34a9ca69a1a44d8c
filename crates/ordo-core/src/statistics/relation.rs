//! Row counts and per-column statistics for one relation.

use indexmap::IndexMap;
use ordo_common::types::ColumnRef;
use ordo_common::utils::error::{Error, Result};

use super::column::{ColumnSelectivity, ColumnStatistics};

/// Statistics for one relation: an estimated row count plus statistics for
/// every tracked column.
///
/// Values are immutable snapshots. Every predicate application produces a
/// fresh `RelationStatistics`, so a plan node owns its statistics outright
/// and no mapping is ever shared between nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationStatistics {
    /// Estimated number of rows.
    pub num_rows: f64,
    /// Statistics per tracked column.
    pub columns: IndexMap<ColumnRef, ColumnStatistics>,
}

impl RelationStatistics {
    /// Creates relation statistics from a row count and column mapping.
    #[must_use]
    pub fn new(num_rows: f64, columns: IndexMap<ColumnRef, ColumnStatistics>) -> Self {
        Self { num_rows, columns }
    }

    /// Looks up the statistics for `column`.
    ///
    /// # Errors
    ///
    /// [`Error::MissingStatistics`] when the column is untracked; estimates
    /// cannot proceed without it.
    pub fn column(&self, column: &ColumnRef) -> Result<&ColumnStatistics> {
        self.columns
            .get(column)
            .ok_or_else(|| Error::MissingStatistics(column.short_name()))
    }

    /// Applies a selection to the relation.
    ///
    /// The row count scales by the selectivity. Columns in `affected` take
    /// the selection's resulting statistics. Any other column whose distinct
    /// count now exceeds the shrunken row count has that count scaled down
    /// by the same factor; key-like columns are near-unique, so their
    /// cardinality tracks the row count. Everything else passes through.
    #[must_use]
    pub fn apply_select(
        &self,
        selectivity: &ColumnSelectivity,
        affected: &[ColumnRef],
    ) -> Self {
        let num_rows = self.num_rows * selectivity.selectivity;
        let columns = self
            .columns
            .iter()
            .map(|(column, stats)| {
                let updated = if affected.contains(column) {
                    selectivity.stats.clone()
                } else if stats.n_distinct as f64 > num_rows {
                    ColumnStatistics::with_histogram(
                        stats.fraction_null,
                        (stats.n_distinct as f64 * selectivity.selectivity).round() as u64,
                        stats.most_common.clone(),
                        stats.histogram.clone(),
                    )
                } else {
                    stats.clone()
                };
                (column.clone(), updated)
            })
            .collect();
        Self { num_rows, columns }
    }
}
