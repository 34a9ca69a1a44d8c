//! Conversion from catalog-shaped statistics rows.
//!
//! Catalog collaborators hand over statistics in the shape the data store
//! publishes them: a signed distinct estimate, parallel most-common arrays,
//! and optional histogram boundary values. This module turns that raw form
//! into [`ColumnStatistics`]; fetching the rows is someone else's job.

use indexmap::IndexMap;
use ordo_common::types::{ColumnRef, Literal, OrderedValue};
use serde::{Deserialize, Serialize};

use super::column::ColumnStatistics;
use super::histogram::HistogramRange;
use super::relation::RelationStatistics;

/// One column's statistics as published by the catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawColumnStatistics {
    /// Fraction of rows that are NULL.
    pub null_fraction: f64,
    /// Signed distinct estimate: non-negative values are an absolute count;
    /// negative values encode a fraction of the row count, negated.
    pub distinct: f64,
    /// Most-common values, parallel to `most_common_frequencies`.
    pub most_common_values: Vec<Literal>,
    /// Observed row fraction of each most-common value.
    pub most_common_frequencies: Vec<f64>,
    /// Sorted histogram boundary values, when the catalog kept a histogram.
    pub histogram_bounds: Vec<Literal>,
}

impl RawColumnStatistics {
    /// Resolves the signed distinct estimate against the row count.
    #[must_use]
    pub fn resolved_distinct(&self, row_count: f64) -> u64 {
        if self.distinct < 0.0 {
            (-self.distinct * row_count).round() as u64
        } else {
            self.distinct.round() as u64
        }
    }

    /// Converts the raw form into [`ColumnStatistics`].
    ///
    /// Histogram boundaries become equi-depth buckets covering whatever row
    /// mass the null fraction and the most-common list leave unexplained.
    #[must_use]
    pub fn into_column_statistics(self, row_count: f64) -> ColumnStatistics {
        let n_distinct = self.resolved_distinct(row_count);

        let most_common: IndexMap<OrderedValue, f64> = self
            .most_common_values
            .into_iter()
            .zip(self.most_common_frequencies)
            .map(|(value, frequency)| (OrderedValue::new(value), frequency))
            .collect();

        let mapped_mass: f64 = most_common.values().sum();
        let mapped_distinct = most_common.len() as u64;
        let boundaries: Vec<OrderedValue> = self
            .histogram_bounds
            .into_iter()
            .map(OrderedValue::new)
            .collect();
        let histogram = HistogramRange::equi_depth(
            &boundaries,
            n_distinct.saturating_sub(mapped_distinct) as f64,
            (1.0 - self.null_fraction - mapped_mass).max(0.0),
        );

        ColumnStatistics::with_histogram(self.null_fraction, n_distinct, most_common, histogram)
    }
}

/// Assembles [`RelationStatistics`] from a row count and raw catalog rows.
#[must_use]
pub fn relation_statistics(
    row_count: f64,
    columns: impl IntoIterator<Item = (ColumnRef, RawColumnStatistics)>,
) -> RelationStatistics {
    let columns = columns
        .into_iter()
        .map(|(column, raw)| (column, raw.into_column_statistics(row_count)))
        .collect();
    RelationStatistics::new(row_count, columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordo_common::types::{Table, TableRef};

    #[test]
    fn test_negative_distinct_is_a_row_fraction() {
        let raw = RawColumnStatistics {
            distinct: -0.25,
            ..Default::default()
        };
        assert_eq!(raw.resolved_distinct(1000.0), 250);
    }

    #[test]
    fn test_positive_distinct_is_absolute() {
        let raw = RawColumnStatistics {
            distinct: 41.6,
            ..Default::default()
        };
        assert_eq!(raw.resolved_distinct(1000.0), 42);
    }

    #[test]
    fn test_histogram_covers_unexplained_mass() {
        let raw = RawColumnStatistics {
            null_fraction: 0.1,
            distinct: 12.0,
            most_common_values: vec![Literal::Integer(1), Literal::Integer(2)],
            most_common_frequencies: vec![0.3, 0.2],
            histogram_bounds: vec![
                Literal::Integer(0),
                Literal::Integer(50),
                Literal::Integer(100),
            ],
        };
        let stats = raw.into_column_statistics(1000.0);

        assert_eq!(stats.n_distinct, 12);
        assert_eq!(stats.most_common.len(), 2);
        assert_eq!(stats.histogram.len(), 2);
        // 1 - 0.1 nulls - 0.5 mapped leaves 0.4 across two buckets.
        let bucket_mass: f64 = stats.histogram.iter().map(|b| b.fraction).sum();
        assert!((bucket_mass - 0.4).abs() < 1e-9);
        let bucket_distinct: f64 = stats.histogram.iter().map(|b| b.num_distinct).sum();
        assert!((bucket_distinct - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_relation_assembly() {
        let table = TableRef::new("t", Table::new("test", "t"));
        let stats = relation_statistics(
            500.0,
            [(
                ColumnRef::new(table.clone(), "id"),
                RawColumnStatistics {
                    distinct: -1.0,
                    ..Default::default()
                },
            )],
        );
        assert!((stats.num_rows - 500.0).abs() < 1e-9);
        assert_eq!(stats.columns[&ColumnRef::new(table, "id")].n_distinct, 500);
    }
}
