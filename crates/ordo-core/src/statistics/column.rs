//! Per-column statistics and the join/semijoin selectivity model.
//!
//! This file is where every selectivity number in the system originates.
//! The model follows the catalog convention: `fraction_null` is the share of
//! rows that are NULL, the most-common-value mapping records exact observed
//! frequencies for a bounded set of skewed values (fractions of all rows,
//! nulls excluded), and whatever mass neither explains is assumed uniformly
//! spread over the remaining ("unmapped") distinct values.
//!
//! Cross-column estimates lean on the containment assumption: of two join
//! sides, the one with fewer remaining distinct values is expected to be a
//! subset of the other. Every denominator here can legitimately be zero on
//! degenerate inputs; each such term contributes nothing instead of
//! poisoning the estimate with NaN.

use indexmap::IndexMap;
use ordo_common::types::OrderedValue;

use super::histogram::HistogramRange;

/// Statistics for one column of one relation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnStatistics {
    /// Fraction of rows that are NULL, in `[0, 1]`.
    pub fraction_null: f64,
    /// Estimated count of distinct non-null values.
    pub n_distinct: u64,
    /// Most-common values and their observed row fractions (nulls excluded).
    /// Invariant: the frequencies plus `fraction_null` sum to at most 1, and
    /// `n_distinct` is at least the mapping's size.
    pub most_common: IndexMap<OrderedValue, f64>,
    /// Equi-depth buckets covering the mass the mapping does not explain.
    pub histogram: Vec<HistogramRange>,
}

/// The outcome of estimating a predicate or join against a column: the
/// fraction of rows (or of the cross product) retained, and the statistics
/// of the surviving column values.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSelectivity {
    /// Fraction retained.
    pub selectivity: f64,
    /// Statistics of the surviving values.
    pub stats: ColumnStatistics,
}

impl ColumnSelectivity {
    /// Bundles a selectivity with the resulting statistics.
    #[must_use]
    pub fn new(selectivity: f64, stats: ColumnStatistics) -> Self {
        Self { selectivity, stats }
    }
}

impl ColumnStatistics {
    /// Creates statistics without a histogram.
    #[must_use]
    pub fn new(
        fraction_null: f64,
        n_distinct: u64,
        most_common: IndexMap<OrderedValue, f64>,
    ) -> Self {
        Self {
            fraction_null,
            n_distinct,
            most_common,
            histogram: Vec::new(),
        }
    }

    /// Creates statistics with equi-depth histogram buckets.
    #[must_use]
    pub fn with_histogram(
        fraction_null: f64,
        n_distinct: u64,
        most_common: IndexMap<OrderedValue, f64>,
        histogram: Vec<HistogramRange>,
    ) -> Self {
        Self {
            fraction_null,
            n_distinct,
            most_common,
            histogram,
        }
    }

    /// Row mass explained by neither NULLs nor the most-common mapping.
    #[must_use]
    pub fn fraction_unmapped(&self) -> f64 {
        1.0 - self.fraction_null - self.most_common.values().sum::<f64>()
    }

    /// Distinct values outside the most-common mapping.
    #[must_use]
    pub fn n_distinct_unmapped(&self) -> u64 {
        self.n_distinct.saturating_sub(self.most_common.len() as u64)
    }

    /// Estimated frequency of `value`, assuming it occurs in the column:
    /// the exact mapped frequency when tracked, otherwise the uniform
    /// average over the unmapped remainder.
    #[must_use]
    pub fn estimated_frequency_assuming_exists(&self, value: &OrderedValue) -> f64 {
        if let Some(frequency) = self.most_common.get(value) {
            return *frequency;
        }
        let unmapped = self.n_distinct_unmapped();
        if unmapped == 0 {
            return 0.0;
        }
        self.fraction_unmapped() / unmapped as f64
    }

    /// Estimates the fraction of this column's rows whose value also appears
    /// in `other`, along with the statistics of the surviving rows.
    ///
    /// Mapped values present on both sides keep their full frequency; the
    /// leftover mass survives in proportion to the containment ratio of the
    /// two sides' remaining distinct counts.
    #[must_use]
    pub fn semijoin(&self, other: &Self) -> ColumnSelectivity {
        let mut shared_fraction = 0.0;
        let mut unshared_fraction = 1.0 - self.fraction_null;
        let mut unshared_distinct_mine = self.n_distinct as i64;
        let mut unshared_distinct_theirs = other.n_distinct as i64;

        // A mapped value that the other side also maps is kept outright.
        for (value, frequency) in &self.most_common {
            if other.most_common.contains_key(value) {
                shared_fraction += frequency;
                unshared_fraction -= frequency;
                unshared_distinct_mine -= 1;
                unshared_distinct_theirs -= 1;
            }
        }

        let mut leftover = 0.0;
        if self.n_distinct_unmapped() > 0 && unshared_distinct_mine > 0 {
            let containment = (unshared_distinct_theirs as f64 / unshared_distinct_mine as f64)
                .clamp(0.0, 1.0);
            leftover = unshared_fraction * containment;
        }
        let selectivity = shared_fraction + leftover;

        // Frequencies are fractions of the old population; dividing by the
        // surviving mass restates them over the new, smaller one.
        let mut surviving_mass = 1.0 - self.fraction_null;
        let mut most_common = IndexMap::new();
        for (value, frequency) in &self.most_common {
            if other.most_common.contains_key(value) {
                most_common.insert(value.clone(), *frequency);
            } else {
                surviving_mass -= frequency;
            }
        }
        if surviving_mass > 0.0 {
            for frequency in most_common.values_mut() {
                *frequency /= surviving_mass;
            }
        }

        let n_distinct = if self.n_distinct == self.most_common.len() as u64 {
            most_common.len() as u64
        } else {
            self.n_distinct.min(other.n_distinct)
        };
        ColumnSelectivity::new(selectivity, Self::new(0.0, n_distinct, most_common))
    }

    /// Estimates the fraction of the cross product of this column and
    /// `other` that satisfies equality, along with the statistics of the
    /// join-key column in the result.
    #[must_use]
    pub fn join(&self, other: &Self) -> ColumnSelectivity {
        let mut unshared_distinct_mine = self.n_distinct as i64;
        let mut unshared_distinct_theirs = other.n_distinct as i64;
        let mut n_shared = 0i64;
        let mut selectivity = 0.0;

        // Values mapped on both sides: exact frequencies, independent draws.
        for (value, frequency) in &self.most_common {
            if let Some(their_frequency) = other.most_common.get(value) {
                selectivity += frequency * their_frequency;
                unshared_distinct_mine -= 1;
                unshared_distinct_theirs -= 1;
                n_shared += 1;
            }
        }

        // Values mapped on exactly one side: the other side is estimated by
        // its uniform unmapped average, scaled by the probability that the
        // value exists over there at all (the containment ratio again).
        if other.n_distinct_unmapped() > 0 && unshared_distinct_mine > 0 {
            let containment = (unshared_distinct_theirs as f64 / unshared_distinct_mine as f64)
                .clamp(0.0, 1.0);
            let their_average = other.fraction_unmapped() / other.n_distinct_unmapped() as f64;
            for (value, frequency) in &self.most_common {
                if !other.most_common.contains_key(value) {
                    selectivity += frequency * their_average * containment;
                }
            }
        }
        if self.n_distinct_unmapped() > 0 && unshared_distinct_theirs > 0 {
            let containment = (unshared_distinct_mine as f64 / unshared_distinct_theirs as f64)
                .clamp(0.0, 1.0);
            let my_average = self.fraction_unmapped() / self.n_distinct_unmapped() as f64;
            for (value, their_frequency) in &other.most_common {
                if !self.most_common.contains_key(value) {
                    selectivity += their_frequency * my_average * containment;
                }
            }
        }

        // Values mapped on neither side: uniform-over-implicit-domain term,
        // present only while both sides still have implicit values left.
        let n_explicit = self.most_common.len() as i64 + other.most_common.len() as i64 - n_shared;
        let implicit_mine = self.n_distinct as i64 - n_explicit;
        let implicit_theirs = other.n_distinct as i64 - n_explicit;
        if implicit_mine > 0 && implicit_theirs > 0 {
            selectivity += self.fraction_unmapped() * other.fraction_unmapped()
                / implicit_mine.max(implicit_theirs) as f64;
        }

        // Only values mapped on both sides are guaranteed present in the
        // join, so the result tracks exactly those.
        let mut most_common = IndexMap::new();
        if selectivity > 0.0 {
            for (value, frequency) in &self.most_common {
                if let Some(their_frequency) = other.most_common.get(value) {
                    most_common.insert(value.clone(), frequency * their_frequency / selectivity);
                }
            }
        }

        let mut n_distinct = self.n_distinct.min(other.n_distinct);
        if self.n_distinct_unmapped() == 0 && other.n_distinct_unmapped() == 0 {
            n_distinct = most_common.len() as u64;
        }
        ColumnSelectivity::new(selectivity, Self::new(0.0, n_distinct, most_common))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn mcv(entries: &[(&str, f64)]) -> IndexMap<OrderedValue, f64> {
        entries
            .iter()
            .map(|(value, frequency)| (OrderedValue::text(*value), *frequency))
            .collect()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_semijoin_without_most_common_is_distinct_ratio() {
        let left = ColumnStatistics::new(0.0, 5, IndexMap::new());
        let right = ColumnStatistics::new(0.0, 10, IndexMap::new());
        assert_close(left.semijoin(&right).selectivity, 1.0);
        assert_close(right.semijoin(&left).selectivity, 0.5);
    }

    #[test]
    fn test_join_without_most_common_uses_larger_domain() {
        // One row per value, left 1-5, right 1-10: 5 of the 50 cross pairs
        // match, so 0.1 either way around.
        let left = ColumnStatistics::new(0.0, 5, IndexMap::new());
        let right = ColumnStatistics::new(0.0, 10, IndexMap::new());
        assert_close(left.join(&right).selectivity, 0.1);
        assert_close(right.join(&left).selectivity, 0.1);
    }

    #[test]
    fn test_fully_mapped_sides_use_exact_frequencies() {
        let left = ColumnStatistics::new(0.0, 3, mcv(&[("A", 0.5), ("B", 0.2), ("C", 0.3)]));
        let right = ColumnStatistics::new(0.0, 3, mcv(&[("B", 0.25), ("C", 0.35), ("D", 0.4)]));

        assert_close(left.semijoin(&right).selectivity, 0.5);
        assert_close(right.semijoin(&left).selectivity, 0.6);

        let joined = left.join(&right);
        assert_close(joined.selectivity, 0.2 * 0.25 + 0.3 * 0.35);
        assert_close(right.join(&left).selectivity, joined.selectivity);

        // Only B and C are certain to appear in the join.
        assert_eq!(joined.stats.n_distinct, 2);
        assert!(joined.stats.most_common.contains_key(&OrderedValue::text("B")));
        assert!(joined.stats.most_common.contains_key(&OrderedValue::text("C")));
    }

    #[test]
    fn test_disjoint_mappings_fall_back_to_containment() {
        // Maximum-overlap assumption: each side is effectively half "A" and
        // half "B", so everything semijoin-survives and half the aligned
        // pairs join.
        let left = ColumnStatistics::new(0.0, 2, mcv(&[("A", 0.5)]));
        let right = ColumnStatistics::new(0.0, 2, mcv(&[("B", 0.5)]));
        assert_close(left.semijoin(&right).selectivity, 1.0);
        assert_close(right.semijoin(&left).selectivity, 1.0);

        let joined = left.join(&right);
        assert_close(joined.selectivity, 0.5);
        assert_eq!(joined.stats.n_distinct, 2);
        assert!(joined.stats.most_common.is_empty());
    }

    #[test]
    fn test_mixed_mapped_and_unmapped_mass() {
        let left = ColumnStatistics::new(0.0, 4, mcv(&[("A", 0.4), ("B", 0.5)]));
        let right = ColumnStatistics::new(0.0, 4, mcv(&[("B", 0.25), ("C", 0.3)]));
        // Each side has four distinct values, so containment saturates.
        assert_close(left.semijoin(&right).selectivity, 1.0);
        assert_close(right.semijoin(&left).selectivity, 1.0);

        let expected = 0.4 * (0.45 / 2.0)        // A against the right's unmapped average
            + 0.5 * 0.25                          // B on both sides
            + 0.3 * (0.1 / 2.0)                   // C against the left's unmapped average
            + 0.1 * 0.45;                         // neither-side remainder, one implicit value each
        assert_close(left.join(&right).selectivity, expected);
        assert_close(right.join(&left).selectivity, expected);
    }

    #[test]
    fn test_asymmetric_domains_scale_by_containment() {
        let left = ColumnStatistics::new(0.0, 10, mcv(&[("A", 0.4), ("B", 0.5)]));
        let right = ColumnStatistics::new(0.0, 4, mcv(&[("B", 0.25), ("C", 0.3)]));

        // B matches outright; the remaining half of the left is a 3-vs-9
        // containment.
        assert_close(left.semijoin(&right).selectivity, 0.5 + 0.5 * (3.0 / 9.0));
        assert_close(right.semijoin(&left).selectivity, 1.0);

        let expected = 0.4 * (0.45 / 2.0) * (3.0 / 9.0)
            + 0.5 * 0.25
            + 0.3 * (0.1 / 8.0)
            + 0.1 * 0.45 / 7.0;
        assert_close(left.join(&right).selectivity, expected);
        assert_close(right.join(&left).selectivity, expected);
    }

    #[test]
    fn test_one_side_fully_mapped() {
        let left = ColumnStatistics::new(0.0, 3, mcv(&[("A", 0.4), ("B", 0.35), ("C", 0.25)]));
        let right = ColumnStatistics::new(0.0, 10, mcv(&[("B", 0.25), ("C", 0.1), ("D", 0.1)]));

        // B and C match, A does not, and the left has no unmapped remainder.
        assert_close(left.semijoin(&right).selectivity, 0.6);
        assert_close(right.semijoin(&left).selectivity, 0.35 + 0.65 / 8.0);

        let expected = 0.35 * 0.25 + 0.25 * 0.1 + 0.4 * (0.55 / 7.0);
        assert_close(left.join(&right).selectivity, expected);
    }

    #[test]
    fn test_semijoin_renormalizes_survivors() {
        let left = ColumnStatistics::new(0.0, 3, mcv(&[("A", 0.5), ("B", 0.2), ("C", 0.3)]));
        let right = ColumnStatistics::new(0.0, 2, mcv(&[("B", 0.6), ("C", 0.4)]));
        let result = left.semijoin(&right);
        // A's mass is discarded; B and C are restated over the survivors.
        assert_close(result.stats.most_common[&OrderedValue::text("B")], 0.4);
        assert_close(result.stats.most_common[&OrderedValue::text("C")], 0.6);
        assert_eq!(result.stats.n_distinct, 2);
        assert_close(result.stats.fraction_null, 0.0);
    }

    #[test]
    fn test_join_is_not_the_product_of_semijoins() {
        // The two operations answer different questions and are computed
        // independently; multiplying the semijoins does not give the join.
        let left = ColumnStatistics::new(0.0, 5, IndexMap::new());
        let right = ColumnStatistics::new(0.0, 10, IndexMap::new());
        let product =
            left.semijoin(&right).selectivity * right.semijoin(&left).selectivity;
        assert_close(product, 0.5);
        assert_close(left.join(&right).selectivity, 0.1);
    }

    #[test]
    fn test_degenerate_zero_distinct_contributes_nothing() {
        let empty = ColumnStatistics::new(0.0, 0, IndexMap::new());
        let other = ColumnStatistics::new(0.0, 10, IndexMap::new());
        assert_close(empty.semijoin(&other).selectivity, 0.0);
        assert_close(empty.join(&other).selectivity, 0.0);
        assert_close(other.join(&empty).selectivity, 0.0);
    }

    proptest! {
        #[test]
        fn prop_unmapped_semijoin_is_distinct_ratio(a in 1u64..500, b in 1u64..500) {
            let left = ColumnStatistics::new(0.0, a, IndexMap::new());
            let right = ColumnStatistics::new(0.0, b, IndexMap::new());
            let expected = (b as f64 / a as f64).min(1.0);
            let actual = left.semijoin(&right).selectivity;
            prop_assert!((actual - expected).abs() < 1e-9);
        }

        #[test]
        fn prop_join_result_mapping_is_bounded_intersection(
            freq_a in 0.05f64..0.4,
            freq_b in 0.05f64..0.4,
            distinct in 4u64..100,
        ) {
            let left = ColumnStatistics::new(0.0, distinct, mcv(&[("X", freq_a), ("Y", 0.1)]));
            let right = ColumnStatistics::new(0.0, distinct, mcv(&[("X", freq_b), ("Z", 0.1)]));
            let result = left.join(&right);
            let mass: f64 = result.stats.most_common.values().sum();
            prop_assert!(mass <= 1.0 + 1e-9);
            for value in result.stats.most_common.keys() {
                prop_assert!(left.most_common.contains_key(value));
                prop_assert!(right.most_common.contains_key(value));
            }
        }
    }
}
