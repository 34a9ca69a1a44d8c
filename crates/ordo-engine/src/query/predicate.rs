//! Predicate representations and their effect on statistics.
//!
//! Two families: [`JoinPredicate`] asserts two columns equal across
//! relations, [`ValuePredicate`] filters a single column. Only conjunctions
//! of these are handled; anything richer belongs to the layers that prepare
//! a query for planning.

use indexmap::IndexMap;
use ordo_core::statistics::{ColumnSelectivity, ColumnStatistics, RelationStatistics};
use ordo_common::types::{ColumnRef, OrderedValue, TableRef};
use ordo_common::utils::error::Result;
use smallvec::SmallVec;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Matched fraction assumed for a LIKE pattern; the model has no frequency
/// information for patterns, so this stays a fixed guess.
const LIKE_SELECTIVITY: f64 = 0.1;

/// An equality assertion between two columns of different relations.
///
/// The pair is unordered: `a = b` and `b = a` are the same predicate, and
/// equality/hashing treat them as such.
#[derive(Debug, Clone, Eq)]
pub struct JoinPredicate {
    /// One side of the equality.
    pub a: ColumnRef,
    /// The other side.
    pub b: ColumnRef,
}

impl JoinPredicate {
    /// Creates a join predicate over two columns.
    #[must_use]
    pub fn new(a: ColumnRef, b: ColumnRef) -> Self {
        Self { a, b }
    }

    /// Whether this predicate connects the two given relations, in either
    /// orientation.
    #[must_use]
    pub fn connects(&self, x: &TableRef, y: &TableRef) -> bool {
        (self.a.table == *x && self.b.table == *y)
            || (self.a.table == *y && self.b.table == *x)
    }

    /// The two sides in a canonical order, used for symmetric equality.
    fn canonical(&self) -> (&ColumnRef, &ColumnRef) {
        if self.a <= self.b {
            (&self.a, &self.b)
        } else {
            (&self.b, &self.a)
        }
    }

    /// Applies the join to a working relation's statistics.
    ///
    /// Equality is transitive, so the update cannot stop at the two joined
    /// columns: every column provably equal to either side through
    /// `existing` predicates receives the same resulting statistics. The
    /// closure is found by fixpoint iteration, absorbing any predicate with
    /// exactly one side already inside.
    ///
    /// # Errors
    ///
    /// [`ordo_common::Error::MissingStatistics`] when either column is
    /// untracked; the estimate cannot proceed without it.
    pub fn apply(
        &self,
        stats: &RelationStatistics,
        existing: &[JoinPredicate],
    ) -> Result<RelationStatistics> {
        let joined = stats.column(&self.a)?.join(stats.column(&self.b)?);

        let mut equal_columns: SmallVec<[ColumnRef; 4]> =
            SmallVec::from_iter([self.a.clone(), self.b.clone()]);
        loop {
            let mut changed = false;
            for predicate in existing {
                let has_a = equal_columns.contains(&predicate.a);
                let has_b = equal_columns.contains(&predicate.b);
                if has_a != has_b {
                    equal_columns.push(if has_a {
                        predicate.b.clone()
                    } else {
                        predicate.a.clone()
                    });
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        Ok(stats.apply_select(&joined, &equal_columns))
    }
}

impl PartialEq for JoinPredicate {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Hash for JoinPredicate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

impl fmt::Display for JoinPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.a.short_name(), self.b.short_name())
    }
}

/// A single-column filter predicate.
///
/// The four kinds are a closed set; adding estimation logic for a new kind
/// means extending this enum and letting exhaustive matches point at every
/// place that needs the new case.
#[derive(Debug, Clone, PartialEq)]
pub enum ValuePredicate {
    /// `column = v`, `column IN (…)`, or their negations.
    Equality {
        /// Filtered column.
        column: ColumnRef,
        /// Values compared against.
        values: Vec<OrderedValue>,
        /// Negated form (`!=` / `NOT IN`).
        negated: bool,
    },
    /// `column <op> threshold` for any combination of `<`, `=`, `>`.
    Inequality {
        /// Filtered column.
        column: ColumnRef,
        /// Comparison threshold.
        threshold: OrderedValue,
        /// Accept values below the threshold.
        less_than: bool,
        /// Accept values equal to the threshold.
        equal: bool,
        /// Accept values above the threshold.
        greater_than: bool,
    },
    /// `column IS NULL` or `column IS NOT NULL`.
    NullCheck {
        /// Filtered column.
        column: ColumnRef,
        /// `IS NOT NULL` when set.
        negated: bool,
    },
    /// `column LIKE pattern`, multiple same-polarity patterns OR-ed.
    Like {
        /// Filtered column.
        column: ColumnRef,
        /// SQL LIKE patterns.
        patterns: Vec<String>,
        /// `NOT LIKE` when set.
        negated: bool,
    },
}

impl ValuePredicate {
    /// The column this predicate filters.
    #[must_use]
    pub fn column(&self) -> &ColumnRef {
        match self {
            ValuePredicate::Equality { column, .. }
            | ValuePredicate::Inequality { column, .. }
            | ValuePredicate::NullCheck { column, .. }
            | ValuePredicate::Like { column, .. } => column,
        }
    }

    /// Applies the predicate to a relation, updating its row count and the
    /// filtered column's statistics.
    pub fn apply(&self, stats: &RelationStatistics) -> Result<RelationStatistics> {
        let selectivity = self.selectivity(stats.column(self.column())?)?;
        Ok(stats.apply_select(&selectivity, std::slice::from_ref(self.column())))
    }

    /// Estimates the fraction of rows this predicate keeps and the
    /// statistics of the surviving column values.
    pub fn selectivity(&self, stats: &ColumnStatistics) -> Result<ColumnSelectivity> {
        match self {
            ValuePredicate::Equality {
                values, negated, ..
            } => Ok(equality_selectivity(stats, values, *negated)),
            ValuePredicate::Inequality {
                threshold,
                less_than,
                equal,
                greater_than,
                ..
            } => inequality_selectivity(stats, threshold, *less_than, *equal, *greater_than),
            ValuePredicate::NullCheck { negated, .. } => Ok(null_selectivity(stats, *negated)),
            ValuePredicate::Like { negated, .. } => {
                // No frequency data exists for patterns; a fixed guess is
                // the weakest estimator in the model, and the statistics
                // pass through untouched.
                let selectivity = if *negated {
                    1.0 - LIKE_SELECTIVITY
                } else {
                    LIKE_SELECTIVITY
                };
                Ok(ColumnSelectivity::new(selectivity, stats.clone()))
            }
        }
    }
}

/// Every target value is assumed present: mapped values use their observed
/// frequency, unmapped ones the uniform average over the unmapped mass.
fn equality_selectivity(
    stats: &ColumnStatistics,
    values: &[OrderedValue],
    negated: bool,
) -> ColumnSelectivity {
    let matched: f64 = values
        .iter()
        .map(|value| stats.estimated_frequency_assuming_exists(value))
        .sum();

    if negated {
        let kept = 1.0 - matched - stats.fraction_null;
        let mut most_common = IndexMap::new();
        for (value, frequency) in &stats.most_common {
            if !values.contains(value) {
                let renormalized = if kept > 0.0 { frequency / kept } else { *frequency };
                most_common.insert(value.clone(), renormalized);
            }
        }
        let n_distinct = stats.n_distinct.saturating_sub(values.len() as u64);
        ColumnSelectivity::new(kept, ColumnStatistics::new(0.0, n_distinct, most_common))
    } else {
        let mut most_common = IndexMap::new();
        if matched > 0.0 {
            for value in values {
                most_common.insert(
                    value.clone(),
                    stats.estimated_frequency_assuming_exists(value) / matched,
                );
            }
        }
        ColumnSelectivity::new(
            matched,
            ColumnStatistics::new(0.0, values.len() as u64, most_common),
        )
    }
}

/// Accepts histogram buckets on any partial overlap with the accepted
/// region; no intra-bucket splitting happens here, so boundary buckets
/// over-count. Callers needing precision pre-split the histogram.
fn inequality_selectivity(
    stats: &ColumnStatistics,
    threshold: &OrderedValue,
    less_than: bool,
    equal: bool,
    greater_than: bool,
) -> Result<ColumnSelectivity> {
    let accepts_value = |value: &OrderedValue| -> Result<bool> {
        let ordering = value.try_cmp(threshold)?;
        Ok((ordering.is_lt() && less_than)
            || (ordering.is_gt() && greater_than)
            || (ordering.is_eq() && equal))
    };

    let mut kept = 0.0;
    let mut surviving_distinct = 0.0;

    for range in &stats.histogram {
        let accepted = (less_than && range.lower.try_cmp(threshold)?.is_lt())
            || (greater_than && range.upper.try_cmp(threshold)?.is_gt())
            || (equal && range.contains(threshold)?);
        if accepted {
            kept += range.fraction;
            surviving_distinct += range.num_distinct;
        }
    }

    for (value, frequency) in &stats.most_common {
        if accepts_value(value)? {
            kept += frequency;
            surviving_distinct += 1.0;
        }
    }

    let mut most_common = IndexMap::new();
    for (value, frequency) in &stats.most_common {
        if accepts_value(value)? {
            let renormalized = if kept > 0.0 { frequency / kept } else { *frequency };
            most_common.insert(value.clone(), renormalized);
        }
    }

    Ok(ColumnSelectivity::new(
        kept,
        ColumnStatistics::new(0.0, surviving_distinct.round() as u64, most_common),
    ))
}

fn null_selectivity(stats: &ColumnStatistics, negated: bool) -> ColumnSelectivity {
    if !negated {
        // Survivors are all NULL: one unknown value, nothing mapped.
        return ColumnSelectivity::new(
            stats.fraction_null,
            ColumnStatistics::new(1.0, 0, IndexMap::new()),
        );
    }
    let kept = 1.0 - stats.fraction_null;
    let mut most_common = stats.most_common.clone();
    if kept > 0.0 {
        for frequency in most_common.values_mut() {
            *frequency /= kept;
        }
    }
    ColumnSelectivity::new(
        kept,
        ColumnStatistics::new(0.0, stats.n_distinct, most_common),
    )
}

impl fmt::Display for ValuePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValuePredicate::Equality {
                column,
                values,
                negated,
            } => {
                if let [value] = values.as_slice() {
                    let op = if *negated { "!=" } else { "=" };
                    write!(f, "{} {} {}", column.short_name(), op, value)
                } else {
                    let op = if *negated { "NOT IN" } else { "IN" };
                    let list: Vec<String> = values.iter().map(ToString::to_string).collect();
                    write!(f, "{} {} ({})", column.short_name(), op, list.join(", "))
                }
            }
            ValuePredicate::Inequality {
                column,
                threshold,
                less_than,
                equal,
                greater_than,
            } => {
                let mut op = String::new();
                if *less_than {
                    op.push('<');
                }
                if *greater_than {
                    op.push('>');
                }
                if *equal {
                    op.push('=');
                }
                write!(f, "{} {} {}", column.short_name(), op, threshold)
            }
            ValuePredicate::NullCheck { column, negated } => {
                let check = if *negated { "IS NOT NULL" } else { "IS NULL" };
                write!(f, "{} {}", column.short_name(), check)
            }
            ValuePredicate::Like {
                column,
                patterns,
                negated,
            } => {
                let op = if *negated { "NOT LIKE" } else { "LIKE" };
                let parts: Vec<String> = patterns
                    .iter()
                    .map(|pattern| format!("{} {} '{}'", column.short_name(), op, pattern))
                    .collect();
                if let [single] = parts.as_slice() {
                    write!(f, "{single}")
                } else {
                    write!(f, "({})", parts.join(" OR "))
                }
            }
        }
    }
}
