//! Equi-depth histogram buckets.

use num_traits::ToPrimitive;
use ordo_common::types::OrderedValue;
use ordo_common::utils::error::{Error, Result};

/// One bucket of an equi-depth histogram.
///
/// A bucket covers the inclusive value interval `[lower, upper]` and carries
/// an estimated distinct-value count plus the fraction of the relation's
/// rows that fall inside it. Values are assumed uniformly spread within a
/// bucket, which is what makes fractional splitting meaningful.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramRange {
    /// Inclusive lower bound.
    pub lower: OrderedValue,
    /// Inclusive upper bound.
    pub upper: OrderedValue,
    /// Estimated distinct values inside the bucket.
    pub num_distinct: f64,
    /// Fraction of the relation's rows inside the bucket.
    pub fraction: f64,
}

impl HistogramRange {
    /// Creates a bucket over `[lower, upper]`.
    #[must_use]
    pub fn new(lower: OrderedValue, upper: OrderedValue, num_distinct: f64, fraction: f64) -> Self {
        Self {
            lower,
            upper,
            num_distinct,
            fraction,
        }
    }

    /// Whether `value` lies within the bucket, bounds inclusive.
    pub fn contains(&self, value: &OrderedValue) -> Result<bool> {
        Ok(value.try_cmp(&self.lower)?.is_ge() && value.try_cmp(&self.upper)?.is_le())
    }

    /// Whether the two buckets' intervals intersect.
    pub fn overlaps(&self, other: &Self) -> Result<bool> {
        Ok(other.upper.try_cmp(&self.lower)?.is_ge()
            && other.lower.try_cmp(&self.upper)?.is_le())
    }

    /// Extracts the sub-bucket `[lower, upper]`, scaling the distinct count
    /// and row fraction linearly by the sub-interval's share of the width.
    ///
    /// Degenerate (point) buckets have no interior and are returned
    /// unchanged.
    ///
    /// # Errors
    ///
    /// [`Error::SplitOutOfBounds`] if the requested interval escapes the
    /// bucket or is inverted; [`Error::TypeMismatch`] on mixed-kind bounds.
    pub fn sub_range(&self, lower: &OrderedValue, upper: &OrderedValue) -> Result<Self> {
        if lower.try_cmp(&self.lower)?.is_lt()
            || upper.try_cmp(&self.upper)?.is_gt()
            || lower.try_cmp(upper)?.is_gt()
        {
            return Err(Error::SplitOutOfBounds);
        }
        if self.lower == self.upper {
            return Ok(self.clone());
        }
        let width = (self.upper.numeric() - self.lower.numeric())
            .to_f64()
            .unwrap_or(0.0);
        let portion = if width > 0.0 {
            (upper.numeric() - lower.numeric()).to_f64().unwrap_or(0.0) / width
        } else {
            0.0
        };
        Ok(Self {
            lower: lower.clone(),
            upper: upper.clone(),
            num_distinct: self.num_distinct * portion,
            fraction: self.fraction * portion,
        })
    }

    /// Partitions the bucket at each of the given interior points.
    ///
    /// `values` must be sorted and lie within the bucket's bounds. An empty
    /// slice returns the bucket unchanged.
    pub fn split(&self, values: &[OrderedValue]) -> Result<Vec<Self>> {
        let Some((first, rest)) = values.split_first() else {
            return Ok(vec![self.clone()]);
        };
        let mut out = Vec::with_capacity(values.len() + 1);
        out.push(self.sub_range(&self.lower, first)?);
        let mut left = first;
        for right in rest {
            out.push(self.sub_range(left, right)?);
            left = right;
        }
        out.push(self.sub_range(left, &self.upper)?);
        Ok(out)
    }

    /// Builds `N - 1` equal-width buckets from `N` sorted boundary values,
    /// allotting each an equal share of `total_distinct` and
    /// `total_fraction`. Fewer than two boundaries yield no buckets.
    #[must_use]
    pub fn equi_depth(
        boundaries: &[OrderedValue],
        total_distinct: f64,
        total_fraction: f64,
    ) -> Vec<Self> {
        if boundaries.len() < 2 {
            return Vec::new();
        }
        let buckets = (boundaries.len() - 1) as f64;
        boundaries
            .windows(2)
            .map(|pair| Self {
                lower: pair[0].clone(),
                upper: pair[1].clone(),
                num_distinct: total_distinct / buckets,
                fraction: total_fraction / buckets,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(lower: i64, upper: i64, num_distinct: f64, fraction: f64) -> HistogramRange {
        HistogramRange::new(
            OrderedValue::integer(lower),
            OrderedValue::integer(upper),
            num_distinct,
            fraction,
        )
    }

    #[test]
    fn test_contains_is_inclusive() {
        let bucket = range(10, 20, 5.0, 0.5);
        assert!(bucket.contains(&OrderedValue::integer(10)).unwrap());
        assert!(bucket.contains(&OrderedValue::integer(20)).unwrap());
        assert!(!bucket.contains(&OrderedValue::integer(21)).unwrap());
    }

    #[test]
    fn test_overlaps_on_shared_boundary() {
        let a = range(0, 10, 4.0, 0.4);
        let b = range(10, 15, 2.0, 0.2);
        let c = range(11, 15, 2.0, 0.2);
        assert!(a.overlaps(&b).unwrap());
        assert!(b.overlaps(&a).unwrap());
        assert!(!a.overlaps(&c).unwrap());
    }

    #[test]
    fn test_sub_range_scales_linearly() {
        let bucket = range(0, 100, 50.0, 0.8);
        let quarter = bucket
            .sub_range(&OrderedValue::integer(0), &OrderedValue::integer(25))
            .unwrap();
        assert!((quarter.num_distinct - 12.5).abs() < 1e-9);
        assert!((quarter.fraction - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_sub_range_rejects_escaping_bounds() {
        let bucket = range(0, 10, 5.0, 0.5);
        let err = bucket
            .sub_range(&OrderedValue::integer(-1), &OrderedValue::integer(5))
            .unwrap_err();
        assert_eq!(err, Error::SplitOutOfBounds);
    }

    #[test]
    fn test_split_partitions_mass() {
        let bucket = range(0, 100, 10.0, 1.0);
        let parts = bucket
            .split(&[OrderedValue::integer(25), OrderedValue::integer(75)])
            .unwrap();
        assert_eq!(parts.len(), 3);
        let total: f64 = parts.iter().map(|p| p.fraction).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!((parts[1].num_distinct - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_split_of_point_bucket_is_identity() {
        let bucket = range(7, 7, 1.0, 0.1);
        let parts = bucket.split(&[OrderedValue::integer(7)]).unwrap();
        assert!(parts.iter().all(|p| *p == bucket));
    }

    #[test]
    fn test_equi_depth_allots_uniform_shares() {
        let boundaries: Vec<_> = [0, 10, 20, 30].map(OrderedValue::integer).into();
        let buckets = HistogramRange::equi_depth(&boundaries, 30.0, 0.9);
        assert_eq!(buckets.len(), 3);
        for bucket in &buckets {
            assert!((bucket.num_distinct - 10.0).abs() < 1e-9);
            assert!((bucket.fraction - 0.3).abs() < 1e-9);
        }
    }

    #[test]
    fn test_equi_depth_needs_two_boundaries() {
        assert!(HistogramRange::equi_depth(&[OrderedValue::integer(1)], 5.0, 0.5).is_empty());
    }
}
