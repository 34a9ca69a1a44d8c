//! Join-order search.
//!
//! A dynamic-programming search over subsets of the query's relations.
//! Plans grow one base relation at a time, guided by predicate
//! connectivity: a partial plan only extends toward relations it has a join
//! predicate edge to, and only the cheapest plan per covered set survives a
//! level. Bushy shapes (joining two multi-relation subplans) are not
//! enumerated.
//!
//! ## Submodules
//!
//! - [`relset`] - Bit-set keys over a fixed relation ordering

pub mod relset;

pub use relset::{RelSet, RelationIndex};

use indexmap::IndexMap;
use ordo_common::types::TableRef;
use ordo_common::utils::error::{Error, Result};
use ordo_common::utils::hash::FxHashMap;
use ordo_core::statistics::RelationStatistics;
use std::sync::Arc;

use super::plan::{JoinNode, PlanNode, ScanNode};
use super::predicate::{JoinPredicate, ValuePredicate};

/// Cost-based join-order planner.
pub struct JoinOrderPlanner {
    /// Whether to semijoin-refine the non-growing column before each join
    /// estimate.
    enable_semijoin_refinement: bool,
    /// Whether to semijoin-reduce the base statistics before the search.
    enable_semijoin_reduction: bool,
}

impl JoinOrderPlanner {
    /// Creates a planner with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            enable_semijoin_refinement: false,
            enable_semijoin_reduction: false,
        }
    }

    /// Enables or disables per-join semijoin refinement of the non-growing
    /// column. Refinement lowers row estimates to reflect that rows without
    /// a partner never reach the join's output.
    pub fn with_semijoin_refinement(mut self, enabled: bool) -> Self {
        self.enable_semijoin_refinement = enabled;
        self
    }

    /// Enables or disables iterative semijoin reduction of the base
    /// statistics before the search.
    ///
    /// Reduction sweeps every join predicate, shrinking both endpoint
    /// relations toward the rows that can find a partner, and repeats the
    /// sweep once per predicate. That bounded pass count approximates
    /// mutual refinement without claiming a fixpoint; cyclic predicate
    /// graphs may not converge within it, so this stays a heuristic.
    pub fn with_semijoin_reduction(mut self, enabled: bool) -> Self {
        self.enable_semijoin_reduction = enabled;
        self
    }

    /// Searches for the cheapest join order over `base` relations.
    ///
    /// Value predicates are folded into the scans first; the search then
    /// grows plans level by level, keeping the first-seen cheapest plan per
    /// covered relation set. Callers must not rely on how equal-cost ties
    /// break.
    ///
    /// # Errors
    ///
    /// [`Error::UnsatisfiableJoinGraph`] when no predicate path connects
    /// every relation; configuration errors (unknown relations, untracked
    /// columns) surface as their own variants.
    pub fn optimize(
        &self,
        base: &IndexMap<TableRef, RelationStatistics>,
        join_predicates: &[JoinPredicate],
        value_predicates: &[ValuePredicate],
    ) -> Result<Arc<PlanNode>> {
        let index = RelationIndex::new(base.keys().cloned())?;
        let working = self.prepare_base(base, join_predicates)?;

        let mut scans: Vec<Arc<PlanNode>> = Vec::with_capacity(index.len());
        for (table, stats) in &working {
            scans.push(scan_node(table, stats, value_predicates)?);
        }

        // Predicates grouped by the unordered pair of relations they join.
        let mut edges: FxHashMap<(usize, usize), Vec<JoinPredicate>> = FxHashMap::default();
        for predicate in join_predicates {
            let a = index.position(&predicate.a.table)?;
            let b = index.position(&predicate.b.table)?;
            if a == b {
                continue;
            }
            edges
                .entry((a.min(b), a.max(b)))
                .or_default()
                .push(predicate.clone());
        }

        let mut best: IndexMap<RelSet, Arc<PlanNode>> = IndexMap::new();
        for (position, scan) in scans.iter().enumerate() {
            best.insert(RelSet::EMPTY.with(position), Arc::clone(scan));
        }

        for level in 2..=index.len() {
            let mut next: IndexMap<RelSet, Arc<PlanNode>> = IndexMap::new();
            for (covered, left) in &best {
                for right_position in 0..index.len() {
                    if covered.contains(right_position) {
                        continue;
                    }
                    let right = &scans[right_position];
                    for left_position in covered.iter() {
                        let pair = (
                            left_position.min(right_position),
                            left_position.max(right_position),
                        );
                        let Some(relevant) = edges.get(&pair) else {
                            continue;
                        };
                        let stats = self.compute_join(left, right, relevant)?;
                        let candidate = Arc::new(PlanNode::Join(JoinNode::new(
                            stats,
                            Arc::clone(left),
                            Arc::clone(right),
                            index.table(left_position).clone(),
                            index.table(right_position).clone(),
                            relevant.clone(),
                        )));
                        let grown = covered.with(right_position);
                        match next.get(&grown) {
                            Some(existing) if existing.cost() <= candidate.cost() => {}
                            _ => {
                                next.insert(grown, candidate);
                            }
                        }
                    }
                }
            }
            tracing::debug!("planner level {level}: {} candidate relation sets", next.len());
            best = next;
        }

        let plan = best
            .get(&index.full_set())
            .cloned()
            .ok_or(Error::UnsatisfiableJoinGraph)?;
        tracing::debug!("selected plan with cumulative cost {}", plan.cost());
        Ok(plan)
    }

    /// Costs one explicit join order instead of searching.
    ///
    /// Starting from a scan of `seed`, each step names an already-covered
    /// relation and the newcomer to join in; the per-step computation is the
    /// one the search uses, so the result is directly comparable against
    /// [`optimize`](Self::optimize). Steps with no predicate edge cost the
    /// cross product.
    pub fn evaluate_order(
        &self,
        base: &IndexMap<TableRef, RelationStatistics>,
        join_predicates: &[JoinPredicate],
        value_predicates: &[ValuePredicate],
        seed: &TableRef,
        steps: &[(TableRef, TableRef)],
    ) -> Result<Arc<PlanNode>> {
        let working = self.prepare_base(base, join_predicates)?;
        let scan_for = |table: &TableRef| -> Result<Arc<PlanNode>> {
            let stats = working
                .get(table)
                .ok_or_else(|| Error::UnknownRelation(table.to_string()))?;
            scan_node(table, stats, value_predicates)
        };

        let mut current = scan_for(seed)?;
        for (inside, added) in steps {
            if !current.tables().contains(inside) {
                return Err(Error::UnknownRelation(inside.to_string()));
            }
            let right = scan_for(added)?;
            let relevant: Vec<JoinPredicate> = join_predicates
                .iter()
                .filter(|predicate| predicate.connects(inside, added))
                .cloned()
                .collect();
            let stats = self.compute_join(&current, &right, &relevant)?;
            current = Arc::new(PlanNode::Join(JoinNode::new(
                stats,
                current,
                right,
                inside.clone(),
                added.clone(),
                relevant,
            )));
        }
        Ok(current)
    }

    /// Applies the optional semijoin pre-reduction to the base statistics.
    fn prepare_base(
        &self,
        base: &IndexMap<TableRef, RelationStatistics>,
        join_predicates: &[JoinPredicate],
    ) -> Result<IndexMap<TableRef, RelationStatistics>> {
        let mut working = base.clone();
        if !self.enable_semijoin_reduction {
            return Ok(working);
        }
        for _pass in 0..join_predicates.len() {
            for predicate in join_predicates {
                let a_relation = working
                    .get(&predicate.a.table)
                    .ok_or_else(|| Error::UnknownRelation(predicate.a.table.to_string()))?;
                let b_relation = working
                    .get(&predicate.b.table)
                    .ok_or_else(|| Error::UnknownRelation(predicate.b.table.to_string()))?;
                let a_stats = a_relation.column(&predicate.a)?;
                let b_stats = b_relation.column(&predicate.b)?;
                let reduced_a = a_relation
                    .apply_select(&a_stats.semijoin(b_stats), std::slice::from_ref(&predicate.a));
                let reduced_b = b_relation
                    .apply_select(&b_stats.semijoin(a_stats), std::slice::from_ref(&predicate.b));
                working.insert(predicate.a.table.clone(), reduced_a);
                working.insert(predicate.b.table.clone(), reduced_b);
            }
        }
        Ok(working)
    }

    /// Estimates the statistics of joining `left` and `right` on
    /// `predicates`.
    ///
    /// Starts from the cross product with both sides' column mappings
    /// merged, then applies each predicate with the full set of previously
    /// incorporated predicates, so transitive equalities propagate.
    fn compute_join(
        &self,
        left: &PlanNode,
        right: &PlanNode,
        predicates: &[JoinPredicate],
    ) -> Result<RelationStatistics> {
        let mut columns = left.stats().columns.clone();
        for (column, stats) in &right.stats().columns {
            columns.insert(column.clone(), stats.clone());
        }
        let mut stats = RelationStatistics::new(
            left.stats().num_rows * right.stats().num_rows,
            columns,
        );

        let mut applied = left.collect_join_predicates();
        for predicate in right.collect_join_predicates() {
            if !applied.contains(&predicate) {
                applied.push(predicate);
            }
        }

        for predicate in predicates {
            if self.enable_semijoin_refinement {
                // Rows of the grown side without a partner will not appear;
                // shrink the non-growing column before the join estimate.
                let (kept, growing) = if left.tables().contains(&predicate.a.table) {
                    (&predicate.a, &predicate.b)
                } else {
                    (&predicate.b, &predicate.a)
                };
                let refined = stats.column(kept)?.semijoin(stats.column(growing)?);
                stats = stats.apply_select(&refined, std::slice::from_ref(kept));
            }
            stats = predicate.apply(&stats, &applied)?;
            applied.push(predicate.clone());
        }
        Ok(stats)
    }
}

impl Default for JoinOrderPlanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the scan node for one base relation, folding in the value
/// predicates that target it. Predicates on other relations are ignored
/// here and picked up by their own scans.
fn scan_node(
    table: &TableRef,
    stats: &RelationStatistics,
    value_predicates: &[ValuePredicate],
) -> Result<Arc<PlanNode>> {
    let matching: Vec<ValuePredicate> = value_predicates
        .iter()
        .filter(|predicate| predicate.column().table == *table)
        .cloned()
        .collect();
    Ok(Arc::new(PlanNode::Scan(ScanNode::new(
        table.clone(),
        stats.clone(),
        matching,
    )?)))
}
