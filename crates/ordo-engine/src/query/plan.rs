//! Immutable join-tree plan nodes.
//!
//! A plan is a binary tree of scans and joins. Each node owns the
//! statistics of its result and the cumulative cost of producing it, both
//! fixed at construction; the planner shares subtrees freely behind `Arc`
//! because nothing in a node can change afterwards.
//!
//! Cost is the total number of rows materialized across the plan: a scan
//! costs its filtered row count, a join costs its children plus its own
//! result size. That ignores operator choice and I/O, which is fine for
//! ranking join orders under one implied execution strategy and useless for
//! absolute runtime prediction.

use ordo_common::types::TableRef;
use ordo_common::utils::error::Result;
use ordo_core::statistics::RelationStatistics;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use super::predicate::{JoinPredicate, ValuePredicate};

/// A node of the join tree: either a base-relation scan or a join of two
/// subtrees.
#[derive(Debug, Clone)]
pub enum PlanNode {
    /// Leaf: scan one base relation, value predicates applied.
    Scan(ScanNode),
    /// Internal: join two subtrees on a set of equi-join predicates.
    Join(JoinNode),
}

/// Leaf node scanning one base relation.
#[derive(Debug, Clone)]
pub struct ScanNode {
    /// The scanned relation.
    pub table: TableRef,
    /// Value predicates folded into the scan.
    pub predicates: Vec<ValuePredicate>,
    stats: RelationStatistics,
    tables: BTreeSet<TableRef>,
    cost: f64,
}

impl ScanNode {
    /// Builds a scan over `table`, applying each value predicate to the base
    /// statistics in turn. The predicates touch distinct aspects of single
    /// columns, so application order does not matter.
    ///
    /// # Errors
    ///
    /// Fails when a predicate references an untracked column.
    pub fn new(
        table: TableRef,
        base: RelationStatistics,
        predicates: Vec<ValuePredicate>,
    ) -> Result<Self> {
        let mut stats = base;
        for predicate in &predicates {
            stats = predicate.apply(&stats)?;
        }
        let cost = stats.num_rows;
        Ok(Self {
            tables: BTreeSet::from([table.clone()]),
            table,
            predicates,
            stats,
            cost,
        })
    }
}

/// Internal node joining two subtrees.
///
/// `left_table` and `right_table` name the specific pair of relations the
/// join predicates connect; the subtrees may of course cover more.
#[derive(Debug, Clone)]
pub struct JoinNode {
    /// Left (already grown) subtree.
    pub left: Arc<PlanNode>,
    /// Right subtree, the newly introduced relation.
    pub right: Arc<PlanNode>,
    /// The relation on the left side the predicates attach to.
    pub left_table: TableRef,
    /// The relation on the right side the predicates attach to.
    pub right_table: TableRef,
    /// Equi-join predicates evaluated by this node.
    pub predicates: Vec<JoinPredicate>,
    stats: RelationStatistics,
    tables: BTreeSet<TableRef>,
    cost: f64,
}

impl JoinNode {
    /// Builds a join node from precomputed result statistics.
    #[must_use]
    pub fn new(
        stats: RelationStatistics,
        left: Arc<PlanNode>,
        right: Arc<PlanNode>,
        left_table: TableRef,
        right_table: TableRef,
        predicates: Vec<JoinPredicate>,
    ) -> Self {
        let tables: BTreeSet<TableRef> = left
            .tables()
            .union(right.tables())
            .cloned()
            .collect();
        let cost = left.cost() + right.cost() + stats.num_rows;
        Self {
            left,
            right,
            left_table,
            right_table,
            predicates,
            stats,
            tables,
            cost,
        }
    }
}

impl PlanNode {
    /// Statistics of this node's result.
    #[must_use]
    pub fn stats(&self) -> &RelationStatistics {
        match self {
            PlanNode::Scan(scan) => &scan.stats,
            PlanNode::Join(join) => &join.stats,
        }
    }

    /// Cumulative cost: rows materialized by this subtree.
    #[must_use]
    pub fn cost(&self) -> f64 {
        match self {
            PlanNode::Scan(scan) => scan.cost,
            PlanNode::Join(join) => join.cost,
        }
    }

    /// The set of base relations this subtree covers, fixed at construction.
    #[must_use]
    pub fn tables(&self) -> &BTreeSet<TableRef> {
        match self {
            PlanNode::Scan(scan) => &scan.tables,
            PlanNode::Join(join) => &join.tables,
        }
    }

    /// All join predicates evaluated anywhere in this subtree.
    #[must_use]
    pub fn collect_join_predicates(&self) -> Vec<JoinPredicate> {
        let mut out = Vec::new();
        self.collect_join_predicates_into(&mut out);
        out
    }

    fn collect_join_predicates_into(&self, out: &mut Vec<JoinPredicate>) {
        if let PlanNode::Join(join) = self {
            for predicate in &join.predicates {
                if !out.contains(predicate) {
                    out.push(predicate.clone());
                }
            }
            join.left.collect_join_predicates_into(out);
            join.right.collect_join_predicates_into(out);
        }
    }

    /// The linear join order: a left-to-right traversal listing each
    /// relation in the order the plan introduces it.
    #[must_use]
    pub fn join_order(&self) -> Vec<TableRef> {
        match self {
            PlanNode::Scan(scan) => vec![scan.table.clone()],
            PlanNode::Join(join) => {
                let mut order = join.left.join_order();
                order.extend(join.right.join_order());
                order
            }
        }
    }

    /// Parent/child adjacency over the joined relations: one
    /// `(left_table, right_table)` edge per join node, outermost first.
    #[must_use]
    pub fn join_tree_edges(&self) -> Vec<(TableRef, TableRef)> {
        let mut edges = Vec::new();
        self.join_tree_edges_into(&mut edges);
        edges
    }

    fn join_tree_edges_into(&self, edges: &mut Vec<(TableRef, TableRef)>) {
        if let PlanNode::Join(join) = self {
            edges.push((join.left_table.clone(), join.right_table.clone()));
            join.left.join_tree_edges_into(edges);
            join.right.join_tree_edges_into(edges);
        }
    }

    fn render(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        write!(f, "{}", "|".repeat(depth))?;
        match self {
            PlanNode::Scan(scan) => {
                write!(f, "TableScan({}", scan.table)?;
                if !scan.predicates.is_empty() {
                    let parts: Vec<String> =
                        scan.predicates.iter().map(ToString::to_string).collect();
                    write!(f, " WHERE [{}]", parts.join(", "))?;
                }
                write!(
                    f,
                    "); rows = {}, cumulative cost = {}",
                    scan.stats.num_rows, scan.cost
                )
            }
            PlanNode::Join(join) => {
                let parts: Vec<String> =
                    join.predicates.iter().map(ToString::to_string).collect();
                writeln!(
                    f,
                    "Join(({}, {}) on [{}]); rows = {}, cumulative cost = {}",
                    join.left_table,
                    join.right_table,
                    parts.join(", "),
                    join.stats.num_rows,
                    join.cost
                )?;
                join.left.render(f, depth + 1)?;
                writeln!(f)?;
                join.right.render(f, depth + 1)
            }
        }
    }
}

impl fmt::Display for PlanNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, 0)
    }
}
