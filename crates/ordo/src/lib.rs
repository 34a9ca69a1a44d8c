//! # Ordo
//!
//! A cost-based join-order optimizer: given per-column statistics for each
//! base relation of a multi-way equi-join query, Ordo predicts the
//! selectivity of every candidate join, propagates statistics through
//! partial results, and searches out the cheapest join order.
//!
//! If you're new here, start with [`JoinOrderPlanner`] - feed it base
//! statistics (see [`statistics::RawColumnStatistics`] for the catalog
//! form), join predicates, and value predicates, and it returns the
//! cheapest [`PlanNode`] tree it can find.
//!
//! ## Quick Start
//!
//! ```rust
//! use indexmap::IndexMap;
//! use ordo::statistics::{ColumnStatistics, RelationStatistics};
//! use ordo::{ColumnRef, JoinOrderPlanner, JoinPredicate, Table, TableRef};
//!
//! let orders = TableRef::new("o", Table::new("shop", "orders"));
//! let users = TableRef::new("u", Table::new("shop", "users"));
//! let base = IndexMap::from([
//!     (
//!         orders.clone(),
//!         RelationStatistics::new(
//!             10_000.0,
//!             IndexMap::from([(
//!                 ColumnRef::new(orders.clone(), "user_id"),
//!                 ColumnStatistics::new(0.0, 500, IndexMap::new()),
//!             )]),
//!         ),
//!     ),
//!     (
//!         users.clone(),
//!         RelationStatistics::new(
//!             500.0,
//!             IndexMap::from([(
//!                 ColumnRef::new(users.clone(), "id"),
//!                 ColumnStatistics::new(0.0, 500, IndexMap::new()),
//!             )]),
//!         ),
//!     ),
//! ]);
//! let join = JoinPredicate::new(
//!     ColumnRef::new(orders, "user_id"),
//!     ColumnRef::new(users, "id"),
//! );
//!
//! let plan = JoinOrderPlanner::new().optimize(&base, &[join], &[])?;
//! println!("{plan}");
//! # Ok::<(), ordo::Error>(())
//! ```

// Re-export the main planning API
pub use ordo_engine::{JoinOrderPlanner, JoinPredicate, PlanNode, ValuePredicate};

// Re-export core types - you'll need these for describing queries and stats
pub use ordo_common::types::{ColumnRef, Literal, OrderedValue, Table, TableRef};
pub use ordo_common::utils::error::{Error, Result};

/// The statistics model: column/relation statistics and histograms.
pub mod statistics {
    pub use ordo_core::statistics::{
        ColumnSelectivity, ColumnStatistics, HistogramRange, RawColumnStatistics,
        RelationStatistics,
    };
}
