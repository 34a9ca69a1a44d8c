//! Error types shared across the Ordo crates.
//!
//! Statistics arithmetic is total over well-formed inputs: degenerate
//! denominators (zero unmapped mass, zero distinct counts) contribute
//! nothing instead of erroring, so only malformed configurations surface
//! here. Cost comparisons are meaningless unless every candidate estimate is
//! computed, which is why these fail fast instead of degrading.

use thiserror::Error;

use crate::types::ValueKind;

/// Result alias used throughout Ordo.
pub type Result<T> = std::result::Result<T, Error>;

/// Error raised by statistics derivation and join-order planning.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A predicate referenced a column with no tracked statistics.
    #[error("no statistics tracked for column {0}")]
    MissingStatistics(String),

    /// A comparison mixed text and numeric embeddings.
    #[error("type mismatch: cannot compare {left} with {right}")]
    TypeMismatch {
        /// Kind of the left operand.
        left: ValueKind,
        /// Kind of the right operand.
        right: ValueKind,
    },

    /// A histogram split point fell outside the bucket being split.
    #[error("split bounds fall outside the histogram bucket")]
    SplitOutOfBounds,

    /// A planner was invoked over an empty set of relations.
    #[error("cannot plan over an empty set of relations")]
    EmptyRelationSet,

    /// More relations than the planner's set representation can index.
    #[error("too many relations: {0} exceeds the supported maximum of 64")]
    TooManyRelations(usize),

    /// A referenced relation is absent from the supplied base statistics.
    #[error("unknown relation {0}")]
    UnknownRelation(String),

    /// No chain of join predicates connects every relation; there is no
    /// plan, which is distinct from a cheap or empty one.
    #[error("join graph cannot be connected by the available predicates")]
    UnsatisfiableJoinGraph,
}
