//! Literal values and their embedding into one totally ordered domain.
//!
//! Histogram arithmetic needs every literal, whatever its type, to live in a
//! single comparable numeric space. Numbers embed as themselves. Text embeds
//! by accumulating a base-weighted sum of character codes: deterministic and
//! order-stable, but lossy in the sense that the original string cannot be
//! recovered, so the embedding is usable for comparison only. It is not a
//! collation; it merely gives text a reproducible order.

use bigdecimal::BigDecimal;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::utils::error::{Error, Result};

/// Each character shifts the accumulated weight down by this factor.
const CHAR_SCALE_DIVISOR: u32 = 100_000;

/// A literal value appearing in a predicate or a statistics entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Literal {
    /// A 64-bit integer.
    Integer(i64),
    /// An arbitrary-precision decimal.
    Decimal(BigDecimal),
    /// A text value.
    Text(String),
}

/// The comparison class of a literal.
///
/// Numeric and text embeddings share one numeric space, but comparing across
/// the two classes is undefined and rejected rather than silently coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Integers and decimals.
    Numeric,
    /// Text.
    Text,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Numeric => write!(f, "numeric"),
            ValueKind::Text => write!(f, "text"),
        }
    }
}

/// A literal together with its canonical numeric embedding.
///
/// Equality and hashing are defined on the embedding alone: two values
/// compare equal iff their embeddings compare equal. The embedding is an
/// exact `BigDecimal`, so long text values with a shared prefix stay
/// distinct; a fixed-precision float would collide on them.
#[derive(Debug, Clone)]
pub struct OrderedValue {
    literal: Literal,
    numeric: BigDecimal,
}

impl OrderedValue {
    /// Embeds a literal into the ordered domain.
    #[must_use]
    pub fn new(literal: Literal) -> Self {
        let numeric = match &literal {
            Literal::Integer(i) => BigDecimal::from(*i),
            Literal::Decimal(d) => d.clone(),
            Literal::Text(s) => text_embedding(s),
        };
        Self { literal, numeric }
    }

    /// Convenience constructor for integer literals.
    #[must_use]
    pub fn integer(value: i64) -> Self {
        Self::new(Literal::Integer(value))
    }

    /// Convenience constructor for text literals.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::new(Literal::Text(value.into()))
    }

    /// The original literal.
    #[must_use]
    pub fn literal(&self) -> &Literal {
        &self.literal
    }

    /// The numeric embedding.
    #[must_use]
    pub fn numeric(&self) -> &BigDecimal {
        &self.numeric
    }

    /// The comparison class of this value.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self.literal {
            Literal::Integer(_) | Literal::Decimal(_) => ValueKind::Numeric,
            Literal::Text(_) => ValueKind::Text,
        }
    }

    /// Compares two values of the same kind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] when one side is text and the other
    /// numeric; such comparisons are undefined and never coerced.
    pub fn try_cmp(&self, other: &Self) -> Result<Ordering> {
        if self.kind() != other.kind() {
            return Err(Error::TypeMismatch {
                left: self.kind(),
                right: other.kind(),
            });
        }
        Ok(self.numeric.cmp(&other.numeric))
    }
}

impl PartialEq for OrderedValue {
    fn eq(&self, other: &Self) -> bool {
        self.numeric == other.numeric
    }
}

impl Eq for OrderedValue {}

impl Hash for OrderedValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.numeric.hash(state);
    }
}

impl fmt::Display for OrderedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.literal {
            Literal::Integer(i) => write!(f, "{i}"),
            Literal::Decimal(d) => write!(f, "{d}"),
            Literal::Text(s) => write!(f, "'{}'", s.replace('\'', "\\'")),
        }
    }
}

/// Walks the characters, adding `(code + 1) * scale` and shrinking the scale
/// by a fixed divisor per character. The `+ 1` keeps a trailing NUL distinct
/// from the absence of a character.
fn text_embedding(text: &str) -> BigDecimal {
    let divisor = BigDecimal::from(CHAR_SCALE_DIVISOR);
    let mut value = BigDecimal::zero();
    let mut scale = BigDecimal::one();
    for c in text.chars() {
        scale = scale / &divisor;
        value += &scale * BigDecimal::from(c as u32 + 1);
    }
    value
}
