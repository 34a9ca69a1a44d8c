//! Hashing utilities.
//!
//! Fast non-cryptographic maps for internal lookups. Anything whose
//! iteration order leaks into estimates or output uses `IndexMap` instead.

use ahash::RandomState;
use std::collections::{HashMap, HashSet};

/// A `HashMap` seeded with ahash.
pub type FxHashMap<K, V> = HashMap<K, V, RandomState>;

/// A `HashSet` seeded with ahash.
pub type FxHashSet<T> = HashSet<T, RandomState>;
