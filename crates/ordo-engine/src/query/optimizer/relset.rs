//! Bit-set keys over a fixed relation ordering.
//!
//! The dynamic-programming table is keyed by "set of covered relations". A
//! canonical bit-set over one fixed ordering of the query's table refs is
//! cheaper to hash than a set of references and iterates deterministically,
//! which keeps planner runs reproducible.

use ordo_common::types::TableRef;
use ordo_common::utils::error::{Error, Result};
use ordo_common::utils::hash::FxHashMap;

/// Maximum number of relations a [`RelSet`] can index.
pub const MAX_RELATIONS: usize = 64;

/// A set of relations, represented by bit position over a [`RelationIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RelSet(u64);

impl RelSet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Returns this set with `position` added.
    #[must_use]
    pub fn with(self, position: usize) -> Self {
        Self(self.0 | (1 << position))
    }

    /// Whether `position` is in the set.
    #[must_use]
    pub fn contains(self, position: usize) -> bool {
        self.0 & (1 << position) != 0
    }

    /// Number of relations in the set.
    #[must_use]
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates the member positions in ascending order.
    pub fn iter(self) -> impl Iterator<Item = usize> {
        (0..MAX_RELATIONS).filter(move |position| self.contains(*position))
    }
}

/// A fixed ordering of the query's relations, assigning each a bit position.
#[derive(Debug, Clone)]
pub struct RelationIndex {
    tables: Vec<TableRef>,
    positions: FxHashMap<TableRef, usize>,
}

impl RelationIndex {
    /// Builds an index over the given relations, in iteration order.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyRelationSet`] for no relations,
    /// [`Error::TooManyRelations`] beyond [`MAX_RELATIONS`].
    pub fn new(tables: impl IntoIterator<Item = TableRef>) -> Result<Self> {
        let tables: Vec<TableRef> = tables.into_iter().collect();
        if tables.is_empty() {
            return Err(Error::EmptyRelationSet);
        }
        if tables.len() > MAX_RELATIONS {
            return Err(Error::TooManyRelations(tables.len()));
        }
        let positions = tables
            .iter()
            .cloned()
            .enumerate()
            .map(|(position, table)| (table, position))
            .collect();
        Ok(Self { tables, positions })
    }

    /// Number of indexed relations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Always false; construction rejects empty inputs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// The relation at `position`.
    #[must_use]
    pub fn table(&self, position: usize) -> &TableRef {
        &self.tables[position]
    }

    /// The bit position of `table`.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownRelation`] when the relation was not indexed.
    pub fn position(&self, table: &TableRef) -> Result<usize> {
        self.positions
            .get(table)
            .copied()
            .ok_or_else(|| Error::UnknownRelation(table.to_string()))
    }

    /// The set containing every indexed relation.
    #[must_use]
    pub fn full_set(&self) -> RelSet {
        let mut set = RelSet::EMPTY;
        for position in 0..self.len() {
            set = set.with(position);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordo_common::types::Table;

    fn table(alias: &str) -> TableRef {
        TableRef::new(alias, Table::new("test", alias))
    }

    #[test]
    fn test_set_operations() {
        let set = RelSet::EMPTY.with(0).with(3);
        assert!(set.contains(0));
        assert!(!set.contains(1));
        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![0, 3]);
    }

    #[test]
    fn test_index_assigns_stable_positions() {
        let index = RelationIndex::new([table("a"), table("b"), table("c")]).unwrap();
        assert_eq!(index.position(&table("b")).unwrap(), 1);
        assert_eq!(index.table(2), &table("c"));
        assert_eq!(index.full_set().len(), 3);
    }

    #[test]
    fn test_empty_input_is_rejected() {
        assert_eq!(
            RelationIndex::new(Vec::<TableRef>::new()).unwrap_err(),
            Error::EmptyRelationSet
        );
    }

    #[test]
    fn test_unknown_relation_is_rejected() {
        let index = RelationIndex::new([table("a")]).unwrap();
        assert!(matches!(
            index.position(&table("zz")),
            Err(Error::UnknownRelation(_))
        ));
    }
}
