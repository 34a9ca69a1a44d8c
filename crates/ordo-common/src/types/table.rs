//! Identity types for base tables, query relations, and columns.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A base table identified by schema and table name.
///
/// Two tables are the same iff both names match; there is no catalog
/// identity beyond the name pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Table {
    /// Schema the table lives in.
    pub schema: String,
    /// Table name within the schema.
    pub name: String,
}

impl Table {
    /// Creates a new table identity.
    #[must_use]
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// One occurrence of a base table within a query, under an alias.
///
/// This is the unit the planner reasons about: two references to the same
/// base table under different aliases are distinct relations (self-joins).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableRef {
    /// Alias used within the query.
    pub alias: String,
    /// The referenced base table.
    pub table: Table,
}

impl TableRef {
    /// Creates a new aliased table reference.
    #[must_use]
    pub fn new(alias: impl Into<String>, table: Table) -> Self {
        Self {
            alias: alias.into(),
            table,
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.alias == self.table.name {
            write!(f, "{}", self.table)
        } else {
            write!(f, "({} AS {})", self.table, self.alias)
        }
    }
}

/// A column of one query relation; the unit statistics are attached to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColumnRef {
    /// The relation the column belongs to.
    pub table: TableRef,
    /// Column name within the relation.
    pub column: String,
}

impl ColumnRef {
    /// Creates a new column reference.
    #[must_use]
    pub fn new(table: TableRef, column: impl Into<String>) -> Self {
        Self {
            table,
            column: column.into(),
        }
    }

    /// Renders `alias.column`, the compact form used in predicate display.
    #[must_use]
    pub fn short_name(&self) -> String {
        format!("{}.{}", self.table.alias, self.column)
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}
