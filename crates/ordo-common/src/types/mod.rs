//! Core type definitions for Ordo.
//!
//! This module contains all fundamental types used throughout the optimizer:
//! - Identity types ([`Table`], [`TableRef`], [`ColumnRef`])
//! - Value types ([`Literal`], [`OrderedValue`], [`ValueKind`])

mod table;
mod value;

pub use table::{ColumnRef, Table, TableRef};
pub use value::{Literal, OrderedValue, ValueKind};
