//! # dirsheet-core
//!
//! Core data structures for dirsheet directory exports.
//!
//! This crate provides the format-independent pieces of an export:
//! - [`ColumnDescriptor`], [`ColumnLayout`] and the [`ColumnProvider`] trait
//! - [`Cell`] and [`Row`] - the staged values of one output row
//! - [`RowWriter`] and the [`RowFormat`] hooks a concrete format implements
//!
//! ## Example
//!
//! ```rust
//! use dirsheet_core::Row;
//!
//! let mut row = Row::new(2).unwrap();
//! row.push_value("Ada").unwrap();
//! row.push_values(["ada@example.org", "lovelace@example.org"]).unwrap();
//!
//! assert_eq!(row.values(1).len(), 2);
//! assert_eq!(row.cursor(), 2);
//! ```

pub mod cell;
pub mod column;
pub mod document;
pub mod error;
pub mod row;

// Re-exports for convenience
pub use cell::Cell;
pub use column::{ColumnDescriptor, ColumnLayout, ColumnProvider, HyperlinkKind, DEFAULT_COLUMN_WIDTH};
pub use document::{DocumentState, RowFormat, RowWriter};
pub use error::{Error, Result};
pub use row::Row;
