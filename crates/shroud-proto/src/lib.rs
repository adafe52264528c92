//! Shroud protocol types.
//!
//! This crate defines the query and mutation IR exchanged between the
//! shroud soft-delete engine and its embedding host.
//!
//! # Modules
//!
//! - [`value`] - Runtime value types for predicates and rows
//! - [`query`] - Read-query IR (reference path, predicate tree, expands)
//! - [`mutation`] - Field-value pairs for update operations
//! - [`result`] - Row types returned by storage reads
//!
//! Query trees are immutable from the engine's point of view: all rewrites
//! produce structurally modified copies and never touch the caller's tree.

pub mod mutation;
pub mod query;
pub mod result;
pub mod value;

// Re-export commonly used types at crate root
pub use mutation::FieldValue;
pub use query::{ExpandItem, PathSegment, Predicate, ReadQuery};
pub use result::Row;
pub use value::Value;
