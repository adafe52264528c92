//! Schema reflection for the soft-delete engine.
//!
//! The catalog holds the loaded entity model: which entities opt into soft
//! delete, their key fields, composition (owned-child) edges, draft-overlay
//! participation, and physical storage names.

mod entity;
mod relation;
mod schema;

pub use entity::{EntityDef, FieldDef, LifecycleRules};
pub use relation::{Cardinality, DeleteBehavior, RelationDef};
pub use schema::{CompositionEdge, SchemaBundle};
