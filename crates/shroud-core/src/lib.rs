//! Shroud Core - Logical-deletion interception engine.
//!
//! Records in opted-in entities are never physically removed by a delete:
//! the engine rewrites the delete into an update stamping tombstone fields,
//! cascades the hide through owned compositions, and injects visibility
//! filters into incoming read queries so hidden records stay out of default
//! result sets while remaining reachable by key.

pub mod cascade;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod fields;
pub mod pipeline;
pub mod query;
pub mod store;

pub use cascade::HideMetadata;
pub use catalog::{
    Cardinality, CompositionEdge, DeleteBehavior, EntityDef, FieldDef, LifecycleRules,
    RelationDef, SchemaBundle,
};
pub use engine::{DeleteOutcome, SoftDeleteEngine};
pub use error::Error;
pub use pipeline::{Handler, HandlerRegistry, LifecycleEvent, Outcome, Request};
pub use query::{PredicateEvaluator, QueryShape, ShapeKind};
pub use store::{MemStore, Store};

/// Re-export protocol types.
pub use shroud_proto as proto;
