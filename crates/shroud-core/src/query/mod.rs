//! Query classification, filter injection, and predicate evaluation.

mod eval;
mod inject;
mod shape;

pub use eval::PredicateEvaluator;
pub use inject::{resolve, rewrite, ResolvedFilter};
pub(crate) use inject::keys_predicate;
pub use shape::{
    classify, explicit_flag, extract_key_values, flag_in_predicate, is_draft_scoped,
    normalize_alias, QueryShape, ShapeKind,
};
