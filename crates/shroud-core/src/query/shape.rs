//! Query shape classification.
//!
//! Decides, for an incoming read query, whether it is a direct-key access,
//! a navigation through a filtered parent, or a plain listing, and extracts
//! any deleted-flag condition the caller already specified.

use crate::fields;
use shroud_proto::{ExpandItem, PathSegment, Predicate, ReadQuery, Value};

/// The classified shape of a read query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    /// Single-segment path with a filter on it: candidate primary-key lookup.
    DirectKey,
    /// Multi-segment path whose root segment carries a filter: traversal
    /// from an identified parent into a related collection.
    Navigation,
    /// Anything else: a filtered or unfiltered listing.
    Listing,
}

/// Classification result for one read query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryShape {
    /// The path/filter shape.
    pub kind: ShapeKind,
    /// Deleted-flag value the caller filtered on, if any.
    pub explicit_flag: Option<bool>,
}

impl QueryShape {
    /// Classify a query and extract any explicit deleted-flag condition.
    ///
    /// Expects the query to be alias-normalized first (see
    /// [`normalize_alias`]).
    pub fn of(query: &ReadQuery) -> Self {
        Self {
            kind: classify(query),
            explicit_flag: explicit_flag(query),
        }
    }
}

/// Classify the reference-path shape of a query.
pub fn classify(query: &ReadQuery) -> ShapeKind {
    let root_filtered = query
        .root_segment()
        .is_some_and(|segment| segment.filter.is_some());

    let kind = if query.path.len() == 1 && root_filtered {
        ShapeKind::DirectKey
    } else if query.path.len() > 1 && root_filtered {
        ShapeKind::Navigation
    } else {
        ShapeKind::Listing
    };
    tracing::debug!(segments = query.path.len(), ?kind, "classified read query");
    kind
}

/// Extract the deleted-flag value from the query's top-level predicate,
/// recursing through AND/OR trees. First match wins.
pub fn explicit_flag(query: &ReadQuery) -> Option<bool> {
    flag_in_predicate(query.predicate.as_ref()?, fields::IS_DELETED)
}

/// Find an equality comparison `field == bool` anywhere in a predicate tree.
pub fn flag_in_predicate(predicate: &Predicate, field: &str) -> Option<bool> {
    match predicate {
        Predicate::Eq { field: f, value } if f == field => value.as_bool(),
        Predicate::And(preds) | Predicate::Or(preds) => {
            preds.iter().find_map(|p| flag_in_predicate(p, field))
        }
        _ => None,
    }
}

/// Rewrite the display alias to the real flag field everywhere in the query.
///
/// The alias exists only so the flag can be shown read-only; filtering on it
/// must behave identically to filtering on the real field. Pure transform;
/// the input query is not touched.
pub fn normalize_alias(query: &ReadQuery) -> ReadQuery {
    let mut rewritten = query.clone();
    rewritten.predicate = rewritten.predicate.map(|p| rename_field(p, fields::IS_DELETED_DISPLAY, fields::IS_DELETED));
    for segment in &mut rewritten.path {
        segment.filter = segment
            .filter
            .take()
            .map(|p| rename_field(p, fields::IS_DELETED_DISPLAY, fields::IS_DELETED));
    }
    rewritten.items = rewritten
        .items
        .into_iter()
        .map(normalize_item_alias)
        .collect();
    rewritten
}

fn normalize_item_alias(mut item: ExpandItem) -> ExpandItem {
    item.filter = item
        .filter
        .take()
        .map(|p| rename_field(p, fields::IS_DELETED_DISPLAY, fields::IS_DELETED));
    item.items = item.items.into_iter().map(normalize_item_alias).collect();
    item
}

fn rename_field(predicate: Predicate, from: &str, to: &str) -> Predicate {
    let rename = |field: String| if field == from { to.to_string() } else { field };
    match predicate {
        Predicate::Eq { field, value } => Predicate::Eq { field: rename(field), value },
        Predicate::Ne { field, value } => Predicate::Ne { field: rename(field), value },
        Predicate::Lt { field, value } => Predicate::Lt { field: rename(field), value },
        Predicate::Le { field, value } => Predicate::Le { field: rename(field), value },
        Predicate::Gt { field, value } => Predicate::Gt { field: rename(field), value },
        Predicate::Ge { field, value } => Predicate::Ge { field: rename(field), value },
        Predicate::In { field, values } => Predicate::In { field: rename(field), values },
        Predicate::IsNull { field } => Predicate::IsNull { field: rename(field) },
        Predicate::IsNotNull { field } => Predicate::IsNotNull { field: rename(field) },
        Predicate::And(preds) => {
            Predicate::And(preds.into_iter().map(|p| rename_field(p, from, to)).collect())
        }
        Predicate::Or(preds) => {
            Predicate::Or(preds.into_iter().map(|p| rename_field(p, from, to)).collect())
        }
    }
}

/// Whether the query is explicitly scoped to staged (draft) rows, either in
/// the top-level predicate or the root segment filter. Such reads must see
/// hidden staged rows, so filtering is skipped for them.
pub fn is_draft_scoped(query: &ReadQuery) -> bool {
    let in_predicate = query
        .predicate
        .as_ref()
        .and_then(|p| flag_in_predicate(p, fields::IS_ACTIVE))
        == Some(false);
    let in_root = query
        .root_segment()
        .and_then(|s| s.filter.as_ref())
        .and_then(|p| flag_in_predicate(p, fields::IS_ACTIVE))
        == Some(false);
    in_predicate || in_root
}

/// Extract equality key values for the given key fields from a segment
/// filter, recursing through conjunctions. Virtual draft keys are not in
/// `key_fields` and therefore drop out naturally.
pub fn extract_key_values(segment: &PathSegment, key_fields: &[&str]) -> Vec<(String, Value)> {
    let mut keys = Vec::new();
    if let Some(filter) = &segment.filter {
        collect_key_values(filter, key_fields, &mut keys);
    }
    keys
}

fn collect_key_values(predicate: &Predicate, key_fields: &[&str], out: &mut Vec<(String, Value)>) {
    match predicate {
        Predicate::Eq { field, value } => {
            if key_fields.contains(&field.as_str()) && !out.iter().any(|(f, _)| f == field) {
                out.push((field.clone(), value.clone()));
            }
        }
        Predicate::And(preds) => {
            for p in preds {
                collect_key_values(p, key_fields, out);
            }
        }
        _ => {}
    }
}
