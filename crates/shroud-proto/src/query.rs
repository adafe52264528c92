//! Read-query IR.
//!
//! A [`ReadQuery`] is an immutable tree: a reference path of one or more
//! segments (each optionally filtered), an optional top-level predicate, and
//! a list of nested expand items, each of which may carry its own filter and
//! its own nested items. The engine never mutates a caller's query; rewrites
//! produce structurally modified copies.

use crate::value::Value;
use serde::{Deserialize, Serialize};

/// A predicate over row fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    /// Field equals value.
    Eq { field: String, value: Value },
    /// Field not equals value.
    Ne { field: String, value: Value },
    /// Field less than value.
    Lt { field: String, value: Value },
    /// Field less than or equal to value.
    Le { field: String, value: Value },
    /// Field greater than value.
    Gt { field: String, value: Value },
    /// Field greater than or equal to value.
    Ge { field: String, value: Value },
    /// Field is in a set of values.
    In { field: String, values: Vec<Value> },
    /// Field is null.
    IsNull { field: String },
    /// Field is not null.
    IsNotNull { field: String },
    /// All conditions must be true.
    And(Vec<Predicate>),
    /// At least one condition must be true.
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Create an equality predicate.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a not-equal predicate.
    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::Ne {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create an AND of multiple predicates.
    pub fn and(preds: Vec<Predicate>) -> Self {
        Predicate::And(preds)
    }

    /// Create an OR of multiple predicates.
    pub fn or(preds: Vec<Predicate>) -> Self {
        Predicate::Or(preds)
    }

    /// Conjoin an extra condition with an optional existing predicate.
    ///
    /// Returns the extra predicate alone when there was none.
    pub fn conjoin(existing: Option<Predicate>, extra: Predicate) -> Predicate {
        match existing {
            Some(Predicate::And(mut preds)) => {
                preds.push(extra);
                Predicate::And(preds)
            }
            Some(p) => Predicate::And(vec![p, extra]),
            None => extra,
        }
    }
}

/// One segment of a query's reference path.
///
/// `Orders(id=1)/items` is two segments: `Orders` carrying an equality
/// filter, then `items` with none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSegment {
    /// Entity or relation name this segment addresses.
    pub target: String,
    /// Optional filter on this segment.
    pub filter: Option<Predicate>,
}

impl PathSegment {
    /// Create an unfiltered segment.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            filter: None,
        }
    }

    /// Set a filter on this segment.
    pub fn with_filter(mut self, filter: Predicate) -> Self {
        self.filter = Some(filter);
        self
    }
}

/// A nested sub-query (expand) item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpandItem {
    /// Relation name on the owning entity.
    pub relation: String,
    /// Fields to project from the related entity (empty = all).
    pub fields: Vec<String>,
    /// Optional per-relation filter.
    pub filter: Option<Predicate>,
    /// Nested expand items of the related entity.
    pub items: Vec<ExpandItem>,
}

impl ExpandItem {
    /// Create a new expand item for a relation.
    pub fn new(relation: impl Into<String>) -> Self {
        Self {
            relation: relation.into(),
            fields: vec![],
            filter: None,
            items: vec![],
        }
    }

    /// Set the projected fields.
    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields = fields;
        self
    }

    /// Set a filter for this item.
    pub fn with_filter(mut self, filter: Predicate) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Add a nested expand item.
    pub fn with_item(mut self, item: ExpandItem) -> Self {
        self.items.push(item);
        self
    }
}

/// A read query against one entity, possibly through a navigation path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadQuery {
    /// Reference path; always at least one segment.
    pub path: Vec<PathSegment>,
    /// Fields to project from the target entity (empty = all).
    pub fields: Vec<String>,
    /// Optional top-level predicate over the target entity.
    pub predicate: Option<Predicate>,
    /// Nested expand items.
    pub items: Vec<ExpandItem>,
}

impl ReadQuery {
    /// Create a query addressing an entity directly.
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            path: vec![PathSegment::new(entity)],
            fields: vec![],
            predicate: None,
            items: vec![],
        }
    }

    /// Append a navigation segment to the path.
    pub fn via(mut self, segment: PathSegment) -> Self {
        self.path.push(segment);
        self
    }

    /// Set a filter on the root segment (by-key addressing).
    pub fn with_root_filter(mut self, filter: Predicate) -> Self {
        if let Some(root) = self.path.first_mut() {
            root.filter = Some(filter);
        }
        self
    }

    /// Set the projected fields.
    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields = fields;
        self
    }

    /// Set the top-level predicate.
    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Add an expand item.
    pub fn expand(mut self, item: ExpandItem) -> Self {
        self.items.push(item);
        self
    }

    /// The root (first) segment of the path, if any.
    pub fn root_segment(&self) -> Option<&PathSegment> {
        self.path.first()
    }

    /// The leaf (last) segment of the path, the query's target.
    pub fn leaf_segment(&self) -> Option<&PathSegment> {
        self.path.last()
    }
}
