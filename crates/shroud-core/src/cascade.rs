//! Cascade of hide operations through the composition graph.
//!
//! When a parent record is hidden, every owned child row that is not yet
//! hidden receives the same tombstone fields, recursively. Already-hidden
//! rows are excluded from the match so their first-hide metadata stays
//! authoritative. The composition graph is assumed acyclic.

use crate::catalog::{EntityDef, SchemaBundle};
use crate::fields;
use crate::query::keys_predicate;
use crate::store::Store;
use shroud_proto::{FieldValue, Predicate, Row, Value};
use std::time::{SystemTime, UNIX_EPOCH};

/// Tombstone data stamped onto hidden records.
///
/// Built fresh per delete/discard event; only its fields are ever written,
/// never the object itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HideMetadata {
    /// When the hide happened (microseconds since Unix epoch).
    pub deleted_at: i64,
    /// Who performed it; anonymous callers become the system identity.
    pub deleted_by: String,
}

impl HideMetadata {
    /// Create metadata for a hide happening now.
    pub fn new(actor: Option<&str>) -> Self {
        let actor = match actor {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => fields::SYSTEM_ACTOR.to_string(),
        };
        Self {
            deleted_at: now_micros(),
            deleted_by: actor,
        }
    }

    /// The field assignments a hide-update writes.
    pub fn assignments(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::new(fields::IS_DELETED, true),
            FieldValue::new(fields::DELETED_AT, Value::Timestamp(self.deleted_at)),
            FieldValue::new(fields::DELETED_BY, self.deleted_by.clone()),
        ]
    }
}

fn now_micros() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as i64)
        .unwrap_or(0)
}

/// Recursively hide all owned children of a committed parent record.
///
/// Per-relation failures are logged and skipped; the cascade continues
/// with the remaining relations and never fails the enclosing request.
pub fn cascade_hide<S: Store>(
    schema: &SchemaBundle,
    store: &S,
    entity: &EntityDef,
    parent_keys: &[(String, Value)],
    meta: &HideMetadata,
) {
    walk(schema, store, entity, parent_keys, meta, false);
}

/// Staged variant: operates on the draft-overlay counterpart of each
/// storage area and additionally matches unconfirmed rows only.
pub fn cascade_hide_staged<S: Store>(
    schema: &SchemaBundle,
    store: &S,
    entity: &EntityDef,
    parent_keys: &[(String, Value)],
    meta: &HideMetadata,
) {
    walk(schema, store, entity, parent_keys, meta, true);
}

fn walk<S: Store>(
    schema: &SchemaBundle,
    store: &S,
    entity: &EntityDef,
    parent_keys: &[(String, Value)],
    meta: &HideMetadata,
    staged: bool,
) {
    for edge in schema.owned_children(&entity.name) {
        if !edge.child.has_soft_delete() {
            continue;
        }
        let Some(fk) = edge.foreign_key.as_deref() else {
            tracing::warn!(
                relation = %edge.relation.name,
                child = %edge.child.name,
                "composition has no reciprocal relation, skipping cascade"
            );
            continue;
        };
        let Some(parent_value) = parent_keys
            .iter()
            .find(|(field, _)| *field == edge.parent_field)
            .map(|(_, value)| value.clone())
        else {
            tracing::warn!(
                relation = %edge.relation.name,
                field = %edge.parent_field,
                "parent key missing for composition, skipping cascade"
            );
            continue;
        };

        if let Err(e) = hide_children(schema, store, &edge.child, fk, &parent_value, meta, staged)
        {
            tracing::warn!(
                child = %edge.child.name,
                error = %e,
                "cascade step failed, continuing with remaining relations"
            );
        }
    }
}

fn hide_children<S: Store>(
    schema: &SchemaBundle,
    store: &S,
    child: &EntityDef,
    fk: &str,
    parent_value: &Value,
    meta: &HideMetadata,
    staged: bool,
) -> Result<(), crate::error::Error> {
    let committed_storage = schema.storage_name(&child.name).to_string();
    let storage = if staged {
        fields::draft_storage_name(&committed_storage)
    } else {
        committed_storage
    };

    // Match only not-yet-hidden rows: the snapshot drives recursion and the
    // update never re-stamps rows hidden earlier.
    let mut conditions = vec![
        Predicate::Eq {
            field: fk.to_string(),
            value: parent_value.clone(),
        },
        Predicate::eq(fields::IS_DELETED, false),
    ];
    if staged {
        conditions.push(Predicate::eq(fields::IS_ACTIVE, false));
    }
    let matching = Predicate::And(conditions);

    let rows = store.query(&storage, Some(&matching), &[])?;
    if rows.is_empty() {
        return Ok(());
    }

    let assignments = meta.assignments();
    if staged {
        // Per-row updates keyed by identity plus the overlay virtual key.
        for row in &rows {
            let keys = child_keys(child, row);
            if keys.is_empty() {
                continue;
            }
            let mut match_keys = keys_predicate(&keys);
            match_keys = Predicate::conjoin(
                Some(match_keys),
                Predicate::eq(fields::IS_ACTIVE, false),
            );
            store.update(&storage, &match_keys, &assignments)?;
        }
    } else {
        store.update(&storage, &matching, &assignments)?;
    }

    for row in &rows {
        let keys = child_keys(child, row);
        if !keys.is_empty() {
            walk(schema, store, child, &keys, meta, staged);
        }
    }
    Ok(())
}

fn child_keys(child: &EntityDef, row: &Row) -> Vec<(String, Value)> {
    child
        .key_fields()
        .iter()
        .filter_map(|key| row.get(key).map(|v| (key.to_string(), v.clone())))
        .collect()
}
