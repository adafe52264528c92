//! The interception engine - the public entry point of the crate.
//!
//! One engine instance wraps a validated schema snapshot and a backing
//! store. `delete` and `draft_cancel` intercept destructive writes;
//! `read` rewrites incoming queries so hidden records stay out of default
//! result sets.

use crate::cascade::{self, HideMetadata};
use crate::catalog::SchemaBundle;
use crate::error::Error;
use crate::fields;
use crate::query::{self, keys_predicate, QueryShape};
use crate::store::Store;
use shroud_proto::{Predicate, ReadQuery, Value};
use std::sync::Arc;

/// What the engine did with a destructive request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The target does not participate; the caller should run the original
    /// physical operation.
    PassThrough,
    /// The delete was turned into a hide-update.
    Intercepted {
        /// Rows updated on the target itself (cascaded rows not counted).
        rows_affected: u64,
    },
}

/// Soft-delete interception over a schema snapshot and a store.
#[derive(Debug)]
pub struct SoftDeleteEngine<S> {
    schema: Arc<SchemaBundle>,
    store: S,
}

impl<S: Store> SoftDeleteEngine<S> {
    /// Build an engine, validating soft-delete configuration up front.
    pub fn new(schema: Arc<SchemaBundle>, store: S) -> Result<Self, Error> {
        schema.validate()?;
        Ok(Self { schema, store })
    }

    /// The schema snapshot the engine reflects over.
    pub fn schema(&self) -> &SchemaBundle {
        &self.schema
    }

    /// Intercept a delete of a committed record.
    ///
    /// For opted-in entities the physical delete becomes an update stamping
    /// the tombstone fields, then cascades through owned compositions. The
    /// returned count covers the target rows only.
    pub fn delete(
        &self,
        entity_name: &str,
        keys: &[(String, Value)],
        actor: Option<&str>,
    ) -> Result<DeleteOutcome, Error> {
        let Some(entity) = self.schema.get_entity(entity_name) else {
            return Ok(DeleteOutcome::PassThrough);
        };
        if !entity.has_soft_delete() {
            return Ok(DeleteOutcome::PassThrough);
        }

        let keys = self.identity_keys(entity_name, keys);
        if keys.is_empty() {
            tracing::warn!(entity = %entity_name, "delete without key values, passing through");
            return Ok(DeleteOutcome::PassThrough);
        }

        let meta = HideMetadata::new(actor);
        let storage = self.schema.storage_name(entity_name);
        // An already-hidden row keeps its first-hide metadata; zero affected
        // rows is still a successful interception, not "not found".
        let matching = Predicate::conjoin(
            Some(keys_predicate(&keys)),
            Predicate::eq(fields::IS_DELETED, false),
        );
        let rows_affected = self.store.update(storage, &matching, &meta.assignments())?;
        tracing::debug!(entity = %entity_name, rows = rows_affected, "delete intercepted as hide");

        cascade::cascade_hide(&self.schema, &self.store, entity, &keys, &meta);
        Ok(DeleteOutcome::Intercepted { rows_affected })
    }

    /// Intercept the discard of a staged (draft-overlay) record.
    ///
    /// Discarding a whole draft root passes through: the staged copy is
    /// scratch space and is physically removed. Discarding a child inside a
    /// draft depends on whether a committed counterpart exists - a freshly
    /// added child passes through, an edited copy of committed data is
    /// hidden in the overlay instead.
    pub fn draft_cancel(
        &self,
        entity_name: &str,
        keys: &[(String, Value)],
        actor: Option<&str>,
    ) -> Result<DeleteOutcome, Error> {
        let Some(entity) = self.schema.get_entity(entity_name) else {
            return Ok(DeleteOutcome::PassThrough);
        };
        if !entity.has_soft_delete() || entity.is_draft_root() {
            return Ok(DeleteOutcome::PassThrough);
        }

        let keys = self.identity_keys(entity_name, keys);
        if keys.is_empty() {
            return Ok(DeleteOutcome::PassThrough);
        }

        let storage = self.schema.storage_name(entity_name);
        if !self.committed_counterpart_exists(storage, &keys) {
            return Ok(DeleteOutcome::PassThrough);
        }

        let meta = HideMetadata::new(actor);
        let staged_storage = fields::draft_storage_name(storage);
        let matching = Predicate::And(vec![
            keys_predicate(&keys),
            Predicate::eq(fields::IS_ACTIVE, false),
            Predicate::eq(fields::IS_DELETED, false),
        ]);
        let rows_affected = self
            .store
            .update(&staged_storage, &matching, &meta.assignments())?;
        tracing::debug!(entity = %entity_name, rows = rows_affected, "draft discard intercepted as hide");

        cascade::cascade_hide_staged(&self.schema, &self.store, entity, &keys, &meta);
        Ok(DeleteOutcome::Intercepted { rows_affected })
    }

    /// Rewrite a read query so hidden records are filtered per its shape.
    ///
    /// Infallible: anything that cannot be resolved leaves the query as the
    /// caller wrote it. Draft-scoped reads and reads against staged storage
    /// are never rewritten; the overlay shows its own state.
    pub fn read(&self, query: &ReadQuery) -> ReadQuery {
        let Some(root) = query.root_segment() else {
            return query.clone();
        };
        if fields::is_draft_storage(&root.target) || query::is_draft_scoped(query) {
            return query.clone();
        }

        let path: Vec<&str> = query.path.iter().map(|s| s.target.as_str()).collect();
        let Some(target) = self.schema.resolve_path_target(&path) else {
            return query.clone();
        };
        if !target.has_soft_delete() {
            return query.clone();
        }

        let normalized = query::normalize_alias(query);
        let shape = QueryShape::of(&normalized);
        let resolved = query::resolve(&normalized, &shape, target, &self.schema, &self.store);
        query::rewrite(&normalized, &resolved, target, &self.schema)
    }

    /// Restrict caller-supplied values to the entity's identity fields.
    fn identity_keys(&self, entity_name: &str, keys: &[(String, Value)]) -> Vec<(String, Value)> {
        let key_fields = self.schema.key_fields(entity_name);
        keys.iter()
            .filter(|(field, _)| key_fields.contains(&field.as_str()))
            .cloned()
            .collect()
    }

    /// Probe the committed storage area for a counterpart of a staged row.
    ///
    /// A probe failure is treated as "exists": hiding a row that turns out
    /// to be new leaves harmless residue, physically deleting one that had
    /// committed history loses data.
    fn committed_counterpart_exists(&self, storage: &str, keys: &[(String, Value)]) -> bool {
        let predicate = keys_predicate(keys);
        match self.store.query(storage, Some(&predicate), &[]) {
            Ok(rows) => !rows.is_empty(),
            Err(e) => {
                tracing::warn!(storage = %storage, error = %e, "existence probe failed, assuming committed");
                true
            }
        }
    }
}
