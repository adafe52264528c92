//! Schema bundle - the loaded snapshot the engine reflects over.

use super::{EntityDef, RelationDef};
use crate::error::Error;
use crate::fields;
use std::collections::HashMap;

/// A composition edge resolved from the schema, ready for cascading.
#[derive(Debug, Clone)]
pub struct CompositionEdge<'a> {
    /// The composition relation (parent side).
    pub relation: &'a RelationDef,
    /// The owned child entity.
    pub child: &'a EntityDef,
    /// Foreign-key field on the child, resolved via the reciprocal
    /// relation; `None` when the child declares no relation back to the
    /// parent (a configuration gap).
    pub foreign_key: Option<String>,
    /// Parent-side field the foreign key joins against.
    pub parent_field: String,
}

/// A versioned snapshot of the entire schema.
///
/// Immutable after load; shared read-only across requests.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaBundle {
    /// Schema version (monotonically increasing).
    pub version: u64,
    /// Entity definitions keyed by name.
    pub entities: HashMap<String, EntityDef>,
    /// Relation definitions keyed by name.
    pub relations: HashMap<String, RelationDef>,
}

impl SchemaBundle {
    /// Create an empty schema bundle.
    pub fn new(version: u64) -> Self {
        Self {
            version,
            entities: HashMap::new(),
            relations: HashMap::new(),
        }
    }

    /// Add an entity to the schema.
    pub fn with_entity(mut self, entity: EntityDef) -> Self {
        self.entities.insert(entity.name.clone(), entity);
        self
    }

    /// Add a relation to the schema.
    pub fn with_relation(mut self, relation: RelationDef) -> Self {
        self.relations.insert(relation.name.clone(), relation);
        self
    }

    /// Get an entity by name.
    pub fn get_entity(&self, name: &str) -> Option<&EntityDef> {
        self.entities.get(name)
    }

    /// Whether an entity opts into soft delete. Unknown entities are not
    /// opted in; absence is a legitimate, common case.
    pub fn is_soft_delete_enabled(&self, name: &str) -> bool {
        self.get_entity(name).is_some_and(EntityDef::has_soft_delete)
    }

    /// Whether an entity is a draft-overlay root.
    pub fn is_draft_root(&self, name: &str) -> bool {
        self.get_entity(name).is_some_and(EntityDef::is_draft_root)
    }

    /// Whether an entity participates in a draft overlay without being its
    /// root (carries the virtual draft key, not the root flag).
    pub fn is_draft_child(&self, name: &str) -> bool {
        self.get_entity(name)
            .is_some_and(|e| e.has_draft_key() && !e.is_draft_root())
    }

    /// Key field names of an entity, excluding virtual draft keys.
    pub fn key_fields(&self, name: &str) -> Vec<&str> {
        self.get_entity(name)
            .map(EntityDef::key_fields)
            .unwrap_or_default()
    }

    /// Physical backing name for an entity, following one level of
    /// projection indirection.
    pub fn storage_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.get_entity(name)
            .map(EntityDef::storage_name)
            .unwrap_or(name)
    }

    /// Composition edges from an entity, with the child foreign key
    /// resolved through the reciprocal relation on the child.
    pub fn owned_children(&self, name: &str) -> Vec<CompositionEdge<'_>> {
        self.relations
            .values()
            .filter(|r| r.is_composition() && r.from_entity == name)
            .filter_map(|relation| {
                let child = self.get_entity(&relation.to_entity)?;
                let reciprocal = self.reciprocal_of(relation);
                let (foreign_key, parent_field) = match reciprocal {
                    Some(r2) => (Some(r2.from_field.clone()), r2.to_field.clone()),
                    None => (None, relation.from_field.clone()),
                };
                Some(CompositionEdge {
                    relation,
                    child,
                    foreign_key,
                    parent_field,
                })
            })
            .collect()
    }

    /// The relation on the child entity that points back at the parent.
    fn reciprocal_of(&self, composition: &RelationDef) -> Option<&RelationDef> {
        self.relations.values().find(|r| {
            r.from_entity == composition.to_entity && r.to_entity == composition.from_entity
        })
    }

    /// Resolve the target entity of a relation declared on `owner`.
    pub fn relation_target(&self, owner: &str, relation_name: &str) -> Option<&EntityDef> {
        self.relations
            .values()
            .find(|r| r.from_entity == owner && r.name == relation_name)
            .and_then(|r| self.get_entity(&r.to_entity))
    }

    /// Resolve the entity a multi-segment reference path lands on.
    ///
    /// The first segment names an entity; each further segment names a
    /// relation on the previous target.
    pub fn resolve_path_target(&self, path: &[impl AsRef<str>]) -> Option<&EntityDef> {
        let mut iter = path.iter();
        let mut current = self.get_entity(iter.next()?.as_ref())?;
        for segment in iter {
            current = self.relation_target(&current.name, segment.as_ref())?;
        }
        Some(current)
    }

    /// Load-time validation of soft-delete configuration.
    ///
    /// An entity that opts in must declare the three metadata fields, and
    /// every composition edge between opted-in entities must have a
    /// resolvable reciprocal relation on the child.
    pub fn validate(&self) -> Result<(), Error> {
        for entity in self.entities.values() {
            if entity.has_soft_delete() && !entity.has_hide_metadata() {
                return Err(Error::SchemaViolation {
                    entity: entity.name.clone(),
                    reason: format!(
                        "soft delete enabled without '{}', '{}', '{}' fields",
                        fields::IS_DELETED,
                        fields::DELETED_AT,
                        fields::DELETED_BY
                    ),
                });
            }
        }

        for relation in self.relations.values().filter(|r| r.is_composition()) {
            let Some(child) = self.get_entity(&relation.to_entity) else {
                return Err(Error::SchemaViolation {
                    entity: relation.from_entity.clone(),
                    reason: format!(
                        "composition '{}' targets unknown entity '{}'",
                        relation.name, relation.to_entity
                    ),
                });
            };
            if child.has_soft_delete() && self.reciprocal_of(relation).is_none() {
                return Err(Error::SchemaViolation {
                    entity: relation.from_entity.clone(),
                    reason: format!(
                        "composition '{}' has no reciprocal relation on '{}'",
                        relation.name, relation.to_entity
                    ),
                });
            }
        }

        Ok(())
    }
}
