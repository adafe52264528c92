//! Entity definitions.

use crate::fields;

/// A field definition within an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    /// Field name.
    pub name: String,
    /// Whether this field is part of the entity key.
    pub key: bool,
    /// Whether this key is draft-overlay bookkeeping rather than identity.
    pub virtual_key: bool,
}

impl FieldDef {
    /// Create a plain (non-key) field.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: false,
            virtual_key: false,
        }
    }

    /// Create a key field.
    pub fn key(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: true,
            virtual_key: false,
        }
    }

    /// Create a virtual draft key field.
    pub fn virtual_key(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: true,
            virtual_key: true,
        }
    }
}

/// Lifecycle rules for an entity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LifecycleRules {
    /// Enable soft delete (deleted records kept with tombstone fields).
    pub soft_delete: bool,
    /// This entity is the root of a draft-overlay editing unit.
    pub draft_root: bool,
}

/// An entity definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDef {
    /// Entity name (unique within schema).
    pub name: String,
    /// Physical backing name when the entity is a service-level projection.
    pub storage_name: Option<String>,
    /// Field definitions.
    pub fields: Vec<FieldDef>,
    /// Lifecycle rules.
    pub lifecycle: LifecycleRules,
}

impl EntityDef {
    /// Create a new entity definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            storage_name: None,
            fields: Vec::new(),
            lifecycle: LifecycleRules::default(),
        }
    }

    /// Add a field to the entity.
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Add multiple fields.
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = FieldDef>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Point this entity at a physical backing name (projection indirection).
    pub fn with_storage_name(mut self, storage: impl Into<String>) -> Self {
        self.storage_name = Some(storage.into());
        self
    }

    /// Enable soft delete.
    pub fn with_soft_delete(mut self) -> Self {
        self.lifecycle.soft_delete = true;
        self
    }

    /// Mark as a draft-overlay root.
    pub fn with_draft_root(mut self) -> Self {
        self.lifecycle.draft_root = true;
        self
    }

    /// Get a field by name.
    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Key field names, excluding virtual draft keys.
    pub fn key_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.key && !f.virtual_key)
            .map(|f| f.name.as_str())
            .collect()
    }

    /// Physical backing name, falling back to the entity name.
    pub fn storage_name(&self) -> &str {
        self.storage_name.as_deref().unwrap_or(&self.name)
    }

    /// Check if this entity has soft delete enabled.
    pub fn has_soft_delete(&self) -> bool {
        self.lifecycle.soft_delete
    }

    /// Check if this entity is a draft-overlay root.
    pub fn is_draft_root(&self) -> bool {
        self.lifecycle.draft_root
    }

    /// Whether the entity carries the draft-overlay virtual identity key.
    pub fn has_draft_key(&self) -> bool {
        self.fields
            .iter()
            .any(|f| f.virtual_key && f.name == fields::IS_ACTIVE)
    }

    /// Whether all three soft-delete metadata fields are declared.
    pub fn has_hide_metadata(&self) -> bool {
        self.get_field(fields::IS_DELETED).is_some()
            && self.get_field(fields::DELETED_AT).is_some()
            && self.get_field(fields::DELETED_BY).is_some()
    }
}
