//! Relation definitions between entities.

/// Cardinality of a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// One-to-one relation (unique foreign key).
    OneToOne,
    /// One-to-many relation (foreign key on the many side).
    OneToMany,
}

/// Behavior for related records when the source record is hidden or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteBehavior {
    /// Propagate to related records (composition / owned children).
    Cascade,
    /// Leave related records untouched.
    Restrict,
}

/// A relation definition between two entities.
///
/// A composition (parent-owns-children) edge is a relation with
/// [`DeleteBehavior::Cascade`]; the child side declares a reciprocal
/// relation back to the parent carrying the foreign-key field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDef {
    /// Relation name, as addressed by expand items (unique per source entity).
    pub name: String,
    /// Source entity name.
    pub from_entity: String,
    /// Field on the source entity joined against `to_field`.
    pub from_field: String,
    /// Target entity name.
    pub to_entity: String,
    /// Field on the target entity joined against `from_field`.
    pub to_field: String,
    /// Relation cardinality.
    pub cardinality: Cardinality,
    /// Delete behavior.
    pub on_delete: DeleteBehavior,
}

impl RelationDef {
    /// Create a one-to-many relation.
    pub fn one_to_many(
        name: impl Into<String>,
        from_entity: impl Into<String>,
        from_field: impl Into<String>,
        to_entity: impl Into<String>,
        to_field: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            from_entity: from_entity.into(),
            from_field: from_field.into(),
            to_entity: to_entity.into(),
            to_field: to_field.into(),
            cardinality: Cardinality::OneToMany,
            on_delete: DeleteBehavior::Restrict,
        }
    }

    /// Create a one-to-one relation.
    pub fn one_to_one(
        name: impl Into<String>,
        from_entity: impl Into<String>,
        from_field: impl Into<String>,
        to_entity: impl Into<String>,
        to_field: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            from_entity: from_entity.into(),
            from_field: from_field.into(),
            to_entity: to_entity.into(),
            to_field: to_field.into(),
            cardinality: Cardinality::OneToOne,
            on_delete: DeleteBehavior::Restrict,
        }
    }

    /// Create a composition (owned-children) edge from parent to child.
    ///
    /// `from_field` is the parent key, `to_field` the child foreign key.
    pub fn composition(
        name: impl Into<String>,
        parent: impl Into<String>,
        parent_key: impl Into<String>,
        child: impl Into<String>,
        child_fk: impl Into<String>,
    ) -> Self {
        Self::one_to_many(name, parent, parent_key, child, child_fk)
            .with_on_delete(DeleteBehavior::Cascade)
    }

    /// Set delete behavior.
    pub fn with_on_delete(mut self, on_delete: DeleteBehavior) -> Self {
        self.on_delete = on_delete;
        self
    }

    /// Whether this edge owns its target records.
    pub fn is_composition(&self) -> bool {
        self.on_delete == DeleteBehavior::Cascade
    }
}
