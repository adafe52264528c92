//! Filter injection.
//!
//! Given a classified query, computes the deleted-flag value for the
//! primary target and for every nested sub-query, then produces a
//! rewritten copy of the tree with those filters conjoined in.

use crate::catalog::{EntityDef, SchemaBundle};
use crate::fields;
use crate::query::shape::{self, QueryShape, ShapeKind};
use crate::store::Store;
use shroud_proto::{ExpandItem, Predicate, ReadQuery, Value};

/// The filter values resolved for one read query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedFilter {
    /// Filter for the primary target; `None` means leave its predicate
    /// alone (direct-key access, or the caller filtered explicitly).
    pub main: Option<bool>,
    /// Filter propagated to every nested sub-query.
    pub nested: bool,
}

/// Resolve the filter values for a query, in priority order: direct-key
/// transparency, caller's explicit filter, navigation parent state,
/// listing default.
pub fn resolve<S: Store>(
    query: &ReadQuery,
    shape: &QueryShape,
    target: &EntityDef,
    schema: &SchemaBundle,
    store: &S,
) -> ResolvedFilter {
    if shape.kind == ShapeKind::DirectKey {
        // The caller asked for one record by key and must get it even if
        // hidden; children follow the record's own visibility state.
        let nested = target_flag_by_key(query, target, schema, store);
        return ResolvedFilter { main: None, nested };
    }

    if let Some(flag) = shape.explicit_flag {
        // The caller's filter already stands; only propagate its value.
        return ResolvedFilter {
            main: None,
            nested: flag,
        };
    }

    if shape.kind == ShapeKind::Navigation {
        let flag = parent_flag_from_navigation(query, schema, store);
        tracing::debug!(parent_flag = flag, "navigation read follows parent state");
        return ResolvedFilter {
            main: Some(flag),
            nested: flag,
        };
    }

    ResolvedFilter {
        main: Some(false),
        nested: false,
    }
}

/// Rewrite a query with resolved filter values.
///
/// Pure structural transform: conjoins the main filter into the top-level
/// predicate when present, and walks the expand tree conjoining the nested
/// value into every sub-query whose target opts into soft delete. Items
/// whose target does not opt in pass through unmodified except for their
/// own nested items. The input query is never mutated.
pub fn rewrite(
    query: &ReadQuery,
    resolved: &ResolvedFilter,
    target: &EntityDef,
    schema: &SchemaBundle,
) -> ReadQuery {
    let mut out = query.clone();
    if let Some(main) = resolved.main {
        out.predicate = Some(Predicate::conjoin(
            out.predicate.take(),
            Predicate::eq(fields::IS_DELETED, main),
        ));
    }
    out.items = query
        .items
        .iter()
        .map(|item| rewrite_item(item, Some(target), resolved.nested, schema))
        .collect();
    out
}

fn rewrite_item(
    item: &ExpandItem,
    owner: Option<&EntityDef>,
    nested: bool,
    schema: &SchemaBundle,
) -> ExpandItem {
    let target = owner.and_then(|o| schema.relation_target(&o.name, &item.relation));

    let mut out = item.clone();
    // Depth first, so arbitrarily deep expansion trees receive the value.
    out.items = item
        .items
        .iter()
        .map(|nested_item| rewrite_item(nested_item, target, nested, schema))
        .collect();

    if target.is_some_and(EntityDef::has_soft_delete) {
        tracing::debug!(relation = %item.relation, flag = nested, "injecting sub-query filter");
        out.filter = Some(Predicate::conjoin(
            out.filter.take(),
            Predicate::eq(fields::IS_DELETED, nested),
        ));
    }
    out
}

/// Current deleted-flag of the directly addressed record, for sub-query
/// propagation. Degrades to visible on any failure.
fn target_flag_by_key<S: Store>(
    query: &ReadQuery,
    target: &EntityDef,
    schema: &SchemaBundle,
    store: &S,
) -> bool {
    let Some(root) = query.root_segment() else {
        return false;
    };
    let keys = shape::extract_key_values(root, &target.key_fields());
    if keys.is_empty() {
        return false;
    }
    lookup_flag(schema.storage_name(&target.name), &keys, store)
}

/// Current deleted-flag of the navigation path's root record.
///
/// Only the immediate path root is consulted; deeper chains keep the
/// default. Degrades to visible when the parent is unknown, not opted in,
/// unkeyed, or unreadable.
fn parent_flag_from_navigation<S: Store>(
    query: &ReadQuery,
    schema: &SchemaBundle,
    store: &S,
) -> bool {
    let Some(root) = query.root_segment() else {
        return false;
    };
    let Some(parent) = schema.get_entity(&root.target) else {
        return false;
    };
    if !parent.has_soft_delete() {
        return false;
    }
    let keys = shape::extract_key_values(root, &parent.key_fields());
    if keys.is_empty() {
        return false;
    }
    lookup_flag(schema.storage_name(&parent.name), &keys, store)
}

fn lookup_flag<S: Store>(storage: &str, keys: &[(String, Value)], store: &S) -> bool {
    let predicate = keys_predicate(keys);
    match store.query(storage, Some(&predicate), &[fields::IS_DELETED.to_string()]) {
        Ok(rows) => rows
            .first()
            .and_then(|row| row.get(fields::IS_DELETED))
            .and_then(Value::as_bool)
            .unwrap_or(false),
        Err(e) => {
            tracing::warn!(storage, error = %e, "parent state lookup failed, treating as visible");
            false
        }
    }
}

/// Build an equality conjunction over key fields.
pub(crate) fn keys_predicate(keys: &[(String, Value)]) -> Predicate {
    let mut eqs: Vec<Predicate> = keys
        .iter()
        .map(|(field, value)| Predicate::Eq {
            field: field.clone(),
            value: value.clone(),
        })
        .collect();
    if eqs.len() == 1 {
        eqs.remove(0)
    } else {
        Predicate::And(eqs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FieldDef, RelationDef};
    use crate::query::shape::QueryShape;
    use crate::store::testing::FailingReads;
    use crate::store::MemStore;
    use shroud_proto::{PathSegment, Row};

    fn schema() -> SchemaBundle {
        let tombstones = || {
            vec![
                FieldDef::new("is_deleted"),
                FieldDef::new("deleted_at"),
                FieldDef::new("deleted_by"),
            ]
        };
        SchemaBundle::new(1)
            .with_entity(
                EntityDef::new("Order")
                    .with_storage_name("orders")
                    .with_field(FieldDef::key("id"))
                    .with_fields(tombstones())
                    .with_soft_delete(),
            )
            .with_entity(
                EntityDef::new("OrderItem")
                    .with_storage_name("order_items")
                    .with_field(FieldDef::key("id"))
                    .with_field(FieldDef::new("order_id"))
                    .with_fields(tombstones())
                    .with_soft_delete(),
            )
            .with_entity(
                EntityDef::new("Note")
                    .with_storage_name("notes")
                    .with_field(FieldDef::key("id")),
            )
            .with_relation(RelationDef::composition(
                "items", "Order", "id", "OrderItem", "order_id",
            ))
            .with_relation(RelationDef::one_to_many(
                "order", "OrderItem", "order_id", "Order", "id",
            ))
            .with_relation(RelationDef::one_to_many(
                "notes", "Order", "id", "Note", "order_id",
            ))
    }

    fn resolve_for(query: &ReadQuery, store: &impl Store) -> ResolvedFilter {
        let schema = schema();
        let target = schema
            .resolve_path_target(
                &query.path.iter().map(|s| s.target.clone()).collect::<Vec<_>>(),
            )
            .unwrap();
        resolve(query, &QueryShape::of(query), target, &schema, store)
    }

    #[test]
    fn test_listing_defaults_to_visible() {
        let store = MemStore::new();
        let query = ReadQuery::new("Order");
        let resolved = resolve_for(&query, &store);
        assert_eq!(resolved.main, Some(false));
        assert!(!resolved.nested);
    }

    #[test]
    fn test_explicit_flag_wins_over_default() {
        let store = MemStore::new();
        let query = ReadQuery::new("Order").with_predicate(Predicate::eq("is_deleted", true));
        let resolved = resolve_for(&query, &store);
        assert_eq!(resolved.main, None);
        assert!(resolved.nested);
    }

    #[test]
    fn test_direct_key_inherits_record_state() {
        let store = MemStore::new();
        store.insert(
            "orders",
            Row::new().with_field("id", 1i64).with_field("is_deleted", true),
        );
        let query = ReadQuery::new("Order").with_root_filter(Predicate::eq("id", 1i64));
        let resolved = resolve_for(&query, &store);
        assert_eq!(resolved.main, None);
        assert!(resolved.nested);
    }

    #[test]
    fn test_direct_key_missing_row_degrades_to_visible() {
        let store = MemStore::new();
        let query = ReadQuery::new("Order").with_root_filter(Predicate::eq("id", 99i64));
        let resolved = resolve_for(&query, &store);
        assert_eq!(resolved.main, None);
        assert!(!resolved.nested);
    }

    #[test]
    fn test_direct_key_lookup_failure_degrades_to_visible() {
        let store = FailingReads::new("orders");
        let query = ReadQuery::new("Order").with_root_filter(Predicate::eq("id", 1i64));
        let resolved = resolve_for(&query, &store);
        assert_eq!(resolved.main, None);
        assert!(!resolved.nested);
    }

    #[test]
    fn test_navigation_lookup_failure_degrades_to_visible() {
        let store = FailingReads::new("orders");
        let query = ReadQuery::new("Order")
            .with_root_filter(Predicate::eq("id", 1i64))
            .via(PathSegment::new("items"));
        let resolved = resolve_for(&query, &store);
        assert_eq!(resolved.main, Some(false));
        assert!(!resolved.nested);
    }

    #[test]
    fn test_navigation_follows_parent_state() {
        let store = MemStore::new();
        store.insert(
            "orders",
            Row::new().with_field("id", 1i64).with_field("is_deleted", true),
        );
        let query = ReadQuery::new("Order")
            .with_root_filter(Predicate::eq("id", 1i64))
            .via(PathSegment::new("items"));
        let resolved = resolve_for(&query, &store);
        assert_eq!(resolved.main, Some(true));
        assert!(resolved.nested);
    }

    #[test]
    fn test_rewrite_conjoins_main_filter() {
        let s = schema();
        let target = s.get_entity("Order").unwrap();
        let query = ReadQuery::new("Order").with_predicate(Predicate::eq("status", "open"));
        let resolved = ResolvedFilter {
            main: Some(false),
            nested: false,
        };
        let out = rewrite(&query, &resolved, target, &s);
        assert_eq!(
            out.predicate,
            Some(Predicate::And(vec![
                Predicate::eq("status", "open"),
                Predicate::eq("is_deleted", false),
            ]))
        );
        // Input untouched.
        assert_eq!(query.predicate, Some(Predicate::eq("status", "open")));
    }

    #[test]
    fn test_rewrite_deep_expand_tree() {
        let s = schema();
        let target = s.get_entity("Order").unwrap();
        let query = ReadQuery::new("Order").expand(
            ExpandItem::new("items")
                .with_item(ExpandItem::new("order").with_item(ExpandItem::new("items"))),
        );
        let resolved = ResolvedFilter {
            main: Some(false),
            nested: true,
        };
        let out = rewrite(&query, &resolved, target, &s);

        let items = &out.items[0];
        assert_eq!(items.filter, Some(Predicate::eq("is_deleted", true)));
        let order = &items.items[0];
        assert_eq!(order.filter, Some(Predicate::eq("is_deleted", true)));
        let inner_items = &order.items[0];
        assert_eq!(inner_items.filter, Some(Predicate::eq("is_deleted", true)));
    }

    #[test]
    fn test_non_opted_in_expand_passes_through() {
        let s = schema();
        let target = s.get_entity("Order").unwrap();
        let query = ReadQuery::new("Order").expand(ExpandItem::new("notes"));
        let resolved = ResolvedFilter {
            main: Some(false),
            nested: false,
        };
        let out = rewrite(&query, &resolved, target, &s);
        assert_eq!(out.items[0].filter, None);
    }
}
