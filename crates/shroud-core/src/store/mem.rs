//! In-memory reference store.
//!
//! Backs the integration tests and gives embedding hosts a working `Store`
//! without a database. Tables are plain row vectors guarded by a read-write
//! lock; predicate matching reuses the engine's evaluator.

use super::Store;
use crate::error::Error;
use crate::query::PredicateEvaluator;
use parking_lot::RwLock;
use shroud_proto::{FieldValue, Predicate, Row};
use std::collections::HashMap;

/// An in-process `Store` implementation.
#[derive(Debug, Default)]
pub struct MemStore {
    tables: RwLock<HashMap<String, Vec<Row>>>,
}

impl MemStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a row into a storage area, creating it on first use.
    pub fn insert(&self, storage: &str, row: Row) {
        self.tables
            .write()
            .entry(storage.to_string())
            .or_default()
            .push(row);
    }

    /// Physically remove rows matching a predicate, returning the count.
    pub fn remove(&self, storage: &str, matching: &Predicate) -> u64 {
        let mut tables = self.tables.write();
        let Some(rows) = tables.get_mut(storage) else {
            return 0;
        };
        let before = rows.len();
        rows.retain(|row| !PredicateEvaluator::evaluate(matching, row));
        (before - rows.len()) as u64
    }

    /// Count rows in a storage area.
    pub fn len(&self, storage: &str) -> usize {
        self.tables.read().get(storage).map_or(0, Vec::len)
    }

    /// Whether a storage area has no rows.
    pub fn is_empty(&self, storage: &str) -> bool {
        self.len(storage) == 0
    }
}

impl Store for MemStore {
    fn query(
        &self,
        storage: &str,
        predicate: Option<&Predicate>,
        fields: &[String],
    ) -> Result<Vec<Row>, Error> {
        let tables = self.tables.read();
        let rows = tables.get(storage).map(Vec::as_slice).unwrap_or_default();
        let matched = rows
            .iter()
            .filter(|row| predicate.map_or(true, |p| PredicateEvaluator::evaluate(p, row)))
            .map(|row| project(row, fields))
            .collect();
        Ok(matched)
    }

    fn update(
        &self,
        storage: &str,
        matching: &Predicate,
        values: &[FieldValue],
    ) -> Result<u64, Error> {
        let mut tables = self.tables.write();
        let Some(rows) = tables.get_mut(storage) else {
            return Ok(0);
        };
        let mut affected = 0u64;
        for row in rows.iter_mut() {
            if PredicateEvaluator::evaluate(matching, row) {
                for fv in values {
                    row.set(&fv.field, fv.value.clone());
                }
                affected += 1;
            }
        }
        Ok(affected)
    }
}

fn project(row: &Row, fields: &[String]) -> Row {
    if fields.is_empty() {
        return row.clone();
    }
    row.fields
        .iter()
        .filter(|(name, _)| fields.iter().any(|f| f == name))
        .cloned()
        .collect()
}
