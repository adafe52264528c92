//! Row types returned by storage reads.

use crate::value::Value;
use serde::{Deserialize, Serialize};

/// One row of an entity, as returned by the storage layer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Row {
    /// Field name and value pairs, in storage order.
    pub fields: Vec<(String, Value)>,
}

impl Row {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field to this row.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Get a field value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// Overwrite a field value, appending if the field is absent.
    pub fn set(&mut self, name: &str, value: Value) {
        match self.fields.iter_mut().find(|(field, _)| field == name) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_and_set() {
        let mut row = Row::new()
            .with_field("id", 1i64)
            .with_field("is_deleted", false);

        assert_eq!(row.get("id"), Some(&Value::Int64(1)));
        assert_eq!(row.get("missing"), None);

        row.set("is_deleted", Value::Bool(true));
        assert_eq!(row.get("is_deleted"), Some(&Value::Bool(true)));

        row.set("deleted_by", Value::String("system".into()));
        assert_eq!(row.fields.len(), 3);
    }
}
