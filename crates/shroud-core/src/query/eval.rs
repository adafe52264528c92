//! Predicate evaluation against rows.
//!
//! Used by the in-memory store and by any host that wants to apply a
//! rewritten predicate without a query planner.

use shroud_proto::{Predicate, Row, Value};

/// Evaluates predicates against rows.
pub struct PredicateEvaluator;

impl PredicateEvaluator {
    /// Evaluate a predicate against a row.
    ///
    /// Missing fields never match (except for `IsNull`).
    pub fn evaluate(predicate: &Predicate, row: &Row) -> bool {
        match predicate {
            Predicate::Eq { field, value } => {
                Self::compare(row, field, value, Self::values_equal)
            }
            Predicate::Ne { field, value } => {
                Self::compare(row, field, value, |a, b| !Self::values_equal(a, b))
            }
            Predicate::Lt { field, value } => Self::compare(row, field, value, |a, b| {
                Self::compare_values(a, b).map(|o| o.is_lt()).unwrap_or(false)
            }),
            Predicate::Le { field, value } => Self::compare(row, field, value, |a, b| {
                Self::compare_values(a, b).map(|o| o.is_le()).unwrap_or(false)
            }),
            Predicate::Gt { field, value } => Self::compare(row, field, value, |a, b| {
                Self::compare_values(a, b).map(|o| o.is_gt()).unwrap_or(false)
            }),
            Predicate::Ge { field, value } => Self::compare(row, field, value, |a, b| {
                Self::compare_values(a, b).map(|o| o.is_ge()).unwrap_or(false)
            }),
            Predicate::In { field, values } => match row.get(field) {
                Some(fv) => values.iter().any(|v| Self::values_equal(fv, v)),
                None => false,
            },
            Predicate::IsNull { field } => {
                matches!(row.get(field), None | Some(Value::Null))
            }
            Predicate::IsNotNull { field } => {
                !matches!(row.get(field), None | Some(Value::Null))
            }
            Predicate::And(preds) => preds.iter().all(|p| Self::evaluate(p, row)),
            Predicate::Or(preds) => preds.iter().any(|p| Self::evaluate(p, row)),
        }
    }

    fn compare<F>(row: &Row, field: &str, value: &Value, comparator: F) -> bool
    where
        F: FnOnce(&Value, &Value) -> bool,
    {
        match row.get(field) {
            Some(fv) => comparator(fv, value),
            None => false,
        }
    }

    /// Check if two values are equal, widening mixed integer types.
    fn values_equal(a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int32(_) | Value::Int64(_), Value::Int32(_) | Value::Int64(_)) => {
                a.as_i64() == b.as_i64()
            }
            (Value::Float64(a), Value::Float64(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::Uuid(a), Value::Uuid(b)) => a == b,
            _ => false,
        }
    }

    /// Compare two values, returning their ordering if comparable.
    fn compare_values(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
        match (a, b) {
            (Value::Int32(_) | Value::Int64(_), Value::Int32(_) | Value::Int64(_)) => {
                Some(a.as_i64()?.cmp(&b.as_i64()?))
            }
            (Value::Float64(a), Value::Float64(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            (Value::Bytes(a), Value::Bytes(b)) => Some(a.cmp(b)),
            (Value::Uuid(a), Value::Uuid(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shroud_proto::Predicate;

    fn sample_row() -> Row {
        Row::new()
            .with_field("id", 1i64)
            .with_field("name", "Alice")
            .with_field("is_deleted", false)
    }

    #[test]
    fn test_eq_and_ne() {
        let row = sample_row();
        assert!(PredicateEvaluator::evaluate(
            &Predicate::eq("name", "Alice"),
            &row
        ));
        assert!(!PredicateEvaluator::evaluate(
            &Predicate::eq("name", "Bob"),
            &row
        ));
        assert!(PredicateEvaluator::evaluate(
            &Predicate::ne("name", "Bob"),
            &row
        ));
    }

    #[test]
    fn test_integer_widening() {
        let row = sample_row();
        assert!(PredicateEvaluator::evaluate(&Predicate::eq("id", 1i32), &row));
    }

    #[test]
    fn test_nested_connectives() {
        let row = sample_row();
        let pred = Predicate::and(vec![
            Predicate::eq("is_deleted", false),
            Predicate::or(vec![
                Predicate::eq("name", "Bob"),
                Predicate::eq("name", "Alice"),
            ]),
        ]);
        assert!(PredicateEvaluator::evaluate(&pred, &row));
    }

    #[test]
    fn test_missing_field_never_matches() {
        let row = sample_row();
        assert!(!PredicateEvaluator::evaluate(
            &Predicate::eq("missing", 1i32),
            &row
        ));
        assert!(PredicateEvaluator::evaluate(
            &Predicate::IsNull {
                field: "missing".into()
            },
            &row
        ));
    }

    #[test]
    fn test_ordering() {
        let row = Row::new().with_field("score", 75i32);
        assert!(PredicateEvaluator::evaluate(
            &Predicate::Gt {
                field: "score".into(),
                value: 50i64.into()
            },
            &row
        ));
        assert!(!PredicateEvaluator::evaluate(
            &Predicate::Lt {
                field: "score".into(),
                value: 75i32.into()
            },
            &row
        ));
    }
}
