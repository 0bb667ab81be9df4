//! Structured predicates for ORM-style data access.
//!
//! [`PredicateCompiler`] turns a validated filter tree into a [`Predicate`].
//! A predicate can be rendered three ways:
//!
//! - [`Predicate::to_json`]: the nested object form an ORM `where` accepts
//! - [`Predicate::to_sql`]: a parameterised PostgreSQL fragment
//! - [`Predicate::matches`]: evaluated directly against a JSON record
//!
//! ```rust
//! use sieve_query::filter::{FilterCondition, FilterGroup, Operator};
//! use sieve_query::predicate::{Predicate, PredicateCompiler};
//!
//! let filter = FilterGroup::all([FilterCondition::new("age", Operator::Between, vec![30, 40])]);
//! let predicate = PredicateCompiler::new().compile(&filter).unwrap();
//!
//! assert_eq!(predicate.to_json(), serde_json::json!({"age": {"gte": 30, "lte": 40}}));
//!
//! let (sql, params) = predicate.to_sql(0);
//! assert_eq!(sql, r#"("age" >= $1 AND "age" <= $2)"#);
//! assert_eq!(params.len(), 2);
//! ```

use std::cmp::Ordering;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::debug;

use crate::coerce;
use crate::error::{QueryError, QueryResult};
use crate::executor::Record;
use crate::filter::{FilterCondition, FilterDefinition, FilterGroup, FilterNode, FilterValue, Operator};
use crate::sql::{escape_identifier, escape_like};

/// A compiled structured predicate.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Predicate {
    /// No filter (always true).
    #[default]
    None,

    /// Equals comparison.
    Equals(String, FilterValue),
    /// Not equals comparison.
    NotEquals(String, FilterValue),

    /// Less than comparison.
    Lt(String, FilterValue),
    /// Less than or equal comparison.
    Lte(String, FilterValue),
    /// Greater than comparison.
    Gt(String, FilterValue),
    /// Greater than or equal comparison.
    Gte(String, FilterValue),

    /// In a list of values.
    In(String, Vec<FilterValue>),

    /// Case-insensitive substring.
    Contains(String, String),
    /// Case-insensitive prefix.
    StartsWith(String, String),
    /// Case-insensitive suffix.
    EndsWith(String, String),

    /// Is null check.
    IsNull(String),
    /// Is not null check.
    IsNotNull(String),

    /// Logical AND of multiple predicates.
    And(Vec<Predicate>),
    /// Logical OR of multiple predicates.
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Check if this predicate is empty.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Create an AND predicate. Empty children are dropped and a single
    /// remaining child stands for itself.
    pub fn and(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        let mut predicates: Vec<_> = predicates.into_iter().filter(|p| !p.is_none()).collect();
        match predicates.len() {
            0 => Self::None,
            1 => predicates.remove(0),
            _ => Self::And(predicates),
        }
    }

    /// Create an OR predicate. A single child stands for itself.
    ///
    /// An empty child is always true, so it makes the whole OR
    /// [`Predicate::None`]. An OR without children is also `None`.
    pub fn or(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        let mut predicates: Vec<_> = predicates.into_iter().collect();
        if predicates.iter().any(Predicate::is_none) {
            return Self::None;
        }
        match predicates.len() {
            0 => Self::None,
            1 => predicates.remove(0),
            _ => Self::Or(predicates),
        }
    }

    /// The field a leaf predicate tests, if this is a leaf.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Equals(f, _)
            | Self::NotEquals(f, _)
            | Self::Lt(f, _)
            | Self::Lte(f, _)
            | Self::Gt(f, _)
            | Self::Gte(f, _)
            | Self::In(f, _)
            | Self::Contains(f, _)
            | Self::StartsWith(f, _)
            | Self::EndsWith(f, _)
            | Self::IsNull(f)
            | Self::IsNotNull(f) => Some(f),
            Self::None | Self::And(_) | Self::Or(_) => None,
        }
    }

    // ============== ORM object form ==============

    /// Render the nested object form, e.g. `{"AND": [{"age": {"gt": 30}}, ...]}`.
    pub fn to_json(&self) -> Value {
        match self {
            Self::None => Value::Object(Map::new()),
            Self::And(predicates) => {
                if let Some(merged) = merge_field_clauses(predicates) {
                    return merged;
                }
                let items = predicates.iter().map(Self::to_json).collect();
                single("AND", Value::Array(items))
            }
            Self::Or(predicates) => {
                let items = predicates.iter().map(Self::to_json).collect();
                single("OR", Value::Array(items))
            }
            leaf => match leaf.field_clause() {
                Some((field, clause)) => single(&field, Value::Object(clause)),
                None => Value::Object(Map::new()),
            },
        }
    }

    /// `(field, {op: value, ...})` for leaf predicates.
    fn field_clause(&self) -> Option<(String, Map<String, Value>)> {
        let mut clause = Map::new();
        let field = match self {
            Self::Equals(f, v) => {
                clause.insert("equals".into(), v.to_json());
                f
            }
            Self::NotEquals(f, v) => {
                clause.insert("not".into(), v.to_json());
                f
            }
            Self::Lt(f, v) => {
                clause.insert("lt".into(), v.to_json());
                f
            }
            Self::Lte(f, v) => {
                clause.insert("lte".into(), v.to_json());
                f
            }
            Self::Gt(f, v) => {
                clause.insert("gt".into(), v.to_json());
                f
            }
            Self::Gte(f, v) => {
                clause.insert("gte".into(), v.to_json());
                f
            }
            Self::In(f, values) => {
                clause.insert(
                    "in".into(),
                    Value::Array(values.iter().map(FilterValue::to_json).collect()),
                );
                f
            }
            Self::Contains(f, s) => {
                clause.insert("contains".into(), Value::String(s.clone()));
                clause.insert("mode".into(), Value::String("insensitive".into()));
                f
            }
            Self::StartsWith(f, s) => {
                clause.insert("startsWith".into(), Value::String(s.clone()));
                clause.insert("mode".into(), Value::String("insensitive".into()));
                f
            }
            Self::EndsWith(f, s) => {
                clause.insert("endsWith".into(), Value::String(s.clone()));
                clause.insert("mode".into(), Value::String("insensitive".into()));
                f
            }
            Self::IsNull(f) => {
                clause.insert("equals".into(), Value::Null);
                f
            }
            Self::IsNotNull(f) => {
                clause.insert("not".into(), Value::Null);
                f
            }
            Self::None | Self::And(_) | Self::Or(_) => return None,
        };
        Some((field.clone(), clause))
    }

    // ============== SQL form ==============

    /// Generate SQL for this predicate with `$n` placeholders numbered after
    /// `param_offset`. Returns (sql, params) where params are the values to bind.
    pub fn to_sql(&self, param_offset: usize) -> (String, Vec<FilterValue>) {
        let mut params = Vec::new();
        let sql = self.to_sql_with_params(param_offset, &mut params);
        (sql, params)
    }

    fn to_sql_with_params(&self, offset: usize, params: &mut Vec<FilterValue>) -> String {
        let bind = |value: FilterValue, params: &mut Vec<FilterValue>| {
            params.push(value);
            format!("${}", offset + params.len())
        };

        match self {
            Self::None => "TRUE".to_string(),

            Self::Equals(col, val) if val.is_null() => format!("{} IS NULL", escape_identifier(col)),
            Self::NotEquals(col, val) if val.is_null() => {
                format!("{} IS NOT NULL", escape_identifier(col))
            }
            Self::Equals(col, val) => {
                format!("{} = {}", escape_identifier(col), bind(val.clone(), params))
            }
            Self::NotEquals(col, val) => {
                format!("{} != {}", escape_identifier(col), bind(val.clone(), params))
            }
            Self::Lt(col, val) => format!("{} < {}", escape_identifier(col), bind(val.clone(), params)),
            Self::Lte(col, val) => format!("{} <= {}", escape_identifier(col), bind(val.clone(), params)),
            Self::Gt(col, val) => format!("{} > {}", escape_identifier(col), bind(val.clone(), params)),
            Self::Gte(col, val) => format!("{} >= {}", escape_identifier(col), bind(val.clone(), params)),

            Self::In(col, values) => {
                if values.is_empty() {
                    return "FALSE".to_string();
                }
                let placeholders: Vec<_> = values.iter().map(|v| bind(v.clone(), params)).collect();
                format!("{} IN ({})", escape_identifier(col), placeholders.join(", "))
            }

            Self::Contains(col, s) => {
                let pattern = format!("%{}%", escape_like(s));
                format!("{} ILIKE {}", escape_identifier(col), bind(pattern.into(), params))
            }
            Self::StartsWith(col, s) => {
                let pattern = format!("{}%", escape_like(s));
                format!("{} ILIKE {}", escape_identifier(col), bind(pattern.into(), params))
            }
            Self::EndsWith(col, s) => {
                let pattern = format!("%{}", escape_like(s));
                format!("{} ILIKE {}", escape_identifier(col), bind(pattern.into(), params))
            }

            Self::IsNull(col) => format!("{} IS NULL", escape_identifier(col)),
            Self::IsNotNull(col) => format!("{} IS NOT NULL", escape_identifier(col)),

            Self::And(predicates) => {
                if predicates.is_empty() {
                    return "TRUE".to_string();
                }
                let parts: Vec<_> = predicates
                    .iter()
                    .map(|p| p.to_sql_with_params(offset, params))
                    .collect();
                format!("({})", parts.join(" AND "))
            }
            Self::Or(predicates) => {
                if predicates.is_empty() {
                    return "FALSE".to_string();
                }
                let parts: Vec<_> = predicates
                    .iter()
                    .map(|p| p.to_sql_with_params(offset, params))
                    .collect();
                format!("({})", parts.join(" OR "))
            }
        }
    }

    // ============== In-memory evaluation ==============

    /// Evaluate against a JSON record.
    ///
    /// Comparisons follow SQL semantics: a missing or null column never
    /// satisfies a comparison. Date strings compare as instants and UUIDs
    /// compare case-insensitively.
    pub fn matches(&self, record: &Record) -> bool {
        let column = |name: &str| record.get(name).filter(|v| !v.is_null());

        match self {
            Self::None => true,
            Self::Equals(col, val) if val.is_null() => column(col).is_none(),
            Self::NotEquals(col, val) if val.is_null() => column(col).is_some(),
            Self::Equals(col, val) => compare(column(col), val) == Some(Ordering::Equal),
            Self::NotEquals(col, val) => {
                compare(column(col), val).is_some_and(|o| o != Ordering::Equal)
            }
            Self::Lt(col, val) => compare(column(col), val) == Some(Ordering::Less),
            Self::Lte(col, val) => compare(column(col), val).is_some_and(Ordering::is_le),
            Self::Gt(col, val) => compare(column(col), val) == Some(Ordering::Greater),
            Self::Gte(col, val) => compare(column(col), val).is_some_and(Ordering::is_ge),
            Self::In(col, values) => values
                .iter()
                .any(|v| compare(column(col), v) == Some(Ordering::Equal)),
            Self::Contains(col, s) => text(column(col)).is_some_and(|t| t.contains(&s.to_lowercase())),
            Self::StartsWith(col, s) => {
                text(column(col)).is_some_and(|t| t.starts_with(&s.to_lowercase()))
            }
            Self::EndsWith(col, s) => text(column(col)).is_some_and(|t| t.ends_with(&s.to_lowercase())),
            Self::IsNull(col) => column(col).is_none(),
            Self::IsNotNull(col) => column(col).is_some(),
            Self::And(predicates) => predicates.iter().all(|p| p.matches(record)),
            Self::Or(predicates) => predicates.iter().any(|p| p.matches(record)),
        }
    }
}

impl Serialize for Predicate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

fn single(key: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    Value::Object(map)
}

/// Merge `[Gte(f, a), Lte(f, b)]`-style conjunctions on one field into a
/// single `{f: {gte: a, lte: b}}` object. Returns `None` when the children
/// span several fields, repeat an operator key or carry a `mode`, which
/// would apply to every sibling key.
fn merge_field_clauses(predicates: &[Predicate]) -> Option<Value> {
    let mut merged_field: Option<String> = None;
    let mut merged = Map::new();

    for predicate in predicates {
        let (field, clause) = predicate.field_clause()?;
        if clause.contains_key("mode") {
            return None;
        }
        match &merged_field {
            Some(existing) if *existing != field => return None,
            Some(_) => {}
            None => merged_field = Some(field),
        }
        for (key, value) in clause {
            if merged.insert(key, value).is_some() {
                return None;
            }
        }
    }

    merged_field.map(|field| single(&field, Value::Object(merged)))
}

fn text(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_lowercase)
}

fn compare(column: Option<&Value>, value: &FilterValue) -> Option<Ordering> {
    match (column?, value) {
        (Value::Number(n), v) => n.as_f64()?.partial_cmp(&v.as_finite_f64()?),
        (Value::Bool(a), FilterValue::Bool(b)) => Some(a.cmp(b)),
        (Value::String(a), FilterValue::String(b)) => {
            if let (Some(a), Some(b)) = (coerce::parse_date(a), coerce::parse_date(b)) {
                Some(a.cmp(&b))
            } else if coerce::is_uuid(a) && coerce::is_uuid(b) {
                Some(a.to_lowercase().cmp(&b.to_lowercase()))
            } else {
                Some(a.as_str().cmp(b.as_str()))
            }
        }
        _ => None,
    }
}

/// Compiles filter trees into [`Predicate`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct PredicateCompiler;

impl PredicateCompiler {
    /// Create a compiler.
    pub fn new() -> Self {
        Self
    }

    /// Compile a filter. An empty filter compiles to [`Predicate::None`].
    pub fn compile(&self, filter: &FilterDefinition) -> QueryResult<Predicate> {
        let predicate = self.compile_group(filter)?;
        debug!(predicate = %predicate.to_json(), "Compiled structured predicate");
        Ok(predicate)
    }

    fn compile_group(&self, group: &FilterGroup) -> QueryResult<Predicate> {
        let and = group
            .and_nodes()
            .iter()
            .map(|node| self.compile_node(node))
            .collect::<QueryResult<Vec<_>>>()?;
        let or = group
            .or_nodes()
            .iter()
            .map(|node| self.compile_node(node))
            .collect::<QueryResult<Vec<_>>>()?;

        Ok(Predicate::and([Predicate::and(and), Predicate::or(or)]))
    }

    fn compile_node(&self, node: &FilterNode) -> QueryResult<Predicate> {
        match node {
            FilterNode::Condition(condition) => self.compile_condition(condition),
            FilterNode::Group(group) => self.compile_group(group),
        }
    }

    fn compile_condition(&self, condition: &FilterCondition) -> QueryResult<Predicate> {
        let field = condition.field.clone();
        let operator = condition.operator;
        let malformed = |message: String| {
            QueryError::malformed_condition(&condition.field, operator.as_str(), message)
        };

        let value = || match &condition.value {
            Some(value) if !value.is_null() => Ok(value),
            _ => Err(malformed(format!("operator '{}' requires a value", operator))),
        };
        let list = || {
            value()?.as_list().ok_or_else(|| {
                malformed(format!("operator '{}' requires an array value", operator))
            })
        };
        let scalar = || -> QueryResult<FilterValue> {
            match value()? {
                v @ (FilterValue::List(_) | FilterValue::Json(_)) => Err(malformed(format!(
                    "operator '{}' requires a scalar value, got {}",
                    operator,
                    v.kind()
                ))),
                v => Ok(v.clone()),
            }
        };

        Ok(match operator {
            Operator::Eq => Predicate::Equals(field, scalar()?),
            Operator::Neq => Predicate::NotEquals(field, scalar()?),
            Operator::Gt => Predicate::Gt(field, scalar()?),
            Operator::Lt => Predicate::Lt(field, scalar()?),
            Operator::Gte => Predicate::Gte(field, scalar()?),
            Operator::Lte => Predicate::Lte(field, scalar()?),
            Operator::In => Predicate::In(field, list()?.to_vec()),
            Operator::Between => match list()? {
                [min, max] => Predicate::And(vec![
                    Predicate::Gte(field.clone(), min.clone()),
                    Predicate::Lte(field, max.clone()),
                ]),
                _ => {
                    return Err(malformed(
                        "operator 'between' requires exactly two values".to_string(),
                    ));
                }
            },
            Operator::Contains => Predicate::Contains(field, scalar()?.to_string()),
            Operator::StartsWith => Predicate::StartsWith(field, scalar()?.to_string()),
            Operator::EndsWith => Predicate::EndsWith(field, scalar()?.to_string()),
            Operator::IsNull => Predicate::IsNull(field),
            Operator::IsNotNull => Predicate::IsNotNull(field),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn compile(json: Value) -> QueryResult<Predicate> {
        let filter: FilterDefinition = serde_json::from_value(json).unwrap();
        PredicateCompiler::new().compile(&filter)
    }

    fn record(json: Value) -> Record {
        json.as_object().cloned().unwrap()
    }

    #[test]
    fn test_empty_filter_is_none() {
        assert_eq!(compile(json!({})).unwrap(), Predicate::None);
        assert_eq!(compile(json!({"and": [], "or": []})).unwrap(), Predicate::None);
        assert_eq!(Predicate::None.to_json(), json!({}));
    }

    #[test]
    fn test_single_condition_collapses() {
        let predicate = compile(json!({"and": [{"field": "age", "operator": "gt", "value": 30}]})).unwrap();
        assert_eq!(predicate, Predicate::Gt("age".into(), FilterValue::Int(30)));
        assert_eq!(predicate.to_json(), json!({"age": {"gt": 30}}));
    }

    #[test]
    fn test_buckets_combine_with_and() {
        let predicate = compile(json!({
            "and": [
                {"field": "age", "operator": "gte", "value": 25},
                {"field": "isActive", "operator": "eq", "value": true}
            ],
            "or": [
                {"field": "role", "operator": "eq", "value": "admin"},
                {"field": "name", "operator": "contains", "value": "jo"}
            ]
        }))
        .unwrap();

        assert_eq!(
            predicate.to_json(),
            json!({"AND": [
                {"AND": [{"age": {"gte": 25}}, {"isActive": {"equals": true}}]},
                {"OR": [
                    {"role": {"equals": "admin"}},
                    {"name": {"contains": "jo", "mode": "insensitive"}}
                ]}
            ]})
        );
    }

    #[test]
    fn test_between_renders_range() {
        let predicate =
            compile(json!({"and": [{"field": "age", "operator": "between", "value": [30, 40]}]})).unwrap();
        assert_eq!(
            predicate,
            Predicate::And(vec![
                Predicate::Gte("age".into(), FilterValue::Int(30)),
                Predicate::Lte("age".into(), FilterValue::Int(40)),
            ])
        );
        assert_eq!(predicate.to_json(), json!({"age": {"gte": 30, "lte": 40}}));
    }

    #[test]
    fn test_insensitive_clauses_are_not_merged() {
        let predicate = compile(json!({"and": [
            {"field": "name", "operator": "eq", "value": "John Doe"},
            {"field": "name", "operator": "contains", "value": "o"}
        ]}))
        .unwrap();
        assert_eq!(
            predicate.to_json(),
            json!({"AND": [
                {"name": {"equals": "John Doe"}},
                {"name": {"contains": "o", "mode": "insensitive"}}
            ]})
        );

        let predicate = compile(json!({"and": [
            {"field": "age", "operator": "gt", "value": 20},
            {"field": "age", "operator": "neq", "value": 28}
        ]}))
        .unwrap();
        assert_eq!(predicate.to_json(), json!({"age": {"gt": 20, "not": 28}}));
    }

    #[test]
    fn test_empty_group_makes_or_true() {
        let predicate = compile(json!({"or": [
            {},
            {"field": "age", "operator": "gt", "value": 100}
        ]}))
        .unwrap();
        assert_eq!(predicate, Predicate::None);
        assert!(predicate.matches(&record(json!({"age": 30}))));

        let predicate = compile(json!({
            "and": [{"field": "age", "operator": "gt", "value": 100}, {"or": []}],
            "or": [{"and": [], "or": []}, {"field": "name", "operator": "eq", "value": "x"}]
        }))
        .unwrap();
        assert_eq!(predicate, Predicate::Gt("age".into(), 100.into()));

        assert_eq!(
            Predicate::or([Predicate::IsNull("a".into()), Predicate::None]),
            Predicate::None
        );
        assert_eq!(
            Predicate::and([Predicate::IsNull("a".into()), Predicate::None]),
            Predicate::IsNull("a".into())
        );
    }

    #[test]
    fn test_null_operators() {
        let predicate = compile(json!({"or": [
            {"field": "name", "operator": "is_null"},
            {"field": "email", "operator": "is_not_null"}
        ]}))
        .unwrap();
        assert_eq!(
            predicate.to_json(),
            json!({"OR": [{"name": {"equals": null}}, {"email": {"not": null}}]})
        );
    }

    #[test]
    fn test_pattern_and_list_operators() {
        let predicate = compile(json!({"and": [
            {"field": "email", "operator": "ends_with", "value": "@example.com"},
            {"field": "role", "operator": "in", "value": ["admin", "user"]},
            {"field": "name", "operator": "neq", "value": "Bob"}
        ]}))
        .unwrap();
        assert_eq!(
            predicate.to_json(),
            json!({"AND": [
                {"email": {"endsWith": "@example.com", "mode": "insensitive"}},
                {"role": {"in": ["admin", "user"]}},
                {"name": {"not": "Bob"}}
            ]})
        );
    }

    #[test]
    fn test_compilation_is_deterministic() {
        let filter = json!({"and": [{"field": "age", "operator": "lt", "value": 50}],
                            "or": [{"field": "role", "operator": "eq", "value": "user"}]});
        assert_eq!(compile(filter.clone()).unwrap(), compile(filter).unwrap());
    }

    #[test]
    fn test_malformed_values_are_internal_errors() {
        let err = compile(json!({"and": [{"field": "age", "operator": "between", "value": [1]}]})).unwrap_err();
        assert_eq!(err.code, ErrorCode::Internal);

        let err = compile(json!({"and": [{"field": "name", "operator": "eq", "value": ["a"]}]})).unwrap_err();
        assert_eq!(err.code, ErrorCode::Internal);
        assert_eq!(err.context.field.as_deref(), Some("name"));

        let err = compile(json!({"and": [{"field": "age", "operator": "in", "value": 3}]})).unwrap_err();
        assert_eq!(err.code, ErrorCode::Internal);

        let err = compile(json!({"and": [{"field": "age", "operator": "gt"}]})).unwrap_err();
        assert_eq!(err.code, ErrorCode::Internal);
    }

    #[test]
    fn test_to_sql_numbers_placeholders() {
        let predicate = Predicate::and([
            Predicate::Equals("name".into(), "Alice".into()),
            Predicate::or([
                Predicate::In("role".into(), vec!["admin".into(), "user".into()]),
                Predicate::Contains("email".into(), "50%_off".into()),
            ]),
        ]);

        let (sql, params) = predicate.to_sql(0);
        assert_eq!(
            sql,
            r#"("name" = $1 AND ("role" IN ($2, $3) OR "email" ILIKE $4))"#
        );
        assert_eq!(params[3], FilterValue::from(r"%50\%\_off%"));

        let (sql, _) = Predicate::Gt("age".into(), 1.into()).to_sql(2);
        assert_eq!(sql, r#""age" > $3"#);
    }

    #[test]
    fn test_to_sql_edge_cases() {
        assert_eq!(Predicate::None.to_sql(0).0, "TRUE");
        assert_eq!(Predicate::In("id".into(), vec![]).to_sql(0).0, "FALSE");
        assert_eq!(Predicate::IsNull("a\"b".into()).to_sql(0).0, r#""a""b" IS NULL"#);
        assert_eq!(
            Predicate::Equals("name".into(), FilterValue::Null).to_sql(0).0,
            r#""name" IS NULL"#
        );
    }

    #[test]
    fn test_matches_records() {
        let alice = record(json!({
            "name": "Alice Brown", "age": 29, "role": "admin", "isActive": true,
            "createdAt": "2024-03-01T10:00:00.000Z", "nickname": null,
            "id": "550e8400-e29b-41d4-a716-446655440005"
        }));

        assert!(Predicate::Gt("age".into(), 25.into()).matches(&alice));
        assert!(!Predicate::Gt("age".into(), 29.into()).matches(&alice));
        assert!(Predicate::Lte("age".into(), FilterValue::Float(29.0)).matches(&alice));
        assert!(Predicate::Contains("name".into(), "BROWN".into()).matches(&alice));
        assert!(Predicate::StartsWith("name".into(), "ali".into()).matches(&alice));
        assert!(Predicate::In("role".into(), vec!["user".into(), "admin".into()]).matches(&alice));
        assert!(Predicate::Equals("isActive".into(), true.into()).matches(&alice));
        assert!(Predicate::Gte("createdAt".into(), "2024-03-01".into()).matches(&alice));
        assert!(Predicate::Equals("id".into(), "550E8400-E29B-41D4-A716-446655440005".into()).matches(&alice));
        assert!(Predicate::IsNull("nickname".into()).matches(&alice));
        assert!(Predicate::IsNull("missing".into()).matches(&alice));
        assert!(!Predicate::NotEquals("nickname".into(), "x".into()).matches(&alice));
        assert!(Predicate::None.matches(&alice));
        assert!(!Predicate::Or(vec![]).matches(&alice));
    }
}
