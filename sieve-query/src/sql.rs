//! Literal SQL generation.
//!
//! [`SqlCompiler`] renders a filter tree as a complete `SELECT` statement with
//! every value inlined as a typed, escaped literal. Use it for stores that only
//! accept raw SQL text; executors that can bind parameters should prefer
//! [`Predicate::to_sql`](crate::predicate::Predicate::to_sql).
//!
//! ```rust
//! use std::sync::Arc;
//! use sieve_query::filter::{FilterCondition, FilterGroup, Operator};
//! use sieve_query::schema::{FieldRegistry, FieldSchema, FieldType};
//! use sieve_query::sql::SqlCompiler;
//!
//! let registry = FieldRegistry::new([
//!     FieldSchema::new("name", FieldType::String).operators([Operator::Eq]),
//! ])
//! .unwrap();
//!
//! let filter = FilterGroup::all([FilterCondition::new("name", Operator::Eq, "O'Brien")]);
//! let query = SqlCompiler::new(Arc::new(registry)).compile(&filter, "users").unwrap();
//!
//! assert_eq!(query.query, r#"SELECT * FROM "users" WHERE ("name" = 'O''Brien')"#);
//! ```

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::coerce;
use crate::error::{QueryError, QueryResult};
use crate::filter::{FilterCondition, FilterDefinition, FilterGroup, FilterNode, FilterValue, Operator};
use crate::schema::{FieldRegistry, FieldSchema, FieldType};

/// Escape a string for use in SQL (for identifiers, not values).
pub fn escape_identifier(name: &str) -> String {
    // Double any existing quotes
    let escaped = name.replace('"', "\"\"");
    format!("\"{}\"", escaped)
}

/// Quote a string literal, doubling embedded single quotes.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Escape LIKE wildcards so the pattern matches the text literally.
///
/// Backslash is the default LIKE escape character in PostgreSQL.
pub fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// A compiled literal SQL statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SqlQuery {
    /// The full statement text.
    pub query: String,
}

impl SqlQuery {
    /// The statement text.
    pub fn as_str(&self) -> &str {
        &self.query
    }
}

impl fmt::Display for SqlQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.query)
    }
}

/// Compiles filter trees into literal SQL using a field registry for typing.
#[derive(Debug, Clone)]
pub struct SqlCompiler {
    registry: Arc<FieldRegistry>,
}

impl SqlCompiler {
    /// Create a compiler over the given registry.
    pub fn new(registry: Arc<FieldRegistry>) -> Self {
        Self { registry }
    }

    /// Compile `filter` into `SELECT * FROM "<table>"[ WHERE ...]`.
    pub fn compile(&self, filter: &FilterDefinition, table: &str) -> QueryResult<SqlQuery> {
        let mut query = format!("SELECT * FROM {}", escape_identifier(table));
        if let Some(clause) = self.compile_group(filter)? {
            query.push_str(" WHERE ");
            query.push_str(&clause);
        }

        debug!(sql = %query, "Compiled literal SQL");
        Ok(SqlQuery { query })
    }

    /// Returns `None` when the group places no constraint on rows.
    fn compile_group(&self, group: &FilterGroup) -> QueryResult<Option<String>> {
        let mut buckets = Vec::with_capacity(2);

        for (nodes, is_or) in [(group.and_nodes(), false), (group.or_nodes(), true)] {
            let mut parts = Vec::with_capacity(nodes.len());
            let mut unconstrained = false;
            for node in nodes {
                let part = match node {
                    FilterNode::Condition(condition) => Some(self.compile_condition(condition)?),
                    FilterNode::Group(group) => self.compile_group(group)?,
                };
                match part {
                    Some(part) => parts.push(part),
                    None => unconstrained = true,
                }
            }
            // An unconstrained child satisfies the whole OR
            if unconstrained && is_or {
                continue;
            }
            if !parts.is_empty() {
                let joiner = if is_or { " OR " } else { " AND " };
                buckets.push(format!("({})", parts.join(joiner)));
            }
        }

        Ok((!buckets.is_empty()).then(|| buckets.join(" AND ")))
    }

    fn compile_condition(&self, condition: &FilterCondition) -> QueryResult<String> {
        let FilterCondition {
            field: name,
            operator,
            value: raw,
        } = condition;

        let field = self
            .registry
            .get(name)
            .ok_or_else(|| QueryError::field_not_found(name))?;
        let column = escape_identifier(name);

        let malformed =
            |message: String| QueryError::malformed_condition(name, operator.as_str(), message);
        let value = || match raw {
            Some(value) if !value.is_null() => Ok(value),
            _ => Err(malformed(format!("operator '{}' requires a value", operator))),
        };
        let scalar = || match value()? {
            v @ (FilterValue::List(_) | FilterValue::Json(_)) => Err(malformed(format!(
                "operator '{}' requires a scalar value, got {}",
                operator,
                v.kind()
            ))),
            v => Ok(v),
        };
        let list = || {
            value()?.as_list().ok_or_else(|| {
                malformed(format!("operator '{}' requires an array value", operator))
            })
        };

        let comparison = |symbol: &str| -> QueryResult<String> {
            Ok(format!("{} {} {}", column, symbol, format_literal(field, scalar()?)?))
        };
        let pattern = |prefix: &str, suffix: &str| -> QueryResult<String> {
            let text = escape_like(&scalar()?.to_string());
            Ok(format!("{} ILIKE {}", column, quote_literal(&format!("{prefix}{text}{suffix}"))))
        };

        match operator {
            Operator::Eq => comparison("="),
            Operator::Neq => comparison("!="),
            Operator::Gt => comparison(">"),
            Operator::Lt => comparison("<"),
            Operator::Gte => comparison(">="),
            Operator::Lte => comparison("<="),
            Operator::In => {
                let literals = list()?
                    .iter()
                    .map(|v| format_literal(field, v))
                    .collect::<QueryResult<Vec<_>>>()?;
                if literals.is_empty() {
                    return Ok("FALSE".to_string());
                }
                Ok(format!("{} IN ({})", column, literals.join(", ")))
            }
            Operator::Between => match list()? {
                [min, max] => Ok(format!(
                    "{} BETWEEN {} AND {}",
                    column,
                    format_literal(field, min)?,
                    format_literal(field, max)?
                )),
                _ => Err(malformed(
                    "operator 'between' requires exactly two values".to_string(),
                )),
            },
            Operator::Contains => pattern("%", "%"),
            Operator::StartsWith => pattern("", "%"),
            Operator::EndsWith => pattern("%", ""),
            Operator::IsNull => Ok(format!("{} IS NULL", column)),
            Operator::IsNotNull => Ok(format!("{} IS NOT NULL", column)),
        }
    }
}

/// Render one scalar value as a literal of the field's type.
fn format_literal(field: &FieldSchema, value: &FilterValue) -> QueryResult<String> {
    let invalid = |kind: &str| {
        QueryError::invalid_value(&field.name, format!("Invalid {} value: {}", kind, value))
    };

    match field.field_type {
        FieldType::String => match value {
            FilterValue::List(_) | FilterValue::Json(_) => Err(invalid("string")),
            scalar => Ok(quote_literal(&scalar.to_string())),
        },
        FieldType::Number => match value {
            FilterValue::Int(i) => Ok(i.to_string()),
            FilterValue::Float(f) if f.is_finite() => Ok(f.to_string()),
            _ => Err(invalid("number")),
        },
        FieldType::Boolean => match value {
            FilterValue::Bool(b) => Ok(b.to_string()),
            _ => Err(invalid("boolean")),
        },
        FieldType::Date => value
            .as_str()
            .and_then(coerce::parse_date)
            .map(|date| quote_literal(&coerce::format_timestamp(&date)))
            .ok_or_else(|| invalid("date")),
        FieldType::Uuid => value
            .as_str()
            .filter(|s| coerce::is_uuid(s))
            .map(quote_literal)
            .ok_or_else(|| invalid("UUID")),
        FieldType::Enum => {
            let label = value.as_str().ok_or_else(|| invalid("enum"))?;
            Ok(match &field.enum_type_name {
                Some(type_name) => format!("{}::{}", quote_literal(label), type_name),
                None => quote_literal(label),
            })
        }
    }
}
