//! Field schemas: which fields an entity exposes to filters.
//!
//! A [`FieldRegistry`] is built once at startup and shared read-only.
//!
//! ```rust
//! use sieve_query::filter::Operator;
//! use sieve_query::schema::{FieldRegistry, FieldSchema, FieldType};
//!
//! let registry = FieldRegistry::new([
//!     FieldSchema::new("age", FieldType::Number).operators([Operator::Gt, Operator::Between]),
//!     FieldSchema::new("password", FieldType::String).not_filterable(),
//! ])
//! .unwrap();
//!
//! assert!(registry.get("age").unwrap().allows(Operator::Gt));
//! assert!(!registry.get("password").unwrap().filterable);
//! ```

use std::fmt;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::coerce;
use crate::error::{QueryError, QueryResult};
use crate::filter::{FilterValue, Operator};

/// Data type of a filterable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Text.
    String,
    /// Finite number.
    Number,
    /// Boolean.
    Boolean,
    /// Calendar date or timestamp.
    Date,
    /// Enumerated label, stored as text.
    Enum,
    /// UUID v1–v5.
    Uuid,
}

impl FieldType {
    /// Lowercase type name used in messages.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Enum => "enum",
            Self::Uuid => "uuid",
        }
    }

    /// Whether a single (non-list) value has this type.
    ///
    /// Enum values are opaque strings; membership is left to the store.
    pub fn accepts(&self, value: &FilterValue) -> bool {
        match self {
            Self::String | Self::Enum => matches!(value, FilterValue::String(_)),
            Self::Number => value.as_finite_f64().is_some(),
            Self::Boolean => matches!(value, FilterValue::Bool(_)),
            Self::Date => value.as_str().and_then(coerce::parse_date).is_some(),
            Self::Uuid => value.as_str().is_some_and(coerce::is_uuid),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter metadata for one entity field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchema {
    /// Field name, unique within a registry.
    pub name: String,
    /// Data type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Operators conditions on this field may use.
    #[serde(default)]
    pub allowed_operators: IndexSet<Operator>,
    /// Whether the field may appear in a filter at all.
    pub filterable: bool,
    /// SQL enum type to cast enum literals to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_type_name: Option<String>,
}

impl FieldSchema {
    /// Create a filterable field with no operators yet.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            allowed_operators: IndexSet::new(),
            filterable: true,
            enum_type_name: None,
        }
    }

    /// Allow the given operators.
    pub fn operators(mut self, operators: impl IntoIterator<Item = Operator>) -> Self {
        self.allowed_operators.extend(operators);
        self
    }

    /// Mark the field as never filterable and drop its operators.
    pub fn not_filterable(mut self) -> Self {
        self.filterable = false;
        self.allowed_operators.clear();
        self
    }

    /// Cast enum literals to the named SQL type.
    pub fn enum_type(mut self, type_name: impl Into<String>) -> Self {
        self.enum_type_name = Some(type_name.into());
        self
    }

    /// Whether `operator` is on the allow-list.
    pub fn allows(&self, operator: Operator) -> bool {
        self.allowed_operators.contains(&operator)
    }
}

/// Read-only lookup of field schemas by name.
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    fields: IndexMap<String, FieldSchema>,
}

impl FieldRegistry {
    /// Build a registry, rejecting duplicate field names and enum type
    /// names that are not plain SQL identifiers.
    pub fn new(fields: impl IntoIterator<Item = FieldSchema>) -> QueryResult<Self> {
        let mut map = IndexMap::new();
        for field in fields {
            if map.contains_key(&field.name) {
                return Err(QueryError::invalid_configuration(format!(
                    "duplicate field `{}` in filter schema",
                    field.name
                )));
            }
            let bad_type = field
                .enum_type_name
                .as_deref()
                .filter(|type_name| !coerce::is_type_name(type_name));
            if let Some(type_name) = bad_type {
                return Err(QueryError::invalid_configuration(format!(
                    "invalid enum type `{}` for field `{}`",
                    type_name, field.name
                ))
                .with_field(&field.name));
            }
            map.insert(field.name.clone(), field);
        }
        Ok(Self { fields: map })
    }

    /// Build a registry from a JSON array of field schemas.
    pub fn from_json(json: &str) -> QueryResult<Self> {
        let fields: Vec<FieldSchema> = serde_json::from_str(json).map_err(|e| {
            QueryError::invalid_configuration(format!("invalid filter schema: {}", e))
                .with_source(e)
        })?;
        Self::new(fields)
    }

    /// Look up a field.
    pub fn get(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.get(name)
    }

    /// Whether a field exists.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// All fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldSchema> {
        self.fields.values()
    }

    /// Fields that may appear in filters.
    pub fn filterable_fields(&self) -> impl Iterator<Item = &FieldSchema> {
        self.iter().filter(|field| field.filterable)
    }

    /// Names of all fields in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the registry has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
