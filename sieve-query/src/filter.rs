//! Filter expression trees.
//!
//! A [`FilterDefinition`] is the root [`FilterGroup`] of a tree whose leaves
//! are [`FilterCondition`]s. Trees are built per request from caller JSON and
//! are never mutated afterwards.
//!
//! ```rust
//! use sieve_query::filter::{FilterDefinition, FilterNode, Operator};
//!
//! let filter: FilterDefinition = serde_json::from_str(r#"{
//!     "and": [
//!         {"field": "age", "operator": "gt", "value": 30},
//!         {"or": [
//!             {"field": "role", "operator": "eq", "value": "admin"},
//!             {"field": "isActive", "operator": "eq", "value": true}
//!         ]}
//!     ]
//! }"#).unwrap();
//!
//! assert_eq!(filter.condition_count(), 3);
//! assert_eq!(filter.depth(), 2);
//! match &filter.and.as_ref().unwrap()[0] {
//!     FilterNode::Condition(c) => assert_eq!(c.operator, Operator::Gt),
//!     FilterNode::Group(_) => unreachable!(),
//! }
//! ```

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// A filter value as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// String value.
    String(String),
    /// List of values.
    List(Vec<FilterValue>),
    /// Any other JSON value (objects).
    Json(serde_json::Value),
}

impl FilterValue {
    /// Check if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow the string payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the list payload, if any.
    pub fn as_list(&self) -> Option<&[FilterValue]> {
        match self {
            Self::List(values) => Some(values),
            _ => None,
        }
    }

    /// Numeric payload as `f64`, if this is a finite number.
    pub fn as_finite_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) if f.is_finite() => Some(*f),
            _ => None,
        }
    }

    /// Short name of the value's JSON kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) | Self::Float(_) => "number",
            Self::String(_) => "string",
            Self::List(_) => "array",
            Self::Json(_) => "object",
        }
    }

    /// Convert to a plain JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Int(i) => serde_json::Value::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::List(values) => {
                serde_json::Value::Array(values.iter().map(Self::to_json).collect())
            }
            Self::Json(v) => v.clone(),
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(v) => write!(f, "{}", v),
            Self::String(s) => f.write_str(s),
            Self::List(values) => {
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", v)?;
                }
                Ok(())
            }
            Self::Json(v) => write!(f, "{}", v),
        }
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for FilterValue {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl<T: Into<FilterValue>> From<Vec<T>> for FilterValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

/// Comparison operators a condition may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// Equals.
    Eq,
    /// Not equals.
    Neq,
    /// Greater than.
    Gt,
    /// Less than.
    Lt,
    /// Greater than or equal.
    Gte,
    /// Less than or equal.
    Lte,
    /// Member of a list.
    In,
    /// Inclusive range `[min, max]`.
    Between,
    /// Case-insensitive substring.
    Contains,
    /// Case-insensitive prefix.
    StartsWith,
    /// Case-insensitive suffix.
    EndsWith,
    /// Is null.
    IsNull,
    /// Is not null.
    IsNotNull,
}

impl Operator {
    /// Every operator, in declaration order.
    pub const ALL: [Operator; 13] = [
        Self::Eq,
        Self::Neq,
        Self::Gt,
        Self::Lt,
        Self::Gte,
        Self::Lte,
        Self::In,
        Self::Between,
        Self::Contains,
        Self::StartsWith,
        Self::EndsWith,
        Self::IsNull,
        Self::IsNotNull,
    ];

    /// Wire name of the operator.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Lt => "lt",
            Self::Gte => "gte",
            Self::Lte => "lte",
            Self::In => "in",
            Self::Between => "between",
            Self::Contains => "contains",
            Self::StartsWith => "starts_with",
            Self::EndsWith => "ends_with",
            Self::IsNull => "is_null",
            Self::IsNotNull => "is_not_null",
        }
    }

    /// Whether conditions using this operator carry a value.
    pub const fn takes_value(&self) -> bool {
        !matches!(self, Self::IsNull | Self::IsNotNull)
    }

    /// Whether the value is a list.
    pub const fn is_list(&self) -> bool {
        matches!(self, Self::In | Self::Between)
    }

    /// Whether this is a substring match.
    pub const fn is_pattern(&self) -> bool {
        matches!(self, Self::Contains | Self::StartsWith | Self::EndsWith)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown operator name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown operator `{0}`")]
pub struct UnknownOperator(pub String);

impl FromStr for Operator {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| UnknownOperator(s.to_string()))
    }
}

/// Leaf node: one field, one operator, an optional value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterCondition {
    /// Field name.
    pub field: String,
    /// Operator.
    pub operator: Operator,
    /// Value. `None` when absent, `Some(FilterValue::Null)` for an explicit null.
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<FilterValue>,
}

fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<FilterValue>, D::Error>
where
    D: Deserializer<'de>,
{
    FilterValue::deserialize(deserializer).map(Some)
}

impl FilterCondition {
    /// Create a condition with a value.
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<FilterValue>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: Some(value.into()),
        }
    }

    /// Create a condition without a value (`is_null` / `is_not_null`).
    pub fn without_value(field: impl Into<String>, operator: Operator) -> Self {
        Self {
            field: field.into(),
            operator,
            value: None,
        }
    }
}

/// Interior node combining children with AND and/or OR.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterGroup {
    /// Children that must all match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub and: Option<Vec<FilterNode>>,
    /// Children of which at least one must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub or: Option<Vec<FilterNode>>,
}

/// The root of a filter tree.
pub type FilterDefinition = FilterGroup;

impl FilterGroup {
    /// Create an empty group (matches everything).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a group whose children are ANDed.
    pub fn all(nodes: impl IntoIterator<Item = impl Into<FilterNode>>) -> Self {
        Self::new().with_and(nodes)
    }

    /// Create a group whose children are ORed.
    pub fn any(nodes: impl IntoIterator<Item = impl Into<FilterNode>>) -> Self {
        Self::new().with_or(nodes)
    }

    /// Set the AND bucket.
    pub fn with_and(mut self, nodes: impl IntoIterator<Item = impl Into<FilterNode>>) -> Self {
        self.and = Some(nodes.into_iter().map(Into::into).collect());
        self
    }

    /// Set the OR bucket.
    pub fn with_or(mut self, nodes: impl IntoIterator<Item = impl Into<FilterNode>>) -> Self {
        self.or = Some(nodes.into_iter().map(Into::into).collect());
        self
    }

    /// The AND bucket, empty when absent.
    pub fn and_nodes(&self) -> &[FilterNode] {
        self.and.as_deref().unwrap_or(&[])
    }

    /// The OR bucket, empty when absent.
    pub fn or_nodes(&self) -> &[FilterNode] {
        self.or.as_deref().unwrap_or(&[])
    }

    /// Both buckets, AND first.
    pub fn nodes(&self) -> impl Iterator<Item = &FilterNode> {
        self.and_nodes().iter().chain(self.or_nodes())
    }

    /// Whether neither bucket has children.
    pub fn is_empty(&self) -> bool {
        self.and_nodes().is_empty() && self.or_nodes().is_empty()
    }

    /// Nesting depth; a group of plain conditions has depth 1.
    pub fn depth(&self) -> usize {
        1 + self
            .nodes()
            .map(|node| match node {
                FilterNode::Condition(_) => 0,
                FilterNode::Group(group) => group.depth(),
            })
            .max()
            .unwrap_or(0)
    }

    /// Total number of conditions in the tree.
    pub fn condition_count(&self) -> usize {
        self.nodes()
            .map(|node| match node {
                FilterNode::Condition(_) => 1,
                FilterNode::Group(group) => group.condition_count(),
            })
            .sum()
    }
}

/// A node of the filter tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterNode {
    /// Leaf condition.
    Condition(FilterCondition),
    /// Nested group.
    Group(FilterGroup),
}

impl<'de> Deserialize<'de> for FilterNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        let is_condition = value
            .as_object()
            .is_some_and(|object| object.contains_key("field"));

        if is_condition {
            FilterCondition::deserialize(value)
                .map(Self::Condition)
                .map_err(de::Error::custom)
        } else {
            FilterGroup::deserialize(value)
                .map(Self::Group)
                .map_err(de::Error::custom)
        }
    }
}

impl From<FilterCondition> for FilterNode {
    fn from(condition: FilterCondition) -> Self {
        Self::Condition(condition)
    }
}

impl From<FilterGroup> for FilterNode {
    fn from(group: FilterGroup) -> Self {
        Self::Group(group)
    }
}
