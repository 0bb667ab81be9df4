//! Schema validation of filter trees.
//!
//! Validation walks the whole tree and reports every bad condition, so a
//! caller sees all problems in one round trip. Within a single condition the
//! checks run in a fixed order and stop at the first failure.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::filter::{FilterCondition, FilterDefinition, FilterGroup, FilterNode, FilterValue, Operator};
use crate::schema::{FieldRegistry, FieldSchema};

/// One validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Field the failure refers to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Operator the failure refers to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    /// Human readable message.
    pub message: String,
}

impl ValidationError {
    fn field(field: &str, message: String) -> Self {
        Self {
            field: Some(field.to_string()),
            operator: None,
            message,
        }
    }

    fn operator(field: &str, operator: Operator, message: String) -> Self {
        Self {
            field: Some(field.to_string()),
            operator: Some(operator.as_str().to_string()),
            message,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates filter trees against a field registry.
#[derive(Debug, Clone)]
pub struct FilterValidator {
    registry: Arc<FieldRegistry>,
}

impl FilterValidator {
    /// Create a validator over the given registry.
    pub fn new(registry: Arc<FieldRegistry>) -> Self {
        Self { registry }
    }

    /// Validate a filter, returning every failure found. Empty means valid.
    pub fn validate(&self, filter: &FilterDefinition) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        self.validate_group(filter, &mut errors);
        if !errors.is_empty() {
            debug!(count = errors.len(), "Filter failed validation");
        }
        errors
    }

    fn validate_group(&self, group: &FilterGroup, errors: &mut Vec<ValidationError>) {
        for node in group.nodes() {
            match node {
                FilterNode::Condition(condition) => self.validate_condition(condition, errors),
                FilterNode::Group(group) => self.validate_group(group, errors),
            }
        }
    }

    fn validate_condition(&self, condition: &FilterCondition, errors: &mut Vec<ValidationError>) {
        let name = condition.field.as_str();

        let Some(field) = self.registry.get(name) else {
            errors.push(ValidationError::field(
                name,
                format!("Field '{}' does not exist", name),
            ));
            return;
        };

        if !field.filterable {
            errors.push(ValidationError::field(
                name,
                format!("Field '{}' is not filterable", name),
            ));
            return;
        }

        if !field.allows(condition.operator) {
            errors.push(ValidationError::operator(
                name,
                condition.operator,
                format!(
                    "Operator '{}' is not allowed for field '{}'",
                    condition.operator, name
                ),
            ));
            return;
        }

        if let Some(value) = self.check_value_shape(condition, errors) {
            Self::check_value_type(value, field, condition.operator, errors);
        }
    }

    /// Returns the value to type-check when the shape is acceptable.
    fn check_value_shape<'a>(
        &self,
        condition: &'a FilterCondition,
        errors: &mut Vec<ValidationError>,
    ) -> Option<&'a FilterValue> {
        let FilterCondition {
            field,
            operator,
            value,
        } = condition;

        if !operator.takes_value() {
            if value.is_some() {
                errors.push(ValidationError::operator(
                    field,
                    *operator,
                    format!("Operator '{}' should not have a value", operator),
                ));
            }
            return None;
        }

        let value = match value {
            Some(value) if !value.is_null() => value,
            _ => {
                errors.push(ValidationError::operator(
                    field,
                    *operator,
                    format!("Operator '{}' requires a value", operator),
                ));
                return None;
            }
        };

        match operator {
            Operator::Between if value.as_list().is_none_or(|list| list.len() != 2) => {
                errors.push(ValidationError::operator(
                    field,
                    *operator,
                    "Operator 'between' requires exactly two values".to_string(),
                ));
                None
            }
            Operator::In if value.as_list().is_none() => {
                errors.push(ValidationError::operator(
                    field,
                    *operator,
                    "Operator 'in' requires an array of values".to_string(),
                ));
                None
            }
            _ => Some(value),
        }
    }

    fn check_value_type(
        value: &FilterValue,
        field: &FieldSchema,
        operator: Operator,
        errors: &mut Vec<ValidationError>,
    ) {
        let values = match value {
            FilterValue::List(values) => values.as_slice(),
            scalar => std::slice::from_ref(scalar),
        };

        for value in values {
            if !field.field_type.accepts(value) {
                errors.push(ValidationError::operator(
                    &field.name,
                    operator,
                    format!("Value '{}' is not a valid {}", value, field.field_type),
                ));
            }
        }
    }
}
