//! Error types for filter validation, compilation and execution.
//!
//! Every failure that leaves the core is a [`QueryError`] carrying an
//! [`ErrorCode`]. Codes follow the pattern `S{category}{number}`:
//! - 1xxx: Filter errors (validation, unknown fields, bad values)
//! - 5xxx: Execution errors reported by the data-access executor
//! - 7xxx: Configuration errors
//! - 9xxx: Internal errors
//!
//! ```rust
//! use sieve_query::{ErrorCode, QueryError};
//!
//! let err = QueryError::field_not_found("nickname");
//! assert_eq!(err.code, ErrorCode::FieldNotFound);
//! assert_eq!(err.http_status(), 400);
//! assert!(err.to_string().contains("S1004"));
//! ```

use std::fmt;
use thiserror::Error;

/// Result type for filter operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Filter errors (1xxx)
    /// The filter failed schema validation (S1001).
    InvalidFilter = 1001,
    /// A value could not be coerced to the field's type (S1002).
    InvalidDataType = 1002,
    /// The filter payload could not be parsed (S1003).
    MalformedFilter = 1003,
    /// A field referenced at compile time is not in the schema (S1004).
    FieldNotFound = 1004,
    /// The filter exceeds the configured size limits (S1005).
    FilterTooComplex = 1005,

    // Execution errors (5xxx)
    /// The executor failed to run the compiled query (S5001).
    DatabaseError = 5001,

    // Configuration errors (7xxx)
    /// Invalid configuration (S7001).
    InvalidConfiguration = 7001,
    /// Missing configuration (S7002).
    MissingConfiguration = 7002,

    // Internal errors (9xxx)
    /// Internal error (S9001).
    Internal = 9001,
}

impl ErrorCode {
    /// Get the error code string (e.g., "S1001").
    pub fn code(&self) -> String {
        format!("S{}", *self as u16)
    }

    /// Whether the error was caused by caller input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidFilter
                | Self::InvalidDataType
                | Self::MalformedFilter
                | Self::FieldNotFound
                | Self::FilterTooComplex
        )
    }

    /// HTTP status equivalent: 400 for caller errors, 500 otherwise.
    pub fn http_status(&self) -> u16 {
        if self.is_client_error() { 400 } else { 500 }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Additional context for an error.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The operation that was being performed.
    pub operation: Option<String>,
    /// The entity being filtered.
    pub entity: Option<String>,
    /// The field involved.
    pub field: Option<String>,
    /// The operator involved.
    pub operator: Option<String>,
    /// The SQL query (if available).
    pub sql: Option<String>,
    /// Suggestions for fixing the error.
    pub suggestions: Vec<String>,
    /// Individual messages folded into this error (e.g. every validation failure).
    pub related: Vec<String>,
}

/// Errors that can occur while validating, compiling or executing a filter.
#[derive(Error, Debug)]
pub struct QueryError {
    /// The error code.
    pub code: ErrorCode,
    /// The error message.
    pub message: String,
    /// Additional context.
    pub context: ErrorContext,
    /// The source error (if any).
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code(), self.message)
    }
}

impl QueryError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Name the operation that failed.
    pub fn with_context(mut self, operation: impl Into<String>) -> Self {
        self.context.operation = Some(operation.into());
        self
    }

    /// Add a suggestion for fixing the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context.suggestions.push(suggestion.into());
        self
    }

    /// Set the entity.
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.context.entity = Some(entity.into());
        self
    }

    /// Set the field.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.context.field = Some(field.into());
        self
    }

    /// Set the operator.
    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.context.operator = Some(operator.into());
        self
    }

    /// Attach the statement that was running.
    pub fn with_sql(mut self, sql: impl Into<String>) -> Self {
        self.context.sql = Some(sql.into());
        self
    }

    /// Attach individual messages that were folded into this error.
    pub fn with_related<I, S>(mut self, related: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.context.related.extend(related.into_iter().map(Into::into));
        self
    }

    /// Set the source error.
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // ============== Constructor Functions ==============

    /// Create a validation failure from the collected messages.
    pub fn validation_failed<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let messages: Vec<String> = messages.into_iter().map(Into::into).collect();
        Self::new(
            ErrorCode::InvalidFilter,
            format!("Filter validation failed: {}", messages.join(", ")),
        )
        .with_related(messages)
    }

    /// Create an error for a value that does not coerce to its field's type.
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidDataType, message).with_field(field)
    }

    /// Create an error for a field missing from the schema at compile time.
    pub fn field_not_found(field: impl Into<String>) -> Self {
        let field = field.into();
        Self::new(
            ErrorCode::FieldNotFound,
            format!("Field '{}' not found in schema", field),
        )
        .with_field(field)
        .with_suggestion("Validate the filter against the same schema before compiling it")
    }

    /// Create an error for a filter payload that could not be parsed.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MalformedFilter, message)
    }

    /// Create an error for a filter that exceeds the configured limits.
    pub fn too_complex(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::FilterTooComplex, message)
    }

    /// Create an error for a condition whose value does not fit its operator.
    ///
    /// Validation rejects these, so reaching it means a compiler was handed an
    /// unvalidated filter.
    pub fn malformed_condition(
        field: impl Into<String>,
        operator: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let message = message.into();
        Self::new(
            ErrorCode::Internal,
            format!("Internal error: {}", message),
        )
        .with_field(field)
        .with_operator(operator)
    }

    /// Create an execution error. Only the cause's message is kept.
    pub fn execution_failed(cause: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::DatabaseError,
            format!("Database query failed: {}", cause),
        )
    }

    /// Create a configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidConfiguration, message)
    }

    /// Create a missing configuration error.
    pub fn missing_configuration(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(
            ErrorCode::MissingConfiguration,
            format!("Missing required configuration: {}", name),
        )
        .with_suggestion(format!("Set the {} environment variable", name))
    }

    // ============== Error Checks ==============

    /// Check if this is a validation failure.
    pub fn is_validation_error(&self) -> bool {
        self.code == ErrorCode::InvalidFilter
    }

    /// Check if the caller can fix this error by changing the filter.
    pub fn is_client_error(&self) -> bool {
        self.code.is_client_error()
    }

    /// Check if this error came from the executor.
    pub fn is_execution_error(&self) -> bool {
        self.code == ErrorCode::DatabaseError
    }

    /// HTTP status equivalent for the boundary layer.
    pub fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Display the full error with all context and suggestions.
    pub fn display_full(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Error [{}]: {}\n", self.code.code(), self.message));

        if let Some(ref op) = self.context.operation {
            output.push_str(&format!("  → While: {}\n", op));
        }
        if let Some(ref entity) = self.context.entity {
            output.push_str(&format!("  → Entity: {}\n", entity));
        }
        if let Some(ref field) = self.context.field {
            output.push_str(&format!("  → Field: {}\n", field));
        }
        if let Some(ref operator) = self.context.operator {
            output.push_str(&format!("  → Operator: {}\n", operator));
        }

        // SQL (truncated if too long)
        if let Some(ref sql) = self.context.sql {
            let sql_display = match sql.char_indices().nth(200) {
                Some((idx, _)) => format!("{}...", &sql[..idx]),
                None => sql.clone(),
            };
            output.push_str(&format!("  → SQL: {}\n", sql_display));
        }

        if self.context.related.len() > 1 {
            output.push_str("\nProblems:\n");
            for related in &self.context.related {
                output.push_str(&format!("  - {}\n", related));
            }
        }

        if !self.context.suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for (i, suggestion) in self.context.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        output
    }
}
