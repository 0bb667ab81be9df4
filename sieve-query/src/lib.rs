//! # sieve-query
//!
//! Schema-checked filter expressions for sieve.
//!
//! This crate provides the filter core:
//! - Filter trees of nested AND/OR groups over field/operator/value conditions
//! - A field schema registry declaring types, operators and filterability
//! - A validator that reports every problem in a filter at once
//! - A structured predicate compiler for ORM-style executors
//! - A literal SQL compiler with typed, escaped values
//! - An orchestration service over an injected [`QueryExecutor`]
//!
//! ## Filters
//!
//! Filters usually arrive as JSON:
//!
//! ```rust
//! use sieve_query::FilterDefinition;
//!
//! let filter: FilterDefinition = serde_json::from_str(r#"{
//!     "and": [{"field": "age", "operator": "between", "value": [30, 40]}],
//!     "or": [
//!         {"field": "role", "operator": "eq", "value": "admin"},
//!         {"field": "email", "operator": "ends_with", "value": "@example.com"}
//!     ]
//! }"#).unwrap();
//!
//! assert_eq!(filter.condition_count(), 3);
//! ```
//!
//! ## Validation and Compilation
//!
//! ```rust
//! use std::sync::Arc;
//! use sieve_query::prelude::*;
//!
//! let registry = Arc::new(FieldRegistry::new([
//!     FieldSchema::new("age", FieldType::Number).operators([Operator::Gt]),
//!     FieldSchema::new("password", FieldType::String).not_filterable(),
//! ]).unwrap());
//!
//! let bad = FilterGroup::all([FilterCondition::new("password", Operator::Eq, "hunter2")]);
//! let errors = FilterValidator::new(registry.clone()).validate(&bad);
//! assert_eq!(errors[0].message, "Field 'password' is not filterable");
//!
//! let good = FilterGroup::all([FilterCondition::new("age", Operator::Gt, 30)]);
//! let sql = SqlCompiler::new(registry).compile(&good, "users").unwrap();
//! assert_eq!(sql.query, r#"SELECT * FROM "users" WHERE ("age" > 30)"#);
//!
//! let predicate = PredicateCompiler::new().compile(&good).unwrap();
//! assert_eq!(predicate.to_json(), serde_json::json!({"age": {"gt": 30}}));
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use sieve_query::{QueryError, ErrorCode};
//!
//! let err = QueryError::validation_failed(["Field 'nope' does not exist"]);
//! assert_eq!(err.code, ErrorCode::InvalidFilter);
//! assert_eq!(err.http_status(), 400);
//! ```

pub mod coerce;
pub mod env;
pub mod error;
pub mod executor;
pub mod filter;
pub mod logging;
pub mod predicate;
pub mod schema;
pub mod service;
pub mod sql;
pub mod validate;

pub use error::{ErrorCode, ErrorContext, QueryError, QueryResult};
pub use executor::{ExecutorError, MemoryExecutor, QueryExecutor, Record};
pub use filter::{
    FilterCondition, FilterDefinition, FilterGroup, FilterNode, FilterValue, Operator,
    UnknownOperator,
};
pub use predicate::{Predicate, PredicateCompiler};
pub use schema::{FieldRegistry, FieldSchema, FieldType};
pub use service::{CompiledQuery, CompilerMode, FilterService, ServiceConfig};
pub use sql::{SqlCompiler, SqlQuery};
pub use validate::{FilterValidator, ValidationError};

// Re-export env sources
pub use env::{EnvSource, MapEnvSource, StdEnvSource};

// Re-export logging utilities
pub use logging::{LogSettings, init as init_logging, init_with_level, is_debug_enabled};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{ErrorCode, QueryError, QueryResult};
    pub use crate::executor::{QueryExecutor, Record};
    pub use crate::filter::{
        FilterCondition, FilterDefinition, FilterGroup, FilterNode, FilterValue, Operator,
    };
    pub use crate::predicate::{Predicate, PredicateCompiler};
    pub use crate::schema::{FieldRegistry, FieldSchema, FieldType};
    pub use crate::service::{CompiledQuery, CompilerMode, FilterService, ServiceConfig};
    pub use crate::sql::{SqlCompiler, SqlQuery};
    pub use crate::validate::{FilterValidator, ValidationError};
}
