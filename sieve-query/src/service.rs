//! Filter orchestration: validate, compile, execute.
//!
//! ```rust
//! use std::sync::Arc;
//! use sieve_query::executor::MemoryExecutor;
//! use sieve_query::filter::Operator;
//! use sieve_query::schema::{FieldRegistry, FieldSchema, FieldType};
//! use sieve_query::service::{CompilerMode, FilterService, ServiceConfig};
//!
//! # tokio_test_block_on(async {
//! let registry = FieldRegistry::new([
//!     FieldSchema::new("age", FieldType::Number).operators([Operator::Gt]),
//! ])
//! .unwrap();
//! let rows = vec![serde_json::json!({"age": 41}).as_object().unwrap().clone()];
//! let executor = MemoryExecutor::new().with_table("users", rows);
//! let service = FilterService::new(Arc::new(registry), executor, ServiceConfig::new("users"));
//!
//! let filter = serde_json::from_str(r#"{"and": [{"field": "age", "operator": "gt", "value": 40}]}"#).unwrap();
//! let found = service.filter(&filter, CompilerMode::Structured).await.unwrap();
//! assert_eq!(found.len(), 1);
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{QueryError, QueryResult};
use crate::executor::{QueryExecutor, Record, project};
use crate::filter::FilterDefinition;
use crate::predicate::{Predicate, PredicateCompiler};
use crate::schema::FieldRegistry;
use crate::sql::{SqlCompiler, SqlQuery};
use crate::validate::FilterValidator;

/// Which compiler turns a filter into a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CompilerMode {
    /// Structured predicate for an ORM-style executor.
    #[default]
    #[serde(rename = "prisma")]
    Structured,
    /// Literal SQL statement.
    #[serde(rename = "sql")]
    Sql,
}

impl CompilerMode {
    /// Map a caller flag to a mode. `"sql"` selects SQL; anything else,
    /// including no flag, selects the structured compiler.
    pub fn from_flag(flag: Option<&str>) -> Self {
        match flag {
            Some("sql") => Self::Sql,
            _ => Self::Structured,
        }
    }

    /// Wire name of the mode.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Structured => "prisma",
            Self::Sql => "sql",
        }
    }
}

impl fmt::Display for CompilerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where and what the service queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Entity name passed to the executor on the structured path.
    pub entity: String,
    /// Table name used in compiled SQL.
    pub table: String,
    /// Columns returned to callers. Empty returns every column.
    pub projection: Vec<String>,
}

impl ServiceConfig {
    /// Query `name` as both entity and table, returning every column.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            entity: name.clone(),
            table: name,
            projection: Vec::new(),
        }
    }

    /// Use a different table name for compiled SQL.
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Only return these columns.
    pub fn projection<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = columns.into_iter().map(Into::into).collect();
        self
    }
}

/// Output of either compiler.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", content = "query", rename_all = "lowercase")]
pub enum CompiledQuery {
    /// A structured predicate.
    Structured(Predicate),
    /// A literal SQL statement.
    Sql(SqlQuery),
}

/// Validates filters, compiles them and runs them through an executor.
#[derive(Debug)]
pub struct FilterService<E> {
    validator: FilterValidator,
    predicates: PredicateCompiler,
    sql: SqlCompiler,
    executor: E,
    config: ServiceConfig,
}

impl<E: QueryExecutor> FilterService<E> {
    /// Create a service.
    pub fn new(registry: Arc<FieldRegistry>, executor: E, config: ServiceConfig) -> Self {
        Self {
            validator: FilterValidator::new(Arc::clone(&registry)),
            predicates: PredicateCompiler::new(),
            sql: SqlCompiler::new(registry),
            executor,
            config,
        }
    }

    /// The service configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// The executor.
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Validate and compile without executing.
    pub fn compile(&self, filter: &FilterDefinition, mode: CompilerMode) -> QueryResult<CompiledQuery> {
        let errors = self.validator.validate(filter);
        if !errors.is_empty() {
            warn!(
                entity = %self.config.entity,
                errors = errors.len(),
                "Rejected filter"
            );
            return Err(QueryError::validation_failed(errors.iter().map(ToString::to_string))
                .with_entity(&self.config.entity));
        }

        let compiled = match mode {
            CompilerMode::Structured => CompiledQuery::Structured(self.predicates.compile(filter)?),
            CompilerMode::Sql => CompiledQuery::Sql(self.sql.compile(filter, &self.config.table)?),
        };
        Ok(compiled)
    }

    /// Validate, compile and execute a filter.
    pub async fn filter(&self, filter: &FilterDefinition, mode: CompilerMode) -> QueryResult<Vec<Record>> {
        let compiled = self.compile(filter, mode)?;
        debug!(entity = %self.config.entity, mode = %mode, "Executing filter");

        let rows = match &compiled {
            CompiledQuery::Structured(predicate) => self
                .executor
                .find_many(&self.config.entity, predicate, &self.config.projection)
                .await
                .map_err(|e| self.execution_failed(e).with_context("find_many"))?,
            CompiledQuery::Sql(query) => self
                .executor
                .query_raw(query.as_str())
                .await
                .map_err(|e| {
                    self.execution_failed(e)
                        .with_context("query_raw")
                        .with_sql(query.as_str())
                })?
                .into_iter()
                .map(|row| project(row, &self.config.projection))
                .collect(),
        };

        debug!(entity = %self.config.entity, rows = rows.len(), "Filter executed");
        Ok(rows)
    }

    /// Check the executor can reach its store.
    pub async fn ping(&self) -> QueryResult<()> {
        self.executor
            .ping()
            .await
            .map_err(|e| self.execution_failed(e).with_context("ping"))
    }

    fn execution_failed(&self, cause: crate::executor::ExecutorError) -> QueryError {
        warn!(entity = %self.config.entity, error = %cause, "Executor failed");
        QueryError::execution_failed(&cause).with_entity(&self.config.entity)
    }
}
