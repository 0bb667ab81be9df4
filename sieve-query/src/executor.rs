//! The data-access seam.
//!
//! The filter service never talks to a store directly. It hands compiled
//! queries to a [`QueryExecutor`], which database crates implement.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

use crate::predicate::Predicate;

/// A result row as a JSON object keyed by column name.
pub type Record = Map<String, Value>;

/// Failure reported by an executor.
#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    /// The store rejected or failed the query.
    #[error("{0}")]
    Query(String),

    /// The store could not be reached.
    #[error("connection error: {0}")]
    Connection(String),

    /// The executor cannot run this kind of query.
    #[error("{0} is not supported by this executor")]
    Unsupported(&'static str),
}

impl ExecutorError {
    /// Create a query error.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query(message.into())
    }

    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }
}

/// Runs compiled queries against a store.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Fetch the rows of `entity` matching `predicate`.
    ///
    /// An empty `projection` selects every column.
    async fn find_many(
        &self,
        entity: &str,
        predicate: &Predicate,
        projection: &[String],
    ) -> Result<Vec<Record>, ExecutorError>;

    /// Run a literal SQL statement.
    async fn query_raw(&self, sql: &str) -> Result<Vec<Record>, ExecutorError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), ExecutorError> {
        Ok(())
    }
}

#[async_trait]
impl<E: QueryExecutor + ?Sized> QueryExecutor for Arc<E> {
    async fn find_many(
        &self,
        entity: &str,
        predicate: &Predicate,
        projection: &[String],
    ) -> Result<Vec<Record>, ExecutorError> {
        (**self).find_many(entity, predicate, projection).await
    }

    async fn query_raw(&self, sql: &str) -> Result<Vec<Record>, ExecutorError> {
        (**self).query_raw(sql).await
    }

    async fn ping(&self) -> Result<(), ExecutorError> {
        (**self).ping().await
    }
}

/// Keep only the projected keys of a record. An empty projection keeps all.
pub fn project(record: Record, projection: &[String]) -> Record {
    if projection.is_empty() {
        return record;
    }
    record
        .into_iter()
        .filter(|(key, _)| projection.iter().any(|p| p == key))
        .collect()
}

/// An executor over in-memory records, keyed by entity name.
///
/// Structured predicates are evaluated with [`Predicate::matches`]. Literal
/// SQL cannot be run and fails with [`ExecutorError::Unsupported`].
#[derive(Debug, Clone, Default)]
pub struct MemoryExecutor {
    tables: HashMap<String, Vec<Record>>,
}

impl MemoryExecutor {
    /// Create an empty executor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity with its rows.
    pub fn with_table(mut self, entity: impl Into<String>, rows: Vec<Record>) -> Self {
        self.tables.insert(entity.into(), rows);
        self
    }

    /// Rows stored for an entity.
    pub fn rows(&self, entity: &str) -> &[Record] {
        self.tables.get(entity).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[async_trait]
impl QueryExecutor for MemoryExecutor {
    async fn find_many(
        &self,
        entity: &str,
        predicate: &Predicate,
        projection: &[String],
    ) -> Result<Vec<Record>, ExecutorError> {
        let rows = self
            .tables
            .get(entity)
            .ok_or_else(|| ExecutorError::query(format!("relation \"{}\" does not exist", entity)))?;

        let matched: Vec<Record> = rows
            .iter()
            .filter(|row| predicate.matches(row))
            .map(|row| project(row.clone(), projection))
            .collect();

        debug!(entity, rows = matched.len(), "In-memory query matched");
        Ok(matched)
    }

    async fn query_raw(&self, _sql: &str) -> Result<Vec<Record>, ExecutorError> {
        Err(ExecutorError::Unsupported("raw SQL"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterValue;
    use serde_json::json;

    fn executor() -> MemoryExecutor {
        let rows = [
            json!({"name": "Ann", "age": 30, "password": "x"}),
            json!({"name": "Ben", "age": 40, "password": "y"}),
        ]
        .into_iter()
        .filter_map(|v| v.as_object().cloned())
        .collect();
        MemoryExecutor::new().with_table("users", rows)
    }

    #[tokio::test]
    async fn test_memory_find_many_filters_and_projects() {
        let predicate = Predicate::Gt("age".into(), FilterValue::Int(35));
        let rows = executor()
            .find_many("users", &predicate, &["name".to_string(), "age".to_string()])
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("name"), Some(&json!("Ben")));
        assert!(!rows[0].contains_key("password"));
    }

    #[tokio::test]
    async fn test_memory_empty_projection_keeps_all_columns() {
        let rows = executor().find_many("users", &Predicate::None, &[]).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].contains_key("password"));
    }

    #[tokio::test]
    async fn test_memory_unknown_entity() {
        let err = executor()
            .find_many("orders", &Predicate::None, &[])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("orders"));
    }

    #[tokio::test]
    async fn test_memory_rejects_raw_sql() {
        let err = executor().query_raw("SELECT 1").await.unwrap_err();
        assert!(matches!(err, ExecutorError::Unsupported(_)));
        assert!(executor().ping().await.is_ok());
    }

    #[tokio::test]
    async fn test_arc_executor_delegates() {
        let shared: Arc<dyn QueryExecutor> = Arc::new(executor());
        let rows = shared.find_many("users", &Predicate::None, &[]).await.unwrap();
        assert_eq!(rows.len(), 2);
    }
}
