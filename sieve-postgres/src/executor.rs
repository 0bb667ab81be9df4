//! [`QueryExecutor`] backed by a PostgreSQL pool.

use async_trait::async_trait;
use sieve_query::sql::escape_identifier;
use sieve_query::{ExecutorError, Predicate, QueryExecutor, Record};
use tokio_postgres::types::ToSql;
use tracing::debug;

use crate::error::PgResult;
use crate::pool::PgPool;
use crate::row::rows_to_records;
use crate::types::bind_params;

/// Runs sieve queries on PostgreSQL.
///
/// Structured predicates become parameterized statements through
/// [`Predicate::to_sql`] and are prepared once per connection. Literal SQL
/// runs as-is.
#[derive(Clone, Debug)]
pub struct PgExecutor {
    pool: PgPool,
}

impl PgExecutor {
    /// Create an executor over a pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn select(
        &self,
        entity: &str,
        predicate: &Predicate,
        projection: &[String],
    ) -> PgResult<Vec<Record>> {
        let (sql, values) = select_statement(entity, predicate, projection);
        debug!(sql = %sql, params = values.len(), "Executing structured query");

        let client = self.pool.get().await?;
        let stmt = client.prepare_cached(&sql).await?;
        let params = bind_params(&values, stmt.params())?;
        let refs: Vec<&(dyn ToSql + Sync)> = params
            .iter()
            .map(|p| p.as_ref() as &(dyn ToSql + Sync))
            .collect();

        let rows = client.query(&stmt, &refs).await?;
        rows_to_records(&rows)
    }

    async fn raw(&self, sql: &str) -> PgResult<Vec<Record>> {
        debug!(sql = %sql, "Executing raw query");
        let client = self.pool.get().await?;
        let rows = client.query(sql, &[]).await?;
        rows_to_records(&rows)
    }

    async fn select_one(&self) -> PgResult<()> {
        let client = self.pool.get().await?;
        client.query_one("SELECT 1", &[]).await?;
        Ok(())
    }
}

/// Build the parameterized `SELECT` for a structured query.
pub fn select_statement(
    entity: &str,
    predicate: &Predicate,
    projection: &[String],
) -> (String, Vec<sieve_query::FilterValue>) {
    let columns = if projection.is_empty() {
        "*".to_string()
    } else {
        projection
            .iter()
            .map(|c| escape_identifier(c))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut sql = format!("SELECT {} FROM {}", columns, escape_identifier(entity));
    if predicate.is_none() {
        return (sql, Vec::new());
    }

    let (clause, values) = predicate.to_sql(0);
    sql.push_str(" WHERE ");
    sql.push_str(&clause);
    (sql, values)
}

#[async_trait]
impl QueryExecutor for PgExecutor {
    async fn find_many(
        &self,
        entity: &str,
        predicate: &Predicate,
        projection: &[String],
    ) -> Result<Vec<Record>, ExecutorError> {
        Ok(self.select(entity, predicate, projection).await?)
    }

    async fn query_raw(&self, sql: &str) -> Result<Vec<Record>, ExecutorError> {
        Ok(self.raw(sql).await?)
    }

    async fn ping(&self) -> Result<(), ExecutorError> {
        Ok(self.select_one().await?)
    }
}
