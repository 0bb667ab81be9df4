//! Structured and SQL compilation must select the same rows.
//!
//! Needs a PostgreSQL seeded with `sql/users.sql`:
//!
//! ```bash
//! psql "$DATABASE_URL" -f sql/users.sql
//! cargo test --test postgres_live -- --ignored
//! ```

#![cfg(feature = "server")]

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use sieve::postgres::{PgExecutor, PgPool};
use sieve::prelude::*;
use sieve::users;

fn service() -> FilterService<Arc<PgExecutor>> {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPool::builder().url(url).max_connections(2).build().unwrap();
    FilterService::new(
        users::registry().unwrap(),
        Arc::new(PgExecutor::new(pool)),
        users::service_config(users::ENTITY),
    )
}

fn ids(rows: Vec<Record>) -> Vec<String> {
    let mut ids: Vec<String> = rows
        .iter()
        .map(|row| row["id"].as_str().unwrap().to_string())
        .collect();
    ids.sort();
    ids
}

fn cases() -> Vec<Value> {
    vec![
        json!({}),
        json!({"and": [{"field": "role", "operator": "eq", "value": "admin"}]}),
        json!({"and": [{"field": "age", "operator": "between", "value": [30, 40]}]}),
        json!({"and": [{"field": "role", "operator": "in", "value": ["user", "moderator"]}]}),
        json!({
            "and": [{"field": "isActive", "operator": "eq", "value": true}],
            "or": [
                {"field": "name", "operator": "starts_with", "value": "bob"},
                {"field": "createdAt", "operator": "gte", "value": "2024-05-01"}
            ]
        }),
        json!({"or": [
            {"field": "email", "operator": "contains", "value": "SMITH"},
            {"field": "id", "operator": "eq", "value": "550e8400-e29b-41d4-a716-446655440004"}
        ]}),
        json!({"and": [
            {"field": "age", "operator": "neq", "value": 28},
            {"or": [
                {"field": "createdAt", "operator": "lt", "value": "2024-03-01T00:00:00Z"},
                {"field": "name", "operator": "ends_with", "value": "wilson"}
            ]}
        ]}),
    ]
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a database seeded with sql/users.sql"]
async fn test_structured_and_sql_select_the_same_rows() {
    let service = service();
    service.ping().await.unwrap();

    for case in cases() {
        let filter: FilterDefinition = serde_json::from_value(case.clone()).unwrap();
        let structured = service.filter(&filter, CompilerMode::Structured).await.unwrap();
        let sql = service.filter(&filter, CompilerMode::Sql).await.unwrap();

        assert!(structured.iter().chain(&sql).all(|row| !row.contains_key("password")));
        assert_eq!(ids(structured), ids(sql), "{}", case);
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a database seeded with sql/users.sql"]
async fn test_store_errors_are_execution_failures() {
    let pool = PgPool::builder()
        .url(std::env::var("DATABASE_URL").unwrap())
        .build()
        .unwrap();
    let service = FilterService::new(
        users::registry().unwrap(),
        PgExecutor::new(pool),
        users::service_config("no_such_table"),
    );

    let err = service
        .filter(&FilterGroup::new(), CompilerMode::Sql)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::DatabaseError);
    assert!(err.message.starts_with("Database query failed:"));
}
