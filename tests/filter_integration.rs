//! Integration tests for filtering the demo `users` entity.
//!
//! These tests exercise the whole pipeline:
//! - Validation against the users schema
//! - Literal SQL compilation (snapshotted)
//! - Structured compilation and in-memory execution
//! - The HTTP surface, end to end

#![cfg(feature = "server")]

use std::sync::Arc;

use axum::body::{Body, to_bytes};
use http::{Request, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tower::ServiceExt;

use sieve::http::{AppState, FilterLimits, router};
use sieve::prelude::*;
use sieve::query::MemoryExecutor;
use sieve::users;

fn filter(value: Value) -> FilterDefinition {
    serde_json::from_value(value).unwrap()
}

fn sql(value: Value) -> String {
    SqlCompiler::new(users::registry().unwrap())
        .compile(&filter(value), users::ENTITY)
        .unwrap()
        .query
}

fn memory_service() -> FilterService<MemoryExecutor> {
    FilterService::new(
        users::registry().unwrap(),
        MemoryExecutor::new().with_table(users::ENTITY, users::sample_users()),
        users::service_config(users::ENTITY),
    )
}

async fn structured_names(value: Value) -> Vec<String> {
    let mut names: Vec<String> = memory_service()
        .filter(&filter(value), CompilerMode::Structured)
        .await
        .unwrap()
        .into_iter()
        .map(|row| row["name"].as_str().unwrap().to_string())
        .collect();
    names.sort();
    names
}

// ============== Validation ==============

#[test]
fn test_password_is_never_filterable() {
    let validator = FilterValidator::new(users::registry().unwrap());
    for operator in Operator::ALL {
        let condition = FilterCondition::new("password", operator, "x");
        let nested = FilterGroup::all([FilterGroup::any([condition.clone()])]);
        for tree in [FilterGroup::all([condition.clone()]), nested] {
            let errors = validator.validate(&tree);
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].message, "Field 'password' is not filterable");
        }
    }
}

#[test]
fn test_mixed_group_reports_only_invalid_conditions() {
    let validator = FilterValidator::new(users::registry().unwrap());
    let errors = validator.validate(&filter(json!({
        "and": [
            {"field": "age", "operator": "gt", "value": 30},
            {"field": "age", "operator": "contains", "value": "3"}
        ],
        "or": [
            {"field": "role", "operator": "eq", "value": "admin"},
            {"field": "createdAt", "operator": "gt", "value": "someday"}
        ]
    })));

    let messages: Vec<_> = errors.iter().map(ToString::to_string).collect();
    assert_eq!(
        messages,
        [
            "Operator 'contains' is not allowed for field 'age'",
            "Value 'someday' is not a valid date",
        ]
    );
}

// ============== SQL compilation ==============

#[test]
fn test_sql_snapshots() {
    insta::assert_snapshot!(sql(json!({})), @r#"SELECT * FROM "users""#);

    insta::assert_snapshot!(
        sql(json!({"and": [{"field": "age", "operator": "between", "value": [30, 40]}]})),
        @r#"SELECT * FROM "users" WHERE ("age" BETWEEN 30 AND 40)"#
    );

    insta::assert_snapshot!(
        sql(json!({
            "and": [{"field": "isActive", "operator": "eq", "value": true}],
            "or": [
                {"field": "role", "operator": "in", "value": ["admin", "moderator"]},
                {"field": "email", "operator": "ends_with", "value": "@example.com"}
            ]
        })),
        @r#"SELECT * FROM "users" WHERE ("isActive" = true) AND ("role" IN ('admin'::role, 'moderator'::role) OR "email" ILIKE '%@example.com')"#
    );

    insta::assert_snapshot!(
        sql(json!({"and": [
            {"field": "createdAt", "operator": "gte", "value": "2024-03-01"},
            {"field": "id", "operator": "neq", "value": "550e8400-e29b-41d4-a716-446655440001"}
        ]})),
        @r#"SELECT * FROM "users" WHERE ("createdAt" >= '2024-03-01T00:00:00.000Z' AND "id" != '550e8400-e29b-41d4-a716-446655440001')"#
    );
}

#[test]
fn test_sql_escapes_quotes() {
    insta::assert_snapshot!(
        sql(json!({"and": [{"field": "name", "operator": "eq", "value": "O'Brien"}]})),
        @r#"SELECT * FROM "users" WHERE ("name" = 'O''Brien')"#
    );
}

// ============== Structured compilation ==============

#[test]
fn test_structured_single_clause_collapses() {
    let predicate = PredicateCompiler::new()
        .compile(&filter(json!({"and": [{"field": "role", "operator": "eq", "value": "admin"}]})))
        .unwrap();
    assert_eq!(predicate.to_json(), json!({"role": {"equals": "admin"}}));
}

#[test]
fn test_structured_compilation_is_idempotent() {
    let value = json!({
        "and": [{"field": "age", "operator": "between", "value": [30, 40]}],
        "or": [{"field": "name", "operator": "contains", "value": "o"}]
    });
    let compiler = PredicateCompiler::new();
    let first = compiler.compile(&filter(value.clone())).unwrap();
    let second = compiler.compile(&filter(value)).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        first.to_json(),
        json!({"AND": [
            {"age": {"gte": 30, "lte": 40}},
            {"name": {"contains": "o", "mode": "insensitive"}}
        ]})
    );
}

// ============== Execution ==============

#[tokio::test]
async fn test_empty_filter_returns_every_user_without_password() {
    let rows = memory_service()
        .filter(&FilterGroup::new(), CompilerMode::Structured)
        .await
        .unwrap();
    assert_eq!(rows.len(), 5);
    assert!(rows.iter().all(|row| !row.contains_key("password")));
    assert!(rows.iter().all(|row| row.len() == users::PUBLIC_COLUMNS.len()));
}

#[tokio::test]
async fn test_structured_execution() {
    assert_eq!(
        structured_names(json!({"and": [{"field": "role", "operator": "eq", "value": "admin"}]})).await,
        ["Admin User", "Alice Brown"]
    );
    assert_eq!(
        structured_names(json!({"and": [{"field": "age", "operator": "between", "value": [30, 40]}]})).await,
        ["Admin User", "Jane Smith"]
    );
    assert_eq!(
        structured_names(json!({
            "and": [{"field": "isActive", "operator": "eq", "value": true}],
            "or": [
                {"field": "name", "operator": "starts_with", "value": "bob"},
                {"field": "createdAt", "operator": "gte", "value": "2024-05-01"}
            ]
        }))
        .await,
        ["Alice Brown", "Bob Wilson"]
    );
    assert_eq!(
        structured_names(json!({"and": [
            {"field": "id", "operator": "in", "value": ["550E8400-E29B-41D4-A716-446655440003"]}
        ]}))
        .await,
        ["Jane Smith"]
    );
}

#[tokio::test]
async fn test_rejected_filter_never_reaches_executor() {
    let err = memory_service()
        .filter(
            &filter(json!({"and": [
                {"field": "age", "operator": "gt", "value": 30},
                {"field": "age", "operator": "between", "value": [30]}
            ]})),
            CompilerMode::Structured,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidFilter);
    assert_eq!(err.http_status(), 400);
    assert_eq!(
        err.message,
        "Filter validation failed: Operator 'between' requires exactly two values"
    );
}

// ============== HTTP ==============

async fn call(request: Request<Body>) -> (StatusCode, Value) {
    let executor: Arc<dyn QueryExecutor> =
        Arc::new(MemoryExecutor::new().with_table(users::ENTITY, users::sample_users()));
    let service = FilterService::new(
        users::registry().unwrap(),
        executor,
        users::service_config(users::ENTITY),
    );
    let app = router(AppState::new(service, FilterLimits::default()));

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn post(body: Value) -> Request<Body> {
    Request::post("/users/filter")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_http_filter_by_role() {
    let (status, body) = call(post(json!({
        "and": [{"field": "role", "operator": "eq", "value": "admin"}],
        "config": "prisma"
    })))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isError"], false);
    assert_eq!(body["body"]["message"], "Users filtered successfully");
    let data = body["body"]["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert!(data.iter().all(|user| user["role"] == "admin"));
}

#[tokio::test]
async fn test_http_rejections() {
    let cases = [
        (
            json!({"and": [{"field": "password", "operator": "eq", "value": "test"}]}),
            "not filterable",
        ),
        (
            json!({"and": [{"field": "age", "operator": "contains", "value": "3"}]}),
            "not allowed for field",
        ),
        (
            json!({"and": [{"field": "isActive", "operator": "gt", "value": true}]}),
            "not allowed for field",
        ),
        (
            json!({"and": [{"field": "age", "operator": "eq", "value": "thirty"}]}),
            "is not a valid number",
        ),
    ];

    for (payload, expected) in cases {
        let (status, body) = call(post(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["isError"], true);
        let message = body["body"]["message"].as_str().unwrap();
        assert!(message.contains(expected), "{}", message);
    }
}

#[tokio::test]
async fn test_http_too_complex() {
    let conditions: Vec<Value> = (0..101)
        .map(|i| json!({"field": "age", "operator": "gt", "value": i}))
        .collect();
    let (status, body) = call(post(json!({"and": conditions}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["body"]["code"], "S1005");
}
