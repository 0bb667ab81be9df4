//! The demo `users` entity: field schema, public columns and seed rows.
//!
//! `password` is declared but not filterable, and is left out of
//! [`PUBLIC_COLUMNS`], so it can neither be filtered on nor returned.

use std::sync::Arc;

use serde_json::{Value, json};
use sieve_query::{
    FieldRegistry, FieldSchema, FieldType, Operator, QueryResult, Record, ServiceConfig,
};

/// Entity and table name.
pub const ENTITY: &str = "users";

/// Columns returned to callers.
pub const PUBLIC_COLUMNS: [&str; 7] = ["id", "email", "name", "age", "role", "isActive", "createdAt"];

/// Name of the PostgreSQL enum backing `role`.
pub const ROLE_TYPE: &str = "role";

/// Field schema of the entity.
pub fn fields() -> Vec<FieldSchema> {
    use Operator::*;

    let text = [Eq, Neq, Contains, StartsWith, EndsWith];
    vec![
        FieldSchema::new("id", FieldType::Uuid).operators([Eq, Neq, In]),
        FieldSchema::new("email", FieldType::String).operators(text),
        FieldSchema::new("name", FieldType::String).operators(text),
        FieldSchema::new("age", FieldType::Number).operators([Eq, Neq, Gt, Lt, Gte, Lte, Between, In]),
        FieldSchema::new("role", FieldType::Enum)
            .operators([Eq, Neq, In])
            .enum_type(ROLE_TYPE),
        FieldSchema::new("isActive", FieldType::Boolean).operators([Eq, Neq]),
        FieldSchema::new("createdAt", FieldType::Date).operators([Eq, Neq, Gt, Lt, Gte, Lte, Between]),
        FieldSchema::new("password", FieldType::String).not_filterable(),
    ]
}

/// Shared registry over [`fields`].
pub fn registry() -> QueryResult<Arc<FieldRegistry>> {
    FieldRegistry::new(fields()).map(Arc::new)
}

/// Service configuration querying `table` and returning [`PUBLIC_COLUMNS`].
pub fn service_config(table: &str) -> ServiceConfig {
    ServiceConfig::new(table).projection(PUBLIC_COLUMNS)
}

/// Seed rows, as stored (including `password`).
pub fn sample_users() -> Vec<Record> {
    [
        json!({
            "id": "550e8400-e29b-41d4-a716-446655440001",
            "email": "admin@example.com",
            "name": "Admin User",
            "age": 35,
            "role": "admin",
            "isActive": true,
            "createdAt": "2024-01-15T10:30:00.000Z",
            "password": "hashedPassword1"
        }),
        json!({
            "id": "550e8400-e29b-41d4-a716-446655440002",
            "email": "john.doe@example.com",
            "name": "John Doe",
            "age": 28,
            "role": "user",
            "isActive": true,
            "createdAt": "2024-02-20T08:00:00.000Z",
            "password": "hashedPassword2"
        }),
        json!({
            "id": "550e8400-e29b-41d4-a716-446655440003",
            "email": "jane.smith@example.com",
            "name": "Jane Smith",
            "age": 32,
            "role": "moderator",
            "isActive": false,
            "createdAt": "2024-03-05T14:45:00.000Z",
            "password": "hashedPassword3"
        }),
        json!({
            "id": "550e8400-e29b-41d4-a716-446655440004",
            "email": "bob.wilson@example.com",
            "name": "Bob Wilson",
            "age": 45,
            "role": "user",
            "isActive": true,
            "createdAt": "2024-04-10T09:15:00.000Z",
            "password": "hashedPassword4"
        }),
        json!({
            "id": "550e8400-e29b-41d4-a716-446655440005",
            "email": "alice.brown@example.com",
            "name": "Alice Brown",
            "age": 29,
            "role": "admin",
            "isActive": true,
            "createdAt": "2024-05-25T16:20:00.000Z",
            "password": "hashedPassword5"
        }),
    ]
    .into_iter()
    .filter_map(|row| match row {
        Value::Object(map) => Some(map),
        _ => None,
    })
    .collect()
}
