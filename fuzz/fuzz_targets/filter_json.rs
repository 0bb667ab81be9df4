//! Fuzz target for filter JSON parsing.
//!
//! Feeds arbitrary bytes through the JSON decoder, then validates and
//! compiles whatever parses. Nothing on this path may panic.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_filter_json
//! ```

#![no_main]

use std::sync::Arc;

use libfuzzer_sys::fuzz_target;
use sieve_query::prelude::*;

fn registry() -> Arc<FieldRegistry> {
    use Operator::*;

    Arc::new(
        FieldRegistry::new([
            FieldSchema::new("id", FieldType::Uuid).operators([Eq, Neq, In]),
            FieldSchema::new("name", FieldType::String).operators([Eq, Contains, StartsWith, EndsWith]),
            FieldSchema::new("age", FieldType::Number).operators([Eq, Gt, Lte, Between, In]),
            FieldSchema::new("role", FieldType::Enum).operators([Eq, In]).enum_type("role"),
            FieldSchema::new("isActive", FieldType::Boolean).operators([Eq, Neq]),
            FieldSchema::new("createdAt", FieldType::Date).operators([Gte, Lt, Between]),
            FieldSchema::new("password", FieldType::String).not_filterable(),
        ])
        .unwrap(),
    )
}

fuzz_target!(|data: &[u8]| {
    let Ok(filter) = serde_json::from_slice::<FilterDefinition>(data) else {
        return;
    };

    // Skip inputs that would only exercise recursion depth
    if filter.depth() > 32 {
        return;
    }

    let registry = registry();
    let _ = FilterValidator::new(registry.clone()).validate(&filter);

    if let Ok(predicate) = PredicateCompiler::new().compile(&filter) {
        let _ = predicate.to_json();
        let _ = predicate.to_sql(0);
    }
    if let Ok(sql) = SqlCompiler::new(registry).compile(&filter, "users") {
        assert!(sql.query.starts_with(r#"SELECT * FROM "users""#));
    }
});
