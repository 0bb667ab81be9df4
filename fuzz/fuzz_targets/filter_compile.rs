//! Fuzz target for filter compilation.
//!
//! Builds arbitrary filter trees directly, skipping JSON, so the
//! validator and both compilers see operator/value shapes the parser
//! would rarely produce.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_filter_compile
//! ```

#![no_main]

use std::sync::Arc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sieve_query::prelude::*;

const FIELDS: [&str; 8] = ["id", "name", "age", "role", "isActive", "createdAt", "password", "nope"];

/// A fuzzable filter value.
#[derive(Debug, Arbitrary, Clone)]
enum FuzzValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<FuzzValue>),
}

impl From<FuzzValue> for FilterValue {
    fn from(val: FuzzValue) -> Self {
        match val {
            FuzzValue::Null => FilterValue::Null,
            FuzzValue::Bool(b) => FilterValue::Bool(b),
            FuzzValue::Int(i) => FilterValue::Int(i),
            FuzzValue::Float(f) => FilterValue::Float(f),
            FuzzValue::String(s) => FilterValue::String(s),
            FuzzValue::List(list) => FilterValue::List(list.into_iter().map(Into::into).collect()),
        }
    }
}

/// A fuzzable filter node.
#[derive(Debug, Arbitrary)]
enum FuzzNode {
    Condition {
        field: u8,
        operator: u8,
        value: Option<FuzzValue>,
    },
    Group {
        and: Option<Vec<FuzzNode>>,
        or: Option<Vec<FuzzNode>>,
    },
}

impl FuzzNode {
    fn into_node(self, depth: usize) -> FilterNode {
        match self {
            FuzzNode::Condition { field, operator, value } => FilterNode::Condition(FilterCondition {
                field: FIELDS[field as usize % FIELDS.len()].to_string(),
                operator: Operator::ALL[operator as usize % Operator::ALL.len()],
                value: value.map(Into::into),
            }),
            FuzzNode::Group { and, or } => FilterNode::Group(group(and, or, depth + 1)),
        }
    }
}

fn group(and: Option<Vec<FuzzNode>>, or: Option<Vec<FuzzNode>>, depth: usize) -> FilterGroup {
    // Limit recursion depth to prevent stack overflow
    if depth > 10 {
        return FilterGroup::new();
    }
    let convert = |nodes: Vec<FuzzNode>| -> Vec<FilterNode> {
        nodes.into_iter().map(|node| node.into_node(depth)).collect()
    };
    FilterGroup {
        and: and.map(convert),
        or: or.map(convert),
    }
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    and: Option<Vec<FuzzNode>>,
    or: Option<Vec<FuzzNode>>,
}

fuzz_target!(|input: FuzzInput| {
    use Operator::*;

    let registry = Arc::new(
        FieldRegistry::new([
            FieldSchema::new("id", FieldType::Uuid).operators([Eq, Neq, In]),
            FieldSchema::new("name", FieldType::String).operators([Eq, Contains, StartsWith]),
            FieldSchema::new("age", FieldType::Number).operators([Eq, Gt, Between, In, IsNull]),
            FieldSchema::new("role", FieldType::Enum).operators([Eq, In]).enum_type("role"),
            FieldSchema::new("isActive", FieldType::Boolean).operators([Eq, IsNotNull]),
            FieldSchema::new("createdAt", FieldType::Date).operators([Gte, Lt, Between]),
            FieldSchema::new("password", FieldType::String).not_filterable(),
        ])
        .unwrap(),
    );

    let filter = group(input.and, input.or, 0);
    let _ = FilterValidator::new(registry.clone()).validate(&filter);

    // Both compilers must fail cleanly, never panic
    if let Ok(predicate) = PredicateCompiler::new().compile(&filter) {
        let _ = predicate.to_sql(0);
    }
    let _ = SqlCompiler::new(registry).compile(&filter, "users");
});
