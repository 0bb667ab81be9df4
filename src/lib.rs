//! # Sieve
//!
//! Schema-checked filter expressions for APIs.
//!
//! Callers send nested AND/OR trees of `{field, operator, value}` conditions.
//! Sieve checks them against a declared field schema and compiles them into
//! either a structured predicate for an ORM-style executor or a literal SQL
//! statement.
//!
//! Sieve provides:
//! - The filter core: schema registry, validator and both compilers
//! - A PostgreSQL executor with connection pooling
//! - An axum HTTP surface with a JSON response envelope
//! - A demo `users` entity wired into the `sieve-server` binary
//!
//! ## Quick Start
//!
//! ```rust
//! use sieve::prelude::*;
//! use sieve::users;
//!
//! let registry = users::registry().unwrap();
//! let filter: FilterDefinition = serde_json::from_str(r#"{
//!     "and": [{"field": "role", "operator": "eq", "value": "admin"}],
//!     "or": [{"field": "age", "operator": "gt", "value": 30}]
//! }"#).unwrap();
//!
//! assert!(FilterValidator::new(registry.clone()).validate(&filter).is_empty());
//!
//! let sql = SqlCompiler::new(registry).compile(&filter, "users").unwrap();
//! assert_eq!(
//!     sql.as_str(),
//!     r#"SELECT * FROM "users" WHERE ("role" = 'admin'::role) AND ("age" > 30)"#
//! );
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod users;

/// The filter core.
pub mod query {
    pub use sieve_query::*;
}

/// PostgreSQL executor.
#[cfg(feature = "server")]
pub mod postgres {
    pub use sieve_postgres::*;
}

/// HTTP surface.
#[cfg(feature = "server")]
pub mod http {
    pub use sieve_axum::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use sieve_query::prelude::*;
}

// Re-export key types at the crate root
pub use sieve_query::{FilterDefinition, FilterService, QueryError, QueryResult};
