//! Reading filter payloads off the wire.

use serde::Deserialize;
use sieve_query::{CompilerMode, FilterDefinition, FilterGroup, FilterNode, QueryError};
use tracing::debug;

use crate::error::ApiError;

/// Size limits applied before a filter reaches the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterLimits {
    /// Largest accepted request body.
    pub max_body_bytes: usize,
    /// Deepest accepted group nesting.
    pub max_depth: usize,
    /// Most conditions accepted in one filter.
    pub max_conditions: usize,
}

impl Default for FilterLimits {
    fn default() -> Self {
        Self {
            max_body_bytes: 64 * 1024,
            max_depth: 8,
            max_conditions: 100,
        }
    }
}

impl FilterLimits {
    /// Reject filters that nest too deeply or carry too many conditions.
    pub fn check(&self, filter: &FilterDefinition) -> Result<(), QueryError> {
        let depth = filter.depth();
        if depth > self.max_depth {
            return Err(QueryError::too_complex(format!(
                "Filter nesting depth {} exceeds the limit of {}",
                depth, self.max_depth
            )));
        }
        let conditions = filter.condition_count();
        if conditions > self.max_conditions {
            return Err(QueryError::too_complex(format!(
                "Filter has {} conditions, the limit is {}",
                conditions, self.max_conditions
            )));
        }
        Ok(())
    }
}

/// A filter as posted by callers: the root group plus the compiler flag.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterRequest {
    /// Children that must all match.
    #[serde(default)]
    pub and: Option<Vec<FilterNode>>,
    /// Children of which at least one must match.
    #[serde(default)]
    pub or: Option<Vec<FilterNode>>,
    /// `"sql"` selects the SQL compiler. Anything else, or nothing, selects
    /// the structured one.
    #[serde(default)]
    pub config: Option<String>,
}

impl FilterRequest {
    /// Parse a JSON payload. Blank input is an empty filter.
    pub fn from_json(payload: &[u8]) -> Result<Self, ApiError> {
        if payload.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(payload)
            .map_err(|e| QueryError::malformed(format!("Invalid filter structure: {}", e)).into())
    }

    /// Split into the filter tree and the compiler mode, enforcing `limits`.
    pub fn into_parts(self, limits: &FilterLimits) -> Result<(FilterDefinition, CompilerMode), ApiError> {
        let mode = CompilerMode::from_flag(self.config.as_deref());

        let filter = FilterGroup {
            and: self.and,
            or: self.or,
        };
        limits.check(&filter)?;

        debug!(
            mode = %mode,
            conditions = filter.condition_count(),
            depth = filter.depth(),
            "Parsed filter request"
        );
        Ok((filter, mode))
    }
}

/// Query string of `GET /filter`.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterParams {
    /// URI-encoded JSON filter.
    pub filter: Option<String>,
}

impl FilterParams {
    /// Parse the `filter` parameter.
    pub fn into_request(self) -> Result<FilterRequest, ApiError> {
        let encoded = self
            .filter
            .ok_or_else(|| ApiError::bad_request("Missing 'filter' query parameter"))?;
        serde_json::from_str(&encoded).map_err(|_| {
            QueryError::malformed("Invalid encoded filter format. Expected URI encoded JSON.").into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use sieve_query::ErrorCode;

    #[test]
    fn test_blank_body_is_empty_filter() {
        let (filter, mode) = FilterRequest::from_json(b"  \n")
            .unwrap()
            .into_parts(&FilterLimits::default())
            .unwrap();
        assert!(filter.is_empty());
        assert_eq!(mode, CompilerMode::Structured);
    }

    #[test]
    fn test_config_selects_mode() {
        let request = FilterRequest::from_json(
            br#"{"and": [{"field": "age", "operator": "gt", "value": 1}], "config": "sql"}"#,
        )
        .unwrap();
        let (filter, mode) = request.into_parts(&FilterLimits::default()).unwrap();
        assert_eq!(mode, CompilerMode::Sql);
        assert_eq!(filter.condition_count(), 1);
    }

    #[test]
    fn test_unknown_config_is_structured() {
        for payload in [
            &br#"{"config": "orm"}"#[..],
            br#"{"config": "prisma"}"#,
            br#"{"config": "SQL"}"#,
            br#"{"config": ""}"#,
        ] {
            let (_, mode) = FilterRequest::from_json(payload)
                .unwrap()
                .into_parts(&FilterLimits::default())
                .unwrap();
            assert_eq!(mode, CompilerMode::Structured);
        }
    }

    #[test]
    fn test_unknown_keys_and_operators_rejected() {
        assert!(FilterRequest::from_json(br#"{"where": []}"#).is_err());
        assert!(
            FilterRequest::from_json(br#"{"and": [{"field": "age", "operator": "like", "value": 1}]}"#)
                .is_err()
        );
        let err = FilterRequest::from_json(b"{not json").unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.message().starts_with("Invalid filter structure: "));
    }

    #[test]
    fn test_limits() {
        let limits = FilterLimits {
            max_depth: 2,
            max_conditions: 2,
            ..FilterLimits::default()
        };

        let deep = br#"{"and": [{"or": [{"and": [{"field": "a", "operator": "eq", "value": 1}]}]}]}"#;
        let err = FilterRequest::from_json(deep).unwrap().into_parts(&limits).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let wide = br#"{"and": [
            {"field": "a", "operator": "eq", "value": 1},
            {"field": "b", "operator": "eq", "value": 2},
            {"field": "c", "operator": "eq", "value": 3}
        ]}"#;
        let err = FilterRequest::from_json(wide).unwrap().into_parts(&limits).unwrap_err();
        assert!(err.message().contains("3 conditions"));

        let filter = FilterGroup::default();
        assert!(limits.check(&filter).is_ok());
        let too_complex = QueryError::too_complex("x");
        assert_eq!(too_complex.code, ErrorCode::FilterTooComplex);
    }

    #[test]
    fn test_query_param() {
        let params = FilterParams {
            filter: Some(r#"{"or": [{"field": "role", "operator": "eq", "value": "admin"}]}"#.into()),
        };
        assert!(params.into_request().is_ok());

        let missing = FilterParams { filter: None };
        assert_eq!(missing.into_request().unwrap_err().status(), StatusCode::BAD_REQUEST);

        let garbage = FilterParams {
            filter: Some("%7Bnope".into()),
        };
        assert!(garbage.into_request().is_err());
    }
}
