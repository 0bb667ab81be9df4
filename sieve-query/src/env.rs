//! Environment variable access.
//!
//! Configuration is read through an [`EnvSource`] so tests can supply a
//! [`MapEnvSource`] instead of mutating the process environment.

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use crate::error::{QueryError, QueryResult};

/// Source for environment variables.
pub trait EnvSource: Send + Sync {
    /// Get an environment variable value.
    fn get(&self, name: &str) -> Option<String>;

    /// Check if a variable exists.
    fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Get a variable, treating empty values as unset.
    fn get_non_empty(&self, name: &str) -> Option<String> {
        self.get(name).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable or fall back to `default`.
    fn get_or(&self, name: &str, default: &str) -> String {
        self.get_non_empty(name)
            .unwrap_or_else(|| default.to_string())
    }

    /// Get a required variable.
    fn require(&self, name: &str) -> QueryResult<String> {
        self.get_non_empty(name)
            .ok_or_else(|| QueryError::missing_configuration(name))
    }

    /// Parse a variable, returning `None` when it is unset.
    fn parse<T>(&self, name: &str) -> QueryResult<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
        Self: Sized,
    {
        self.get_non_empty(name)
            .map(|raw| {
                raw.trim().parse::<T>().map_err(|e| {
                    QueryError::invalid_configuration(format!(
                        "{} has invalid value `{}`: {}",
                        name, raw, e
                    ))
                })
            })
            .transpose()
    }

    /// Interpret a variable as a flag (`true`, `1`, `yes`, case-insensitive).
    fn flag(&self, name: &str) -> bool {
        self.get(name)
            .is_some_and(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
    }
}

/// Default environment source using std::env.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdEnvSource;

impl EnvSource for StdEnvSource {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Environment source backed by a HashMap.
#[derive(Debug, Clone, Default)]
pub struct MapEnvSource {
    vars: HashMap<String, String>,
}

impl MapEnvSource {
    /// Create a new map-based environment source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl EnvSource for MapEnvSource {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}
