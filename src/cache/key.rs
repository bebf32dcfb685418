//! Cache Key Module
//!
//! Derives cache keys from a request path and its query parameters.
//!
//! Parameters are written as canonical JSON (object fields sorted at every
//! depth), so two logically identical parameter sets always produce the same
//! key regardless of insertion order.

use std::fmt;

use serde_json::Value;

/// Separates the path from the serialized parameters
pub const KEY_SEPARATOR: char = '|';

// == Cache Key ==
/// Deterministic key of the form `{path}|{canonical params}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Builds the key for a path and optional parameters.
    ///
    /// Absent, `null` and empty-object parameters all yield `{path}|`.
    pub fn new(path: &str, params: Option<&Value>) -> Self {
        let mut key = String::with_capacity(path.len() + 1);
        key.push_str(path);
        key.push(KEY_SEPARATOR);
        if let Some(params) = params.filter(|p| !is_empty_params(p)) {
            write_canonical(params, &mut key);
        }
        Self(key)
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the key starts with the given prefix.
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CacheKey> for String {
    fn from(key: CacheKey) -> Self {
        key.0
    }
}

fn is_empty_params(params: &Value) -> bool {
    match params {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

// == Canonical JSON ==
/// Serializes a JSON value with object fields in sorted order.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut fields: Vec<(&String, &Value)> = map.iter().collect();
            fields.sort_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (i, (name, field)) in fields.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                // Display on a JSON string value yields its quoted, escaped form
                out.push_str(&Value::String(name.clone()).to_string());
                out.push(':');
                write_canonical(field, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
