//! Credential sources for bearer authentication
//!
//! The token is looked up on every request and never cached by the client,
//! so a login or logout elsewhere in the process takes effect on the next call.

use std::collections::HashMap;
use std::env;
use std::fmt;

use parking_lot::RwLock;

/// Key under which the bearer token is stored
pub const TOKEN_KEY: &str = "hextech.jwt";

// == Credential Store ==
/// Read-only key/value view over wherever the application keeps its token.
///
/// A missing key is not an error; requests then go out unauthenticated.
pub trait CredentialStore: Send + Sync + fmt::Debug {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Returns the bearer token, treating an empty value as absent.
    fn token(&self) -> Option<String> {
        self.get(TOKEN_KEY).filter(|t| !t.trim().is_empty())
    }
}

// == Memory Store ==
/// In-process store, written by login/logout flows.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding a bearer token.
    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store.set(TOKEN_KEY, token);
        store
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.values.write().insert(key.into(), value.into());
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.values.write().remove(key)
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }
}

// == Environment Store ==
/// Reads keys from environment variables.
///
/// `hextech.jwt` maps to `HEXTECH_JWT`: ASCII letters are upper-cased and any
/// other non-alphanumeric character becomes `_`.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvCredentialStore;

impl EnvCredentialStore {
    /// Returns the environment variable consulted for `key`.
    pub fn var_name(key: &str) -> String {
        key.chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect()
    }
}

impl CredentialStore for EnvCredentialStore {
    fn get(&self, key: &str) -> Option<String> {
        env::var(Self::var_name(key)).ok()
    }
}
