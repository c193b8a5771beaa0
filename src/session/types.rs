//! Session identifiers and the payload exchanged with callers.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of a live session.
///
/// Never parsed; only compared and hashed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Fencing token for optimistic concurrency on a session payload.
///
/// Rotated on every accepted save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConsistencyToken(String);

impl ConsistencyToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ConsistencyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snapshot of a session's key-value data together with the token it was read at.
///
/// Values handed out by the manager are owned copies; mutating one has no
/// effect on the stored record until it is passed back to `save_store`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStore {
    #[serde(default)]
    pub data: HashMap<String, String>,
    pub consistency_token: ConsistencyToken,
}

impl SessionStore {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.data.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.data.remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_store_serializes_with_flat_token() {
        let mut store = SessionStore {
            data: HashMap::new(),
            consistency_token: ConsistencyToken::new("tok-1"),
        };
        store.insert("user", "alice");

        let json = serde_json::to_value(&store).unwrap();
        assert_eq!(json["consistency_token"], "tok-1");
        assert_eq!(json["data"]["user"], "alice");
    }

    #[test]
    fn session_store_helpers_edit_data() {
        let mut store = SessionStore::default();
        assert_eq!(store.insert("theme", "dark"), None);
        assert_eq!(store.insert("theme", "light"), Some("dark".to_string()));
        assert_eq!(store.get("theme"), Some("light"));

        assert_eq!(store.remove("theme"), Some("light".to_string()));
        assert_eq!(store.remove("theme"), None);
        assert!(store.data.is_empty());
    }

    #[test]
    fn session_store_data_defaults_to_empty() {
        let store: SessionStore =
            serde_json::from_str(r#"{"consistency_token":"abc"}"#).unwrap();
        assert!(store.data.is_empty());
        assert_eq!(store.consistency_token.as_str(), "abc");
    }

    #[test]
    fn session_id_displays_raw_value() {
        let id = SessionId::from("0b7c");
        assert_eq!(id.to_string(), "0b7c");
        assert!(!id.is_empty());
        assert!(SessionId::new("").is_empty());
    }
}
