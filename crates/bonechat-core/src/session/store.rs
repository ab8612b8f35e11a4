//! SessionStore trait definition and a plain map-backed implementation.

use std::collections::HashMap;

/// Per-user key-value bag provided by the session transport.
///
/// Semantics are last-write-wins with no transaction across keys. Callers
/// mark the bag dirty after a mutation so the transport knows to persist it.
pub trait SessionStore: Send {
    /// Get a copy of the value stored under `key`.
    fn get(&self, key: &str) -> Option<serde_json::Value>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: serde_json::Value);

    /// Flag the bag as modified.
    fn mark_dirty(&mut self);
}

/// Session bag backed by a `HashMap`.
///
/// Used directly by the terminal chat loop and as the payload of the HTTP
/// session backend.
#[derive(Debug, Clone, Default)]
pub struct MapSession {
    data: HashMap<String, serde_json::Value>,
    dirty: bool,
}

impl MapSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap previously persisted data. The result starts clean.
    pub fn from_data(data: HashMap<String, serde_json::Value>) -> Self {
        Self { data, dirty: false }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn data(&self) -> &HashMap<String, serde_json::Value> {
        &self.data
    }

    pub fn into_data(self) -> HashMap<String, serde_json::Value> {
        self.data
    }
}

impl SessionStore for MapSession {
    fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.data.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: serde_json::Value) {
        self.data.insert(key.to_string(), value);
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_map_session_get_absent() {
        let session = MapSession::new();
        assert!(session.get("missing").is_none());
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_map_session_set_does_not_mark_dirty() {
        let mut session = MapSession::new();
        session.set("k", json!(1));
        assert_eq!(session.get("k"), Some(json!(1)));
        assert!(!session.is_dirty());

        session.mark_dirty();
        assert!(session.is_dirty());
    }

    #[test]
    fn test_map_session_last_write_wins() {
        let mut session = MapSession::new();
        session.set("k", json!("first"));
        session.set("k", json!("second"));
        assert_eq!(session.get("k"), Some(json!("second")));
    }

    #[test]
    fn test_from_data_starts_clean() {
        let mut data = HashMap::new();
        data.insert("k".to_string(), json!(true));
        let session = MapSession::from_data(data);
        assert!(!session.is_dirty());
        assert_eq!(session.get("k"), Some(json!(true)));
    }
}
