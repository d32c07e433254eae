//! Shared host state
//!
//! The host state object and the parsed invocation options are handed to
//! every source script by reference: a script that writes
//! `host.service.artifact = "app.zip"` changes the very value the host reads
//! back once the hook settles. [`SharedValue`] is that reference, a
//! lock-protected script value cloned by handle, never by content.

use rhai::Dynamic;
use scriptable_core::{Error, Result};
use serde_json::Value;

/// A mutable document shared between the host and its scripts
///
/// Cloning a `SharedValue` clones the handle; all clones observe the same
/// writes. Writes are last-writer-wins, which matches strictly sequential
/// hook execution.
#[derive(Debug, Clone)]
pub struct SharedValue {
    inner: Dynamic,
}

impl SharedValue {
    /// Share a JSON document
    pub fn from_json(value: &Value) -> Result<Self> {
        let dynamic = rhai::serde::to_dynamic(value)
            .map_err(|e| Error::State(format!("Failed to convert host state: {e}")))?;
        Ok(Self {
            inner: dynamic.into_shared(),
        })
    }

    /// Share an empty mapping
    #[must_use]
    pub fn empty() -> Self {
        Self {
            inner: Dynamic::from_map(rhai::Map::new()).into_shared(),
        }
    }

    /// Snapshot the current content as JSON
    pub fn to_json(&self) -> Result<Value> {
        let snapshot = self.inner.flatten_clone();
        rhai::serde::from_dynamic(&snapshot)
            .map_err(|e| Error::State(format!("Failed to read host state: {e}")))
    }

    /// Look up a value by JSON pointer (e.g. `/service/artifact`)
    pub fn pointer(&self, pointer: &str) -> Result<Option<Value>> {
        Ok(self.to_json()?.pointer(pointer).cloned())
    }

    /// Replace the whole content, keeping the handle
    pub fn replace(&self, value: &Value) -> Result<()> {
        let fresh = rhai::serde::to_dynamic(value)
            .map_err(|e| Error::State(format!("Failed to convert host state: {e}")))?;
        let mut handle = self.inner.clone();
        let mut guard = handle
            .write_lock::<Dynamic>()
            .ok_or_else(|| Error::State("Host state is not writable".to_string()))?;
        *guard = fresh;
        Ok(())
    }

    /// Handle to push into a script scope
    pub(crate) fn handle(&self) -> Dynamic {
        self.inner.clone()
    }
}

impl Default for SharedValue {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round_trip() {
        let doc = json!({ "service": { "name": "demo", "functions": ["a", "b"], "memory": 128 } });
        let state = SharedValue::from_json(&doc).unwrap();
        assert_eq!(state.to_json().unwrap(), doc);
    }

    #[test]
    fn test_empty() {
        assert_eq!(SharedValue::empty().to_json().unwrap(), json!({}));
        assert_eq!(SharedValue::default().to_json().unwrap(), json!({}));
    }

    #[test]
    fn test_clones_share_content() {
        let state = SharedValue::from_json(&json!({ "a": 1 })).unwrap();
        let other = state.clone();

        other.replace(&json!({ "a": 2 })).unwrap();
        assert_eq!(state.pointer("/a").unwrap(), Some(json!(2)));
    }

    #[test]
    fn test_pointer_missing() {
        let state = SharedValue::from_json(&json!({ "service": {} })).unwrap();
        assert_eq!(state.pointer("/service/artifact").unwrap(), None);
    }
}
