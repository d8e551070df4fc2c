//! Opaque JSON metadata attached to every entry.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form key/value bag carried alongside an entry.
///
/// The tree engine never interprets it; it only round-trips through
/// snapshots and the [`value`](Self::value)/[`scan`](Self::scan) pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(Map<String, Value>);

impl Metadata {
    /// Marshal to JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be serialized.
    pub fn value(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.0)
    }

    /// Unmarshal from JSON bytes. `None` yields an empty bag.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a JSON object.
    pub fn scan(src: Option<&[u8]>) -> Result<Self, serde_json::Error> {
        src.map_or_else(|| Ok(Self::default()), |bytes| serde_json::from_slice(bytes).map(Self))
    }

    /// Look up a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Insert a key, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Return `true` if no keys are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
