//! [`Record`]: the ordered key/value payload carried inside a token.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field holding the certificate holder's full name.
pub const FIELD_NAME: &str = "name";
/// Field holding the certificate identifier.
pub const FIELD_CERT_ID: &str = "cert_id";
/// Field holding the issue date.
pub const FIELD_ISSUED_AT: &str = "issued_at";

/// Ordered mapping of field names to JSON values.
///
/// The codec treats the contents as opaque. Field order is insertion order
/// and survives an encode/decode cycle, so the canonical form of a record is
/// stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build the `{name, cert_id, issued_at}` record used for certificates.
    pub fn certificate(
        name: impl Into<String>,
        cert_id: impl Into<String>,
        issued_at: impl Into<String>,
    ) -> Self {
        Self::new()
            .with(FIELD_NAME, name)
            .with(FIELD_CERT_ID, cert_id)
            .with(FIELD_ISSUED_AT, issued_at)
    }

    /// Append (or overwrite) a string field, builder style.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Append (or overwrite) a string field.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), Value::String(value.into()));
    }

    /// Raw value of a field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Value of a field if it is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Field names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Fields in order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compact JSON with no insignificant whitespace and non-ASCII left as UTF-8.
    pub(crate) fn to_canonical_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.0)
    }

    /// Parse canonical bytes; anything but a JSON object is rejected.
    pub(crate) fn from_canonical_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Record> for Map<String, Value> {
    fn from(record: Record) -> Self {
        record.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}
