//! Task document produced by a drone and persisted by the ingestion task.
//!
//! The document has no fixed schema. It is treated opaquely except for the
//! reserved `task_id` key, which the task reports back to its caller.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reserved key carrying the document's identifier.
pub const TASK_ID_KEY: &str = "task_id";

/// Structured result document: string keys mapping to arbitrary JSON values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskDoc(Map<String, Value>);

impl TaskDoc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Shallow merge: every key of `other` is copied in, overwriting any
    /// same-named existing key. Nested values are replaced, not merged.
    pub fn update(&mut self, other: &Map<String, Value>) {
        for (key, value) in other {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Identifier stored under the reserved `task_id` key, if any.
    pub fn task_id(&self) -> Option<&Value> {
        self.0.get(TASK_ID_KEY)
    }

    pub fn set_task_id(&mut self, id: Value) {
        self.0.insert(TASK_ID_KEY.to_string(), id);
    }

    /// Serialize to pretty-printed JSON with trailing newline.
    pub fn to_json_string(&self) -> Result<String> {
        let mut buf = serde_json::to_string_pretty(&self.0).context("serialize task document")?;
        buf.push('\n');
        Ok(buf)
    }
}

impl From<Map<String, Value>> for TaskDoc {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Encode a timestamp as a document value.
///
/// This is the crate-wide datetime strategy: RFC 3339 in UTC with
/// microsecond precision, e.g. `"2026-08-30T12:34:56.789012Z"`.
pub fn datetime_value(at: DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339_opts(SecondsFormat::Micros, true))
}
