use std::collections::HashMap;

use agg_lang::Value;
use serde::{Deserialize, Serialize};

/// A discrete event: named properties with scalar values.
///
/// By convention `name` identifies the event type and `time` carries a
/// timestamp, but the engine treats every property alike.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Event {
    pub fields: HashMap<String, Value>,
}

impl Event {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for an event whose `name` property is set.
    pub fn named(name: &str) -> Self {
        Self::new().with("name", name)
    }

    pub fn with(mut self, prop: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(prop.to_string(), value.into());
        self
    }

    pub fn get(&self, prop: &str) -> Option<&Value> {
        self.fields.get(prop)
    }

    pub fn name(&self) -> Option<&str> {
        self.fields.get("name").and_then(Value::as_str)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Event {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
