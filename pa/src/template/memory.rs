//! Run-scoped template memory

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

/// Reserved key holding the rendered persona
pub const PERSONA_KEY: &str = "persona";

/// Reserved key holding the active schema's format instructions
pub const FORMAT_INSTRUCTIONS_KEY: &str = "format_instructions";

/// Named values bound into prompts
pub type Variables = BTreeMap<String, Value>;

/// Values threaded between the steps of one run
///
/// Keys are only ever added or overwritten. There is no way to remove one, so
/// anything a step stored is visible to every later step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Memory {
    values: Variables,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, replacing any previous value under the same key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        debug!(%key, "Memory::insert: called");
        self.values.insert(key, value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// A value that is stored as a JSON string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Variables> for Memory {
    fn from(values: Variables) -> Self {
        Self { values }
    }
}

impl Extend<(String, Value)> for Memory {
    fn extend<I: IntoIterator<Item = (String, Value)>>(&mut self, iter: I) {
        self.values.extend(iter);
    }
}
