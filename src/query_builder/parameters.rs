use crate::constants::defaults;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Process-wide source of parameter names.
///
/// Clones share one counter, so every compilation fed from the same sequence
/// receives distinct names even when compilations run concurrently.
#[derive(Debug, Clone)]
pub struct ParameterSequence {
    prefix: Arc<str>,
    counter: Arc<AtomicU64>,
}

impl ParameterSequence {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: Arc::from(prefix),
            counter: Arc::new(AtomicU64::new(defaults::FIRST_PARAMETER_INDEX)),
        }
    }

    /// Allocate the next parameter name
    pub fn next_name(&self) -> String {
        let index = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{}_{}", self.prefix, index)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Index the next allocated name will carry
    pub fn peek(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }
}

impl Default for ParameterSequence {
    fn default() -> Self {
        Self::new(defaults::PARAMETER_PREFIX)
    }
}

/// Ordered parameter name to value bindings of one query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterTable {
    entries: Vec<(String, Value)>,
    index: HashMap<String, usize>,
}

impl ParameterTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `value` under `name`, replacing an earlier binding of the same name
    /// in place
    pub fn set(&mut self, name: &str, value: Value) {
        match self.index.get(name) {
            Some(&position) => self.entries[position].1 = value,
            None => {
                self.index.insert(name.to_string(), self.entries.len());
                self.entries.push((name.to_string(), value));
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.index.get(name).map(|&position| &self.entries[position].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Append every binding of `other`
    pub fn extend(&mut self, other: ParameterTable) {
        for (name, value) in other.entries {
            self.set(&name, value);
        }
    }
}

impl IntoIterator for ParameterTable {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Binds literal values of one compilation under fresh sequence names
#[derive(Debug)]
pub struct ParameterBinder<'a> {
    sequence: &'a ParameterSequence,
    table: ParameterTable,
}

impl<'a> ParameterBinder<'a> {
    pub fn new(sequence: &'a ParameterSequence) -> Self {
        Self {
            sequence,
            table: ParameterTable::new(),
        }
    }

    /// Record `value` and return the placeholder name it is bound to
    pub fn bind(&mut self, value: Value) -> String {
        let name = self.sequence.next_name();
        self.table.set(&name, value);
        name
    }

    pub fn table(&self) -> &ParameterTable {
        &self.table
    }

    pub fn into_table(self) -> ParameterTable {
        self.table
    }
}
