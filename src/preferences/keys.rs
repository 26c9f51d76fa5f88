//! Typed keys over a flat key-value bag

use serde_json::Value;
use std::collections::BTreeMap;
use std::marker::PhantomData;

/// A value type that can live in the preference bag
pub trait PreferenceValue: Sized {
    /// Decode from JSON; `None` when the stored value has another type
    fn from_json(value: &Value) -> Option<Self>;
    /// Encode to JSON
    fn to_json(&self) -> Value;
}

impl PreferenceValue for bool {
    fn from_json(value: &Value) -> Option<Self> {
        value.as_bool()
    }

    fn to_json(&self) -> Value {
        Value::Bool(*self)
    }
}

impl PreferenceValue for i64 {
    fn from_json(value: &Value) -> Option<Self> {
        value.as_i64()
    }

    fn to_json(&self) -> Value {
        Value::from(*self)
    }
}

impl PreferenceValue for String {
    fn from_json(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }

    fn to_json(&self) -> Value {
        Value::String(self.clone())
    }
}

/// Name of a preference together with its value type
pub struct PreferenceKey<T> {
    name: &'static str,
    _type: PhantomData<fn() -> T>,
}

impl<T> PreferenceKey<T> {
    /// Declare a key
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _type: PhantomData,
        }
    }

    /// Key name as stored on disk
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for PreferenceKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PreferenceKey<T> {}

impl<T> std::fmt::Debug for PreferenceKey<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PreferenceKey").field(&self.name).finish()
    }
}

/// Snapshot of every stored preference
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Preferences {
    values: BTreeMap<String, Value>,
}

impl Preferences {
    /// Empty bag
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_map(values: BTreeMap<String, Value>) -> Self {
        Self { values }
    }

    pub(crate) fn as_map(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    /// Read a value; absent or mistyped entries read as `None`
    pub fn get<T: PreferenceValue>(&self, key: PreferenceKey<T>) -> Option<T> {
        self.values.get(key.name()).and_then(T::from_json)
    }

    /// Store a value, replacing any previous one
    pub fn set<T: PreferenceValue>(&mut self, key: PreferenceKey<T>, value: &T) {
        self.values.insert(key.name().to_string(), value.to_json());
    }

    /// Remove a value; returns whether it was present
    pub fn remove<T>(&mut self, key: PreferenceKey<T>) -> bool {
        self.values.remove(key.name()).is_some()
    }

    /// Whether a key is present
    pub fn contains<T>(&self, key: PreferenceKey<T>) -> bool {
        self.values.contains_key(key.name())
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLAG: PreferenceKey<bool> = PreferenceKey::new("flag");
    const COUNT: PreferenceKey<i64> = PreferenceKey::new("count");
    const LABEL: PreferenceKey<String> = PreferenceKey::new("label");

    #[test]
    fn absent_keys_read_as_none() {
        let prefs = Preferences::new();
        assert_eq!(prefs.get(FLAG), None);
        assert!(!prefs.contains(COUNT));
    }

    #[test]
    fn set_get_remove() {
        let mut prefs = Preferences::new();
        prefs.set(FLAG, &true);
        prefs.set(COUNT, &7);
        prefs.set(LABEL, &"dark".to_string());

        assert_eq!(prefs.get(FLAG), Some(true));
        assert_eq!(prefs.get(COUNT), Some(7));
        assert_eq!(prefs.get(LABEL).as_deref(), Some("dark"));

        assert!(prefs.remove(LABEL));
        assert!(!prefs.remove(LABEL));
        assert_eq!(prefs.len(), 2);
    }

    #[test]
    fn mistyped_value_reads_as_none() {
        let mut prefs = Preferences::new();
        prefs.set(PreferenceKey::<String>::new("count"), &"seven".to_string());
        assert_eq!(prefs.get(COUNT), None);
    }
}
