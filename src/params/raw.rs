use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single raw configuration value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Bool(b) => write!(f, "{}", b),
            RawValue::Int(i) => write!(f, "{}", i),
            RawValue::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Str(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Str(value)
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        RawValue::Bool(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Int(value)
    }
}

/// Precedence-resolved flat parameter map for one invocation.
///
/// Blank strings (including the literal `null`) and unset options are never
/// stored, so `contains` means "explicitly configured".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawParameters {
    values: BTreeMap<String, RawValue>,
}

impl RawParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: impl Into<RawValue>) {
        let value = value.into();
        if let RawValue::Str(s) = &value {
            if crate::proxy::is_blank(Some(s)) {
                return;
            }
        }
        self.values.insert(key.to_string(), value);
    }

    pub fn put_str(&mut self, key: &str, value: Option<&String>) {
        if let Some(v) = value {
            self.insert(key, v.as_str());
        }
    }

    pub fn put_bool(&mut self, key: &str, value: Option<bool>) {
        if let Some(v) = value {
            self.insert(key, v);
        }
    }

    pub fn put_int(&mut self, key: &str, value: Option<i64>) {
        if let Some(v) = value {
            self.insert(key, v);
        }
    }

    /// Copy every entry of `other`, replacing existing keys
    pub fn extend(&mut self, other: RawParameters) {
        self.values.extend(other.values);
    }

    pub fn remove(&mut self, key: &str) -> Option<RawValue> {
        self.values.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.values.get(key)
    }

    /// String form of the value; booleans and integers are rendered
    pub fn get_str(&self, key: &str) -> Option<String> {
        self.values.get(key).map(|v| v.to_string())
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.values.get(key)? {
            RawValue::Bool(b) => Some(*b),
            RawValue::Str(s) => s.trim().parse().ok(),
            RawValue::Int(_) => None,
        }
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.values.get(key)? {
            RawValue::Int(i) => Some(*i),
            RawValue::Str(s) => s.trim().parse().ok(),
            RawValue::Bool(_) => None,
        }
    }

    /// Comma separated list with trimmed, non-empty entries
    pub fn get_list(&self, key: &str) -> Option<Vec<String>> {
        let raw = self.get_str(key)?;
        let items: Vec<String> = raw
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if items.is_empty() {
            None
        } else {
            Some(items)
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| k.as_str())
    }
}

impl<K: AsRef<str>, V: Into<RawValue>> FromIterator<(K, V)> for RawParameters {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut params = RawParameters::new();
        for (k, v) in iter {
            params.insert(k.as_ref(), v);
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_strings_are_not_stored() {
        let mut params = RawParameters::new();
        params.insert("a", "");
        params.insert("b", "   ");
        params.insert("c", "null");
        params.insert("d", "value");

        assert_eq!(params.len(), 1);
        assert!(params.contains("d"));
    }

    #[test]
    fn test_false_is_distinct_from_unset() {
        let mut params = RawParameters::new();
        params.put_bool("flag", Some(false));
        params.put_bool("other", None);

        assert_eq!(params.get_bool("flag"), Some(false));
        assert!(!params.contains("other"));
    }

    #[test]
    fn test_typed_accessors_accept_strings() {
        let params: RawParameters = [("depth", "2"), ("full", "true")].into_iter().collect();

        assert_eq!(params.get_int("depth"), Some(2));
        assert_eq!(params.get_bool("full"), Some(true));
        assert_eq!(params.get_str("depth").as_deref(), Some("2"));
    }

    #[test]
    fn test_get_list_trims_entries() {
        let params: RawParameters = [("severities", "high, critical,,")].into_iter().collect();
        assert_eq!(
            params.get_list("severities"),
            Some(vec!["high".to_string(), "critical".to_string()])
        );
    }

    #[test]
    fn test_string_values_are_kept_verbatim() {
        let params: RawParameters = [("url", " https://fake.blackduck-url ")].into_iter().collect();
        assert_eq!(
            params.get_str("url").as_deref(),
            Some(" https://fake.blackduck-url ")
        );
    }
}
