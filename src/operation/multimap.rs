//! Ordered multi-value maps.
//!
//! [`MultiValueMap`] keeps keys in insertion order and every key maps to an
//! ordered list of values. Lookups are case-sensitive unless the map was
//! created with [`MultiValueMap::case_insensitive`], in which case the first
//! spelling of a key is kept for iteration and display.
//!
//! [`Parameters`] is the `String`-valued flavour used for query strings and
//! `application/x-www-form-urlencoded` bodies.
use url::form_urlencoded;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ParameterError {
    #[error("The parameter '{0}' is malformed")]
    Malformed(String),
}

/// Insertion-ordered map from a key to one or more values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiValueMap<V> {
    entries: Vec<(String, Vec<V>)>,
    case_insensitive: bool,
}

impl<V> Default for MultiValueMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> MultiValueMap<V> {
    /// Creates an empty map with case-sensitive keys.
    pub fn new() -> Self {
        Self { entries: Vec::new(), case_insensitive: false }
    }

    /// Creates an empty map whose keys are compared ignoring ASCII case.
    pub fn case_insensitive() -> Self {
        Self { entries: Vec::new(), case_insensitive: true }
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| {
            if self.case_insensitive {
                k.eq_ignore_ascii_case(key)
            } else {
                k == key
            }
        })
    }

    /// Appends `value` to the values of `key`, adding the key when it is new.
    pub fn add(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        match self.position(&key) {
            Some(idx) => self.entries[idx].1.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }

    /// Replaces all values of `key`. The key keeps its original position.
    pub fn set(&mut self, key: impl Into<String>, values: Vec<V>) {
        let key = key.into();
        match self.position(&key) {
            Some(idx) => self.entries[idx].1 = values,
            None => self.entries.push((key, values)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&[V]> {
        self.position(key).map(|idx| self.entries[idx].1.as_slice())
    }

    pub fn first(&self, key: &str) -> Option<&V> {
        self.get(key).and_then(|values| values.first())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<V>> {
        self.position(key).map(|idx| self.entries.remove(idx).1)
    }

    /// Keys in insertion order, spelled as first inserted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[V])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends every value of `other`, key by key.
    pub fn merge(&mut self, other: MultiValueMap<V>) {
        for (key, values) in other.entries {
            for value in values {
                self.add(key.clone(), value);
            }
        }
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for MultiValueMap<V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = MultiValueMap::new();
        for (k, v) in iter {
            map.add(k, v);
        }
        map
    }
}

/// Request parameters taken from a query string or a form body.
pub type Parameters = MultiValueMap<String>;

impl MultiValueMap<String> {
    /// Parses `a=1&b=2&b=3` style input. A name without a value (`a` or `a=`)
    /// maps to the empty string, while `a=b=c` is rejected.
    pub fn from_query_string(query: &str) -> Result<Self, ParameterError> {
        let mut parameters = Parameters::new();
        for parameter in query.split('&').filter(|p| !p.is_empty()) {
            if parameter.split('=').count() > 2 {
                return Err(ParameterError::Malformed(parameter.to_string()));
            }
            for (name, value) in form_urlencoded::parse(parameter.as_bytes()) {
                parameters.add(name.into_owned(), value.into_owned());
            }
        }
        Ok(parameters)
    }

    /// Serializes the parameters back into an encoded query string.
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (name, values) in self.iter() {
            if values.is_empty() {
                serializer.append_pair(name, "");
            }
            for value in values {
                serializer.append_pair(name, value);
            }
        }
        serializer.finish()
    }
}
