//! HTTP header collection used by requests, responses and request parts.
use http::HeaderMap;

use super::media_type::{MediaType, MediaTypeError};
use super::multimap::MultiValueMap;

pub const HOST: &str = "Host";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_LENGTH: &str = "Content-Length";
pub const COOKIE: &str = "Cookie";
pub const SET_COOKIE: &str = "Set-Cookie";

/// Ordered header map with case-insensitive names.
///
/// Header names keep the spelling they were first added with, so rendered
/// snippets show headers the way the application sent them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpHeaders {
    inner: MultiValueMap<String>,
}

impl Default for HttpHeaders {
    fn default() -> Self {
        Self { inner: MultiValueMap::case_insensitive() }
    }
}

impl HttpHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.add(name, value.into());
    }

    /// Replaces every value of `name` with `value`.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.set(name, vec![value.into()]);
    }

    /// Replaces every value of `name` with `values`. An existing header
    /// keeps its position and spelling.
    pub fn set_all(&mut self, name: impl Into<String>, values: Vec<String>) {
        self.inner.set(name, values);
    }

    /// First value of `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner.first(name).map(String::as_str)
    }

    pub fn get_all(&self, name: &str) -> &[String] {
        self.inner.get(name).unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        self.inner.remove(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.inner.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.inner.iter()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Parsed `Content-Type`, `None` when the header is absent.
    pub fn content_type(&self) -> Option<Result<MediaType, MediaTypeError>> {
        self.get(CONTENT_TYPE).map(str::parse)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HttpHeaders {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut headers = HttpHeaders::new();
        for (name, value) in iter {
            headers.add(name, value);
        }
        headers
    }
}

impl From<&HeaderMap> for HttpHeaders {
    /// Values that are not visible ASCII are decoded lossily.
    fn from(map: &HeaderMap) -> Self {
        let mut headers = HttpHeaders::new();
        for (name, value) in map {
            let value = match value.to_str() {
                Ok(v) => v.to_string(),
                Err(_) => String::from_utf8_lossy(value.as_bytes()).into_owned(),
            };
            headers.add(canonical_name(name.as_str()), value);
        }
        headers
    }
}

/// `content-type` -> `Content-Type`. The `http` crate lowercases every name.
fn canonical_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}
