//! Descriptors: the authored expectations for one named element of an
//! operation, and the append-only lists they are grouped in.
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use serde_json::Value;

use crate::errors::SnippetError;
use crate::snippet::{Attributes, Model};

/// Describes one header, cookie, parameter, request part or link relation.
///
/// Descriptors are plain values. The builder methods consume and return the
/// descriptor, so once a descriptor is added to a [`DescriptorList`] it can
/// no longer change.
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor {
    pub name: String,
    pub description: Option<String>,
    pub optional: bool,
    pub ignored: bool,
    pub attributes: Attributes,
}

/// Starts a descriptor for the element called `name`.
pub fn describe(name: impl Into<String>) -> Descriptor {
    Descriptor {
        name: name.into(),
        description: None,
        optional: false,
        ignored: false,
        attributes: Attributes::new(),
    }
}

impl Descriptor {
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks the element as optional. It must still be documented when it is
    /// present, but its absence is not an error.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Marks the element as ignored. An ignored element is accepted when
    /// present, is never reported missing and does not appear in snippets.
    pub fn ignored(mut self) -> Self {
        self.ignored = true;
        self
    }

    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attributes(mut self, attributes: Attributes) -> Self {
        self.attributes.extend(attributes);
        self
    }

    pub fn has_description(&self) -> bool {
        self.description.as_deref().is_some_and(|d| !d.trim().is_empty())
    }

    /// Builds the model row for this descriptor. `key` names the column the
    /// descriptor's name is stored under (`name`, `rel`, `path`).
    pub fn to_row(&self, key: &str) -> Model {
        let mut row = Model::new();
        row.insert(key.to_string(), Value::String(self.name.clone()));
        row.insert(
            "description".to_string(),
            self.description.clone().map_or(Value::Null, Value::String),
        );
        row.insert("optional".to_string(), Value::Bool(self.optional));
        for (k, v) in &self.attributes {
            row.entry(k.clone()).or_insert_with(|| v.clone());
        }
        row
    }

    /// Checks the descriptor can be documented. `kind` is the singular
    /// element name used in the error message, for example `header`.
    pub fn check(&self, kind: &'static str) -> Result<(), SnippetError> {
        if self.name.trim().is_empty() {
            return Err(SnippetError::EmptyName);
        }
        if !self.ignored && !self.has_description() {
            return Err(SnippetError::MissingDescription { kind, name: self.name.clone() });
        }
        Ok(())
    }
}

impl AsRef<Descriptor> for Descriptor {
    fn as_ref(&self) -> &Descriptor {
        self
    }
}

/// An immutable, cheaply cloned list of descriptors.
///
/// [`DescriptorList::and`] builds a new list holding this list's descriptors
/// followed by the extra ones. The list it was called on is left as is, so a
/// common base list can be shared by several snippets.
pub struct DescriptorList<D> {
    items: Arc<[D]>,
}

impl<D> Clone for DescriptorList<D> {
    fn clone(&self) -> Self {
        Self { items: Arc::clone(&self.items) }
    }
}

impl<D: fmt::Debug> fmt::Debug for DescriptorList<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

impl<D> Default for DescriptorList<D> {
    fn default() -> Self {
        Self { items: Arc::from(Vec::new()) }
    }
}

impl<D: Clone> DescriptorList<D> {
    pub fn and(&self, more: impl IntoIterator<Item = D>) -> Self {
        self.items.iter().cloned().chain(more).collect()
    }
}

impl<D> DescriptorList<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when both lists share the same storage.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.items, &other.items)
    }
}

impl<D> Deref for DescriptorList<D> {
    type Target = [D];

    fn deref(&self) -> &[D] {
        &self.items
    }
}

impl<D> FromIterator<D> for DescriptorList<D> {
    fn from_iter<T: IntoIterator<Item = D>>(iter: T) -> Self {
        Self { items: iter.into_iter().collect() }
    }
}

impl<D> From<Vec<D>> for DescriptorList<D> {
    fn from(items: Vec<D>) -> Self {
        Self { items: items.into() }
    }
}

impl<D, const N: usize> From<[D; N]> for DescriptorList<D> {
    fn from(items: [D; N]) -> Self {
        items.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_sets_flags_and_attributes() {
        let d = describe("X-Token")
            .description("Auth token")
            .optional()
            .attribute("format", "uuid");

        assert_eq!(d.name, "X-Token");
        assert_eq!(d.description.as_deref(), Some("Auth token"));
        assert!(d.optional);
        assert!(!d.ignored);
        assert_eq!(d.attributes.get("format"), Some(&json!("uuid")));
    }

    #[test]
    fn row_contains_name_description_optional_and_attributes() {
        let row = describe("tz").description("one").optional().attribute("extra", 3).to_row("name");
        assert_eq!(
            Value::Object(row),
            json!({"name": "tz", "description": "one", "optional": true, "extra": 3})
        );
    }

    #[test]
    fn attributes_do_not_override_core_columns() {
        let row = describe("a").description("real").attribute("description", "fake").to_row("name");
        assert_eq!(row["description"], json!("real"));
    }

    #[test]
    fn check_requires_description_unless_ignored() {
        let err = describe("Accept").check("header").unwrap_err();
        assert_eq!(
            err.to_string(),
            "The descriptor for header 'Accept' must either have a description or be marked as ignored"
        );
        assert!(describe("Accept").description("  ").check("header").is_err());
        assert!(describe("Accept").ignored().check("header").is_ok());
        assert!(matches!(describe(" ").ignored().check("header"), Err(SnippetError::EmptyName)));
    }

    #[test]
    fn and_leaves_the_original_list_untouched() {
        let base: DescriptorList<Descriptor> = [describe("a"), describe("b")].into();
        let extended = base.and([describe("c")]);
        let other = base.and([describe("d")]);

        let names = |list: &DescriptorList<Descriptor>| list.iter().map(|d| d.name.clone()).collect::<Vec<_>>();
        assert_eq!(names(&base), vec!["a", "b"]);
        assert_eq!(names(&extended), vec!["a", "b", "c"]);
        assert_eq!(names(&other), vec!["a", "b", "d"]);
        assert!(!base.ptr_eq(&extended));
        assert!(base.ptr_eq(&base.clone()));
    }
}
