//! Snippets turn a verified [`Operation`] into a model and render it through
//! a [`TemplateEngine`].
//!
//! Every snippet follows the same steps:
//! 1. collect the names of the elements it documents from the operation,
//! 2. [`verify`](crate::verify::verify) them against its descriptors,
//! 3. build a model holding one row per non-ignored descriptor, with the
//!    snippet's own attributes merged in last.
use serde_json::Value;

use crate::descriptor::{Descriptor, DescriptorList};
use crate::errors::SnippetError;
use crate::operation::Operation;
use crate::verify::{verify, ElementKind};

pub mod template;
pub mod writer;

pub use template::{StandardTemplateEngine, TemplateEngine};
pub use writer::SnippetWriter;

/// Model handed to a template engine.
pub type Model = serde_json::Map<String, Value>;

/// Free-form attributes of a descriptor or snippet.
pub type Attributes = serde_json::Map<String, Value>;

/// Builds attributes from key/value pairs.
///
/// ```
/// use restdocs::snippet::attributes;
/// let attrs = attributes([("title", "Custom title")]);
/// assert_eq!(attrs["title"], "Custom title");
/// ```
pub fn attributes<I, K, V>(pairs: I) -> Attributes
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}

/// Which half of the exchange a snippet documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Request,
    Response,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Request => "request",
            Side::Response => "response",
        }
    }
}

pub trait Snippet: Send + Sync {
    /// Snippet type, for example `request-headers`. Also the file stem the
    /// snippet is written to.
    fn name(&self) -> &str;

    fn create_model(&self, operation: &Operation) -> Result<Model, SnippetError>;

    fn render(&self, operation: &Operation, engine: &dyn TemplateEngine) -> Result<String, SnippetError> {
        let model = self.create_model(operation)?;
        log::debug!("rendering {} for operation {}", self.name(), operation.name());
        engine.render(self.name(), &model).map_err(SnippetError::Template)
    }
}

/// Verification and row building shared by every snippet whose elements are
/// identified by a plain name.
#[derive(Debug, Clone)]
pub(crate) struct DescribedElements {
    pub kind: ElementKind,
    pub descriptors: DescriptorList<Descriptor>,
    pub relaxed: bool,
    pub attributes: Attributes,
}

impl DescribedElements {
    pub fn new(kind: ElementKind, descriptors: DescriptorList<Descriptor>, relaxed: bool) -> Self {
        Self { kind, descriptors, relaxed, attributes: Attributes::new() }
    }

    pub fn and(&self, more: impl IntoIterator<Item = Descriptor>) -> Self {
        Self { descriptors: self.descriptors.and(more), ..self.clone() }
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes.extend(attributes);
        self
    }

    pub fn check_descriptors(&self) -> Result<(), SnippetError> {
        self.descriptors.iter().try_for_each(|d| d.check(self.kind.singular))
    }

    /// Verifies `actual` and, on success, returns a model holding the rows
    /// under `collection`.
    pub fn verified_model<'a>(
        &self,
        actual: impl IntoIterator<Item = &'a str>,
        collection: &str,
    ) -> Result<Model, SnippetError> {
        self.check_descriptors()?;
        verify(actual, &self.descriptors[..], self.relaxed, self.kind.matching).into_result(&self.kind)?;

        let rows = self
            .descriptors
            .iter()
            .filter(|d| !d.ignored)
            .map(|d| Value::Object(d.to_row("name")))
            .collect();

        let mut model = Model::new();
        model.insert(collection.to_string(), Value::Array(rows));
        Ok(self.finish(model))
    }

    /// Merges the snippet attributes into `model`.
    pub fn finish(&self, mut model: Model) -> Model {
        merge_attributes(&mut model, &self.attributes);
        model
    }
}

pub(crate) fn merge_attributes(model: &mut Model, attributes: &Attributes) {
    for (k, v) in attributes {
        model.insert(k.clone(), v.clone());
    }
}
