//! Hypermedia links: extraction from response payloads and the `links`
//! snippet.
//!
//! Link descriptors may omit their description when the payload gives the
//! link a title. The title is then used in its place.
mod atom;
mod extractor;
mod hal;
mod json_path;

pub use atom::AtomLinkExtractor;
pub use extractor::{ContentTypeLinkExtractor, LinkExtractor};
pub use hal::HalLinkExtractor;
pub use json_path::DynamicJsonPathLinkExtractor;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::descriptor::{describe, Descriptor, DescriptorList};
use crate::errors::SnippetError;
use crate::operation::{MultiValueMap, Operation};
use crate::snippet::{Attributes, Model, Snippet};
use crate::verify::{verify, ElementKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Link {
    pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self { rel: rel.into(), href: href.into(), title: None }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Links grouped by relation, relations in the order they were found.
pub type LinkMap = MultiValueMap<Link>;

/// Describes the link relation `rel`.
pub fn link_with_rel(rel: impl Into<String>) -> Descriptor {
    describe(rel)
}

/// Extracts links from HAL `_links` objects.
pub fn hal_links() -> HalLinkExtractor {
    HalLinkExtractor
}

/// Extracts links from Atom-style `links` arrays.
pub fn atom_links() -> AtomLinkExtractor {
    AtomLinkExtractor
}

/// Extracts links found at each of `paths`, for payloads that nest their
/// links: `json_path_links(["foo.links", "first.links"])`.
pub fn json_path_links<I, S>(paths: I) -> DynamicJsonPathLinkExtractor
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    DynamicJsonPathLinkExtractor::new(paths)
}

/// Documents the links of a response, choosing the extractor by content type.
pub fn links(descriptors: impl Into<DescriptorList<Descriptor>>) -> LinksSnippet {
    LinksSnippet::new(Arc::new(ContentTypeLinkExtractor::default()), descriptors.into(), false)
}

pub fn relaxed_links(descriptors: impl Into<DescriptorList<Descriptor>>) -> LinksSnippet {
    LinksSnippet::new(Arc::new(ContentTypeLinkExtractor::default()), descriptors.into(), true)
}

/// Documents the links of a response using `extractor`.
pub fn links_with(
    extractor: impl LinkExtractor + 'static,
    descriptors: impl Into<DescriptorList<Descriptor>>,
) -> LinksSnippet {
    LinksSnippet::new(Arc::new(extractor), descriptors.into(), false)
}

pub fn relaxed_links_with(
    extractor: impl LinkExtractor + 'static,
    descriptors: impl Into<DescriptorList<Descriptor>>,
) -> LinksSnippet {
    LinksSnippet::new(Arc::new(extractor), descriptors.into(), true)
}

#[derive(Clone)]
pub struct LinksSnippet {
    extractor: Arc<dyn LinkExtractor>,
    descriptors: DescriptorList<Descriptor>,
    relaxed: bool,
    attributes: Attributes,
}

impl std::fmt::Debug for LinksSnippet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinksSnippet")
            .field("descriptors", &self.descriptors)
            .field("relaxed", &self.relaxed)
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}

impl LinksSnippet {
    fn new(extractor: Arc<dyn LinkExtractor>, descriptors: DescriptorList<Descriptor>, relaxed: bool) -> Self {
        Self { extractor, descriptors, relaxed, attributes: Attributes::new() }
    }

    pub fn and(&self, more: impl IntoIterator<Item = Descriptor>) -> Self {
        Self { descriptors: self.descriptors.and(more), ..self.clone() }
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes.extend(attributes);
        self
    }

    /// The description of `descriptor`, falling back to the title of the first
    /// titled link with its relation.
    fn description_for(descriptor: &Descriptor, links: &LinkMap) -> Result<String, SnippetError> {
        if let Some(description) = descriptor.description.as_deref().filter(|d| !d.trim().is_empty()) {
            return Ok(description.to_string());
        }
        links
            .get(&descriptor.name)
            .unwrap_or_default()
            .iter()
            .find_map(|link| link.title.clone())
            .ok_or_else(|| SnippetError::NoLinkDescription { rel: descriptor.name.clone() })
    }
}

impl Snippet for LinksSnippet {
    fn name(&self) -> &str {
        "links"
    }

    fn create_model(&self, operation: &Operation) -> Result<Model, SnippetError> {
        if let Some(d) = self.descriptors.iter().find(|d| d.name.trim().is_empty()) {
            log::debug!("rejecting link descriptor with empty rel: {d:?}");
            return Err(SnippetError::EmptyName);
        }

        let links = self.extractor.extract_links(operation.response())?;
        let kind = ElementKind::LINKS;
        verify(links.keys(), &self.descriptors[..], self.relaxed, kind.matching).into_result(&kind)?;

        let mut rows = Vec::new();
        for descriptor in self.descriptors.iter().filter(|d| !d.ignored) {
            let mut row = descriptor.to_row("rel");
            let description = Self::description_for(descriptor, &links)?;
            row.insert("description".to_string(), Value::String(description));
            rows.push(Value::Object(row));
        }

        let mut model = Model::new();
        model.insert("links".to_string(), Value::Array(rows));
        crate::snippet::merge_attributes(&mut model, &self.attributes);
        Ok(model)
    }
}
