//! Snippets documenting how a request addresses the API: query, form and
//! path parameters, and the parts of a multipart request.
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::descriptor::{describe, Descriptor, DescriptorList};
use crate::errors::SnippetError;
use crate::operation::Operation;
use crate::snippet::{Attributes, DescribedElements, Model, Snippet};
use crate::verify::ElementKind;

pub fn parameter_with_name(name: impl Into<String>) -> Descriptor {
    describe(name)
}

pub fn part_with_name(name: impl Into<String>) -> Descriptor {
    describe(name)
}

/// Where a [`ParametersSnippet`] finds the parameters it documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterSource {
    /// The query string of the request URI.
    Query,
    /// An `application/x-www-form-urlencoded` request body.
    Form,
    /// `{name}` placeholders of the operation's URL template.
    Path,
}

impl ParameterSource {
    fn kind(self) -> ElementKind {
        match self {
            ParameterSource::Query => ElementKind::QUERY_PARAMETERS,
            ParameterSource::Form => ElementKind::FORM_PARAMETERS,
            ParameterSource::Path => ElementKind::PATH_PARAMETERS,
        }
    }
}

macro_rules! parameter_snippets {
    ($($strict:ident, $relaxed:ident => $source:expr;)*) => {
        $(
            pub fn $strict(descriptors: impl Into<DescriptorList<Descriptor>>) -> ParametersSnippet {
                ParametersSnippet::new($source, descriptors.into(), false)
            }

            pub fn $relaxed(descriptors: impl Into<DescriptorList<Descriptor>>) -> ParametersSnippet {
                ParametersSnippet::new($source, descriptors.into(), true)
            }
        )*
    };
}

parameter_snippets! {
    query_parameters, relaxed_query_parameters => ParameterSource::Query;
    form_parameters, relaxed_form_parameters => ParameterSource::Form;
    path_parameters, relaxed_path_parameters => ParameterSource::Path;
}

#[derive(Debug, Clone)]
pub struct ParametersSnippet {
    source: ParameterSource,
    elements: DescribedElements,
}

impl ParametersSnippet {
    fn new(source: ParameterSource, descriptors: DescriptorList<Descriptor>, relaxed: bool) -> Self {
        Self { source, elements: DescribedElements::new(source.kind(), descriptors, relaxed) }
    }

    pub fn and(&self, more: impl IntoIterator<Item = Descriptor>) -> Self {
        Self { source: self.source, elements: self.elements.and(more) }
    }

    pub fn with_attributes(self, attributes: Attributes) -> Self {
        Self { source: self.source, elements: self.elements.with_attributes(attributes) }
    }
}

impl Snippet for ParametersSnippet {
    fn name(&self) -> &str {
        match self.source {
            ParameterSource::Query => "query-parameters",
            ParameterSource::Form => "form-parameters",
            ParameterSource::Path => "path-parameters",
        }
    }

    fn create_model(&self, operation: &Operation) -> Result<Model, SnippetError> {
        let request = operation.request();
        match self.source {
            ParameterSource::Query => {
                let parameters = request.query_parameters()?;
                self.elements.verified_model(parameters.keys(), "parameters")
            }
            ParameterSource::Form => {
                let parameters = request.form_parameters()?;
                self.elements.verified_model(parameters.keys(), "parameters")
            }
            ParameterSource::Path => {
                let template = operation.url_template().ok_or(SnippetError::MissingUrlTemplate)?;
                let names = url_template_variables(template);
                let mut model = self.elements.verified_model(names, "parameters")?;
                let path = template.split_once('?').map_or(template, |(path, _)| path);
                model.entry("path").or_insert_with(|| Value::String(path.to_string()));
                Ok(model)
            }
        }
    }
}

lazy_static! {
    static ref TEMPLATE_VARIABLE: Option<Regex> = Regex::new(r"\{([^/]+?)\}").ok();
}

/// Variable names of a URL template, in order: `/a/{id}/{slug:[a-z]+}`
/// yields `id` and `slug`.
pub fn url_template_variables(template: &str) -> Vec<&str> {
    let Some(pattern) = TEMPLATE_VARIABLE.as_ref() else {
        return Vec::new();
    };
    pattern
        .captures_iter(template)
        .filter_map(|caps| caps.get(1))
        .map(|variable| {
            let variable = variable.as_str();
            variable.split_once(':').map_or(variable, |(name, _)| name).trim()
        })
        .filter(|name| !name.is_empty())
        .collect()
}

pub fn request_parts(descriptors: impl Into<DescriptorList<Descriptor>>) -> RequestPartsSnippet {
    RequestPartsSnippet { elements: DescribedElements::new(ElementKind::REQUEST_PARTS, descriptors.into(), false) }
}

pub fn relaxed_request_parts(descriptors: impl Into<DescriptorList<Descriptor>>) -> RequestPartsSnippet {
    RequestPartsSnippet { elements: DescribedElements::new(ElementKind::REQUEST_PARTS, descriptors.into(), true) }
}

#[derive(Debug, Clone)]
pub struct RequestPartsSnippet {
    elements: DescribedElements,
}

impl RequestPartsSnippet {
    pub fn and(&self, more: impl IntoIterator<Item = Descriptor>) -> Self {
        Self { elements: self.elements.and(more) }
    }

    pub fn with_attributes(self, attributes: Attributes) -> Self {
        Self { elements: self.elements.with_attributes(attributes) }
    }
}

impl Snippet for RequestPartsSnippet {
    fn name(&self) -> &str {
        "request-parts"
    }

    fn create_model(&self, operation: &Operation) -> Result<Model, SnippetError> {
        let names = operation.request().parts().iter().map(|p| p.name.as_str());
        self.elements.verified_model(names, "requestParts")
    }
}
