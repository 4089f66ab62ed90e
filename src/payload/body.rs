use serde_json::Value;

use crate::errors::SnippetError;
use crate::operation::Operation;
use crate::snippet::{merge_attributes, Attributes, Model, Snippet};

/// Which body a [`BodySnippet`] shows.
#[derive(Debug, Clone, PartialEq, Eq)]
enum BodySource {
    Request,
    Response,
    RequestPart(String),
}

/// `request-body`, `response-body` and `request-part-{name}-body`: the body
/// verbatim, decoded with the charset of its content type.
#[derive(Debug, Clone)]
pub struct BodySnippet {
    name: String,
    source: BodySource,
    attributes: Attributes,
}

pub fn request_body() -> BodySnippet {
    BodySnippet::new(BodySource::Request)
}

pub fn response_body() -> BodySnippet {
    BodySnippet::new(BodySource::Response)
}

pub fn request_part_body(part: impl Into<String>) -> BodySnippet {
    BodySnippet::new(BodySource::RequestPart(part.into()))
}

impl BodySnippet {
    fn new(source: BodySource) -> Self {
        let name = match &source {
            BodySource::Request => "request-body".to_string(),
            BodySource::Response => "response-body".to_string(),
            BodySource::RequestPart(part) => format!("request-part-{part}-body"),
        };
        Self { name, source, attributes: Attributes::new() }
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes.extend(attributes);
        self
    }
}

impl Snippet for BodySnippet {
    fn name(&self) -> &str {
        &self.name
    }

    fn create_model(&self, operation: &Operation) -> Result<Model, SnippetError> {
        let body = match &self.source {
            BodySource::Request => operation.request().content_as_string(),
            BodySource::Response => operation.response().content_as_string(),
            BodySource::RequestPart(name) => operation
                .request()
                .parts()
                .iter()
                .find(|p| &p.name == name)
                .map(|p| p.content_as_string())
                .ok_or_else(|| SnippetError::Payload(format!("A request part named '{name}' was not found in the request")))?,
        };

        let mut model = Model::new();
        model.insert("body".into(), Value::String(body));
        merge_attributes(&mut model, &self.attributes);
        Ok(model)
    }
}
