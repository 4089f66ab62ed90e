//! `request-headers` and `response-headers` snippets.
//!
//! Header snippets are relaxed unless [`HeadersSnippet::strict`] is called:
//! HTTP stacks add headers of their own (`Host`, `Content-Length`, `Date`)
//! that are rarely worth documenting. Documented, non-optional headers must
//! always be present. Names compare ignoring ASCII case.
use crate::descriptor::{describe, Descriptor, DescriptorList};
use crate::errors::SnippetError;
use crate::operation::Operation;
use crate::snippet::{Attributes, DescribedElements, Model, Side, Snippet};
use crate::verify::ElementKind;

pub fn header_with_name(name: impl Into<String>) -> Descriptor {
    describe(name)
}

pub fn request_headers(descriptors: impl Into<DescriptorList<Descriptor>>) -> HeadersSnippet {
    HeadersSnippet::new(Side::Request, descriptors.into())
}

pub fn response_headers(descriptors: impl Into<DescriptorList<Descriptor>>) -> HeadersSnippet {
    HeadersSnippet::new(Side::Response, descriptors.into())
}

#[derive(Debug, Clone)]
pub struct HeadersSnippet {
    side: Side,
    elements: DescribedElements,
}

impl HeadersSnippet {
    fn new(side: Side, descriptors: DescriptorList<Descriptor>) -> Self {
        let kind = match side {
            Side::Request => ElementKind::REQUEST_HEADERS,
            Side::Response => ElementKind::RESPONSE_HEADERS,
        };
        Self { side, elements: DescribedElements::new(kind, descriptors, true) }
    }

    /// Also fails on headers that are present but not documented.
    pub fn strict(mut self) -> Self {
        self.elements.relaxed = false;
        self
    }

    pub fn and(&self, more: impl IntoIterator<Item = Descriptor>) -> Self {
        Self { side: self.side, elements: self.elements.and(more) }
    }

    pub fn with_attributes(self, attributes: Attributes) -> Self {
        Self { side: self.side, elements: self.elements.with_attributes(attributes) }
    }
}

impl Snippet for HeadersSnippet {
    fn name(&self) -> &str {
        match self.side {
            Side::Request => "request-headers",
            Side::Response => "response-headers",
        }
    }

    fn create_model(&self, operation: &Operation) -> Result<Model, SnippetError> {
        let headers = match self.side {
            Side::Request => operation.request().headers(),
            Side::Response => operation.response().headers(),
        };
        self.elements.verified_model(headers.names(), "headers")
    }
}
