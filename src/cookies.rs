//! `request-cookies` and `response-cookies` snippets.
//!
//! Cookie names are case-sensitive. Cookie snippets are strict unless built
//! with one of the `relaxed_*` functions.
use crate::descriptor::{describe, Descriptor, DescriptorList};
use crate::errors::SnippetError;
use crate::operation::Operation;
use crate::snippet::{Attributes, DescribedElements, Model, Side, Snippet};
use crate::verify::ElementKind;

pub fn cookie_with_name(name: impl Into<String>) -> Descriptor {
    describe(name)
}

pub fn request_cookies(descriptors: impl Into<DescriptorList<Descriptor>>) -> CookiesSnippet {
    CookiesSnippet::new(Side::Request, descriptors.into(), false)
}

pub fn relaxed_request_cookies(descriptors: impl Into<DescriptorList<Descriptor>>) -> CookiesSnippet {
    CookiesSnippet::new(Side::Request, descriptors.into(), true)
}

pub fn response_cookies(descriptors: impl Into<DescriptorList<Descriptor>>) -> CookiesSnippet {
    CookiesSnippet::new(Side::Response, descriptors.into(), false)
}

pub fn relaxed_response_cookies(descriptors: impl Into<DescriptorList<Descriptor>>) -> CookiesSnippet {
    CookiesSnippet::new(Side::Response, descriptors.into(), true)
}

#[derive(Debug, Clone)]
pub struct CookiesSnippet {
    side: Side,
    elements: DescribedElements,
}

impl CookiesSnippet {
    fn new(side: Side, descriptors: DescriptorList<Descriptor>, relaxed: bool) -> Self {
        let kind = match side {
            Side::Request => ElementKind::REQUEST_COOKIES,
            Side::Response => ElementKind::RESPONSE_COOKIES,
        };
        Self { side, elements: DescribedElements::new(kind, descriptors, relaxed) }
    }

    pub fn and(&self, more: impl IntoIterator<Item = Descriptor>) -> Self {
        Self { side: self.side, elements: self.elements.and(more) }
    }

    pub fn with_attributes(self, attributes: Attributes) -> Self {
        Self { side: self.side, elements: self.elements.with_attributes(attributes) }
    }
}

impl Snippet for CookiesSnippet {
    fn name(&self) -> &str {
        match self.side {
            Side::Request => "request-cookies",
            Side::Response => "response-cookies",
        }
    }

    fn create_model(&self, operation: &Operation) -> Result<Model, SnippetError> {
        let names: Vec<&str> = match self.side {
            Side::Request => operation.request().cookies().iter().map(|c| c.name.as_str()).collect(),
            Side::Response => operation.response().cookies().iter().map(|c| c.name.as_str()).collect(),
        };
        self.elements.verified_model(names, "cookies")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{HttpHeaders, OperationRequest, OperationResponse};
    use http::{Method, StatusCode};
    use serde_json::json;
    use url::Url;

    fn operation(request_cookies: &[&str], set_cookies: &[&str]) -> Operation {
        let mut builder = OperationRequest::builder(Method::GET, Url::parse("http://localhost/").unwrap());
        for name in request_cookies {
            builder = builder.cookie(*name, "value");
        }
        let headers: HttpHeaders = set_cookies.iter().map(|c| ("Set-Cookie", *c)).collect();
        Operation::new("cookies", builder.build(), OperationResponse::new(StatusCode::OK, headers, Vec::new()))
    }

    #[test]
    fn optional_cookie_may_be_absent() {
        let snippet = request_cookies([
            cookie_with_name("tz").description("one").optional(),
            cookie_with_name("logged_in").description("two"),
        ]);
        let model = snippet.create_model(&operation(&["logged_in"], &[])).unwrap();
        assert_eq!(
            model["cookies"],
            json!([
                {"name": "tz", "description": "one", "optional": true},
                {"name": "logged_in", "description": "two", "optional": false}
            ])
        );
    }

    #[test]
    fn undocumented_cookie_fails() {
        let err = request_cookies(DescriptorList::new())
            .create_model(&operation(&["JSESSIONID"], &[]))
            .unwrap_err();
        assert_eq!(err.to_string(), "Cookies with the following names were not documented: [JSESSIONID]");
    }

    #[test]
    fn names_are_case_sensitive() {
        let snippet = response_cookies([cookie_with_name("Session").description("s")]);
        let err = snippet.create_model(&operation(&[], &["session=1"])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cookies with the following names were not documented: [session]. \
             Cookies with the following names were not found in the response: [Session]"
        );
    }

    #[test]
    fn relaxed_accepts_undocumented_cookies() {
        let snippet = relaxed_response_cookies([cookie_with_name("a").description("A")]);
        assert!(snippet.create_model(&operation(&[], &["a=1", "b=2"])).is_ok());
        assert_eq!(snippet.name(), "response-cookies");
    }

    #[test]
    fn ignored_cookie_needs_no_description() {
        let snippet = request_cookies([cookie_with_name("tracking").ignored()]);
        let model = snippet.create_model(&operation(&["tracking"], &[])).unwrap();
        assert_eq!(model["cookies"], json!([]));
    }
}
