//! Framework-agnostic model of one documented HTTP exchange.
//!
//! An [`Operation`] is produced once per exchange by a converter (see
//! [`converter`]) and is read-only from then on. Bodies are always fully
//! materialized byte vectors, so every read returns the same bytes.
mod headers;
mod media_type;
mod multimap;
mod request;
mod response;

pub mod converter;
pub mod preprocess;

pub use headers::{HttpHeaders, CONTENT_LENGTH, CONTENT_TYPE, COOKIE, HOST, SET_COOKIE};
pub use media_type::{
    MediaType, MediaTypeError, ALL, APPLICATION_FORM_URLENCODED, APPLICATION_HAL_FORMS_JSON,
    APPLICATION_HAL_JSON, APPLICATION_JSON, APPLICATION_VND_HAL_JSON, MULTIPART_FORM_DATA,
};
pub use multimap::{MultiValueMap, ParameterError, Parameters};
pub use request::{OperationRequest, OperationRequestBuilder, OperationRequestPart, RequestCookie};
pub use response::{OperationResponse, ResponseCookie};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    name: String,
    request: OperationRequest,
    response: OperationResponse,
    url_template: Option<String>,
}

impl Operation {
    pub fn new(name: impl Into<String>, request: OperationRequest, response: OperationResponse) -> Self {
        Self { name: name.into(), request, response, url_template: None }
    }

    /// Attaches the URL template (`/users/{id}`) the request was made from.
    /// Path parameters are only documentable when this is present.
    pub fn with_url_template(mut self, template: impl Into<String>) -> Self {
        self.url_template = Some(template.into());
        self
    }

    /// Identifier of the operation. Snippets are written below a directory
    /// of this name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn request(&self) -> &OperationRequest {
        &self.request
    }

    pub fn response(&self) -> &OperationResponse {
        &self.response
    }

    pub fn url_template(&self) -> Option<&str> {
        self.url_template.as_deref()
    }
}

/// Decodes a body using the `charset` of the `Content-Type` header.
///
/// Only the UTF-8 family is decoded natively. Any other or unknown charset
/// falls back to lossy UTF-8.
pub(crate) fn decode_content(headers: &HttpHeaders, content: &[u8]) -> String {
    let charset = headers
        .content_type()
        .and_then(Result::ok)
        .and_then(|ct| ct.charset().map(str::to_string));

    match charset.as_deref() {
        Some(cs) if cs.eq_ignore_ascii_case("utf-8") || cs.eq_ignore_ascii_case("utf8") => {
            String::from_utf8_lossy(content).into_owned()
        }
        Some(cs) if cs.eq_ignore_ascii_case("us-ascii") || cs.eq_ignore_ascii_case("iso-8859-1") => {
            content.iter().map(|&b| b as char).collect()
        }
        _ => String::from_utf8_lossy(content).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, StatusCode};
    use url::Url;

    #[test]
    fn latin1_content_is_decoded_per_byte() {
        let headers: HttpHeaders = [("Content-Type", "text/plain; charset=ISO-8859-1")].into_iter().collect();
        assert_eq!(decode_content(&headers, &[0x63, 0x61, 0x66, 0xe9]), "café");
    }

    #[test]
    fn utf8_is_the_default() {
        assert_eq!(decode_content(&HttpHeaders::new(), "café".as_bytes()), "café");
    }

    #[test]
    fn operation_exposes_its_parts() {
        let request = OperationRequest::builder(Method::GET, Url::parse("http://localhost/users/1").unwrap()).build();
        let response = OperationResponse::new(StatusCode::OK, HttpHeaders::new(), Vec::new());
        let operation = Operation::new("get-user", request, response).with_url_template("/users/{id}");

        assert_eq!(operation.name(), "get-user");
        assert_eq!(operation.url_template(), Some("/users/{id}"));
        assert_eq!(operation.request().method(), Method::GET);
        assert_eq!(operation.response().status(), StatusCode::OK);
    }
}
