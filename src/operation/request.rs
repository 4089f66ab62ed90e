use http::Method;
use url::Url;

use super::headers::{HttpHeaders, CONTENT_LENGTH, HOST};
use super::media_type::APPLICATION_FORM_URLENCODED;
use super::multimap::{ParameterError, Parameters};
use super::decode_content;

/// A cookie sent with a request. Cookie names are case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestCookie {
    pub name: String,
    pub value: String,
}

impl RequestCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }

    /// Parses the value of a `Cookie` header (`a=1; b=2`). Pairs without a
    /// `=` are skipped.
    pub fn parse_header(value: &str) -> Vec<RequestCookie> {
        value
            .split(';')
            .filter_map(|pair| pair.split_once('='))
            .map(|(name, value)| RequestCookie::new(name.trim(), value.trim()))
            .filter(|cookie| !cookie.name.is_empty())
            .collect()
    }
}

/// One part of a multipart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRequestPart {
    pub name: String,
    pub submitted_file_name: Option<String>,
    pub headers: HttpHeaders,
    pub content: Vec<u8>,
}

impl OperationRequestPart {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            submitted_file_name: None,
            headers: HttpHeaders::new(),
            content: content.into(),
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.submitted_file_name = Some(file_name.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.add(name, value);
        self
    }

    pub fn content_as_string(&self) -> String {
        decode_content(&self.headers, &self.content)
    }
}

/// The request half of an [`Operation`](super::Operation).
///
/// Built once through [`OperationRequest::builder`] and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRequest {
    method: Method,
    uri: Url,
    headers: HttpHeaders,
    cookies: Vec<RequestCookie>,
    parts: Vec<OperationRequestPart>,
    content: Vec<u8>,
}

impl OperationRequest {
    pub fn builder(method: Method, uri: Url) -> OperationRequestBuilder {
        OperationRequestBuilder {
            inner: OperationRequest {
                method,
                uri,
                headers: HttpHeaders::new(),
                cookies: Vec::new(),
                parts: Vec::new(),
                content: Vec::new(),
            },
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    pub fn headers(&self) -> &HttpHeaders {
        &self.headers
    }

    pub fn cookies(&self) -> &[RequestCookie] {
        &self.cookies
    }

    pub fn parts(&self) -> &[OperationRequestPart] {
        &self.parts
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn content_as_string(&self) -> String {
        decode_content(&self.headers, &self.content)
    }

    /// Parameters from the query string of the URI.
    pub fn query_parameters(&self) -> Result<Parameters, ParameterError> {
        Parameters::from_query_string(self.uri.query().unwrap_or_default())
    }

    /// Parameters from an `application/x-www-form-urlencoded` body. Any other
    /// content type yields no parameters.
    pub fn form_parameters(&self) -> Result<Parameters, ParameterError> {
        let is_form = matches!(
            self.headers.content_type(),
            Some(Ok(ct)) if ct.is_compatible_with(&APPLICATION_FORM_URLENCODED)
        );
        if !is_form {
            return Ok(Parameters::new());
        }
        Parameters::from_query_string(&self.content_as_string())
    }

    /// Starts a builder seeded with this request, used by preprocessors.
    pub fn to_builder(&self) -> OperationRequestBuilder {
        OperationRequestBuilder { inner: self.clone() }
    }
}

#[derive(Debug, Clone)]
pub struct OperationRequestBuilder {
    inner: OperationRequest,
}

impl OperationRequestBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut OperationRequest)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn header(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let (name, value) = (name.into(), value.into());
        self.map(|r| r.headers.add(name, value))
    }

    pub fn headers(self, headers: HttpHeaders) -> Self {
        self.map(|r| r.headers = headers)
    }

    pub fn cookie(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let cookie = RequestCookie::new(name, value);
        self.map(|r| r.cookies.push(cookie))
    }

    pub fn cookies(self, cookies: Vec<RequestCookie>) -> Self {
        self.map(|r| r.cookies = cookies)
    }

    pub fn uri(self, uri: Url) -> Self {
        self.map(|r| r.uri = uri)
    }

    pub fn part(self, part: OperationRequestPart) -> Self {
        self.map(|r| r.parts.push(part))
    }

    pub fn parts(self, parts: Vec<OperationRequestPart>) -> Self {
        self.map(|r| r.parts = parts)
    }

    pub fn content(self, content: impl Into<Vec<u8>>) -> Self {
        let content = content.into();
        self.map(|r| r.content = content)
    }

    /// Apply multiple changes in one go.
    pub fn with(self, f: impl FnOnce(&mut OperationRequest)) -> Self {
        self.map(f)
    }

    /// Finishes the request. A `Host` header is derived from the URI when
    /// absent and `Content-Length` is set for non-empty bodies.
    pub fn build(mut self) -> OperationRequest {
        let request = &mut self.inner;
        if !request.headers.contains(HOST) {
            if let Some(host) = host_header(&request.uri) {
                request.headers.set(HOST, host);
            }
        }
        if request.content.is_empty() {
            if request.headers.get(CONTENT_LENGTH) == Some("0") {
                request.headers.remove(CONTENT_LENGTH);
            }
        } else {
            request.headers.set(CONTENT_LENGTH, request.content.len().to_string());
        }
        self.inner
    }
}

/// `localhost` or `localhost:8080`; default ports are omitted.
fn host_header(uri: &Url) -> Option<String> {
    let host = uri.host_str()?;
    Some(match uri.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}
