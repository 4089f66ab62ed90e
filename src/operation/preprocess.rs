//! Request and response preprocessors applied before snippets are rendered.
//!
//! Preprocessors never modify an operation in place. Each one returns a new
//! request or response derived from the one it was given.
use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use super::{HttpHeaders, OperationRequest, OperationResponse, APPLICATION_JSON, CONTENT_LENGTH, HOST};

pub trait OperationPreprocessor: Send + Sync {
    fn preprocess_request(&self, request: OperationRequest) -> OperationRequest {
        request
    }

    fn preprocess_response(&self, response: OperationResponse) -> OperationResponse {
        response
    }
}

/// Removes headers by name (case-insensitive) from requests and responses.
#[derive(Debug, Clone)]
pub struct RemoveHeaders {
    names: Vec<String>,
}

pub fn remove_headers<I, S>(names: I) -> RemoveHeaders
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    RemoveHeaders { names: names.into_iter().map(Into::into).collect() }
}

impl RemoveHeaders {
    fn strip(&self, headers: &HttpHeaders) -> HttpHeaders {
        let mut headers = headers.clone();
        for name in &self.names {
            headers.remove(name);
        }
        headers
    }
}

impl OperationPreprocessor for RemoveHeaders {
    fn preprocess_request(&self, request: OperationRequest) -> OperationRequest {
        let headers = self.strip(request.headers());
        request.to_builder().headers(headers).build()
    }

    fn preprocess_response(&self, response: OperationResponse) -> OperationResponse {
        let headers = self.strip(response.headers());
        response.with_parts(headers, response.content().to_vec())
    }
}

/// Pretty prints JSON bodies. Bodies that are not JSON, or that fail to
/// parse, are left untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrettyPrint;

pub fn pretty_print() -> PrettyPrint {
    PrettyPrint
}

impl PrettyPrint {
    fn format(headers: &HttpHeaders, content: &[u8]) -> Option<Vec<u8>> {
        if content.is_empty() {
            return None;
        }
        match headers.content_type() {
            Some(Ok(ct)) if ct.is_compatible_with(&APPLICATION_JSON) => {}
            None => {}
            _ => return None,
        }
        let value: serde_json::Value = serde_json::from_slice(content).ok()?;
        serde_json::to_vec_pretty(&value).ok()
    }
}

impl OperationPreprocessor for PrettyPrint {
    fn preprocess_request(&self, request: OperationRequest) -> OperationRequest {
        match Self::format(request.headers(), request.content()) {
            Some(pretty) => request.to_builder().content(pretty).build(),
            None => request,
        }
    }

    fn preprocess_response(&self, response: OperationResponse) -> OperationResponse {
        match Self::format(response.headers(), response.content()) {
            Some(pretty) => with_content(&response, response.headers().clone(), pretty),
            None => response,
        }
    }
}

/// Replaces the body of a response. A `Content-Length` header, when present,
/// follows the new body.
fn with_content(response: &OperationResponse, mut headers: HttpHeaders, content: Vec<u8>) -> OperationResponse {
    if headers.contains(CONTENT_LENGTH) {
        headers.set(CONTENT_LENGTH, content.len().to_string());
    }
    response.with_parts(headers, content)
}

#[derive(Debug, Clone)]
enum HeaderModification {
    Add(String, String),
    Set(String, String),
    Remove(String),
    RemoveValue(String, String),
    RemoveMatching(Regex),
}

/// Adds, replaces and removes headers of requests and responses. The
/// modifications are applied in the order they were declared.
///
/// ```
/// use restdocs::operation::preprocess::modify_headers;
/// let preprocessor = modify_headers()
///     .remove("Date")
///     .set("Server", "example")
///     .remove_matching(regex::Regex::new("^X-Internal-.*").unwrap());
/// # let _ = preprocessor;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ModifyHeaders {
    modifications: Vec<HeaderModification>,
}

pub fn modify_headers() -> ModifyHeaders {
    ModifyHeaders::default()
}

impl ModifyHeaders {
    fn push(mut self, modification: HeaderModification) -> Self {
        self.modifications.push(modification);
        self
    }

    pub fn add(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(HeaderModification::Add(name.into(), value.into()))
    }

    /// Replaces every value of `name`.
    pub fn set(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(HeaderModification::Set(name.into(), value.into()))
    }

    pub fn remove(self, name: impl Into<String>) -> Self {
        self.push(HeaderModification::Remove(name.into()))
    }

    /// Removes one value of `name`. The header goes away with its last value.
    pub fn remove_value(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(HeaderModification::RemoveValue(name.into(), value.into()))
    }

    /// Removes every header whose whole name matches `pattern`.
    pub fn remove_matching(self, pattern: Regex) -> Self {
        self.push(HeaderModification::RemoveMatching(pattern))
    }

    fn apply(&self, headers: &HttpHeaders) -> HttpHeaders {
        let mut headers = headers.clone();
        for modification in &self.modifications {
            match modification {
                HeaderModification::Add(name, value) => headers.add(name.as_str(), value.as_str()),
                HeaderModification::Set(name, value) => headers.set(name.as_str(), value.as_str()),
                HeaderModification::Remove(name) => {
                    headers.remove(name);
                }
                HeaderModification::RemoveValue(name, value) => {
                    let kept: Vec<String> = headers.get_all(name).iter().filter(|v| *v != value).cloned().collect();
                    if kept.is_empty() {
                        headers.remove(name);
                    } else {
                        headers.set_all(name.as_str(), kept);
                    }
                }
                HeaderModification::RemoveMatching(pattern) => {
                    let matching: Vec<String> = headers
                        .names()
                        .filter(|name| pattern.find(name).is_some_and(|m| m.start() == 0 && m.end() == name.len()))
                        .map(str::to_string)
                        .collect();
                    for name in matching {
                        headers.remove(&name);
                    }
                }
            }
        }
        headers
    }
}

impl OperationPreprocessor for ModifyHeaders {
    fn preprocess_request(&self, request: OperationRequest) -> OperationRequest {
        let headers = self.apply(request.headers());
        request.to_builder().headers(headers).build()
    }

    fn preprocess_response(&self, response: OperationResponse) -> OperationResponse {
        let headers = self.apply(response.headers());
        response.with_parts(headers, response.content().to_vec())
    }
}

/// Replaces every match of a pattern in request and response bodies.
///
/// The replacement may refer to capture groups as `$1` or `${name}`.
#[derive(Debug, Clone)]
pub struct ReplacePattern {
    pattern: Regex,
    replacement: String,
}

pub fn replace_pattern(pattern: Regex, replacement: impl Into<String>) -> ReplacePattern {
    ReplacePattern { pattern, replacement: replacement.into() }
}

impl ReplacePattern {
    fn replace(&self, content: String) -> Option<Vec<u8>> {
        if !self.pattern.is_match(&content) {
            return None;
        }
        Some(self.pattern.replace_all(&content, self.replacement.as_str()).into_owned().into_bytes())
    }
}

impl OperationPreprocessor for ReplacePattern {
    fn preprocess_request(&self, request: OperationRequest) -> OperationRequest {
        match self.replace(request.content_as_string()) {
            Some(content) => request.to_builder().content(content).build(),
            None => request,
        }
    }

    fn preprocess_response(&self, response: OperationResponse) -> OperationResponse {
        match self.replace(response.content_as_string()) {
            Some(content) => with_content(&response, response.headers().clone(), content),
            None => response,
        }
    }
}

lazy_static! {
    static ref URI_PATTERN: Option<Regex> = Regex::new(r#"https?://[^\s"']+"#).ok();
}

/// Rewrites the scheme, host and port of the request URI and of every
/// absolute `http(s)` URI found in header values and bodies, so that
/// snippets show a public address instead of a test server.
#[derive(Debug, Clone, Default)]
pub struct ModifyUris {
    scheme: Option<String>,
    host: Option<String>,
    port: Option<Option<u16>>,
}

pub fn modify_uris() -> ModifyUris {
    ModifyUris::default()
}

impl ModifyUris {
    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(Some(port));
        self
    }

    pub fn remove_port(mut self) -> Self {
        self.port = Some(None);
        self
    }

    fn is_noop(&self) -> bool {
        self.scheme.is_none() && self.host.is_none() && self.port.is_none()
    }

    fn modify_uri(&self, uri: &Url) -> Url {
        let mut modified = uri.clone();
        if let Some(scheme) = &self.scheme {
            if modified.set_scheme(scheme).is_err() {
                log::warn!("cannot change the scheme of {uri} to {scheme}");
            }
        }
        if let Some(host) = &self.host {
            if let Err(err) = modified.set_host(Some(host)) {
                log::warn!("cannot change the host of {uri} to {host}: {err}");
            }
        }
        if let Some(port) = self.port {
            if modified.set_port(port).is_err() {
                log::warn!("cannot change the port of {uri}");
            }
        }
        modified
    }

    fn modify_text(&self, text: &str) -> String {
        let Some(pattern) = URI_PATTERN.as_ref() else {
            return text.to_string();
        };
        pattern
            .replace_all(text, |caps: &regex::Captures<'_>| {
                let original = &caps[0];
                let Ok(uri) = Url::parse(original) else {
                    return original.to_string();
                };
                let mut modified = self.modify_uri(&uri).to_string();
                // parsing adds a slash to bare origins
                if !original.ends_with('/') && modified.ends_with('/') && uri.path() == "/" {
                    modified.pop();
                }
                modified
            })
            .into_owned()
    }

    fn modify_headers(&self, headers: &HttpHeaders) -> HttpHeaders {
        headers
            .iter()
            .flat_map(|(name, values)| values.iter().map(move |value| (name, value)))
            .map(|(name, value)| (name, self.modify_text(value)))
            .collect()
    }
}

impl OperationPreprocessor for ModifyUris {
    fn preprocess_request(&self, request: OperationRequest) -> OperationRequest {
        if self.is_noop() {
            return request;
        }
        let uri = self.modify_uri(request.uri());
        let mut headers = self.modify_headers(request.headers());
        if let Some(host) = uri.host_str() {
            let host = match uri.port() {
                Some(port) => format!("{host}:{port}"),
                None => host.to_string(),
            };
            headers.set(HOST, host);
        }
        let parts = request
            .parts()
            .iter()
            .cloned()
            .map(|mut part| {
                part.content = self.modify_text(&part.content_as_string()).into_bytes();
                part.headers = self.modify_headers(&part.headers);
                part
            })
            .collect();
        let content = if request.content().is_empty() {
            Vec::new()
        } else {
            self.modify_text(&request.content_as_string()).into_bytes()
        };
        request.to_builder().uri(uri).headers(headers).parts(parts).content(content).build()
    }

    fn preprocess_response(&self, response: OperationResponse) -> OperationResponse {
        if self.is_noop() {
            return response;
        }
        let headers = self.modify_headers(response.headers());
        let content = if response.content().is_empty() {
            Vec::new()
        } else {
            self.modify_text(&response.content_as_string()).into_bytes()
        };
        with_content(&response, headers, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, StatusCode};
    use url::Url;

    fn request(headers: &[(&str, &str)], body: &str) -> OperationRequest {
        let mut builder = OperationRequest::builder(Method::POST, Url::parse("http://localhost/").unwrap());
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.content(body).build()
    }

    #[test]
    fn removes_headers_ignoring_case() {
        let request = request(&[("X-Secret", "1"), ("Accept", "*/*")], "");
        let request = remove_headers(["x-secret"]).preprocess_request(request);
        assert!(!request.headers().contains("X-Secret"));
        assert!(request.headers().contains("Accept"));
    }

    #[test]
    fn removes_response_headers_and_keeps_body() {
        let headers: HttpHeaders = [("Date", "today"), ("Content-Type", "text/plain")].into_iter().collect();
        let response = OperationResponse::new(StatusCode::OK, headers, b"body".to_vec());
        let response = remove_headers(vec!["date".to_string()]).preprocess_response(response);
        assert_eq!(response.headers().names().collect::<Vec<_>>(), vec!["Content-Type"]);
        assert_eq!(response.content(), b"body");
    }

    #[test]
    fn pretty_prints_json_and_updates_length() {
        let request = request(&[("Content-Type", "application/json")], r#"{"a":1}"#);
        let request = pretty_print().preprocess_request(request);
        assert_eq!(request.content_as_string(), "{\n  \"a\": 1\n}");
        assert_eq!(request.headers().get("Content-Length"), Some("12"));
    }

    #[test]
    fn leaves_non_json_alone() {
        let request = request(&[("Content-Type", "text/plain")], r#"{"a":1}"#);
        let request = pretty_print().preprocess_request(request);
        assert_eq!(request.content_as_string(), r#"{"a":1}"#);

        let request = self::request(&[], "not json");
        assert_eq!(pretty_print().preprocess_request(request).content_as_string(), "not json");
    }

    fn response(headers: &[(&str, &str)], body: &str) -> OperationResponse {
        let headers: HttpHeaders = headers.iter().copied().collect();
        OperationResponse::new(StatusCode::OK, headers, body.as_bytes().to_vec())
    }

    #[test]
    fn modifies_headers_in_declaration_order() {
        let response = response(
            &[("Date", "today"), ("X-Internal-Id", "1"), ("x-internal-node", "a"), ("Vary", "Accept"), ("Vary", "Origin")],
            "",
        );
        let response = modify_headers()
            .remove("date")
            .add("Server", "one")
            .set("Server", "two")
            .remove_value("Vary", "Accept")
            .remove_matching(Regex::new("(?i)x-internal-.*").unwrap())
            .preprocess_response(response);

        let headers: Vec<_> = response.headers().iter().map(|(n, v)| (n, v.to_vec())).collect();
        assert_eq!(
            headers,
            vec![("Vary", vec!["Origin".to_string()]), ("Server", vec!["two".to_string()])]
        );
    }

    #[test]
    fn removing_the_last_value_removes_the_header() {
        let request = request(&[("Accept", "text/plain")], "");
        let request = modify_headers().remove_value("accept", "text/plain").preprocess_request(request);
        assert!(!request.headers().contains("Accept"));
    }

    #[test]
    fn header_patterns_must_match_the_whole_name() {
        let request = request(&[("X-Trace", "1"), ("X-Trace-Id", "2")], "");
        let request = modify_headers().remove_matching(Regex::new("X-Trace").unwrap()).preprocess_request(request);
        assert!(request.headers().contains("X-Trace-Id"));
        assert!(!request.headers().contains("X-Trace"));
    }

    #[test]
    fn replaces_patterns_in_bodies() {
        let pattern = Regex::new(r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}").unwrap();
        let preprocessor = replace_pattern(pattern, "<id>");

        let request = request(&[("Content-Type", "text/plain")], "id=0f8fad5b-d9cb-469f-a165-70867728950e");
        let request = preprocessor.preprocess_request(request);
        assert_eq!(request.content_as_string(), "id=<id>");
        assert_eq!(request.headers().get("Content-Length"), Some("7"));

        let response = response(&[("Content-Length", "99")], "no ids here");
        let response = preprocessor.preprocess_response(response);
        assert_eq!(response.content_as_string(), "no ids here");
        assert_eq!(response.headers().get("Content-Length"), Some("99"));
    }

    #[test]
    fn replacement_can_use_capture_groups() {
        let preprocessor = replace_pattern(Regex::new(r"(\w+)@example\.com").unwrap(), "$1@example.org");
        let response = preprocessor.preprocess_response(response(&[("Content-Length", "16")], "ada@example.com!"));
        assert_eq!(response.content_as_string(), "ada@example.org!");
        assert_eq!(response.headers().get("Content-Length"), Some("16"));
    }

    #[test]
    fn modifies_request_uri_and_host() {
        let request = OperationRequest::builder(Method::GET, Url::parse("http://localhost:8080/orders/7?x=1").unwrap())
            .header("Referer", "http://localhost:8080/orders")
            .build();
        let request = modify_uris().scheme("https").host("api.example.com").remove_port().preprocess_request(request);

        assert_eq!(request.uri().as_str(), "https://api.example.com/orders/7?x=1");
        assert_eq!(request.headers().get("Host"), Some("api.example.com"));
        assert_eq!(request.headers().get("Referer"), Some("https://api.example.com/orders"));
    }

    #[test]
    fn modifies_uris_in_response_bodies() {
        let body = r#"{"self":"http://localhost:8080/orders/7","home":"http://localhost:8080"}"#;
        let response = response(&[("Location", "http://localhost:8080/orders/7")], body);
        let response = modify_uris().host("api.example.com").port(443).preprocess_response(response);

        assert_eq!(
            response.content_as_string(),
            r#"{"self":"http://api.example.com:443/orders/7","home":"http://api.example.com:443"}"#
        );
        assert_eq!(response.headers().get("Location"), Some("http://api.example.com:443/orders/7"));
    }

    #[test]
    fn unconfigured_uri_modifier_changes_nothing() {
        let request = request(&[("Host", "localhost")], "see http://localhost/x");
        let unchanged = modify_uris().preprocess_request(request.clone());
        assert_eq!(unchanged, request);
    }
}
