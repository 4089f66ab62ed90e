//! `http-request` and `http-response` snippets: the exchange as it went over
//! the wire.
use http::Method;
use serde_json::{json, Value};

use crate::errors::SnippetError;
use crate::operation::{HttpHeaders, Operation, OperationRequest, CONTENT_TYPE, MULTIPART_FORM_DATA};
use crate::snippet::{merge_attributes, Attributes, Model, Snippet};

/// Boundary used when a multipart request body is rendered from its parts.
pub const MULTIPART_BOUNDARY: &str = "6o2knFse3p53ty9dmcQvWAIx1zInP11uCfbm";

pub fn http_request() -> HttpRequestSnippet {
    HttpRequestSnippet::default()
}

pub fn http_response() -> HttpResponseSnippet {
    HttpResponseSnippet::default()
}

#[derive(Debug, Clone, Default)]
pub struct HttpRequestSnippet {
    attributes: Attributes,
}

impl HttpRequestSnippet {
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes.extend(attributes);
        self
    }
}

impl Snippet for HttpRequestSnippet {
    fn name(&self) -> &str {
        "http-request"
    }

    fn create_model(&self, operation: &Operation) -> Result<Model, SnippetError> {
        let request = operation.request();
        let uri = request.uri();
        let path = match uri.query() {
            Some(query) if !query.is_empty() => format!("{}?{query}", uri.path()),
            _ => uri.path().to_string(),
        };

        let mut model = Model::new();
        model.insert("method".into(), Value::String(request.method().to_string()));
        model.insert("path".into(), Value::String(path));
        model.insert("headers".into(), Value::Array(request_headers(request)));
        model.insert("requestBody".into(), Value::String(request_body(request)));
        merge_attributes(&mut model, &self.attributes);
        Ok(model)
    }
}

fn header_rows(headers: &HttpHeaders) -> impl Iterator<Item = (&str, &String)> {
    headers.iter().flat_map(|(name, values)| values.iter().map(move |value| (name, value)))
}

fn is_multipart(request: &OperationRequest) -> bool {
    matches!(
        request.headers().content_type(),
        Some(Ok(ct)) if ct.is_compatible_with(&MULTIPART_FORM_DATA)
    )
}

fn request_headers(request: &OperationRequest) -> Vec<Value> {
    let add_boundary = !request.parts().is_empty() && is_multipart(request);
    header_rows(request.headers())
        .map(|(name, value)| {
            let value = if add_boundary && name.eq_ignore_ascii_case(CONTENT_TYPE) && !value.contains("boundary=") {
                format!("{value}; boundary={MULTIPART_BOUNDARY}")
            } else {
                value.clone()
            };
            json!({ "name": name, "value": value })
        })
        .collect()
}

fn request_body(request: &OperationRequest) -> String {
    let content = request.content_as_string();
    if !content.is_empty() {
        return format!("\n{content}");
    }
    let put_or_post = *request.method() == Method::PUT || *request.method() == Method::POST;
    if !put_or_post || request.parts().is_empty() {
        return String::new();
    }

    let mut body = String::from("\n");
    for part in request.parts() {
        body.push_str(&format!("--{MULTIPART_BOUNDARY}\n"));
        body.push_str(&format!("Content-Disposition: form-data; name={}\n", part.name));
        if let Some(content_type) = part.headers.get(CONTENT_TYPE) {
            body.push_str(&format!("Content-Type: {content_type}\n"));
        }
        body.push('\n');
        body.push_str(&part.content_as_string());
        body.push('\n');
    }
    body.push_str(&format!("--{MULTIPART_BOUNDARY}--"));
    body
}

#[derive(Debug, Clone, Default)]
pub struct HttpResponseSnippet {
    attributes: Attributes,
}

impl HttpResponseSnippet {
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes.extend(attributes);
        self
    }
}

impl Snippet for HttpResponseSnippet {
    fn name(&self) -> &str {
        "http-response"
    }

    fn create_model(&self, operation: &Operation) -> Result<Model, SnippetError> {
        let response = operation.response();
        let status = response.status();
        let content = response.content_as_string();
        let body = if content.is_empty() { content } else { format!("\n{content}") };

        let headers = header_rows(response.headers())
            .map(|(name, value)| json!({ "name": name, "value": value }))
            .collect();

        let mut model = Model::new();
        model.insert("statusCode".into(), Value::from(status.as_u16()));
        model.insert("statusReason".into(), Value::String(status.canonical_reason().unwrap_or_default().to_string()));
        model.insert("headers".into(), Value::Array(headers));
        model.insert("responseBody".into(), Value::String(body));
        merge_attributes(&mut model, &self.attributes);
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{OperationRequestPart, OperationResponse};
    use crate::snippet::StandardTemplateEngine;
    use http::StatusCode;
    use url::Url;

    fn operation(request: OperationRequest, response: OperationResponse) -> Operation {
        Operation::new("op", request, response)
    }

    fn ok() -> OperationResponse {
        OperationResponse::new(StatusCode::OK, HttpHeaders::new(), Vec::new())
    }

    #[test]
    fn get_request_with_query_string() {
        let request = OperationRequest::builder(Method::GET, Url::parse("http://localhost:8080/users?page=2").unwrap())
            .header("Accept", "application/json")
            .build();
        let out = http_request().render(&operation(request, ok()), &StandardTemplateEngine::default()).unwrap();
        assert_eq!(
            out,
            "[source,http,options=\"nowrap\"]\n----\nGET /users?page=2 HTTP/1.1\nAccept: application/json\nHost: localhost:8080\n\n----"
        );
    }

    #[test]
    fn post_request_with_body() {
        let request = OperationRequest::builder(Method::POST, Url::parse("http://localhost/users").unwrap())
            .header("Content-Type", "application/json")
            .content(r#"{"name":"Ada"}"#)
            .build();
        let model = http_request().create_model(&operation(request, ok())).unwrap();
        assert_eq!(model["method"], "POST");
        assert_eq!(model["requestBody"], "\n{\"name\":\"Ada\"}");
        let names: Vec<_> = model["headers"].as_array().unwrap().iter().map(|h| h["name"].clone()).collect();
        assert_eq!(names, vec!["Content-Type", "Host", "Content-Length"]);
    }

    #[test]
    fn multipart_request_is_rendered_from_its_parts() {
        let request = OperationRequest::builder(Method::POST, Url::parse("http://localhost/upload").unwrap())
            .header("Content-Type", "multipart/form-data")
            .part(OperationRequestPart::new("image", b"<<png data>>".to_vec()).with_header("Content-Type", "image/png"))
            .build();
        let model = http_request().create_model(&operation(request, ok())).unwrap();

        assert_eq!(
            model["headers"][0]["value"],
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}")
        );
        assert_eq!(
            model["requestBody"],
            format!(
                "\n--{b}\nContent-Disposition: form-data; name=image\nContent-Type: image/png\n\n<<png data>>\n--{b}--",
                b = MULTIPART_BOUNDARY
            )
        );
    }

    #[test]
    fn response_with_status_headers_and_body() {
        let headers: HttpHeaders = [("Content-Type", "text/plain"), ("X-Tag", "a"), ("X-Tag", "b")].into_iter().collect();
        let response = OperationResponse::new(StatusCode::CREATED, headers, b"done".to_vec());
        let request = OperationRequest::builder(Method::POST, Url::parse("http://localhost/").unwrap()).build();

        let out = http_response().render(&operation(request, response), &StandardTemplateEngine::default()).unwrap();
        assert_eq!(
            out,
            "[source,http,options=\"nowrap\"]\n----\nHTTP/1.1 201 Created\nContent-Type: text/plain\nX-Tag: a\nX-Tag: b\n\ndone\n----"
        );
    }

    #[test]
    fn empty_response_has_no_body_line() {
        let request = OperationRequest::builder(Method::DELETE, Url::parse("http://localhost/x").unwrap()).build();
        let response = OperationResponse::new(StatusCode::NO_CONTENT, HttpHeaders::new(), Vec::new());
        let model = http_response().create_model(&operation(request, response)).unwrap();
        assert_eq!(model["statusCode"], 204);
        assert_eq!(model["statusReason"], "No Content");
        assert_eq!(model["responseBody"], "");
    }
}
