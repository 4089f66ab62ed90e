//! `curl-request` and `httpie-request` snippets: a command line that
//! reproduces the documented request.
//!
//! `Host` and `Content-Length` are left to the tool and never rendered.
use http::Method;
use serde_json::Value;

use crate::errors::SnippetError;
use crate::operation::{
    MediaType, Operation, OperationRequest, OperationRequestPart, CONTENT_LENGTH, CONTENT_TYPE, HOST,
    MULTIPART_FORM_DATA,
};
use crate::snippet::{merge_attributes, Attributes, Model, Snippet};

pub fn curl_request() -> CurlRequestSnippet {
    CurlRequestSnippet::default()
}

pub fn httpie_request() -> HttpieRequestSnippet {
    HttpieRequestSnippet::default()
}

/// Request headers worth passing on the command line.
fn cli_headers(request: &OperationRequest) -> impl Iterator<Item = (&str, &String)> {
    request
        .headers()
        .iter()
        .filter(|(name, _)| !name.eq_ignore_ascii_case(HOST) && !name.eq_ignore_ascii_case(CONTENT_LENGTH))
        .flat_map(|(name, values)| values.iter().map(move |value| (name, value)))
}

fn part_content_type(part: &OperationRequestPart) -> Option<&str> {
    part.headers.get(CONTENT_TYPE)
}

#[derive(Debug, Clone, Default)]
pub struct CurlRequestSnippet {
    attributes: Attributes,
}

impl CurlRequestSnippet {
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes.extend(attributes);
        self
    }
}

impl Snippet for CurlRequestSnippet {
    fn name(&self) -> &str {
        "curl-request"
    }

    fn create_model(&self, operation: &Operation) -> Result<Model, SnippetError> {
        let request = operation.request();
        let mut options = String::from("-i");

        if *request.method() != Method::GET {
            options.push_str(&format!(" -X {}", request.method()));
        }
        for (name, value) in cli_headers(request) {
            options.push_str(&format!(" -H '{name}: {value}'"));
        }
        for part in request.parts() {
            let value = match &part.submitted_file_name {
                Some(file) if !file.is_empty() => format!("@{file}"),
                _ => part.content_as_string(),
            };
            options.push_str(&format!(" -F '{}={value}", part.name));
            if let Some(content_type) = part_content_type(part) {
                options.push_str(&format!(";type={content_type}"));
            }
            options.push('\'');
        }
        let content = request.content_as_string();
        if !content.is_empty() {
            options.push_str(&format!(" -d '{content}'"));
        }

        let mut model = Model::new();
        model.insert("url".into(), Value::String(format!("'{}'", request.uri())));
        model.insert("options".into(), Value::String(options));
        merge_attributes(&mut model, &self.attributes);
        Ok(model)
    }
}

#[derive(Debug, Clone, Default)]
pub struct HttpieRequestSnippet {
    attributes: Attributes,
}

impl HttpieRequestSnippet {
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes.extend(attributes);
        self
    }
}

impl Snippet for HttpieRequestSnippet {
    fn name(&self) -> &str {
        "httpie-request"
    }

    fn create_model(&self, operation: &Operation) -> Result<Model, SnippetError> {
        let request = operation.request();
        let has_parts = !request.parts().is_empty();

        let content = request.content_as_string();
        let echo_content = if content.is_empty() { String::new() } else { format!("echo '{content}' | ") };

        let mut options = String::new();
        if has_parts {
            options.push_str("--form ");
        }
        options.push_str(request.method().as_str());

        let mut items = String::new();
        for part in request.parts() {
            items.push_str(&format!(" \\\n  '{}'", part.name));
            match &part.submitted_file_name {
                Some(file) if !file.is_empty() => items.push_str(&format!("@'{file}'")),
                _ => items.push_str(&format!("@<(echo '{}')", part.content_as_string())),
            }
        }
        for (name, value) in cli_headers(request) {
            // --form sets the multipart content type itself
            let multipart = value.parse::<MediaType>().is_ok_and(|ct| ct.is_compatible_with(&MULTIPART_FORM_DATA));
            if has_parts && name.eq_ignore_ascii_case(CONTENT_TYPE) && multipart {
                continue;
            }
            items.push_str(&format!(" '{name}:{value}'"));
        }

        let mut model = Model::new();
        model.insert("echoContent".into(), Value::String(echo_content));
        model.insert("options".into(), Value::String(options));
        model.insert("url".into(), Value::String(format!("'{}'", request.uri())));
        model.insert("requestItems".into(), Value::String(items));
        merge_attributes(&mut model, &self.attributes);
        Ok(model)
    }
}
