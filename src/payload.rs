//! `request-fields`, `response-fields` and `request-part-{name}-fields`
//! snippets documenting the fields of a JSON payload, plus the body snippets
//! that show a payload verbatim.
//!
//! A field is missing when a required, non-ignored descriptor's path
//! matches nothing. Whatever is left of the payload after every described
//! path has been removed is undocumented, and gets reported pretty printed.
mod body;
mod field_path;
mod field_processor;
mod field_type;

pub use body::{request_body, request_part_body, response_body, BodySnippet};
pub use field_path::{FieldPath, Segment};
pub use field_processor::{extract, has_field, is_empty, remove, remove_subsection};
pub use field_type::FieldType;

use serde_json::Value;

use crate::descriptor::{describe, Descriptor, DescriptorList};
use crate::errors::SnippetError;
use crate::operation::Operation;
use crate::snippet::{merge_attributes, Attributes, Model, Snippet};
use crate::verify::{format_names, DocumentationMismatch};

/// Describes a field of a JSON payload addressed by a [`FieldPath`].
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    descriptor: Descriptor,
    field_type: Option<FieldType>,
    subsection: bool,
}

pub fn field_with_path(path: impl Into<String>) -> FieldDescriptor {
    FieldDescriptor { descriptor: describe(path), field_type: None, subsection: false }
}

/// Describes a whole subsection of the payload. Nothing below the path needs
/// documenting on its own.
pub fn subsection_with_path(path: impl Into<String>) -> FieldDescriptor {
    FieldDescriptor { descriptor: describe(path), field_type: None, subsection: true }
}

impl FieldDescriptor {
    pub fn path(&self) -> &str {
        &self.descriptor.name
    }

    pub fn declared_type(&self) -> Option<FieldType> {
        self.field_type
    }

    pub fn is_subsection(&self) -> bool {
        self.subsection
    }

    pub fn description(self, description: impl Into<String>) -> Self {
        Self { descriptor: self.descriptor.description(description), ..self }
    }

    pub fn field_type(mut self, field_type: FieldType) -> Self {
        self.field_type = Some(field_type);
        self
    }

    pub fn optional(self) -> Self {
        Self { descriptor: self.descriptor.optional(), ..self }
    }

    pub fn ignored(self) -> Self {
        Self { descriptor: self.descriptor.ignored(), ..self }
    }

    pub fn attribute(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { descriptor: self.descriptor.attribute(key, value), ..self }
    }

    fn with_prefix(&self, prefix: &str) -> Self {
        let mut prefixed = self.clone();
        prefixed.descriptor.name = format!("{prefix}{}", self.descriptor.name);
        prefixed
    }
}

impl AsRef<Descriptor> for FieldDescriptor {
    fn as_ref(&self) -> &Descriptor {
        &self.descriptor
    }
}

/// Which payload a [`FieldsSnippet`] reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadSource {
    Request,
    Response,
    /// The body of the multipart request part with this name.
    RequestPart(String),
}

pub fn request_fields(descriptors: impl Into<DescriptorList<FieldDescriptor>>) -> FieldsSnippet {
    FieldsSnippet::new(PayloadSource::Request, descriptors.into(), false)
}

pub fn relaxed_request_fields(descriptors: impl Into<DescriptorList<FieldDescriptor>>) -> FieldsSnippet {
    FieldsSnippet::new(PayloadSource::Request, descriptors.into(), true)
}

pub fn response_fields(descriptors: impl Into<DescriptorList<FieldDescriptor>>) -> FieldsSnippet {
    FieldsSnippet::new(PayloadSource::Response, descriptors.into(), false)
}

pub fn relaxed_response_fields(descriptors: impl Into<DescriptorList<FieldDescriptor>>) -> FieldsSnippet {
    FieldsSnippet::new(PayloadSource::Response, descriptors.into(), true)
}

pub fn request_part_fields(
    part: impl Into<String>,
    descriptors: impl Into<DescriptorList<FieldDescriptor>>,
) -> FieldsSnippet {
    FieldsSnippet::new(PayloadSource::RequestPart(part.into()), descriptors.into(), false)
}

#[derive(Debug, Clone)]
pub struct FieldsSnippet {
    name: String,
    source: PayloadSource,
    descriptors: DescriptorList<FieldDescriptor>,
    relaxed: bool,
    attributes: Attributes,
}

impl FieldsSnippet {
    fn new(source: PayloadSource, descriptors: DescriptorList<FieldDescriptor>, relaxed: bool) -> Self {
        let name = match &source {
            PayloadSource::Request => "request-fields".to_string(),
            PayloadSource::Response => "response-fields".to_string(),
            PayloadSource::RequestPart(part) => format!("request-part-{part}-fields"),
        };
        Self { name, source, descriptors, relaxed, attributes: Attributes::new() }
    }

    pub fn and(&self, more: impl IntoIterator<Item = FieldDescriptor>) -> Self {
        Self { descriptors: self.descriptors.and(more), ..self.clone() }
    }

    /// Like [`and`](Self::and) with `prefix` prepended to every extra path,
    /// for documenting a repeated structure once: `and_with_prefix("items[].", ..)`.
    pub fn and_with_prefix(&self, prefix: &str, more: impl IntoIterator<Item = FieldDescriptor>) -> Self {
        self.and(more.into_iter().map(|d| d.with_prefix(prefix)))
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes.extend(attributes);
        self
    }

    fn content<'a>(&self, operation: &'a Operation) -> Result<&'a [u8], SnippetError> {
        match &self.source {
            PayloadSource::Request => Ok(operation.request().content()),
            PayloadSource::Response => Ok(operation.response().content()),
            PayloadSource::RequestPart(name) => operation
                .request()
                .parts()
                .iter()
                .find(|p| &p.name == name)
                .map(|p| p.content.as_slice())
                .ok_or_else(|| SnippetError::Payload(format!("A request part named '{name}' was not found in the request"))),
        }
    }

    fn read_payload(&self, operation: &Operation) -> Result<Value, SnippetError> {
        let content = self.content(operation)?;
        if content.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(content).map_err(|err| SnippetError::Payload(err.to_string()))
    }

    fn verify(&self, payload: &Value) -> Result<(), SnippetError> {
        let missing: Vec<String> = self
            .descriptors
            .iter()
            .filter(|d| !d.descriptor.ignored && !d.descriptor.optional)
            .filter(|d| !has_field(&FieldPath::compile(d.path()), payload))
            .map(|d| d.path().to_string())
            .collect();

        let undocumented = if self.relaxed {
            None
        } else {
            let mut remaining = payload.clone();
            for d in self.descriptors.iter() {
                let path = FieldPath::compile(d.path());
                if d.subsection {
                    remove_subsection(&path, &mut remaining);
                } else {
                    remove(&path, &mut remaining);
                }
            }
            (!is_empty(&remaining)).then_some(remaining)
        };

        if missing.is_empty() && undocumented.is_none() {
            return Ok(());
        }

        let mut parts = Vec::with_capacity(2);
        if let Some(remaining) = &undocumented {
            let pretty = serde_json::to_string_pretty(remaining).map_err(|err| SnippetError::Payload(err.to_string()))?;
            parts.push(format!("The following parts of the payload were not documented:\n{pretty}"));
        }
        if !missing.is_empty() {
            parts.push(format!(
                "Fields with the following paths were not found in the payload: {}",
                format_names(&missing)
            ));
        }
        let undocumented_paths = match undocumented {
            Some(Value::Object(map)) => map.keys().cloned().collect(),
            Some(other) => vec![other.to_string()],
            None => Vec::new(),
        };
        Err(DocumentationMismatch::with_message(undocumented_paths, missing, parts.join("\n")).into())
    }

    /// The type shown for `descriptor`: the declared one, checked against the
    /// payload when the field is present, or the one found in the payload.
    fn resolve_type(&self, descriptor: &FieldDescriptor, payload: &Value) -> Result<FieldType, SnippetError> {
        let path = FieldPath::compile(descriptor.path());
        let values = extract(&path, payload);
        let actual = if path.is_precise() {
            values.first().map(|v| FieldType::of(v))
        } else {
            FieldType::common(values.iter().copied())
        };

        match (descriptor.field_type, actual) {
            (Some(declared), None) => Ok(declared),
            (Some(declared), Some(actual)) => {
                let compatible = declared == actual
                    || declared == FieldType::Varies
                    || (descriptor.descriptor.optional && actual == FieldType::Null);
                if compatible {
                    Ok(declared)
                } else {
                    Err(SnippetError::FieldTypeMismatch {
                        path: descriptor.path().to_string(),
                        actual: actual.to_string(),
                        expected: declared.to_string(),
                    })
                }
            }
            (None, Some(actual)) => Ok(actual),
            (None, None) => Err(SnippetError::FieldTypeRequired { path: descriptor.path().to_string() }),
        }
    }
}

impl Snippet for FieldsSnippet {
    fn name(&self) -> &str {
        &self.name
    }

    fn create_model(&self, operation: &Operation) -> Result<Model, SnippetError> {
        for d in self.descriptors.iter() {
            d.descriptor.check("field")?;
        }
        let payload = self.read_payload(operation)?;
        self.verify(&payload)?;

        let mut fields = Vec::new();
        for d in self.descriptors.iter().filter(|d| !d.descriptor.ignored) {
            let field_type = self.resolve_type(d, &payload)?;
            let mut row = d.descriptor.to_row("path");
            row.insert("type".to_string(), Value::String(field_type.to_string()));
            fields.push(Value::Object(row));
        }

        let mut model = Model::new();
        model.insert("fields".to_string(), Value::Array(fields));
        merge_attributes(&mut model, &self.attributes);
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{HttpHeaders, OperationRequest, OperationRequestPart, OperationResponse};
    use http::{Method, StatusCode};
    use serde_json::json;
    use url::Url;

    fn response(body: &str) -> Operation {
        let request = OperationRequest::builder(Method::GET, Url::parse("http://localhost/").unwrap()).build();
        let headers: HttpHeaders = [("Content-Type", "application/json")].into_iter().collect();
        Operation::new("fields", request, OperationResponse::new(StatusCode::OK, headers, body.as_bytes().to_vec()))
    }

    #[test]
    fn documents_fields_with_resolved_types() {
        let snippet = response_fields([
            field_with_path("id").description("Identifier"),
            field_with_path("tags").description("Tags"),
            field_with_path("owner.name").description("Owner name"),
            field_with_path("mixed[]").description("Mixed values"),
        ]);
        let model = snippet
            .create_model(&response(r#"{"id": 1, "tags": ["a"], "owner": {"name": "x"}, "mixed": [1, "b"]}"#))
            .unwrap();

        let types: Vec<_> = model["fields"].as_array().unwrap().iter().map(|f| f["type"].clone()).collect();
        assert_eq!(types, vec![json!("Number"), json!("Array"), json!("String"), json!("Varies")]);
        assert_eq!(model["fields"][0]["path"], json!("id"));
    }

    #[test]
    fn reports_undocumented_payload_and_missing_fields() {
        let snippet = response_fields([field_with_path("a").description("one")]);
        let err = snippet.create_model(&response(r#"{"b": 2}"#)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "The following parts of the payload were not documented:\n{\n  \"b\": 2\n}\n\
             Fields with the following paths were not found in the payload: [a]"
        );
        match err {
            SnippetError::Mismatch(mismatch) => {
                assert_eq!(mismatch.undocumented, vec!["b".to_string()]);
                assert_eq!(mismatch.missing, vec!["a".to_string()]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn relaxed_fields_only_report_missing() {
        let snippet = relaxed_response_fields([field_with_path("a").description("one")]);
        assert!(snippet.create_model(&response(r#"{"a": 1, "b": 2}"#)).is_ok());
        let err = snippet.create_model(&response(r#"{"b": 2}"#)).unwrap_err();
        assert_eq!(err.to_string(), "Fields with the following paths were not found in the payload: [a]");
    }

    #[test]
    fn absent_optional_field_needs_a_type() {
        let snippet = response_fields([field_with_path("a").description("one").optional()]);
        let err = snippet.create_model(&response("{}")).unwrap_err();
        assert!(matches!(err, SnippetError::FieldTypeRequired { ref path } if path == "a"));

        let snippet = response_fields([field_with_path("a").description("one").optional().field_type(FieldType::String)]);
        let model = snippet.create_model(&response("{}")).unwrap();
        assert_eq!(model["fields"][0]["type"], json!("String"));
    }

    #[test]
    fn declared_type_must_match_payload() {
        let snippet = response_fields([field_with_path("a").description("one").field_type(FieldType::String)]);
        let err = snippet.create_model(&response(r#"{"a": 1}"#)).unwrap_err();
        assert_eq!(err.to_string(), "The field 'a' has a type of Number rather than String");
    }

    #[test]
    fn subsection_covers_nested_content() {
        let snippet = response_fields([subsection_with_path("meta").description("Metadata")]);
        let model = snippet.create_model(&response(r#"{"meta": {"a": {"b": 1}}}"#)).unwrap();
        assert_eq!(model["fields"][0]["type"], json!("Object"));
    }

    #[test]
    fn ignored_fields_are_removed_but_not_rendered() {
        let snippet = response_fields([field_with_path("a").description("one"), field_with_path("_debug").ignored()]);
        let model = snippet.create_model(&response(r#"{"a": 1, "_debug": true}"#)).unwrap();
        assert_eq!(model["fields"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn prefixed_descriptors() {
        let snippet = response_fields([field_with_path("items").description("Items")])
            .and_with_prefix("items[].", [field_with_path("id").description("Item id")]);
        assert!(snippet.create_model(&response(r#"{"items": [{"id": 1}, {"id": 2}]}"#)).is_ok());
    }

    #[test]
    fn invalid_json_is_a_payload_error() {
        let snippet = response_fields([field_with_path("a").description("one")]);
        assert!(matches!(snippet.create_model(&response("{")), Err(SnippetError::Payload(_))));
    }

    #[test]
    fn empty_body_has_no_fields() {
        let snippet = response_fields(DescriptorList::new());
        assert!(snippet.create_model(&response("")).is_ok());
        let snippet = response_fields([field_with_path("a").description("one")]);
        assert!(snippet.create_model(&response("")).is_err());
    }

    #[test]
    fn request_part_fields_read_the_part() {
        let request = OperationRequest::builder(Method::POST, Url::parse("http://localhost/").unwrap())
            .part(OperationRequestPart::new("metadata", br#"{"version": 1}"#.to_vec()))
            .build();
        let op = Operation::new("upload", request, OperationResponse::new(StatusCode::OK, HttpHeaders::new(), Vec::new()));

        let snippet = request_part_fields("metadata", [field_with_path("version").description("Version")]);
        assert_eq!(snippet.name(), "request-part-metadata-fields");
        assert!(snippet.create_model(&op).is_ok());
        assert!(request_part_fields("other", DescriptorList::new()).create_model(&op).is_err());
    }
}
