//! Turns a request/response pair into written snippets.
use std::path::PathBuf;
use std::sync::Arc;

use crate::cli::{curl_request, httpie_request};
use crate::config::DocumentationConfig;
use crate::context::DocumentationContext;
use crate::errors::SnippetError;
use crate::exchange::{http_request, http_response};
use crate::operation::converter::{RequestConverter, ResponseConverter};
use crate::operation::preprocess::OperationPreprocessor;
use crate::operation::{Operation, OperationRequest, OperationResponse};
use crate::payload::{request_body, response_body};
use crate::snippet::{Snippet, SnippetWriter, TemplateEngine};

/// Documents operations under one identifier.
///
/// The identifier may contain placeholders such as `{method-name}` and
/// `{step}`, see [`DocumentationContext::resolve`]. Snippets are written to
/// `{output directory}/{identifier}/{snippet}.{ext}`, with the directory and
/// extension taken from the [`DocumentationConfig`].
#[derive(Clone)]
pub struct DocumentationGenerator {
    identifier: String,
    snippets: Vec<Arc<dyn Snippet>>,
    request_preprocessors: Vec<Arc<dyn OperationPreprocessor>>,
    response_preprocessors: Vec<Arc<dyn OperationPreprocessor>>,
}

impl std::fmt::Debug for DocumentationGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentationGenerator")
            .field("identifier", &self.identifier)
            .field("snippets", &self.snippets.iter().map(|s| s.name()).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl DocumentationGenerator {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            snippets: Vec::new(),
            request_preprocessors: Vec::new(),
            response_preprocessors: Vec::new(),
        }
    }

    /// A generator rendering the default snippets: `curl-request`,
    /// `http-request`, `http-response`, `httpie-request`, `request-body` and
    /// `response-body`.
    pub fn with_default_snippets(identifier: impl Into<String>) -> Self {
        Self::new(identifier).with_snippets(default_snippets())
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn snippet(mut self, snippet: impl Snippet + 'static) -> Self {
        self.snippets.push(Arc::new(snippet));
        self
    }

    /// Returns a generator that also renders `snippets`, leaving this one
    /// unchanged.
    pub fn with_snippets(&self, snippets: impl IntoIterator<Item = Arc<dyn Snippet>>) -> Self {
        let mut generator = self.clone();
        generator.snippets.extend(snippets);
        generator
    }

    pub fn preprocess_request(mut self, preprocessor: impl OperationPreprocessor + 'static) -> Self {
        self.request_preprocessors.push(Arc::new(preprocessor));
        self
    }

    pub fn preprocess_response(mut self, preprocessor: impl OperationPreprocessor + 'static) -> Self {
        self.response_preprocessors.push(Arc::new(preprocessor));
        self
    }

    /// Documents one operation and returns the paths of the written snippets.
    ///
    /// The config is validated first, and an engine tied to a template format
    /// other than the configured one is rejected. Preprocessors run in the
    /// order they were added. Rendering stops at the first snippet that
    /// fails. Snippets written before it are kept.
    pub fn handle(
        &self,
        context: &DocumentationContext,
        request: OperationRequest,
        response: OperationResponse,
        url_template: Option<&str>,
        engine: &dyn TemplateEngine,
        config: &DocumentationConfig,
    ) -> Result<Vec<PathBuf>, SnippetError> {
        config.validate()?;
        if let Some(engine_format) = engine.template_format() {
            if engine_format != config.template_format {
                return Err(SnippetError::FormatMismatch { configured: config.template_format, engine: engine_format });
            }
        }

        let request = self
            .request_preprocessors
            .iter()
            .fold(request, |request, p| p.preprocess_request(request));
        let response = self
            .response_preprocessors
            .iter()
            .fold(response, |response, p| p.preprocess_response(response));

        let name = context.resolve(&self.identifier);
        if name.trim().is_empty() {
            return Err(SnippetError::EmptyName);
        }
        let mut operation = Operation::new(name, request, response);
        if let Some(template) = url_template {
            operation = operation.with_url_template(template);
        }

        let writer = SnippetWriter::from_config(config);
        let mut written = Vec::with_capacity(self.snippets.len());
        for snippet in &self.snippets {
            let content = snippet.render(&operation, engine)?;
            written.push(writer.write(operation.name(), snippet.name(), &content)?);
        }
        log::debug!("documented {} with {} snippet(s)", operation.name(), written.len());
        Ok(written)
    }

    /// Converts framework values with `converter`, then documents them like
    /// [`handle`](Self::handle).
    #[allow(clippy::too_many_arguments)]
    pub fn handle_with<C, Req, Resp>(
        &self,
        context: &DocumentationContext,
        converter: &C,
        request: &Req,
        response: &Resp,
        url_template: Option<&str>,
        engine: &dyn TemplateEngine,
        config: &DocumentationConfig,
    ) -> Result<Vec<PathBuf>, SnippetError>
    where
        C: RequestConverter<Req> + ResponseConverter<Resp>,
        Req: ?Sized,
        Resp: ?Sized,
    {
        let request = converter.convert_request(request)?;
        let response = converter.convert_response(response)?;
        self.handle(context, request, response, url_template, engine, config)
    }
}

/// The snippets every operation gets unless a generator is configured
/// otherwise.
pub fn default_snippets() -> Vec<Arc<dyn Snippet>> {
    vec![
        Arc::new(curl_request()),
        Arc::new(http_request()),
        Arc::new(http_response()),
        Arc::new(httpie_request()),
        Arc::new(request_body()),
        Arc::new(response_body()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigError, TemplateFormat};
    use crate::context::DocumentationContext;
    use crate::errors::SnippetError;
    use crate::headers::{header_with_name, response_headers};
    use crate::operation::preprocess::remove_headers;
    use crate::operation::HttpHeaders;
    use crate::snippet::StandardTemplateEngine;
    use http::{Method, StatusCode};
    use url::Url;

    fn config_in(dir: &std::path::Path) -> DocumentationConfig {
        DocumentationConfig::builder().output_directory(dir).build().unwrap()
    }

    fn exchange() -> (OperationRequest, OperationResponse) {
        let request = OperationRequest::builder(Method::GET, Url::parse("http://localhost/users/1").unwrap()).build();
        let headers: HttpHeaders = [("Content-Type", "application/json"), ("X-Trace", "abc")].into_iter().collect();
        (request, OperationResponse::new(StatusCode::OK, headers, br#"{"id":1}"#.to_vec()))
    }

    #[test]
    fn writes_each_snippet_below_the_resolved_identifier() {
        let dir = tempfile::tempdir().unwrap();
        let context = DocumentationContext::new("UserTests", "getUser");
        context.before_operation();
        let config = DocumentationConfig::builder()
            .output_directory(dir.path())
            .template_format(TemplateFormat::Markdown)
            .build()
            .unwrap();

        let generator = DocumentationGenerator::new("{method-name}-{step}")
            .snippet(response_headers([header_with_name("Content-Type").description("The content type")]));
        let (request, response) = exchange();
        let written = generator
            .handle(&context, request, response, None, &StandardTemplateEngine::new(config.template_format), &config)
            .unwrap();

        assert_eq!(written, vec![dir.path().join("get-user-1").join("response-headers.md")]);
        let content = std::fs::read_to_string(&written[0]).unwrap();
        assert!(content.contains("The content type"));
    }

    #[test]
    fn preprocessors_run_before_snippets() {
        let dir = tempfile::tempdir().unwrap();
        let context = DocumentationContext::new("T", "m");
        let config = config_in(dir.path());

        let generator = DocumentationGenerator::new("op")
            .snippet(
                response_headers([header_with_name("Content-Type").description("Type")]).strict(),
            )
            .preprocess_response(remove_headers(["X-Trace"]));
        let (request, response) = exchange();
        let engine = StandardTemplateEngine::default();
        assert!(generator.handle(&context, request, response, None, &engine, &config).is_ok());
    }

    #[test]
    fn stops_at_first_failing_snippet() {
        let dir = tempfile::tempdir().unwrap();
        let context = DocumentationContext::new("T", "m");
        let config = config_in(dir.path());

        let generator = DocumentationGenerator::new("op")
            .snippet(response_headers([header_with_name("X-Missing").description("Absent")]))
            .snippet(response_headers([header_with_name("Content-Type").description("Type")]));
        let (request, response) = exchange();
        let err = generator
            .handle(&context, request, response, None, &StandardTemplateEngine::default(), &config)
            .unwrap_err();

        assert!(matches!(err, SnippetError::Mismatch(_)));
        assert!(!dir.path().join("op").exists());
    }

    #[test]
    fn output_location_and_extension_come_from_the_config() {
        let configured = tempfile::tempdir().unwrap();
        let context = DocumentationContext::new("T", "m");
        let config = DocumentationConfig::builder()
            .output_directory(configured.path())
            .template_format(TemplateFormat::Markdown)
            .build()
            .unwrap();

        let generator = DocumentationGenerator::new("op")
            .snippet(response_headers([header_with_name("Content-Type").description("Type")]));
        let (request, response) = exchange();
        let written = generator
            .handle(&context, request, response, None, &StandardTemplateEngine::new(TemplateFormat::Markdown), &config)
            .unwrap();

        assert_eq!(written, vec![configured.path().join("op").join("response-headers.md")]);
        let content = std::fs::read_to_string(&written[0]).unwrap();
        assert!(content.starts_with("Name | Description"));
    }

    #[test]
    fn engine_format_must_match_the_config() {
        let dir = tempfile::tempdir().unwrap();
        let context = DocumentationContext::new("T", "m");
        let config = DocumentationConfig::builder()
            .output_directory(dir.path())
            .template_format(TemplateFormat::Markdown)
            .build()
            .unwrap();

        let generator = DocumentationGenerator::new("op")
            .snippet(response_headers([header_with_name("Content-Type").description("Type")]));
        let (request, response) = exchange();
        let err = generator
            .handle(&context, request, response, None, &StandardTemplateEngine::new(TemplateFormat::Asciidoctor), &config)
            .unwrap_err();

        assert!(matches!(
            err,
            SnippetError::FormatMismatch { configured: TemplateFormat::Markdown, engine: TemplateFormat::Asciidoctor }
        ));
        assert_eq!(
            err.to_string(),
            "The template engine renders asciidoctor but the configuration asks for markdown snippets"
        );
        assert!(!dir.path().join("op").exists());
    }

    #[test]
    fn hand_built_configs_are_validated() {
        let dir = tempfile::tempdir().unwrap();
        let context = DocumentationContext::new("T", "m");
        let config = DocumentationConfig {
            output_directory: dir.path().to_path_buf(),
            snippet_encoding: "ISO-8859-1".to_string(),
            ..DocumentationConfig::default()
        };

        let (request, response) = exchange();
        let err = DocumentationGenerator::new("op")
            .handle(&context, request, response, None, &StandardTemplateEngine::default(), &config)
            .unwrap_err();
        assert!(matches!(err, SnippetError::Config(ConfigError::UnsupportedEncoding(_))));
    }

    #[test]
    fn default_snippets_document_the_whole_exchange() {
        let dir = tempfile::tempdir().unwrap();
        let context = DocumentationContext::new("T", "m");
        let config = config_in(dir.path());

        let generator = DocumentationGenerator::with_default_snippets("op");
        let (request, response) = exchange();
        let written = generator
            .handle(&context, request, response, None, &StandardTemplateEngine::default(), &config)
            .unwrap();

        let names: Vec<_> = written.iter().map(|p| p.file_stem().unwrap().to_string_lossy().into_owned()).collect();
        assert_eq!(
            names,
            vec!["curl-request", "http-request", "http-response", "httpie-request", "request-body", "response-body"]
        );
        let body = std::fs::read_to_string(dir.path().join("op").join("response-body.adoc")).unwrap();
        assert_eq!(body, "[source,options=\"nowrap\"]\n----\n{\"id\":1}\n----");
    }

    #[test]
    fn with_snippets_leaves_the_original_untouched() {
        let base = DocumentationGenerator::new("op").snippet(request_body());
        let extended = base.with_snippets(default_snippets());
        assert_eq!(format!("{base:?}"), r#"DocumentationGenerator { identifier: "op", snippets: ["request-body"], .. }"#);
        assert!(format!("{extended:?}").contains(r#""request-body", "curl-request""#));
    }
}
