use crate::verify::DocumentationMismatch;

/// Failure raised while documenting an operation.
///
/// The `Display` output of every variant is the message test authors see, so
/// it names the offending headers, parameters, links or fields verbatim.
#[derive(Debug, thiserror::Error)]
pub enum SnippetError {
    #[error(transparent)]
    Mismatch(#[from] DocumentationMismatch),

    #[error("The descriptor for {kind} '{name}' must either have a description or be marked as ignored")]
    MissingDescription { kind: &'static str, name: String },

    #[error(
        "No description was provided for the link with rel '{rel}' and no title was available from the link in the payload"
    )]
    NoLinkDescription { rel: String },

    #[error("Cannot determine the type of the field '{path}' as it is not present in the payload. Please provide a type using FieldDescriptor::field_type")]
    FieldTypeRequired { path: String },

    #[error("The field '{path}' has a type of {actual} rather than {expected}")]
    FieldTypeMismatch {
        path: String,
        actual: String,
        expected: String,
    },

    #[error("Unable to document path parameters as the URL template is not available. Use Operation::with_url_template to provide it")]
    MissingUrlTemplate,

    #[error("A descriptor name must not be empty")]
    EmptyName,

    #[error(transparent)]
    Parameters(#[from] crate::operation::ParameterError),

    #[error(transparent)]
    LinkExtraction(#[from] LinkExtractionError),

    #[error("Cannot handle payload: {0}")]
    Payload(String),

    #[error("Template error: {0}")]
    Template(#[source] anyhow::Error),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    #[error("The template engine renders {engine} but the configuration asks for {configured} snippets")]
    FormatMismatch {
        configured: crate::config::TemplateFormat,
        engine: crate::config::TemplateFormat,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure raised by a link extractor.
#[derive(Debug, thiserror::Error)]
pub enum LinkExtractionError {
    #[error("No content type is present in the response")]
    UnsupportedContent,

    #[error("No LinkExtractor has been provided and one is not available for the content type {content_type}")]
    NoExtractor { content_type: String },

    #[error("Invalid content type: {0}")]
    InvalidContentType(#[from] crate::operation::MediaTypeError),

    #[error("Cannot parse links from the payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

/// Failure raised when a framework request or response cannot be turned into
/// an operation.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("Invalid request URI '{uri}': {source}")]
    InvalidUri {
        uri: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Unknown correlation id {0}")]
    UnknownCorrelation(String),
}

/// Misuse of [`ManualDocumentation`](crate::context::ManualDocumentation).
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ContextError {
    #[error("Context already exists. Did you forget to call after_test()?")]
    AlreadyStarted,

    #[error("No test is in progress. Call before_test() before documenting an operation")]
    NoTestInProgress,
}
