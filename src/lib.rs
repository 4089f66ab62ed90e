pub mod cli;
pub mod config;
pub mod context;
pub mod cookies;
pub mod descriptor;
pub mod errors;
pub mod exchange;
pub mod generator;
pub mod headers;
pub mod hypermedia;
pub mod operation;
pub mod payload;
pub mod request;
pub mod snippet;
pub mod verify;

pub use config::{DocumentationConfig, TemplateFormat};
pub use context::{DocumentationContext, ManualDocumentation};
pub use descriptor::{describe, Descriptor, DescriptorList};
pub use errors::{ContextError, ConversionError, LinkExtractionError, SnippetError};
pub use generator::{default_snippets, DocumentationGenerator};
pub use operation::{Operation, OperationRequest, OperationResponse};
pub use snippet::{Snippet, StandardTemplateEngine, TemplateEngine};
