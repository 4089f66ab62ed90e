//! Documentation configuration.
//!
//! [`DocumentationConfig`] decides where snippets are written and which
//! markup they use. It has
//! sensible defaults via [`Default`], a fluent [`DocumentationConfig::builder()`]
//! with validation, and can be loaded from JSON.
//!
//! # Examples
//!
//! ```rust
//! use restdocs::config::{DocumentationConfig, TemplateFormat};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = DocumentationConfig::builder()
//!     .output_directory("target/snippets")
//!     .template_format(TemplateFormat::Markdown)
//!     .build()?;
//! assert_eq!(cfg.template_format.file_extension(), "md");
//! # Ok(()) }
//! ```
//!
//! # Fields (summary)
//! - `output_directory`: Root directory for snippets (default: `target/generated-snippets`).
//! - `template_format`: Markup of rendered snippets (default: Asciidoctor).
//! - `snippet_encoding`: Encoding of written files. Only UTF-8 is supported.
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Markup language of rendered snippets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateFormat {
    #[default]
    Asciidoctor,
    Markdown,
}

impl TemplateFormat {
    pub fn id(self) -> &'static str {
        match self {
            TemplateFormat::Asciidoctor => "asciidoctor",
            TemplateFormat::Markdown => "markdown",
        }
    }

    pub fn file_extension(self) -> &'static str {
        match self {
            TemplateFormat::Asciidoctor => "adoc",
            TemplateFormat::Markdown => "md",
        }
    }
}

impl fmt::Display for TemplateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentationConfig {
    pub output_directory: PathBuf,
    pub template_format: TemplateFormat,
    pub snippet_encoding: String,
}

impl Default for DocumentationConfig {
    fn default() -> Self {
        Self {
            output_directory: PathBuf::from("target/generated-snippets"),
            template_format: TemplateFormat::default(),
            snippet_encoding: "UTF-8".to_string(),
        }
    }
}

impl DocumentationConfig {
    pub fn builder() -> DocumentationConfigBuilder {
        DocumentationConfigBuilder::default()
    }

    /// Checks a config that was assembled by hand rather than by the
    /// builder or a loader.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate(self)
    }

    /// Parses and validates a JSON config. Missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: DocumentationConfig = serde_json::from_str(json).map_err(ConfigError::Parse)?;
        validate(&config)?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }
}

/// Builder for [`DocumentationConfig`].
#[derive(Debug, Clone, Default)]
pub struct DocumentationConfigBuilder {
    inner: DocumentationConfig,
}

impl DocumentationConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut DocumentationConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn output_directory<P: Into<PathBuf>>(self, dir: P) -> Self { self.map(|c| c.output_directory = dir.into()) }
    pub fn template_format(self, format: TemplateFormat) -> Self { self.map(|c| c.template_format = format) }
    pub fn snippet_encoding<S: Into<String>>(self, encoding: S) -> Self { self.map(|c| c.snippet_encoding = encoding.into()) }

    /// Apply multiple changes in one go.
    pub fn with(self, f: impl FnOnce(&mut DocumentationConfig)) -> Self { self.map(f) }

    /// Validate and build the final config.
    pub fn build(self) -> Result<DocumentationConfig, ConfigError> {
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

// ---------- Validation ----------

#[derive(Debug)]
pub enum ConfigError {
    EmptyOutputDirectory,
    UnsupportedEncoding(String),
    Parse(serde_json::Error),
    Read { path: PathBuf, source: std::io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyOutputDirectory =>
                write!(f, "output_directory must not be empty"),
            ConfigError::UnsupportedEncoding(enc) =>
                write!(f, "snippet_encoding {enc} is not supported (expected UTF-8)"),
            ConfigError::Parse(err) =>
                write!(f, "invalid documentation config: {err}"),
            ConfigError::Read { path, source } =>
                write!(f, "cannot read documentation config {}: {source}", path.display()),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Parse(err) => Some(err),
            ConfigError::Read { source, .. } => Some(source),
            _ => None,
        }
    }
}

fn validate(c: &DocumentationConfig) -> Result<(), ConfigError> {
    if c.output_directory.as_os_str().is_empty() {
        return Err(ConfigError::EmptyOutputDirectory);
    }
    let encoding = c.snippet_encoding.replace('_', "-");
    if !encoding.eq_ignore_ascii_case("utf-8") && !encoding.eq_ignore_ascii_case("utf8") {
        return Err(ConfigError::UnsupportedEncoding(c.snippet_encoding.clone()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let cfg = DocumentationConfig::default();
        assert_eq!(cfg.output_directory, PathBuf::from("target/generated-snippets"));
        assert_eq!(cfg.template_format, TemplateFormat::Asciidoctor);
        assert_eq!(cfg.template_format.file_extension(), "adoc");
        assert_eq!(cfg.template_format.to_string(), "asciidoctor");
    }

    #[test]
    fn hand_built_config_is_validated() {
        let cfg = DocumentationConfig { snippet_encoding: "ISO-8859-1".into(), ..Default::default() };
        assert!(matches!(cfg.validate(), Err(ConfigError::UnsupportedEncoding(_))));
        assert!(DocumentationConfig::default().validate().is_ok());
    }

    #[test]
    fn builder_validates() {
        let err = DocumentationConfig::builder().output_directory("").build().unwrap_err();
        assert!(matches!(err, ConfigError::EmptyOutputDirectory));

        let err = DocumentationConfig::builder().snippet_encoding("ISO-8859-1").build().unwrap_err();
        assert_eq!(err.to_string(), "snippet_encoding ISO-8859-1 is not supported (expected UTF-8)");

        let cfg = DocumentationConfig::builder()
            .with(|c| {
                c.template_format = TemplateFormat::Markdown;
                c.snippet_encoding = "utf8".into();
            })
            .build()
            .unwrap();
        assert_eq!(cfg.template_format, TemplateFormat::Markdown);
    }

    #[test]
    fn parses_partial_json() {
        let cfg = DocumentationConfig::from_json_str(r#"{"template_format": "markdown"}"#).unwrap();
        assert_eq!(cfg.template_format, TemplateFormat::Markdown);
        assert_eq!(cfg.snippet_encoding, "UTF-8");

        assert!(matches!(DocumentationConfig::from_json_str("{"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"output_directory": "docs/snippets", "template_format": "markdown"}}"#).unwrap();

        let cfg = DocumentationConfig::load(file.path()).unwrap();
        assert_eq!(cfg.output_directory, PathBuf::from("docs/snippets"));
        assert_eq!(cfg.template_format, TemplateFormat::Markdown);

        let missing = DocumentationConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(missing, ConfigError::Read { .. }));
    }
}
