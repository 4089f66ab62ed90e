use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::{DocumentationConfig, TemplateFormat};

/// Writes rendered snippets to `{output_directory}/{operation}/{snippet}.{ext}`.
#[derive(Debug, Clone)]
pub struct SnippetWriter {
    output_directory: PathBuf,
    format: TemplateFormat,
}

impl SnippetWriter {
    pub fn new(output_directory: impl Into<PathBuf>, format: TemplateFormat) -> Self {
        Self { output_directory: output_directory.into(), format }
    }

    pub fn from_config(config: &DocumentationConfig) -> Self {
        Self::new(config.output_directory.clone(), config.template_format)
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    pub fn path_for(&self, operation: &str, snippet: &str) -> PathBuf {
        self.output_directory
            .join(operation)
            .join(format!("{snippet}.{}", self.format.file_extension()))
    }

    /// Writes `content`, creating missing directories. Existing files are
    /// replaced. Returns the path written to.
    pub fn write(&self, operation: &str, snippet: &str, content: &str) -> io::Result<PathBuf> {
        let path = self.path_for(operation, snippet);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        log::debug!("wrote snippet {}", path.display());
        Ok(path)
    }
}
