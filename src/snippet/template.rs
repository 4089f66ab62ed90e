//! Rendering of snippet models to text.
//!
//! The [`TemplateEngine`] trait is the seam for custom formatting. The
//! bundled [`StandardTemplateEngine`] renders every built-in snippet in
//! either Asciidoctor or Markdown syntax: descriptor snippets as tables,
//! the HTTP, body and command-line snippets as source blocks.
use anyhow::{anyhow, Result};
use serde_json::Value;

use super::Model;
use crate::config::TemplateFormat;

pub trait TemplateEngine: Send + Sync {
    /// Renders the model of the snippet called `snippet_name`.
    fn render(&self, snippet_name: &str, model: &Model) -> Result<String>;

    /// The markup this engine always produces, if it is tied to one.
    fn template_format(&self) -> Option<TemplateFormat> {
        None
    }
}

struct Column {
    header: &'static str,
    key: &'static str,
    /// Rendered as inline code.
    literal: bool,
}

const fn column(header: &'static str, key: &'static str, literal: bool) -> Column {
    Column { header, key, literal }
}

static NAME_COLUMNS: [Column; 2] = [column("Name", "name", true), column("Description", "description", false)];
static PART_COLUMNS: [Column; 2] = [column("Part", "name", true), column("Description", "description", false)];
static PARAMETER_COLUMNS: [Column; 2] =
    [column("Parameter", "name", true), column("Description", "description", false)];
static LINK_COLUMNS: [Column; 2] = [column("Relation", "rel", true), column("Description", "description", false)];
static FIELD_COLUMNS: [Column; 3] = [
    column("Path", "path", true),
    column("Type", "type", true),
    column("Description", "description", false),
];

/// Table layout of a built-in snippet: the model key holding the rows and
/// the columns to print.
fn table_for(snippet_name: &str) -> Option<(&'static str, &'static [Column])> {
    Some(match snippet_name {
        "request-headers" | "response-headers" => ("headers", &NAME_COLUMNS[..]),
        "request-cookies" | "response-cookies" => ("cookies", &NAME_COLUMNS[..]),
        "query-parameters" | "form-parameters" | "path-parameters" => ("parameters", &PARAMETER_COLUMNS[..]),
        "request-parts" => ("requestParts", &PART_COLUMNS[..]),
        "links" => ("links", &LINK_COLUMNS[..]),
        "request-fields" | "response-fields" => ("fields", &FIELD_COLUMNS[..]),
        part if part.starts_with("request-part-") && part.ends_with("-fields") => ("fields", &FIELD_COLUMNS[..]),
        _ => return None,
    })
}

/// Kind of source block a snippet is rendered into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    Http,
    Bash,
    Plain,
}

fn text(model: &Model, key: &str) -> String {
    match model.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// `name: value` lines of the `headers` entry, each ending in a newline.
fn header_lines(model: &Model) -> String {
    let Some(Value::Array(headers)) = model.get("headers") else {
        return String::new();
    };
    headers
        .iter()
        .filter_map(Value::as_object)
        .map(|header| format!("{}: {}\n", text(header, "name"), text(header, "value")))
        .collect()
}

/// Block layout of a built-in source snippet and the text it holds.
fn source_block(snippet_name: &str, model: &Model) -> Option<(Block, String)> {
    Some(match snippet_name {
        "http-request" => (
            Block::Http,
            format!(
                "{} {} HTTP/1.1\n{}{}",
                text(model, "method"),
                text(model, "path"),
                header_lines(model),
                text(model, "requestBody")
            ),
        ),
        "http-response" => (
            Block::Http,
            format!(
                "HTTP/1.1 {} {}\n{}{}",
                text(model, "statusCode"),
                text(model, "statusReason"),
                header_lines(model),
                text(model, "responseBody")
            ),
        ),
        "curl-request" => (Block::Bash, format!("$ curl {} {}", text(model, "url"), text(model, "options"))),
        "httpie-request" => (
            Block::Bash,
            format!(
                "$ {}http {} {}{}",
                text(model, "echoContent"),
                text(model, "options"),
                text(model, "url"),
                text(model, "requestItems")
            ),
        ),
        "request-body" | "response-body" => (Block::Plain, text(model, "body")),
        part if part.starts_with("request-part-") && part.ends_with("-body") => (Block::Plain, text(model, "body")),
        _ => return None,
    })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StandardTemplateEngine {
    format: TemplateFormat,
}

impl StandardTemplateEngine {
    pub fn new(format: TemplateFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> TemplateFormat {
        self.format
    }

    fn cell(&self, value: Option<&Value>, literal: bool) -> String {
        let text = match value {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };
        if text.is_empty() {
            return text;
        }
        match self.format {
            TemplateFormat::Asciidoctor if literal => format!("`+{}+`", text.replace('|', "\\|")),
            TemplateFormat::Asciidoctor => text.replace('|', "\\|"),
            TemplateFormat::Markdown => {
                let text = text.replace('|', "\\|").replace('\n', "<br>");
                if literal {
                    format!("`{text}`")
                } else {
                    text
                }
            }
        }
    }

    fn render_block(&self, title: Option<&str>, block: Block, content: &str) -> String {
        let mut out = String::new();
        match self.format {
            TemplateFormat::Asciidoctor => {
                if let Some(title) = title {
                    out.push_str(&format!(".{title}\n"));
                }
                out.push_str(match block {
                    Block::Http => "[source,http,options=\"nowrap\"]\n",
                    Block::Bash => "[source,bash]\n",
                    Block::Plain => "[source,options=\"nowrap\"]\n",
                });
                out.push_str(&format!("----\n{content}\n----"));
            }
            TemplateFormat::Markdown => {
                if let Some(title) = title {
                    out.push_str(&format!("**{title}**\n\n"));
                }
                let language = match block {
                    Block::Http => "http",
                    Block::Bash => "bash",
                    Block::Plain => "",
                };
                out.push_str(&format!("```{language}\n{content}\n```"));
            }
        }
        out
    }

    fn render_table(&self, title: Option<&str>, columns: &[Column], rows: &[Value]) -> String {
        let mut out = String::new();
        match self.format {
            TemplateFormat::Asciidoctor => {
                if let Some(title) = title {
                    out.push_str(&format!(".{title}\n"));
                }
                out.push_str("|===\n");
                let headers: Vec<String> = columns.iter().map(|c| format!("|{}", c.header)).collect();
                out.push_str(&headers.concat());
                out.push('\n');
                for row in rows {
                    out.push('\n');
                    for c in columns {
                        out.push_str(&format!("|{}\n", self.cell(row.get(c.key), c.literal)));
                    }
                }
                out.push('\n');
                out.push_str("|===");
            }
            TemplateFormat::Markdown => {
                if let Some(title) = title {
                    out.push_str(&format!("**{title}**\n\n"));
                }
                let headers: Vec<&str> = columns.iter().map(|c| c.header).collect();
                out.push_str(&headers.join(" | "));
                out.push('\n');
                let rules: Vec<String> = columns.iter().map(|c| "-".repeat(c.header.len())).collect();
                out.push_str(&rules.join(" | "));
                for row in rows {
                    out.push('\n');
                    let cells: Vec<String> = columns.iter().map(|c| self.cell(row.get(c.key), c.literal)).collect();
                    out.push_str(&cells.join(" | "));
                }
            }
        }
        out
    }
}

impl TemplateEngine for StandardTemplateEngine {
    fn render(&self, snippet_name: &str, model: &Model) -> Result<String> {
        if let Some((block, content)) = source_block(snippet_name, model) {
            let title = model.get("title").and_then(Value::as_str);
            return Ok(self.render_block(title, block, &content));
        }
        let (collection, columns) =
            table_for(snippet_name).ok_or_else(|| anyhow!("No template found for snippet '{snippet_name}'"))?;
        let rows: &[Value] = match model.get(collection) {
            Some(Value::Array(rows)) => rows.as_slice(),
            Some(_) => return Err(anyhow!("Model entry '{collection}' of snippet '{snippet_name}' is not a list")),
            None => &[],
        };
        let title = model
            .get("title")
            .and_then(Value::as_str)
            .or_else(|| model.get("path").and_then(Value::as_str));
        Ok(self.render_table(title, columns, rows))
    }

    fn template_format(&self) -> Option<TemplateFormat> {
        Some(self.format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn model(value: Value) -> Model {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn renders_asciidoctor_table() {
        let engine = StandardTemplateEngine::new(TemplateFormat::Asciidoctor);
        let out = engine
            .render(
                "request-headers",
                &model(json!({"headers": [{"name": "Accept", "description": "a|b", "optional": false}]})),
            )
            .unwrap();
        assert_eq!(out, "|===\n|Name|Description\n\n|`+Accept+`\n|a\\|b\n\n|===");
    }

    #[test]
    fn renders_markdown_table_with_title() {
        let engine = StandardTemplateEngine::new(TemplateFormat::Markdown);
        let out = engine
            .render(
                "links",
                &model(json!({
                    "title": "Links",
                    "links": [{"rel": "self", "description": "This resource"}]
                })),
            )
            .unwrap();
        assert_eq!(out, "**Links**\n\nRelation | Description\n-------- | -----------\n`self` | This resource");
    }

    #[test]
    fn path_is_used_as_title() {
        let engine = StandardTemplateEngine::new(TemplateFormat::Asciidoctor);
        let out = engine.render("path-parameters", &model(json!({"path": "/users/{id}", "parameters": []}))).unwrap();
        assert!(out.starts_with("./users/{id}\n|===\n|Parameter|Description"));
    }

    #[test]
    fn unknown_snippet_is_an_error() {
        let engine = StandardTemplateEngine::default();
        let err = engine.render("xml-request", &Model::new()).unwrap_err();
        assert_eq!(err.to_string(), "No template found for snippet 'xml-request'");
    }

    #[test]
    fn renders_http_request_block() {
        let engine = StandardTemplateEngine::new(TemplateFormat::Asciidoctor);
        let out = engine
            .render(
                "http-request",
                &model(json!({
                    "method": "POST",
                    "path": "/users?x=1",
                    "headers": [{"name": "Host", "value": "localhost"}],
                    "requestBody": "\n{}"
                })),
            )
            .unwrap();
        assert_eq!(out, "[source,http,options=\"nowrap\"]\n----\nPOST /users?x=1 HTTP/1.1\nHost: localhost\n\n{}\n----");
    }

    #[test]
    fn renders_markdown_code_blocks() {
        let engine = StandardTemplateEngine::new(TemplateFormat::Markdown);
        let out = engine
            .render("http-response", &model(json!({"statusCode": 204, "statusReason": "No Content", "headers": []})))
            .unwrap();
        assert_eq!(out, "```http\nHTTP/1.1 204 No Content\n\n```");

        let out = engine.render("response-body", &model(json!({"body": "hello"}))).unwrap();
        assert_eq!(out, "```\nhello\n```");

        let out = engine
            .render("curl-request", &model(json!({"url": "'http://localhost/'", "options": "-i", "title": "Call"})))
            .unwrap();
        assert_eq!(out, "**Call**\n\n```bash\n$ curl 'http://localhost/' -i\n```");
    }

    #[test]
    fn standard_engine_reports_its_format() {
        let engine = StandardTemplateEngine::new(TemplateFormat::Markdown);
        assert_eq!(TemplateEngine::template_format(&engine), Some(TemplateFormat::Markdown));
    }
}
