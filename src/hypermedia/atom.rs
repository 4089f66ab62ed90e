use serde_json::Value;

use super::extractor::read_json;
use super::{Link, LinkExtractor, LinkMap};
use crate::errors::LinkExtractionError;
use crate::operation::OperationResponse;

/// Reads Atom-style links: a top-level `links` array of objects each
/// carrying a `rel` and an `href`, and optionally a `title`.
///
/// A single `link` object, or a `link` array, is accepted as well. Entries
/// whose `rel` or `href` is not a string are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct AtomLinkExtractor;

impl LinkExtractor for AtomLinkExtractor {
    fn extract_links(&self, response: &OperationResponse) -> Result<LinkMap, LinkExtractionError> {
        let payload = read_json(response)?;
        Ok(links_from(&payload))
    }
}

fn links_from(payload: &Value) -> LinkMap {
    let mut links = LinkMap::new();
    let entries: Vec<&Value> = match payload.get("links").or_else(|| payload.get("link")) {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(single @ Value::Object(_)) => vec![single],
        _ => Vec::new(),
    };
    for entry in entries {
        match parse_link(entry) {
            Some(link) => links.add(link.rel.clone(), link),
            None => log::warn!("skipping malformed Atom link {entry}"),
        }
    }
    links
}

fn parse_link(entry: &Value) -> Option<Link> {
    let rel = entry.get("rel")?.as_str()?;
    let href = entry.get("href")?.as_str()?;
    let title = entry.get("title").and_then(Value::as_str).map(str::to_string);
    Some(Link { rel: rel.to_string(), href: href.to_string(), title })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn links_array() {
        let links = links_from(&json!({"links": [
            {"rel": "alpha", "href": "https://alpha.example.com", "title": "Alpha"},
            {"rel": "bravo", "href": "https://bravo.example.com"},
            {"rel": "alpha", "href": "https://alpha.example.com/two"}
        ]}));
        assert_eq!(links.keys().collect::<Vec<_>>(), vec!["alpha", "bravo"]);
        assert_eq!(links.get("alpha").unwrap().len(), 2);
        assert_eq!(links.first("alpha").unwrap().title.as_deref(), Some("Alpha"));
    }

    #[test]
    fn single_link_object() {
        let links = links_from(&json!({"link": {"rel": "self", "href": "/me"}}));
        assert_eq!(links.first("self"), Some(&Link::new("self", "/me")));
    }

    #[test]
    fn non_string_rel_or_href_is_skipped() {
        let links = links_from(&json!({"links": [
            {"rel": 1, "href": "/one"},
            {"rel": "two", "href": ["/two"]},
            {"rel": "three", "href": "/three"},
            "four"
        ]}));
        assert_eq!(links.keys().collect::<Vec<_>>(), vec!["three"]);
    }

    #[test]
    fn hal_payload_has_no_atom_links() {
        assert!(links_from(&json!({"_links": {"self": {"href": "/"}}})).is_empty());
    }
}
