use serde_json::{Map, Value};

use super::extractor::read_json;
use super::{Link, LinkExtractor, LinkMap};
use crate::errors::LinkExtractionError;
use crate::operation::OperationResponse;

/// Reads links from a HAL payload.
///
/// Each entry of the top-level `_links` object is a relation whose value is
/// a link object or an array of link objects:
///
/// ```json
/// {"_links": {"self": {"href": "/orders/1"}, "items": [{"href": "/items/1", "title": "First"}]}}
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HalLinkExtractor;

impl LinkExtractor for HalLinkExtractor {
    fn extract_links(&self, response: &OperationResponse) -> Result<LinkMap, LinkExtractionError> {
        let payload = read_json(response)?;
        Ok(links_from(&payload))
    }
}

fn links_from(payload: &Value) -> LinkMap {
    let mut links = LinkMap::new();
    let Some(rels) = payload.get("_links").and_then(Value::as_object) else {
        return links;
    };
    for (rel, value) in rels {
        match value {
            Value::Object(object) => push_link(&mut links, rel, object),
            Value::Array(items) => {
                for item in items {
                    match item.as_object() {
                        Some(object) => push_link(&mut links, rel, object),
                        None => log::warn!("skipping HAL link for rel '{rel}' that is not an object"),
                    }
                }
            }
            _ => log::warn!("skipping HAL rel '{rel}' with unexpected value {value}"),
        }
    }
    links
}

fn push_link(links: &mut LinkMap, rel: &str, object: &Map<String, Value>) {
    let Some(href) = object.get("href").and_then(Value::as_str) else {
        log::warn!("skipping HAL link for rel '{rel}' without an href");
        return;
    };
    let title = object.get("title").and_then(Value::as_str).map(str::to_string);
    links.add(rel, Link { rel: rel.to_string(), href: href.to_string(), title });
}
