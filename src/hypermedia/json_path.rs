use serde_json::Value;

use super::extractor::read_json;
use super::{Link, LinkExtractor, LinkMap};
use crate::errors::LinkExtractionError;
use crate::operation::OperationResponse;

/// Reads links found at configurable paths into the payload.
///
/// Each path is either dotted (`foo.links`) or a JSON pointer
/// (`/foo/links`). The value found there is an object keyed by relation.
/// A relation maps to an href string, a link object with an `href` and an
/// optional `title`, or an array of either. Links from every path are merged
/// in the order the paths were given. A relation found under several paths
/// keeps every link rather than the last one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicJsonPathLinkExtractor {
    paths: Vec<String>,
}

impl DynamicJsonPathLinkExtractor {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { paths: paths.into_iter().map(Into::into).collect() }
    }

    fn links_from(&self, payload: &Value) -> LinkMap {
        let mut links = LinkMap::new();
        for path in &self.paths {
            match lookup(payload, path) {
                Some(Value::Object(rels)) => {
                    let mut found = LinkMap::new();
                    for (rel, value) in rels {
                        add_links(&mut found, rel, value);
                    }
                    links.merge(found);
                }
                Some(other) => log::warn!("value at link path '{path}' is not an object: {other}"),
                None => log::trace!("no links at path '{path}'"),
            }
        }
        links
    }
}

impl LinkExtractor for DynamicJsonPathLinkExtractor {
    fn extract_links(&self, response: &OperationResponse) -> Result<LinkMap, LinkExtractionError> {
        let payload = read_json(response)?;
        Ok(self.links_from(&payload))
    }
}

fn lookup<'a>(payload: &'a Value, path: &str) -> Option<&'a Value> {
    if path.starts_with('/') {
        return payload.pointer(path);
    }
    path.split('.')
        .filter(|key| !key.is_empty())
        .try_fold(payload, |value, key| value.as_object()?.get(key))
}

fn add_links(links: &mut LinkMap, rel: &str, value: &Value) {
    match value {
        Value::String(href) => links.add(rel, Link::new(rel, href.as_str())),
        Value::Object(object) => match object.get("href").and_then(Value::as_str) {
            Some(href) => {
                let title = object.get("title").and_then(Value::as_str).map(str::to_string);
                links.add(rel, Link { rel: rel.to_string(), href: href.to_string(), title });
            }
            None => log::warn!("skipping link for rel '{rel}' without an href"),
        },
        Value::Array(items) => {
            for item in items.iter().filter(|item| !item.is_array()) {
                add_links(links, rel, item);
            }
        }
        other => log::warn!("skipping link for rel '{rel}' with unexpected value {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rels(links: &LinkMap) -> Vec<&str> {
        links.keys().collect()
    }

    #[test]
    fn reads_links_below_a_sub_document() {
        let payload = json!({
            "foo": {"links": {"self": "/foo", "related": ["/bar", "/baz"]}},
            "first": {"links": {"next": "/second"}}
        });
        let links = json_path(["foo.links"]).links_from(&payload);
        assert_eq!(rels(&links), vec!["self", "related"]);
        assert_eq!(links.get("related").unwrap().len(), 2);
        assert_eq!(links.first("self"), Some(&Link::new("self", "/foo")));
    }

    #[test]
    fn merges_links_from_every_path() {
        let payload = json!({
            "a": {"links": {"self": "/a"}},
            "b": {"links": {"self": "/b", "up": {"href": "/", "title": "Home"}}}
        });
        let links = json_path(["a.links", "/b/links"]).links_from(&payload);
        assert_eq!(rels(&links), vec!["self", "up"]);
        assert_eq!(links.get("self").unwrap().len(), 2);
        assert_eq!(links.first("up").unwrap().title.as_deref(), Some("Home"));
    }

    #[test]
    fn absent_or_unusable_paths_give_no_links() {
        let payload = json!({"foo": {"links": ["x"]}, "bar": 1});
        assert!(json_path(["missing.links", "foo.links", "bar.links"]).links_from(&payload).is_empty());
    }

    #[test]
    fn extraction_is_repeatable() {
        let payload = json!({"foo": {"links": {"self": "/foo"}}});
        let extractor = json_path(["foo.links"]);
        assert_eq!(extractor.links_from(&payload), extractor.links_from(&payload));
    }

    fn json_path<const N: usize>(paths: [&str; N]) -> DynamicJsonPathLinkExtractor {
        DynamicJsonPathLinkExtractor::new(paths)
    }
}
