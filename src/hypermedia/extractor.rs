use std::sync::Arc;

use lazy_static::lazy_static;
use serde_json::Value;

use super::{AtomLinkExtractor, HalLinkExtractor, LinkMap};
use crate::errors::LinkExtractionError;
use crate::operation::{
    MediaType, OperationResponse, APPLICATION_HAL_FORMS_JSON, APPLICATION_HAL_JSON, APPLICATION_JSON,
    APPLICATION_VND_HAL_JSON,
};

/// Pulls the hypermedia links out of a response.
pub trait LinkExtractor: Send + Sync {
    fn extract_links(&self, response: &OperationResponse) -> Result<LinkMap, LinkExtractionError>;
}

impl<T: LinkExtractor + ?Sized> LinkExtractor for Arc<T> {
    fn extract_links(&self, response: &OperationResponse) -> Result<LinkMap, LinkExtractionError> {
        (**self).extract_links(response)
    }
}

type Registry = Vec<(MediaType, Arc<dyn LinkExtractor>)>;

lazy_static! {
    static ref DEFAULT_EXTRACTORS: Registry = {
        let hal: Arc<dyn LinkExtractor> = Arc::new(HalLinkExtractor);
        vec![
            (APPLICATION_JSON, Arc::new(AtomLinkExtractor) as Arc<dyn LinkExtractor>),
            (APPLICATION_HAL_JSON, Arc::clone(&hal)),
            (APPLICATION_VND_HAL_JSON, Arc::clone(&hal)),
            (APPLICATION_HAL_FORMS_JSON, hal),
        ]
    };
}

/// Delegates to the extractor registered for the response's content type.
///
/// An extractor registered for exactly the response's type and subtype wins.
/// Otherwise the first registration compatible with the content type is
/// used, in registration order.
#[derive(Clone)]
pub struct ContentTypeLinkExtractor {
    extractors: Registry,
}

impl Default for ContentTypeLinkExtractor {
    /// JSON is read as Atom, the HAL media types as HAL.
    fn default() -> Self {
        Self { extractors: DEFAULT_EXTRACTORS.clone() }
    }
}

impl std::fmt::Debug for ContentTypeLinkExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.extractors.iter().map(|(mt, _)| mt.to_string())).finish()
    }
}

impl ContentTypeLinkExtractor {
    /// An extractor with no registrations.
    pub fn empty() -> Self {
        Self { extractors: Vec::new() }
    }

    /// Registers `extractor` for `media_type`, replacing an earlier
    /// registration for the same media type. Parameters of `media_type` are
    /// dropped.
    pub fn register(mut self, media_type: MediaType, extractor: impl LinkExtractor + 'static) -> Self {
        let media_type = media_type.without_parameters();
        let extractor: Arc<dyn LinkExtractor> = Arc::new(extractor);
        match self.extractors.iter().position(|(mt, _)| mt.matches_exactly(&media_type)) {
            Some(idx) => self.extractors[idx].1 = extractor,
            None => self.extractors.push((media_type, extractor)),
        }
        self
    }

    fn extractor_for(&self, content_type: &MediaType) -> Option<&Arc<dyn LinkExtractor>> {
        self.extractors
            .iter()
            .find(|(mt, _)| mt.matches_exactly(content_type))
            .or_else(|| self.extractors.iter().find(|(mt, _)| content_type.is_compatible_with(mt)))
            .map(|(_, extractor)| extractor)
    }
}

impl LinkExtractor for ContentTypeLinkExtractor {
    fn extract_links(&self, response: &OperationResponse) -> Result<LinkMap, LinkExtractionError> {
        let content_type = response
            .headers()
            .content_type()
            .ok_or(LinkExtractionError::UnsupportedContent)??;

        match self.extractor_for(&content_type) {
            Some(extractor) => {
                log::trace!("extracting links from {content_type} content");
                extractor.extract_links(response)
            }
            None => Err(LinkExtractionError::NoExtractor { content_type: content_type.to_string() }),
        }
    }
}

/// Parses the response body as JSON. An empty body has no links and reads
/// as an empty object.
pub(super) fn read_json(response: &OperationResponse) -> Result<Value, LinkExtractionError> {
    let content = response.content();
    if content.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Default::default()));
    }
    Ok(serde_json::from_slice(content)?)
}
