//! Conversion from framework request/response types into an [`Operation`]'s
//! halves, plus a registry that correlates in-flight requests with the
//! documentation configuration they were issued with.
//!
//! [`Operation`]: super::Operation
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::{Mutex, PoisonError};

use http::header::COOKIE as COOKIE_HEADER;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use super::{HttpHeaders, OperationRequest, OperationResponse, RequestCookie};
use crate::errors::ConversionError;

/// Header carrying the [`CorrelationId`] of a request issued by an
/// asynchronous client.
pub const CORRELATION_HEADER: &str = "X-Restdocs-Correlation-Id";

/// Base that relative request URIs are resolved against.
pub const DEFAULT_BASE_URI: &str = "http://localhost";

pub trait RequestConverter<R: ?Sized> {
    fn convert_request(&self, request: &R) -> Result<OperationRequest, ConversionError>;
}

pub trait ResponseConverter<R: ?Sized> {
    fn convert_response(&self, response: &R) -> Result<OperationResponse, ConversionError>;
}

/// Converts the `http` crate's `Request<B>` and `Response<B>` for any body
/// that is already in memory.
#[derive(Debug, Clone, Default)]
pub struct HttpConverter {
    base: Option<Url>,
}

impl HttpConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves relative request URIs against `base` instead of
    /// `http://localhost`.
    pub fn with_base(base: Url) -> Self {
        Self { base: Some(base) }
    }

    fn resolve(&self, uri: &http::Uri) -> Result<Url, ConversionError> {
        let raw = uri.to_string();
        let resolved = match &self.base {
            _ if uri.scheme().is_some() => Url::parse(&raw),
            Some(base) => base.join(&raw),
            None => Url::parse(&format!("{DEFAULT_BASE_URI}{raw}")),
        };
        resolved.map_err(|source| ConversionError::InvalidUri { uri: raw, source })
    }
}

impl<B: AsRef<[u8]>> RequestConverter<http::Request<B>> for HttpConverter {
    fn convert_request(&self, request: &http::Request<B>) -> Result<OperationRequest, ConversionError> {
        let uri = self.resolve(request.uri())?;
        let cookies = request
            .headers()
            .get_all(COOKIE_HEADER)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(RequestCookie::parse_header)
            .collect();

        Ok(OperationRequest::builder(request.method().clone(), uri)
            .headers(HttpHeaders::from(request.headers()))
            .cookies(cookies)
            .content(request.body().as_ref().to_vec())
            .build())
    }
}

impl<B: AsRef<[u8]>> ResponseConverter<http::Response<B>> for HttpConverter {
    fn convert_response(&self, response: &http::Response<B>) -> Result<OperationResponse, ConversionError> {
        Ok(OperationResponse::new(
            response.status(),
            HttpHeaders::from(response.headers()),
            response.body().as_ref().to_vec(),
        ))
    }
}

/// Identifies one in-flight request in a [`CorrelationRegistry`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for CorrelationId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl std::str::FromStr for CorrelationId {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| ConversionError::UnknownCorrelation(s.to_string()))
    }
}

impl Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Concurrent map from a request's correlation id to the value registered
/// when the request was issued.
///
/// Requests and their responses may be handled on different threads, so the
/// registry is shared by reference. Entries are removed when taken.
#[derive(Debug)]
pub struct CorrelationRegistry<T> {
    entries: Mutex<HashMap<CorrelationId, T>>,
}

impl<T> Default for CorrelationRegistry<T> {
    fn default() -> Self {
        Self { entries: Mutex::new(HashMap::new()) }
    }
}

impl<T> CorrelationRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under a fresh id. The id is meant to travel in the
    /// [`CORRELATION_HEADER`] of the request.
    pub fn register(&self, value: T) -> CorrelationId {
        let id = CorrelationId::new();
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).insert(id, value);
        id
    }

    /// Removes and returns the value registered under `id`.
    pub fn take(&self, id: &CorrelationId) -> Result<T, ConversionError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .ok_or_else(|| ConversionError::UnknownCorrelation(id.to_string()))
    }

    /// Looks up the id in the correlation header of `headers` and takes its
    /// value.
    pub fn take_for(&self, headers: &HttpHeaders) -> Result<T, ConversionError> {
        let raw = headers
            .get(CORRELATION_HEADER)
            .ok_or_else(|| ConversionError::UnknownCorrelation(String::new()))?;
        self.take(&raw.parse()?)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
