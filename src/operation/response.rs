use http::StatusCode;

use super::decode_content;
use super::headers::{HttpHeaders, SET_COOKIE};

/// A cookie set by a response.
///
/// Only the attributes that end up in documentation are kept: `Path`,
/// `Domain` (leading dot stripped), `Max-Age`, `Expires` (raw string),
/// `SameSite`, `Secure` and `HttpOnly`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResponseCookie {
    pub name: String,
    pub value: String,
    pub path: Option<String>,
    pub domain: Option<String>,
    pub max_age: Option<i64>,
    pub expires: Option<String>,
    pub same_site: Option<String>,
    pub secure: bool,
    pub http_only: bool,
}

impl ResponseCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into(), ..Default::default() }
    }

    /// Parses a single `Set-Cookie` header value. Returns `None` when the
    /// header has no `name=value` pair.
    pub fn parse_set_cookie(header: &str) -> Option<ResponseCookie> {
        let mut parts = header.split(';');
        let (name, value) = parts.next()?.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let mut cookie = ResponseCookie::new(name, value.trim().trim_matches('"'));
        for part in parts.map(str::trim).filter(|p| !p.is_empty()) {
            match part.split_once('=') {
                Some((k, v)) => {
                    let v = v.trim();
                    match k.trim().to_ascii_lowercase().as_str() {
                        "path" => cookie.path = Some(v.to_string()),
                        "domain" => cookie.domain = Some(v.trim_start_matches('.').to_string()),
                        "expires" => cookie.expires = Some(v.to_string()),
                        "max-age" => cookie.max_age = v.parse().ok(),
                        "samesite" => cookie.same_site = Some(normalize_same_site(v)),
                        _ => {}
                    }
                }
                None => {
                    if part.eq_ignore_ascii_case("secure") {
                        cookie.secure = true;
                    } else if part.eq_ignore_ascii_case("httponly") {
                        cookie.http_only = true;
                    }
                }
            }
        }
        Some(cookie)
    }
}

fn normalize_same_site(value: &str) -> String {
    ["Lax", "Strict", "None"]
        .into_iter()
        .find(|known| known.eq_ignore_ascii_case(value))
        .map_or_else(|| value.to_string(), str::to_string)
}

/// The response half of an [`Operation`](super::Operation).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationResponse {
    status: StatusCode,
    headers: HttpHeaders,
    cookies: Vec<ResponseCookie>,
    content: Vec<u8>,
}

impl OperationResponse {
    /// Cookies are derived from the `Set-Cookie` headers. Malformed
    /// header values are logged and skipped.
    pub fn new(status: StatusCode, headers: HttpHeaders, content: impl Into<Vec<u8>>) -> Self {
        let cookies = headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| {
                let cookie = ResponseCookie::parse_set_cookie(value);
                if cookie.is_none() {
                    log::warn!("Ignoring malformed Set-Cookie header: {value}");
                }
                cookie
            })
            .collect();

        Self { status, headers, cookies, content: content.into() }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HttpHeaders {
        &self.headers
    }

    pub fn cookies(&self) -> &[ResponseCookie] {
        &self.cookies
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn content_as_string(&self) -> String {
        decode_content(&self.headers, &self.content)
    }

    /// Same status with replaced headers and content, used by preprocessors.
    /// Cookies are derived again from the new headers.
    pub fn with_parts(&self, headers: HttpHeaders, content: Vec<u8>) -> Self {
        Self::new(self.status, headers, content)
    }
}
