//! Media types as found in `Content-Type` headers.
//!
//! Parsing is permissive about whitespace and parameter quoting. Type,
//! subtype and parameter names are normalized to lowercase.
//!
//! ## Compatibility
//! [`MediaType::is_compatible_with`] is what content-type dispatch uses.
//! Parameters never take part in it. Two types are compatible when:
//! - either side is `*/*`, or
//! - the types match and
//!   - the subtypes are equal, or either subtype is `*`, or
//!   - one side is a wildcard with a suffix (`*+json`) and the other subtype
//!     has that suffix, or
//!   - one subtype has no suffix and is the structured-syntax suffix of the
//!     other (`json` is compatible with `vnd.hal+json`).
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum MediaTypeError {
    #[error("Invalid media type '{0}': expected 'type/subtype'")]
    MissingSubtype(String),

    #[error("Invalid media type '{0}': malformed parameter")]
    MalformedParameter(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    type_: Cow<'static, str>,
    subtype: Cow<'static, str>,
    parameters: Vec<(String, String)>,
}

pub const ALL: MediaType = MediaType::from_static("*", "*");
pub const APPLICATION_JSON: MediaType = MediaType::from_static("application", "json");
pub const APPLICATION_HAL_JSON: MediaType = MediaType::from_static("application", "hal+json");
pub const APPLICATION_VND_HAL_JSON: MediaType = MediaType::from_static("application", "vnd.hal+json");
pub const APPLICATION_HAL_FORMS_JSON: MediaType =
    MediaType::from_static("application", "prs.hal-forms+json");
pub const APPLICATION_FORM_URLENCODED: MediaType =
    MediaType::from_static("application", "x-www-form-urlencoded");
pub const MULTIPART_FORM_DATA: MediaType = MediaType::from_static("multipart", "form-data");

impl MediaType {
    /// Builds a parameterless media type from static, already lowercase parts.
    pub const fn from_static(type_: &'static str, subtype: &'static str) -> Self {
        Self {
            type_: Cow::Borrowed(type_),
            subtype: Cow::Borrowed(subtype),
            parameters: Vec::new(),
        }
    }

    pub fn type_(&self) -> &str {
        &self.type_
    }

    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    pub fn parameters(&self) -> &[(String, String)] {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn charset(&self) -> Option<&str> {
        self.parameter("charset")
    }

    /// Returns the structured-syntax suffix, `json` for `vnd.hal+json`.
    pub fn suffix(&self) -> Option<&str> {
        self.subtype.rsplit_once('+').map(|(_, suffix)| suffix)
    }

    pub fn is_wildcard_type(&self) -> bool {
        self.type_ == "*"
    }

    pub fn is_wildcard_subtype(&self) -> bool {
        self.subtype == "*" || self.subtype.starts_with("*+")
    }

    /// True when type and subtype are identical, ignoring parameters.
    pub fn matches_exactly(&self, other: &MediaType) -> bool {
        self.type_ == other.type_ && self.subtype == other.subtype
    }

    pub fn is_compatible_with(&self, other: &MediaType) -> bool {
        if self.is_wildcard_type() || other.is_wildcard_type() {
            return true;
        }
        if self.type_ != other.type_ {
            return false;
        }
        if self.subtype == other.subtype || self.subtype == "*" || other.subtype == "*" {
            return true;
        }
        match (self.suffix(), other.suffix()) {
            (Some(ours), Some(theirs)) if self.is_wildcard_subtype() || other.is_wildcard_subtype() => {
                ours == theirs
            }
            (Some(ours), None) => ours == other.subtype,
            (None, Some(theirs)) => theirs == self.subtype,
            _ => false,
        }
    }

    /// The same media type without any parameters.
    pub fn without_parameters(&self) -> MediaType {
        Self {
            type_: self.type_.clone(),
            subtype: self.subtype.clone(),
            parameters: Vec::new(),
        }
    }
}

impl FromStr for MediaType {
    type Err = MediaTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(';');
        let full_type = parts.next().unwrap_or_default().trim();
        let full_type = if full_type == "*" { "*/*" } else { full_type };

        let (type_, subtype) = full_type
            .split_once('/')
            .map(|(t, st)| (t.trim(), st.trim()))
            .filter(|(t, st)| !t.is_empty() && !st.is_empty() && !st.contains('/'))
            .ok_or_else(|| MediaTypeError::MissingSubtype(s.to_string()))?;

        let mut parameters = Vec::new();
        for part in parts {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let (name, value) = part
                .split_once('=')
                .ok_or_else(|| MediaTypeError::MalformedParameter(s.to_string()))?;
            let name = name.trim();
            if name.is_empty() {
                return Err(MediaTypeError::MalformedParameter(s.to_string()));
            }
            parameters.push((name.to_ascii_lowercase(), value.trim().trim_matches('"').to_string()));
        }

        Ok(Self {
            type_: Cow::Owned(type_.to_ascii_lowercase()),
            subtype: Cow::Owned(subtype.to_ascii_lowercase()),
            parameters,
        })
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.type_, self.subtype)?;
        for (name, value) in &self.parameters {
            write!(f, ";{name}={value}")?;
        }
        Ok(())
    }
}
