//! Verification of the names found in an operation against the names that
//! were documented.
//!
//! ```text
//! expected     = names of descriptors that are not ignored
//! undocumented = actual - every descriptor name     (empty when relaxed)
//! missing      = required, not ignored names - actual
//! ```
//!
//! Ignored descriptors still count as handled, so an ignored name that is
//! present is never undocumented. Both sets keep the order of their first
//! occurrence.
use crate::descriptor::Descriptor;

/// How names are compared for one kind of element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMatching {
    CaseSensitive,
    /// HTTP header names.
    IgnoreAsciiCase,
}

impl NameMatching {
    pub fn matches(self, a: &str, b: &str) -> bool {
        match self {
            NameMatching::CaseSensitive => a == b,
            NameMatching::IgnoreAsciiCase => a.eq_ignore_ascii_case(b),
        }
    }
}

/// One documentable kind of element and the wording of its failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementKind {
    /// Capitalized plural used to open messages, `Headers`.
    pub plural: &'static str,
    /// Singular used in descriptor checks, `header`.
    pub singular: &'static str,
    /// What identifies an element, `names` or `relations`.
    pub identified_by: &'static str,
    /// Where elements are looked for, `request` or `response`.
    pub location: &'static str,
    pub matching: NameMatching,
}

impl ElementKind {
    pub const REQUEST_HEADERS: ElementKind = ElementKind::headers("request");
    pub const RESPONSE_HEADERS: ElementKind = ElementKind::headers("response");
    pub const REQUEST_COOKIES: ElementKind = ElementKind::named("Cookies", "cookie", "request");
    pub const RESPONSE_COOKIES: ElementKind = ElementKind::named("Cookies", "cookie", "response");
    pub const QUERY_PARAMETERS: ElementKind = ElementKind::named("Query parameters", "query parameter", "request");
    pub const FORM_PARAMETERS: ElementKind = ElementKind::named("Form parameters", "form parameter", "request");
    pub const PATH_PARAMETERS: ElementKind = ElementKind::named("Path parameters", "path parameter", "request");
    pub const REQUEST_PARTS: ElementKind = ElementKind::named("Request parts", "request part", "request");
    pub const LINKS: ElementKind = ElementKind {
        plural: "Links",
        singular: "link",
        identified_by: "relations",
        location: "response",
        matching: NameMatching::CaseSensitive,
    };

    const fn headers(location: &'static str) -> ElementKind {
        ElementKind {
            plural: "Headers",
            singular: "header",
            identified_by: "names",
            location,
            matching: NameMatching::IgnoreAsciiCase,
        }
    }

    const fn named(plural: &'static str, singular: &'static str, location: &'static str) -> ElementKind {
        ElementKind { plural, singular, identified_by: "names", location, matching: NameMatching::CaseSensitive }
    }

    fn undocumented_message(&self, names: &[String]) -> String {
        format!(
            "{} with the following {} were not documented: {}",
            self.plural,
            self.identified_by,
            format_names(names)
        )
    }

    fn missing_message(&self, names: &[String]) -> String {
        format!(
            "{} with the following {} were not found in the {}: {}",
            self.plural,
            self.identified_by,
            self.location,
            format_names(names)
        )
    }
}

/// Names rendered as `[a, b]`.
pub fn format_names(names: &[String]) -> String {
    format!("[{}]", names.join(", "))
}

/// Outcome of [`verify`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verification {
    pub undocumented: Vec<String>,
    pub missing: Vec<String>,
}

impl Verification {
    pub fn is_ok(&self) -> bool {
        self.undocumented.is_empty() && self.missing.is_empty()
    }

    /// Turns a failed verification into a [`DocumentationMismatch`] worded
    /// for `kind`.
    pub fn into_result(self, kind: &ElementKind) -> Result<(), DocumentationMismatch> {
        if self.is_ok() {
            return Ok(());
        }
        let mut parts = Vec::with_capacity(2);
        if !self.undocumented.is_empty() {
            parts.push(kind.undocumented_message(&self.undocumented));
        }
        if !self.missing.is_empty() {
            parts.push(kind.missing_message(&self.missing));
        }
        Err(DocumentationMismatch {
            undocumented: self.undocumented,
            missing: self.missing,
            message: parts.join(". "),
        })
    }
}

/// The operation does not match its documentation.
///
/// Displays as the fully formatted message, for example
/// `Links with the following relations were not documented: [alpha]`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct DocumentationMismatch {
    pub undocumented: Vec<String>,
    pub missing: Vec<String>,
    message: String,
}

impl DocumentationMismatch {
    /// A mismatch with a pre-formatted message, used by payload fields where
    /// the undocumented part is a JSON document rather than a list of names.
    pub fn with_message(undocumented: Vec<String>, missing: Vec<String>, message: String) -> Self {
        Self { undocumented, missing, message }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Compares the `actual` names of an operation with `descriptors`.
///
/// When `relaxed` is true undocumented names are accepted. Missing
/// required names are reported either way.
pub fn verify<'a, I, D>(actual: I, descriptors: &[D], relaxed: bool, matching: NameMatching) -> Verification
where
    I: IntoIterator<Item = &'a str>,
    D: AsRef<Descriptor>,
{
    let actual: Vec<&str> = dedup(actual, matching);
    let documented = |name: &str| descriptors.iter().any(|d| matching.matches(&d.as_ref().name, name));

    let undocumented: Vec<String> = if relaxed {
        Vec::new()
    } else {
        actual.iter().copied().filter(|name| !documented(name)).map(str::to_string).collect()
    };

    let required = descriptors
        .iter()
        .map(|d| d.as_ref())
        .filter(|d| !d.ignored && !d.optional)
        .map(|d| d.name.as_str());
    let missing: Vec<String> = dedup(required, matching)
        .into_iter()
        .filter(|name| !actual.iter().any(|a| matching.matches(a, name)))
        .map(str::to_string)
        .collect();

    log::trace!("verified {actual:?}: undocumented={undocumented:?} missing={missing:?}");
    Verification { undocumented, missing }
}

fn dedup<'a>(names: impl IntoIterator<Item = &'a str>, matching: NameMatching) -> Vec<&'a str> {
    let mut unique: Vec<&str> = Vec::new();
    for name in names {
        if !unique.iter().any(|seen| matching.matches(seen, name)) {
            unique.push(name);
        }
    }
    unique
}
