use std::fmt;

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    /// `[]`, `[*]` or `[n]`. Every form addresses all items of an array.
    Array,
}

/// A compiled path into a JSON payload.
///
/// Keys are separated by dots. Keys that contain dots or brackets are
/// written as `['a.b']`. Array segments are `[]`, `[*]` or `[0]`:
/// `items[].id`, `['user.name']`, `matrix[][]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    segments: Vec<Segment>,
}

impl FieldPath {
    pub fn compile(path: &str) -> FieldPath {
        FieldPath { raw: path.to_string(), segments: parse_segments(path) }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// A precise path has no array segments and so matches at most one value.
    pub fn is_precise(&self) -> bool {
        !self.segments.contains(&Segment::Array)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn parse_segments(path: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut key = String::new();
    let mut rest = path;

    let flush = |key: &mut String, segments: &mut Vec<Segment>| {
        if !key.is_empty() {
            segments.push(Segment::Key(std::mem::take(key)));
        }
    };

    while let Some(c) = rest.chars().next() {
        match c {
            '.' => {
                flush(&mut key, &mut segments);
                rest = &rest[1..];
            }
            '[' => {
                if let Some(quoted) = rest.strip_prefix("['") {
                    if let Some(end) = quoted.find("']").filter(|&end| end > 0) {
                        flush(&mut key, &mut segments);
                        segments.push(Segment::Key(quoted[..end].to_string()));
                        rest = &quoted[end + 2..];
                        continue;
                    }
                }
                if let Some(close) = rest.find(']') {
                    let inner = &rest[1..close];
                    if inner.is_empty() || inner == "*" || inner.bytes().all(|b| b.is_ascii_digit()) {
                        flush(&mut key, &mut segments);
                        segments.push(Segment::Array);
                        rest = &rest[close + 1..];
                        continue;
                    }
                }
                key.push(c);
                rest = &rest[1..];
            }
            _ => {
                key.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }
    flush(&mut key, &mut segments);
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(path: &str) -> Vec<Segment> {
        FieldPath::compile(path).segments().to_vec()
    }

    fn k(s: &str) -> Segment {
        Segment::Key(s.to_string())
    }

    #[test]
    fn dotted_path() {
        assert_eq!(keys("a.b.c"), vec![k("a"), k("b"), k("c")]);
        assert!(FieldPath::compile("a.b").is_precise());
    }

    #[test]
    fn array_segments() {
        assert_eq!(keys("a[].b"), vec![k("a"), Segment::Array, k("b")]);
        assert_eq!(keys("a[*].b"), vec![k("a"), Segment::Array, k("b")]);
        assert_eq!(keys("a[0][]"), vec![k("a"), Segment::Array, Segment::Array]);
        assert_eq!(keys("[]"), vec![Segment::Array]);
        assert!(!FieldPath::compile("a[]").is_precise());
    }

    #[test]
    fn bracketed_keys() {
        assert_eq!(keys("['a.b'].c"), vec![k("a.b"), k("c")]);
        assert_eq!(keys("a['b.c'][]"), vec![k("a"), k("b.c"), Segment::Array]);
    }

    #[test]
    fn unusual_brackets_stay_in_the_key() {
        assert_eq!(keys("a[x]"), vec![k("a[x]")]);
        assert_eq!(keys("né.x"), vec![k("né"), k("x")]);
    }

    #[test]
    fn display_is_the_raw_path() {
        assert_eq!(FieldPath::compile("a[*].b").to_string(), "a[*].b");
    }
}
