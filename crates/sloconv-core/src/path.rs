//! Path model shared by the walker, the setter and the rule registry
//!
//! A path is an ordered list of segments. Its textual form joins segments
//! with `.`, writes a literal dot inside a key as `\.`, and uses `#` as the
//! positional wildcard. Concrete paths come out of the walker and never
//! contain wildcards; pattern paths are rule keys and destination templates.
//!
//! Copyright (c) 2025 Sloconv Team
//! Licensed under the Apache-2.0 license

use std::fmt;

/// Separator between path segments
pub const SEPARATOR: char = '.';

/// Textual form of the wildcard segment
pub const WILDCARD: &str = "#";

/// A single path segment
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Object member name
    Key(String),
    /// Array position
    Index(usize),
    /// Any array position (pattern paths only)
    Wildcard,
}

impl Segment {
    /// Classify a raw, unescaped segment
    pub fn parse(raw: &str) -> Self {
        if raw == WILDCARD {
            return Segment::Wildcard;
        }
        match parse_index(raw) {
            Some(index) => Segment::Index(index),
            None => Segment::Key(raw.to_string()),
        }
    }

    /// Numeric value of the segment, if its text is a non-negative integer
    ///
    /// Object keys made only of digits count as indices, matching how the
    /// textual form is read back. Leading zeros are accepted here, but
    /// [`Segment::parse`] keeps such text as a key so it prints unchanged.
    pub fn index(&self) -> Option<usize> {
        match self {
            Segment::Index(i) => Some(*i),
            Segment::Key(k) => numeric_value(k),
            Segment::Wildcard => None,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Segment::Wildcard)
    }

    /// Textual equality, the comparison used by pattern matching
    pub fn same_text(&self, other: &Segment) -> bool {
        self.raw() == other.raw()
    }

    /// Unescaped text of the segment
    pub fn raw(&self) -> std::borrow::Cow<'_, str> {
        match self {
            Segment::Key(k) => std::borrow::Cow::Borrowed(k.as_str()),
            Segment::Index(i) => std::borrow::Cow::Owned(i.to_string()),
            Segment::Wildcard => std::borrow::Cow::Borrowed(WILDCARD),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(k) => f.write_str(&escape_key(k)),
            Segment::Index(i) => write!(f, "{i}"),
            Segment::Wildcard => f.write_str(WILDCARD),
        }
    }
}

/// Index of a segment whose text is its canonical decimal form
fn parse_index(raw: &str) -> Option<usize> {
    if raw.len() > 1 && raw.starts_with('0') {
        return None;
    }
    numeric_value(raw)
}

fn numeric_value(raw: &str) -> Option<usize> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Escape literal dots so a key survives being embedded in a textual path
pub fn escape_key(key: &str) -> String {
    key.replace(SEPARATOR, "\\.")
}

/// An ordered sequence of segments
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    /// The empty path, addressing the document root
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse the textual form of a path
    ///
    /// `\.` is an escaped dot; any other backslash is kept literally. The
    /// empty string parses to the root path.
    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            return Self::root();
        }
        let mut segments = Vec::new();
        let mut current = String::new();
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\\' if chars.peek() == Some(&SEPARATOR) => {
                    current.push(SEPARATOR);
                    chars.next();
                }
                SEPARATOR => segments.push(Segment::parse(&std::mem::take(&mut current))),
                other => current.push(other),
            }
        }
        segments.push(Segment::parse(&current));
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Return a new path extended with `segment`
    pub fn child(&self, segment: Segment) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend(self.segments.iter().cloned());
        segments.push(segment);
        Self { segments }
    }

    /// Position of the leftmost wildcard segment
    pub fn first_wildcard(&self) -> Option<usize> {
        self.segments.iter().position(Segment::is_wildcard)
    }

    pub fn has_wildcard(&self) -> bool {
        self.first_wildcard().is_some()
    }

    /// Replace the segment at `position` with a concrete index
    pub fn with_index_at(&self, position: usize, index: usize) -> Self {
        let mut replaced = self.clone();
        if let Some(segment) = replaced.segments.get_mut(position) {
            *segment = Segment::Index(index);
        }
        replaced
    }

    /// The first `len` segments
    pub fn prefix(&self, len: usize) -> Self {
        Self {
            segments: self.segments[..len.min(self.segments.len())].to_vec(),
        }
    }

    /// Every segment whose text is a non-negative integer, left to right
    pub fn indices(&self) -> Vec<usize> {
        self.segments.iter().filter_map(Segment::index).collect()
    }

    /// Replace every numeric segment with the wildcard
    pub fn generify(&self) -> Self {
        Self {
            segments: self
                .segments
                .iter()
                .map(|s| if s.index().is_some() { Segment::Wildcard } else { s.clone() })
                .collect(),
        }
    }

    /// Whether this pattern matches `concrete`
    ///
    /// Segment counts must be equal; every non-wildcard pattern segment must
    /// equal the concrete segment at the same position.
    pub fn matches(&self, concrete: &Path) -> bool {
        self.segments.len() == concrete.segments.len()
            && self
                .segments
                .iter()
                .zip(&concrete.segments)
                .all(|(p, c)| p.is_wildcard() || p.same_text(c))
    }

    /// Whether this pattern matches the leading segments of `concrete`
    pub fn is_prefix_of(&self, concrete: &Path) -> bool {
        self.segments.len() <= concrete.segments.len()
            && self
                .segments
                .iter()
                .zip(&concrete.segments)
                .all(|(p, c)| p.is_wildcard() || p.same_text(c))
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{SEPARATOR}")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl From<&str> for Path {
    fn from(text: &str) -> Self {
        Path::parse(text)
    }
}

impl From<String> for Path {
    fn from(text: String) -> Self {
        Path::parse(&text)
    }
}

impl FromIterator<Segment> for Path {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

/// Generic form of a textual path
pub fn generify(path: &str) -> String {
    Path::parse(path).generify().to_string()
}

/// Whether the textual `pattern` matches the textual `concrete` path
pub fn match_path(pattern: &str, concrete: &str) -> bool {
    pattern == concrete || Path::parse(pattern).matches(&Path::parse(concrete))
}
