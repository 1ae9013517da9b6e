//! PropertyPath parsing and formatting.
//!
//! Grammar (shared by the accessor, the expander and template keys):
//!   segment(.segment)*
//! - '.' separates segments
//! - a segment is either a plain `name` or `name[idx]` with a base-10 index
//! - only one trailing bracket group is recognised per segment; the name is
//!   everything before it, so `a[1][2]` is name `a[1]`, index 2
//!   Examples:
//!   "nested.test[2].path" -> [nested, test[2], path]
//!   "marker.range[0]"     -> [marker, range[0]]
//!   "a[x].b"              -> [a[x] (plain), b]
//!
//! Parsing is total: anything that does not look like `name[digits]` is kept
//! as an opaque plain name. That includes indices above [`MAX_INDEX`], so a
//! key such as `a[18446744073709551615]` never allocates an array.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Largest array index a path may address. Arrays are padded with `null` up
/// to the index, so this also caps the length of arrays the expander creates.
pub const MAX_INDEX: usize = 1 << 20;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathSegment {
    /// Property name (may be empty, may contain brackets when malformed)
    pub name: String,
    /// Array index addressed under `name`, if the segment ends in `[idx]`
    pub index: Option<usize>,
}

impl PathSegment {
    pub fn key(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: None,
        }
    }

    pub fn indexed(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index: Some(index),
        }
    }

    /// Property name and index to walk. A hand-built segment whose index is
    /// above [`MAX_INDEX`] addresses the plain name `name[idx]` instead, the
    /// same reading the parser gives such text.
    pub fn addressable(&self) -> (Cow<'_, str>, Option<usize>) {
        match self.index {
            Some(idx) if idx > MAX_INDEX => (Cow::Owned(self.to_string()), None),
            index => (Cow::Borrowed(self.name.as_str()), index),
        }
    }

    /// Parse a single dot-free segment.
    pub fn parse(raw: &str) -> Self {
        match split_trailing_index(raw) {
            Some((name, index)) => PathSegment::indexed(name, index),
            None => PathSegment::key(raw),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(idx) => write!(f, "{}[{}]", self.name, idx),
            None => f.write_str(&self.name),
        }
    }
}

/// Split `name[digits]` into its parts. The bracket group must close the segment.
fn split_trailing_index(raw: &str) -> Option<(&str, usize)> {
    let inner = raw.strip_suffix(']')?;
    let open = inner.rfind('[')?;
    let digits = &inner[open + 1..];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let index = digits.parse::<usize>().ok().filter(|idx| *idx <= MAX_INDEX)?;
    Some((&inner[..open], index))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyPath {
    pub segments: Vec<PathSegment>,
}

impl PropertyPath {
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    /// Parse a path string according to the grammar described above.
    pub fn parse(s: &str) -> Self {
        let segments = s.split('.').map(PathSegment::parse).collect();
        Self { segments }
    }

    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.segments.iter()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn first(&self) -> Option<&PathSegment> {
        self.segments.first()
    }

    /// Everything after the first segment, or `None` for single-segment paths.
    pub fn tail(&self) -> Option<PropertyPath> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(PropertyPath::new(self.segments[1..].to_vec()))
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{seg}")?;
        }
        Ok(())
    }
}

impl FromStr for PropertyPath {
    type Err = Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(PropertyPath::parse(s))
    }
}

impl From<&str> for PropertyPath {
    fn from(s: &str) -> Self {
        PropertyPath::parse(s)
    }
}

// Serde support: serialize as string, deserialize from string
impl Serialize for PropertyPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PropertyPath {
    fn deserialize<D>(deserializer: D) -> Result<PropertyPath, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(PropertyPath::parse(&s))
    }
}

/// How the expander treats one key of a flat mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathKey {
    /// `head.rest...` where `head` carries no brackets at all.
    Dotted { head: String, rest: PropertyPath },
    /// `head[index]` optionally followed by `.rest...`.
    Indexed {
        head: String,
        index: usize,
        rest: Option<PropertyPath>,
    },
    /// Anything else; no path semantics applied.
    Plain,
}

impl PathKey {
    pub fn classify(key: &str) -> Self {
        let path = PropertyPath::parse(key);
        let Some(first) = path.first() else {
            return PathKey::Plain;
        };
        if first.name.is_empty() {
            return PathKey::Plain;
        }
        match first.index {
            Some(index) => PathKey::Indexed {
                head: first.name.clone(),
                index,
                rest: path.tail(),
            },
            None if !first.name.contains('[') => match path.tail() {
                Some(rest) => PathKey::Dotted {
                    head: first.name.clone(),
                    rest,
                },
                None => PathKey::Plain,
            },
            None => PathKey::Plain,
        }
    }
}

/// True for keys made only of ASCII letters, digits and underscores.
pub fn is_simple_key(key: &str) -> bool {
    key.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}
