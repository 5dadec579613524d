use std::fmt;
use std::str::FromStr;

use crate::parse::ParseError;

/// One step from a value to one of its children.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Segment {
    /// A named member of an object.
    Member(String),
    /// A concrete element of a collection.
    Index(usize),
    /// Any element of a collection, written `[*]`.
    Any,
}

/// Canonical location of a value, from the model root down to a member or element.
///
/// The string form joins members with `.` and attaches element segments directly:
/// `orders[*].total`, `orders[2].total`. The root is the empty path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    /// The model root.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// A copy of this path with one more member segment.
    #[must_use]
    pub fn member(&self, name: &str) -> Self {
        self.child(Segment::Member(name.to_owned()))
    }

    /// A copy of this path with one more element segment.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        self.child(Segment::Index(index))
    }

    /// A copy of this path with one more `[*]` segment.
    #[must_use]
    pub fn any(&self) -> Self {
        self.child(Segment::Any)
    }

    fn child(&self, segment: Segment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }

    /// Append every segment of `other`.
    #[must_use]
    pub fn join(&self, other: &Path) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Self { segments }
    }

    /// Replace every concrete index with `[*]`.
    ///
    /// This is the key under which a result path is found in a template.
    #[must_use]
    pub fn generalize(&self) -> Self {
        let segments = self
            .segments
            .iter()
            .map(|s| match s {
                Segment::Index(_) => Segment::Any,
                other => other.clone(),
            })
            .collect();
        Self { segments }
    }

    #[must_use]
    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Swap a leading `prefix` for `replacement`. `None` if `prefix` does not lead this path.
    #[must_use]
    pub fn replace_prefix(&self, prefix: &Path, replacement: &Path) -> Option<Self> {
        let rest = self.segments.strip_prefix(prefix.segments.as_slice())?;
        let mut segments = replacement.segments.clone();
        segments.extend(rest.iter().cloned());
        Some(Self { segments })
    }

    pub(crate) fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    pub(crate) fn pop(&mut self) {
        self.segments.pop();
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Member(name) if i == 0 => write!(f, "{name}")?,
                Segment::Member(name) => write!(f, ".{name}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
                Segment::Any => write!(f, "[*]")?,
            }
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parse::parse_path(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Path {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
