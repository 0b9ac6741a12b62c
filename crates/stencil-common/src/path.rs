//! Addressable paths into the data a template consumes.

use std::borrow::Borrow;
use std::fmt;

use serde::Serialize;

/// One step of a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Segment {
    /// `.name`
    Field(String),
    /// `[3]` when concrete; `None` is the dynamic element position that a
    /// loop body introduces. A dynamic offset only equals another dynamic one.
    Offset(Option<u32>),
}

impl Segment {
    pub fn field(name: impl Into<String>) -> Self {
        Segment::Field(name.into())
    }

    pub fn offset(value: u32) -> Self {
        Segment::Offset(Some(value))
    }

    pub fn dynamic() -> Self {
        Segment::Offset(None)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Field(name) => write!(f, ".{name}"),
            Segment::Offset(Some(n)) => write!(f, "[{n}]"),
            Segment::Offset(None) => write!(f, "[]"),
        }
    }
}

/// An ordered sequence of segments. The empty path is the document root.
///
/// Paths are values: [`Path::concat`] and [`Path::child`] build new paths
/// and leave their inputs untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Path(Vec<Segment>);

impl Path {
    /// The root path `.`.
    pub fn root() -> Self {
        Path(Vec::new())
    }

    pub fn new(segments: Vec<Segment>) -> Self {
        Path(segments)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// `self` followed by every segment of `other`.
    pub fn concat(&self, other: &Path) -> Path {
        let mut segments = Vec::with_capacity(self.0.len() + other.0.len());
        segments.extend_from_slice(&self.0);
        segments.extend_from_slice(&other.0);
        Path(segments)
    }

    /// `self` followed by one more segment.
    pub fn child(&self, segment: Segment) -> Path {
        let mut segments = self.0.clone();
        segments.push(segment);
        Path(segments)
    }

    /// The first `len` segments.
    pub fn prefix(&self, len: usize) -> Path {
        Path(self.0[..len.min(self.0.len())].to_vec())
    }
}

/// Lets hashed collections of paths be queried with a segment slice.
/// `Path` hashes and compares exactly as its segments do.
impl Borrow<[Segment]> for Path {
    fn borrow(&self) -> &[Segment] {
        &self.0
    }
}

impl From<Vec<Segment>> for Path {
    fn from(segments: Vec<Segment>) -> Self {
        Path(segments)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, ".");
        }
        for segment in &self.0 {
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}
