//! Type errors raised while solving constraints.
//!
//! Every type error carries two spans: `span`, the usage that could not be
//! reconciled, and `established`, the earlier usage that fixed the shape it
//! conflicts with. `trace` lists the blocks enclosing the failing usage,
//! outermost first.

use std::fmt;

use stencil_common::path::Path;
use stencil_common::span::Span;

use crate::ty::{Shape, Ty};

/// A type error encountered during solving.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeError {
    /// A path is required to be two incompatible shapes.
    ///
    /// Example: `{{>x .a}}{{#with .a}}{{/with}}` uses `.a` as a string and
    /// then as a block scope.
    Mismatch {
        path: Path,
        expected: Shape,
        found: Shape,
        span: Span,
        established: Span,
        trace: Vec<Span>,
    },
    /// A field was accessed on something that is not a dict.
    NotADict {
        path: Path,
        field: String,
        found: Ty,
        span: Span,
        established: Span,
        trace: Vec<Span>,
    },
    /// An offset was applied to something that is neither a list nor a tuple.
    NotIndexable {
        path: Path,
        found: Ty,
        span: Span,
        established: Span,
        trace: Vec<Span>,
    },
}

impl TypeError {
    /// The usage that failed.
    pub fn span(&self) -> Span {
        match self {
            TypeError::Mismatch { span, .. }
            | TypeError::NotADict { span, .. }
            | TypeError::NotIndexable { span, .. } => *span,
        }
    }

    /// The earlier usage that fixed the conflicting shape.
    pub fn established(&self) -> Span {
        match self {
            TypeError::Mismatch { established, .. }
            | TypeError::NotADict { established, .. }
            | TypeError::NotIndexable { established, .. } => *established,
        }
    }

    /// Open spans of the blocks enclosing the failing usage, outermost first.
    pub fn trace(&self) -> &[Span] {
        match self {
            TypeError::Mismatch { trace, .. }
            | TypeError::NotADict { trace, .. }
            | TypeError::NotIndexable { trace, .. } => trace,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            TypeError::Mismatch { path, .. }
            | TypeError::NotADict { path, .. }
            | TypeError::NotIndexable { path, .. } => path,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            TypeError::Mismatch { .. } => "E0001",
            TypeError::NotADict { .. } => "E0002",
            TypeError::NotIndexable { .. } => "E0003",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            TypeError::Mismatch { .. } => "Type mismatch",
            TypeError::NotADict { .. } => "Not a dict",
            TypeError::NotIndexable { .. } => "Not indexable",
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeError::Mismatch {
                path,
                expected,
                found,
                ..
            } => write!(
                f,
                "type mismatch at `{path}`: expected {expected}, found {found}"
            ),
            TypeError::NotADict {
                path, field, found, ..
            } => write!(
                f,
                "cannot access field `{field}`: `{path}` is `{found}`, not a dict"
            ),
            TypeError::NotIndexable { path, found, .. } => write!(
                f,
                "cannot index into `{path}`: it is `{found}`, not a list or tuple"
            ),
        }
    }
}

impl std::error::Error for TypeError {}
