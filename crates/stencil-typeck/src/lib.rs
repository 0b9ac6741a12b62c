//! Stencil type checker: schema inference for templates.
//!
//! Given template source, this crate infers the shape of the data the
//! template consumes, or reports the first place where usages disagree.
//!
//! # Architecture
//!
//! - [`ty`]: the schema lattice (`Ty`) and its `intersect` operation
//! - [`constraint`]: statement tree -> ordered path constraints
//! - [`solve`]: incremental solver with tuple-to-list rollback
//! - [`error`]: type errors, each carrying two spans
//! - [`report`]: structured, renderer-agnostic error reports
//! - [`diagnostics`]: ariadne and JSON rendering of reports

pub mod constraint;
pub mod diagnostics;
pub mod error;
mod node;
pub mod report;
pub mod solve;
pub mod ty;

use std::fmt;

use stencil_common::error::LexError;
use stencil_common::path::Path;
use stencil_common::span::Span;
use stencil_parser::ParseError;

use crate::constraint::Constraint;
use crate::error::TypeError;
use crate::report::Report;
use crate::solve::{NoopObserver, SolveObserver, Solver};
use crate::ty::Ty;

/// The result of inferring a template's schema.
#[derive(Clone, Debug, PartialEq)]
pub struct Inference {
    /// The inferred schema.
    pub ty: Ty,
    /// The constraints the schema was solved from, in document order.
    pub constraints: Vec<Constraint>,
    /// Shape paths that were assumed to be tuples and proven to be lists.
    pub lessons: Vec<Path>,
    /// Constraint applications, replays after rollbacks included.
    pub steps: usize,
}

impl Inference {
    /// The schema at `path`, if the template reaches it.
    pub fn at(&self, path: &Path) -> Option<&Ty> {
        self.ty.at(path)
    }
}

/// The first failure anywhere in the pipeline.
#[derive(Clone, Debug, PartialEq)]
pub enum CheckError {
    Lex(LexError),
    Syntax(ParseError),
    Type(TypeError),
}

impl CheckError {
    pub fn span(&self) -> Span {
        match self {
            CheckError::Lex(err) => err.span,
            CheckError::Syntax(err) => err.span(),
            CheckError::Type(err) => err.span(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            CheckError::Lex(err) => err.code(),
            CheckError::Syntax(err) => err.code(),
            CheckError::Type(err) => err.code(),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            CheckError::Lex(err) => err.title(),
            CheckError::Syntax(err) => err.title(),
            CheckError::Type(err) => err.title(),
        }
    }

    /// The structured report a presentation layer renders.
    pub fn report(&self) -> Report {
        match self {
            CheckError::Lex(err) => report::lex_report(err),
            CheckError::Syntax(err) => report::parse_report(err),
            CheckError::Type(err) => report::type_report(err),
        }
    }
}

impl From<LexError> for CheckError {
    fn from(err: LexError) -> Self {
        CheckError::Lex(err)
    }
}

impl From<ParseError> for CheckError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Lex(err) => CheckError::Lex(err),
            other => CheckError::Syntax(other),
        }
    }
}

impl From<TypeError> for CheckError {
    fn from(err: TypeError) -> Self {
        CheckError::Type(err)
    }
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckError::Lex(err) => err.fmt(f),
            CheckError::Syntax(err) => err.fmt(f),
            CheckError::Type(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for CheckError {}

/// Infer the schema of a template.
///
/// This is the main entry point: it parses the source, generates
/// constraints and solves them, stopping at the first error.
pub fn check(source: &str) -> Result<Inference, CheckError> {
    check_with_observer(source, NoopObserver)
}

/// [`check`], reporting solver progress to `observer`.
pub fn check_with_observer<O: SolveObserver>(
    source: &str,
    observer: O,
) -> Result<Inference, CheckError> {
    let statements = stencil_parser::parse(source)?;
    let constraints = constraint::generate(&statements);
    let solution = Solver::with_observer(observer).solve(&constraints)?;
    Ok(Inference {
        ty: solution.ty,
        constraints,
        lessons: solution.lessons,
        steps: solution.steps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use stencil_common::error::LexErrorKind;
    use stencil_common::path::Segment;

    #[test]
    fn pipeline_splits_error_kinds() {
        assert!(matches!(check("{{>x .a"), Err(CheckError::Lex(_))));
        assert!(matches!(check("{{#a .}}"), Err(CheckError::Syntax(_))));
        assert!(matches!(
            check("{{>x .a}}{{>y .a.b}}"),
            Err(CheckError::Type(_))
        ));
    }

    #[test]
    fn lexical_errors_keep_their_kind() {
        let Err(CheckError::Lex(err)) = check("{{>x .a&}}") else {
            panic!("expected a lexical error");
        };
        assert_eq!(err.kind, LexErrorKind::UnknownSymbol('&'));
        assert_eq!(CheckError::Lex(err).code(), "L0002");
    }

    #[test]
    fn inference_answers_path_queries() {
        let inference = check("{{#loop .rows}}{{>c .cells[1]}}{{/loop}}").unwrap();
        let path = Path::new(vec![
            Segment::field("rows"),
            Segment::dynamic(),
            Segment::field("cells"),
        ]);
        assert_eq!(
            inference.at(&path).map(|ty| ty.to_string()),
            Some("(Unknown, Str)".to_string())
        );
        assert_eq!(inference.constraints.len(), 2);
    }

    #[test]
    fn display_delegates_to_stage_error() {
        let err = check("{{#with .a}}{{/loop}}").unwrap_err();
        assert_eq!(err.code(), "P0004");
        assert_eq!(err.title(), "Mismatched closing tag");
        assert_eq!(
            err.to_string(),
            "mismatched closing tag: expected `{{/with}}`, found `{{/loop}}`"
        );
    }
}
