//! Structured error reports.
//!
//! A `Report` is plain data: a code, a title, the spans involved (primary
//! first) and an ordered list of parts a presentation layer can render in
//! whatever form it likes. The ariadne renderer in [`crate::diagnostics`]
//! is one such consumer.

use serde::Serialize;
use stencil_common::error::{LexError, LexErrorKind};
use stencil_common::span::Span;
use stencil_parser::ParseError;

use crate::error::TypeError;
use crate::ty::Ty;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
    pub code: &'static str,
    pub title: &'static str,
    pub message: String,
    /// Every span a snippet points at, primary first.
    pub spans: Vec<Span>,
    pub parts: Vec<ReportPart>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportPart {
    Text { text: String },
    /// A rendered type.
    Type { ty: Ty },
    /// Quoted alternatives, e.g. the tokens a parser would have accepted.
    Alternatives { items: Vec<String> },
    /// A source excerpt around `span`.
    Snippet {
        span: Span,
        label: String,
        primary: bool,
    },
}

impl Report {
    fn new(code: &'static str, title: &'static str, message: String) -> Self {
        Report {
            code,
            title,
            parts: vec![ReportPart::Text {
                text: message.clone(),
            }],
            message,
            spans: Vec::new(),
        }
    }

    fn text(mut self, text: impl Into<String>) -> Self {
        self.parts.push(ReportPart::Text { text: text.into() });
        self
    }

    fn ty(mut self, ty: &Ty) -> Self {
        self.parts.push(ReportPart::Type { ty: ty.clone() });
        self
    }

    fn alternatives(mut self, items: &[&str]) -> Self {
        self.parts.push(ReportPart::Alternatives {
            items: items.iter().map(|item| item.to_string()).collect(),
        });
        self
    }

    fn snippet(mut self, span: Span, label: impl Into<String>) -> Self {
        let primary = self.spans.is_empty();
        self.spans.push(span);
        self.parts.push(ReportPart::Snippet {
            span,
            label: label.into(),
            primary,
        });
        self
    }

    /// Labels of the snippet parts, in order.
    pub fn labels(&self) -> impl Iterator<Item = (Span, &str, bool)> + '_ {
        self.parts.iter().filter_map(|part| match part {
            ReportPart::Snippet {
                span,
                label,
                primary,
            } => Some((*span, label.as_str(), *primary)),
            _ => None,
        })
    }

    /// Free-text parts after the headline message.
    pub fn notes(&self) -> impl Iterator<Item = &str> + '_ {
        self.parts.iter().skip(1).filter_map(|part| match part {
            ReportPart::Text { text } => Some(text.as_str()),
            _ => None,
        })
    }
}

pub fn lex_report(err: &LexError) -> Report {
    let report = Report::new(err.code(), err.title(), err.to_string());
    match err.kind {
        LexErrorKind::UnclosedAction => report
            .snippet(err.span, "this action has no closing `}}` on its line")
            .text("actions cannot span lines; close it with `}}` before the line or input ends"),
        LexErrorKind::UnknownSymbol(_) => report.snippet(err.span, "not allowed inside an action"),
    }
}

pub fn parse_report(err: &ParseError) -> Report {
    if let ParseError::Lex(lex) = err {
        return lex_report(lex);
    }

    let report = Report::new(err.code(), err.title(), err.to_string());
    let report = match err {
        ParseError::UnexpectedToken {
            found,
            expected,
            span,
        } => report
            .snippet(*span, format!("unexpected {found}"))
            .text("accepted here")
            .alternatives(expected),
        ParseError::InvalidOffset { span, .. } => {
            report.snippet(*span, "offsets must fit in 32 bits")
        }
        ParseError::UnclosedBlock { name, span, .. } => report
            .snippet(*span, "input ends here")
            .text(format!("add `{{{{/{name}}}}}` to close the block")),
        ParseError::MismatchedClosingTag { expected, span, .. } => {
            report.snippet(*span, format!("expected `{{{{/{expected}}}}}`"))
        }
        ParseError::StrayClause { span, .. } => {
            report.snippet(*span, "clauses may only appear inside a block")
        }
        ParseError::StrayClose { span, .. } => report.snippet(*span, "no open block to close"),
        ParseError::TooDeep { span, .. } => report
            .snippet(*span, "nesting exceeds the limit here")
            .text("each enclosing block and each path segment adds one level"),
        ParseError::Lex(_) => unreachable!("handled above"),
    };
    match err.related() {
        Some((label, span)) => report.snippet(span, label),
        None => report,
    }
}

pub fn type_report(err: &TypeError) -> Report {
    let report = Report::new(err.code(), err.title(), err.to_string());
    let mut report = match err {
        TypeError::Mismatch {
            expected,
            found,
            span,
            established,
            ..
        } => report
            .snippet(*span, format!("used as {found} here"))
            .snippet(*established, format!("used as {expected} here")),
        TypeError::NotADict {
            path,
            field,
            found,
            span,
            established,
            ..
        } => report
            .snippet(*span, format!("field `{field}` accessed here"))
            .snippet(*established, format!("`{path}` established here"))
            .text(format!("`{path}` has type"))
            .ty(found),
        TypeError::NotIndexable {
            path,
            found,
            span,
            established,
            ..
        } => report
            .snippet(*span, "indexed here")
            .snippet(*established, format!("`{path}` established here"))
            .text(format!("`{path}` has type"))
            .ty(found),
    };
    for span in err.trace() {
        report = report.snippet(*span, "inside this block");
    }
    report
}
