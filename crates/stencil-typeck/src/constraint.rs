//! Constraint generation: statement tree -> ordered constraint list.
//!
//! The walk is pre-order and keeps a running base path. Inline references
//! require `Str`; a `loop` block requires its path's element to exist and
//! narrows the base to that element; any other block requires a non-atomic
//! scope at its path and narrows the base to it. Clause bodies see the base
//! that was active outside the block.
//!
//! The order of the returned constraints follows the document and the
//! solver depends on it.

use std::fmt;
use std::rc::Rc;

use serde::{Serialize, Serializer};
use stencil_common::path::{Path, Segment};
use stencil_common::span::Span;
use stencil_parser::{Block, Statement};

use crate::ty::{Shape, Ty};

/// The block name that repeats its body once per element.
pub const LOOP: &str = "loop";

/// What a usage requires of the value at a path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    /// Only that the path exists.
    Unknown,
    /// That the path exists and can be narrowed into, so is not atomic.
    Scope,
    Str,
    Num,
    Bool,
}

impl Requirement {
    /// The atomic type this requirement pins down, if any.
    pub fn atomic(self) -> Option<Ty> {
        match self {
            Requirement::Str => Some(Ty::Str),
            Requirement::Num => Some(Ty::Num),
            Requirement::Bool => Some(Ty::Bool),
            Requirement::Unknown | Requirement::Scope => None,
        }
    }

    pub fn shape(self) -> Shape {
        match self {
            Requirement::Unknown => Shape::Unknown,
            Requirement::Scope => Shape::Scope,
            Requirement::Str => Shape::Str,
            Requirement::Num => Shape::Num,
            Requirement::Bool => Shape::Bool,
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Unknown => write!(f, "Unknown"),
            Requirement::Scope => write!(f, "Scope"),
            Requirement::Str => write!(f, "Str"),
            Requirement::Num => write!(f, "Num"),
            Requirement::Bool => write!(f, "Bool"),
        }
    }
}

/// The chain of block open spans enclosing a usage.
///
/// A persistent linked list: pushing shares the parent chain, so every
/// constraint generated inside a block holds the same tail.
#[derive(Clone, Debug, Default)]
pub struct Trace(Option<Rc<TraceLink>>);

#[derive(Debug)]
struct TraceLink {
    span: Span,
    parent: Trace,
}

impl Trace {
    /// The empty trace of a top-level usage.
    pub fn root() -> Self {
        Trace(None)
    }

    /// This trace extended by one more enclosing block.
    pub fn push(&self, span: Span) -> Trace {
        Trace(Some(Rc::new(TraceLink {
            span,
            parent: self.clone(),
        })))
    }

    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self;
        while let Some(link) = &current.0 {
            depth += 1;
            current = &link.parent;
        }
        depth
    }

    /// Enclosing spans, outermost first.
    pub fn spans(&self) -> Vec<Span> {
        let mut spans = Vec::with_capacity(self.depth());
        let mut current = self;
        while let Some(link) = &current.0 {
            spans.push(link.span);
            current = &link.parent;
        }
        spans.reverse();
        spans
    }
}

impl PartialEq for Trace {
    fn eq(&self, other: &Self) -> bool {
        self.spans() == other.spans()
    }
}

impl Serialize for Trace {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.spans())
    }
}

/// One usage of a path, in document order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Constraint {
    pub path: Path,
    pub required: Requirement,
    pub trace: Trace,
    /// Span of the marker that made this usage.
    pub origin: Span,
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} : {} @{}..{}",
            self.path, self.required, self.origin.start.offset, self.origin.end.offset
        )
    }
}

/// Walk a statement tree into its ordered constraint list.
pub fn generate(statements: &[Statement]) -> Vec<Constraint> {
    let mut generator = Generator {
        constraints: Vec::new(),
    };
    generator.walk(statements, &Path::root(), &Trace::root());
    generator.constraints
}

struct Generator {
    constraints: Vec<Constraint>,
}

impl Generator {
    fn walk(&mut self, statements: &[Statement], base: &Path, trace: &Trace) {
        for statement in statements {
            match statement {
                Statement::Text { .. } => {}
                Statement::Inline { path, span, .. } => {
                    self.push(base.concat(path), Requirement::Str, trace, *span);
                }
                Statement::Block(block) => self.block(block, base, trace),
            }
        }
    }

    fn block(&mut self, block: &Block, base: &Path, trace: &Trace) {
        let (scope, required) = if block.name == LOOP {
            (
                base.concat(&block.path).child(Segment::dynamic()),
                Requirement::Unknown,
            )
        } else {
            (base.concat(&block.path), Requirement::Scope)
        };
        self.push(scope.clone(), required, trace, block.open);

        let inner = trace.push(block.open);
        self.walk(&block.statements, &scope, &inner);
        for clause in &block.clauses {
            self.walk(&clause.statements, base, &inner);
        }
    }

    fn push(&mut self, path: Path, required: Requirement, trace: &Trace, origin: Span) {
        self.constraints.push(Constraint {
            path,
            required,
            trace: trace.clone(),
            origin,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constraints(source: &str) -> Vec<Constraint> {
        generate(&stencil_parser::parse(source).unwrap())
    }

    fn render(source: &str) -> Vec<String> {
        constraints(source).iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn text_contributes_nothing() {
        assert!(constraints("just text").is_empty());
    }

    #[test]
    fn inline_requires_str() {
        assert_eq!(render("a {{>x .title}}"), vec![".title : Str @2..15"]);
    }

    #[test]
    fn with_block_narrows_base() {
        assert_eq!(
            render("{{#with .user}}{{>x .name}}{{/with}}"),
            vec![".user : Scope @0..15", ".user.name : Str @15..27"]
        );
    }

    #[test]
    fn loop_block_appends_dynamic_offset() {
        assert_eq!(
            render("{{#loop .items}}{{>x .name}}{{>y .}}{{/loop}}"),
            vec![
                ".items[] : Unknown @0..16",
                ".items[].name : Str @16..28",
                ".items[] : Str @28..36",
            ]
        );
    }

    #[test]
    fn clauses_use_outer_base() {
        assert_eq!(
            render("{{#with .a}}{{>x .b}}{{:else}}{{>y .c}}{{/with}}"),
            vec![".a : Scope @0..12", ".a.b : Str @12..21", ".c : Str @30..39"]
        );
    }

    #[test]
    fn document_order_is_preserved() {
        let paths: Vec<String> = constraints("{{>a .z}}{{#with .y}}{{>b .x}}{{/with}}{{>c .w}}")
            .iter()
            .map(|c| c.path.to_string())
            .collect();
        assert_eq!(paths, vec![".z", ".y", ".y.x", ".w"]);
    }

    #[test]
    fn trace_records_enclosing_blocks() {
        let cs = constraints("{{#with .a}}{{#loop .b}}{{>x .c}}{{/loop}}{{/with}}");
        assert_eq!(cs.len(), 3);
        assert!(cs[0].trace.spans().is_empty());
        assert_eq!(cs[1].trace.spans().len(), 1);

        let spans = cs[2].trace.spans();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].start.offset, 0);
        assert_eq!(spans[1].start.offset, 12);
        assert_eq!(cs[2].path.to_string(), ".a.b[].c");
    }

    #[test]
    fn trace_serializes_as_span_list() {
        let cs = constraints("{{#with .a}}{{>x .b}}{{/with}}");
        let json = serde_json::to_value(&cs[1]).unwrap();
        assert_eq!(json["required"], "str");
        assert_eq!(json["trace"].as_array().unwrap().len(), 1);
        assert_eq!(json["path"][0]["Field"], "a");
    }
}
