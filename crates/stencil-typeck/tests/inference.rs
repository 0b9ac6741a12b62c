//! End-to-end inference tests: template source in, schema or error out.
//!
//! Successful inferences snapshot the rendered schema; failures snapshot
//! `code: message` plus the two spans every type error carries.

use insta::assert_snapshot;
use stencil_common::path::{Path, Segment};
use stencil_parser::ParseError;
use stencil_typeck::error::TypeError;
use stencil_typeck::ty::{Field, Ty};
use stencil_typeck::{check, CheckError};

fn infer(source: &str) -> String {
    match check(source) {
        Ok(inference) => inference.ty.to_string(),
        Err(CheckError::Type(err)) => format!(
            "{}: {} @{}..{} (established @{}..{})",
            err.code(),
            err,
            err.span().start.offset,
            err.span().end.offset,
            err.established().start.offset,
            err.established().end.offset,
        ),
        Err(err) => format!(
            "{}: {} @{}:{}",
            err.code(),
            err,
            err.span().start.line,
            err.span().start.column
        ),
    }
}

// ── Schemas ────────────────────────────────────────────────────────────

#[test]
fn single_field() {
    assert_snapshot!(infer("{{>x .title}}"), @"{title: Str}");
}

#[test]
fn with_narrows_into_a_dict() {
    assert_snapshot!(infer("{{#with .user}}{{>x .name}}{{/with}}"), @"{user: {name: Str}}");
}

#[test]
fn loop_makes_a_list_of_dicts() {
    assert_snapshot!(infer("{{#loop .items}}{{>x .name}}{{/loop}}"), @"{items: List<{name: Str}>}");

    let inference = check("{{#loop .items}}{{>x .name}}{{/loop}}").unwrap();
    assert_eq!(
        inference.ty,
        Ty::dict(vec![Field::new(
            "items",
            Ty::list(Ty::dict(vec![Field::new("name", Ty::Str)]), 0)
        )])
    );
}

#[test]
fn text_only_template_is_unknown() {
    assert_snapshot!(infer("no markers here"), @"Unknown");
}

#[test]
fn root_inline_is_a_string() {
    assert_snapshot!(infer("{{>x .}}"), @"Str");
}

#[test]
fn realistic_page() {
    let source = "\
<h1>{{>text .title}}</h1>
{{#with .author}}
  <p>{{>text .name}} ({{>text .email}})</p>
{{/with}}
<ul>
{{#loop .posts}}
  <li>{{>text .title}} {{#loop .tags}}<i>{{>text .}}</i>{{/loop}}</li>
{{:empty}}
  <li>{{>text .placeholder}}</li>
{{/loop}}
</ul>
";
    assert_snapshot!(
        infer(source),
        @"{title: Str, author: {name: Str, email: Str}, posts: List<{title: Str, tags: List<Str>}>, placeholder: Str}"
    );
}

#[test]
fn pair_stays_a_tuple() {
    assert_snapshot!(infer("{{>a .pair[0]}} and {{>b .pair[1].label}}"), @"{pair: (Str, {label: Str})}");
}

// ── Rollback ───────────────────────────────────────────────────────────

#[test]
fn indexed_then_looped_rolls_back_once() {
    let inference = check("{{>x .arr[0]}}{{#loop .arr}}{{>y .}}{{/loop}}").unwrap();
    assert_snapshot!(inference.ty.to_string(), @"{arr: List<Str, 1..>}");
    assert_eq!(inference.lessons, vec![Path::new(vec![Segment::field("arr")])]);
    // Three constraints, one replayed from the start after the rollback.
    assert_eq!(inference.steps, 5);
}

#[test]
fn looped_then_indexed_needs_no_rollback() {
    let inference = check("{{#loop .arr}}{{>y .}}{{/loop}}{{>x .arr[4]}}").unwrap();
    assert_snapshot!(inference.ty.to_string(), @"{arr: List<Str, 5..>}");
    assert!(inference.lessons.is_empty());
}

#[test]
fn many_tuple_paths_terminate() {
    let mut source = String::new();
    for i in 0..20 {
        source.push_str(&format!("{{{{>x .f{i}[0]}}}}"));
    }
    for i in 0..20 {
        source.push_str(&format!("{{{{#loop .f{i}}}}}{{{{/loop}}}}"));
    }
    let inference = check(&source).unwrap();
    assert_eq!(inference.lessons.len(), 20);
    assert!(inference
        .at(&Path::new(vec![Segment::field("f19")]))
        .is_some_and(|ty| matches!(ty, Ty::List { min_length: 1, .. })));
}

// ── Scale ──────────────────────────────────────────────────────────────

/// `levels` nested `{{#with .a}}` blocks around `body`.
fn nested_withs(levels: usize, body: &str) -> String {
    format!(
        "{}{}{}",
        "{{#with .a}}".repeat(levels),
        body,
        "{{/with}}".repeat(levels)
    )
}

fn path_of(fields: &[&str]) -> Path {
    Path::new(fields.iter().map(|name| Segment::field(*name)).collect())
}

#[test]
fn many_usages_deep_inside_nested_blocks() {
    // Two levels per block, so 127 blocks plus a one-segment inline path
    // stays inside the parser's limit.
    let levels = stencil_parser::MAX_DEPTH / 2 - 1;
    let body: String = (0..2_000).map(|i| format!("{{{{>x .f{i}}}}}")).collect();
    let inference = check(&nested_withs(levels, &body)).unwrap();

    assert_eq!(inference.steps, inference.constraints.len());
    assert_eq!(inference.constraints.len(), levels + 2_000);

    let mut fields = vec!["a"; levels];
    fields.push("f1999");
    assert_eq!(inference.at(&path_of(&fields)), Some(&Ty::Str));
}

#[test]
fn nested_loops_deep_inside_blocks() {
    let levels = 60;
    let body = "{{#loop .xs}}{{#loop .ys}}{{>x .v}}{{/loop}}{{/loop}}";
    let inference = check(&nested_withs(levels, body)).unwrap();
    let fields = vec!["a"; levels];
    assert_snapshot!(
        inference.at(&path_of(&fields)).unwrap().to_string(),
        @"{xs: List<{ys: List<{v: Str}>}>}"
    );
}

#[test]
fn nesting_past_the_limit_is_a_syntax_error() {
    for levels in [700, 5_000] {
        let err = check(&nested_withs(levels, "{{>x .name}}")).unwrap_err();
        assert!(
            matches!(err, CheckError::Syntax(ParseError::TooDeep { .. })),
            "{levels}: {err:?}"
        );
        assert_eq!(err.code(), "P0007");
    }
}

// ── Errors ─────────────────────────────────────────────────────────────

#[test]
fn string_then_scope() {
    assert_snapshot!(
        infer("{{>x .a}}{{#with .a}}{{/with}}"),
        @"E0001: type mismatch at `.a`: expected Str, found a block scope @9..21 (established @0..9)"
    );
}

#[test]
fn field_below_a_string() {
    assert_snapshot!(
        infer("{{>x .a}}{{>y .a.b}}"),
        @"E0002: cannot access field `b`: `.a` is `Str`, not a dict @9..20 (established @0..9)"
    );
}

#[test]
fn loop_over_a_dict() {
    assert_snapshot!(
        infer("{{#with .a}}{{>x .b}}{{/with}}{{#loop .a}}{{/loop}}"),
        @"E0003: cannot index into `.a`: it is `{b: Str}`, not a list or tuple @30..42 (established @0..12)"
    );
}

#[test]
fn unclosed_block_at_end_of_input() {
    assert_snapshot!(infer("{{#foo .}}"), @"P0003: unclosed block `foo`, expected `{{/foo}}` @1:11");
    let err = check("{{#foo .}}").unwrap_err();
    assert_eq!(err.span().start.offset, 10);
    assert!(err.span().is_empty());
}

#[test]
fn unclosed_action_across_lines() {
    assert_snapshot!(infer("a\n{{>x .b\n}}"), @"L0001: unclosed action @2:1");
}

#[test]
fn mismatch_inside_nested_blocks_keeps_trace() {
    let err = match check("{{>x .a.b}}{{#with .a}}{{#with .b}}{{/with}}{{/with}}") {
        Err(CheckError::Type(err)) => err,
        other => panic!("expected a type error, got {other:?}"),
    };
    assert!(matches!(err, TypeError::Mismatch { .. }));
    assert_eq!(err.path().to_string(), ".a.b");
    let trace: Vec<u32> = err.trace().iter().map(|span| span.start.offset).collect();
    assert_eq!(trace, vec![11]);
}
