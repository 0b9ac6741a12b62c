//! Statement parser integration tests using insta snapshots.
//!
//! Each test parses a template and snapshots the outline produced by
//! `debug_tree`, or the rendered error when parsing fails.

use insta::assert_snapshot;
use stencil_parser::{debug_tree, parse};

fn parse_and_debug(source: &str) -> String {
    match parse(source) {
        Ok(statements) => debug_tree(&statements),
        Err(err) => {
            let span = err.span();
            format!(
                "error {}: {} @{}:{}",
                err.code(),
                err,
                span.start.line,
                span.start.column
            )
        }
    }
}

// ── Trees ──────────────────────────────────────────────────────────────

#[test]
fn inline_reference() {
    assert_snapshot!(parse_and_debug("Hello {{>x .title}}!"), @r###"
    Text "Hello " @0..6
    Inline x .title @6..19
    Text "!" @19..20
    "###);
}

#[test]
fn with_block() {
    assert_snapshot!(parse_and_debug("{{#with .user}}{{>x .name}}{{/with}}"), @r###"
    Block with .user @0..36
      Inline x .name @15..27
    "###);
}

#[test]
fn loop_with_clause() {
    assert_snapshot!(
        parse_and_debug("{{#loop .items[0].tags}}{{>t .}}{{:empty}}-{{/loop}}"),
        @r###"
    Block loop .items[0].tags @0..52
      Inline t . @24..32
      Clause empty @32..43
        Text "-" @42..43
    "###
    );
}

#[test]
fn multiline_template() {
    assert_snapshot!(parse_and_debug("{{#with .a}}\n  {{>x [1]}}\n{{/with}}\n"), @r###"
    Block with .a @0..35
      Text "\n  " @12..15
      Inline x [1] @15..25
      Text "\n" @25..26
    Text "\n" @35..36
    "###);
}

// ── Errors ─────────────────────────────────────────────────────────────

#[test]
fn unclosed_block_at_end_of_input() {
    assert_snapshot!(parse_and_debug("{{#foo .}}"), @"error P0003: unclosed block `foo`, expected `{{/foo}}` @1:11");
}

#[test]
fn mismatched_close() {
    assert_snapshot!(parse_and_debug("{{#with .a}}\n{{/loop}}"), @"error P0004: mismatched closing tag: expected `{{/with}}`, found `{{/loop}}` @2:1");
}

#[test]
fn unclosed_action() {
    assert_snapshot!(parse_and_debug("a\n{{>x .b\n}}"), @"error L0001: unclosed action @2:1");
}

#[test]
fn unknown_symbol() {
    assert_snapshot!(parse_and_debug("{{>x .a-b}}"), @"error L0002: unknown symbol '-' @1:8");
}

#[test]
fn malformed_path() {
    assert_snapshot!(parse_and_debug("{{>x .a[b]}}"), @"error P0001: unexpected word, expected integer @1:9");
}
