//! Ariadne-based diagnostic rendering.
//!
//! Every `CheckError` is first turned into a [`Report`]; this module then
//! renders that report either as a labeled ariadne snippet or as a single
//! line of JSON. The first snippet of a report is the primary label; the
//! remaining snippets become secondary labels, so a type mismatch always
//! shows both the conflicting usage and the one that established the
//! prior shape.

use std::ops::Range;

use ariadne::{Color, Config, IndexType, Label, Report as Diagnostic, ReportKind, Source};
use serde::Serialize;

use crate::report::{Report, ReportPart};
use crate::CheckError;

/// How diagnostics are rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiagnosticOptions {
    /// Use ANSI colors in human-readable output.
    pub color: bool,
    /// Emit one JSON object per diagnostic instead of a rendered snippet.
    pub json: bool,
}

impl DiagnosticOptions {
    /// Plain text without colors, for tests and non-terminal output.
    pub fn colorless() -> Self {
        DiagnosticOptions {
            color: false,
            json: false,
        }
    }

    pub fn json_mode() -> Self {
        DiagnosticOptions {
            color: false,
            json: true,
        }
    }
}

impl Default for DiagnosticOptions {
    fn default() -> Self {
        DiagnosticOptions {
            color: true,
            json: false,
        }
    }
}

/// Render a pipeline error against the source it came from.
pub fn render_diagnostic(
    error: &CheckError,
    source: &str,
    filename: &str,
    options: &DiagnosticOptions,
) -> String {
    render_report(&error.report(), source, filename, options)
}

/// Render an already-built report.
pub fn render_report(
    report: &Report,
    source: &str,
    filename: &str,
    options: &DiagnosticOptions,
) -> String {
    if options.json {
        render_json(report, source, filename)
    } else {
        render_ariadne(report, source, options.color)
    }
}

// ── Ariadne ────────────────────────────────────────────────────────────

fn render_ariadne(report: &Report, source: &str, color: bool) -> String {
    let config = Config::default()
        .with_color(color)
        .with_index_type(IndexType::Byte);
    let primary = report
        .spans
        .first()
        .map_or(0..0, |span| clamp(span.range(), source.len()));

    let mut builder = Diagnostic::build(ReportKind::Error, primary)
        .with_code(report.code)
        .with_message(&report.message)
        .with_config(config);

    let mut notes = Vec::new();
    let mut pending_text: Option<&str> = None;
    for part in report.parts.iter().skip(1) {
        match part {
            ReportPart::Snippet {
                span,
                label,
                primary,
            } => {
                let color = if *primary {
                    Color::Red
                } else if label.as_str() == "inside this block" {
                    Color::Cyan
                } else {
                    Color::Blue
                };
                builder.add_label(
                    Label::new(clamp(span.range(), source.len()))
                        .with_message(label)
                        .with_color(color)
                        .with_order(if *primary { 0 } else { 1 }),
                );
            }
            ReportPart::Text { text } => {
                if let Some(previous) = pending_text.replace(text) {
                    notes.push(previous.to_string());
                }
            }
            ReportPart::Type { ty } => match pending_text.take() {
                Some(text) => notes.push(format!("{text} `{ty}`")),
                None => notes.push(format!("`{ty}`")),
            },
            ReportPart::Alternatives { items } => {
                let items = items.join(", ");
                match pending_text.take() {
                    Some(text) => notes.push(format!("{text}: {items}")),
                    None => notes.push(items),
                }
            }
        }
    }
    if let Some(text) = pending_text {
        notes.push(text.to_string());
    }
    for note in notes {
        builder = builder.with_help(note);
    }

    let mut buf = Vec::new();
    if builder.finish().write(Source::from(source), &mut buf).is_err() {
        return format!("error[{}]: {}", report.code, report.message);
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Keep a byte range inside the source and make empty ranges one byte
/// wide where possible, so end-of-input errors still get a caret.
fn clamp(range: Range<usize>, len: usize) -> Range<usize> {
    let start = range.start.min(len);
    let end = range.end.min(len).max(start);
    if start == end {
        if end < len {
            start..end + 1
        } else {
            start.saturating_sub(1)..end
        }
    } else {
        start..end
    }
}

// ── JSON ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct JsonDiagnostic<'a> {
    code: &'static str,
    severity: &'static str,
    title: &'static str,
    message: &'a str,
    file: &'a str,
    spans: Vec<JsonSpan<'a>>,
    parts: &'a [ReportPart],
}

#[derive(Serialize)]
struct JsonSpan<'a> {
    start: u32,
    end: u32,
    line: u32,
    column: u32,
    label: &'a str,
    primary: bool,
}

fn render_json(report: &Report, _source: &str, filename: &str) -> String {
    let spans = report
        .labels()
        .map(|(span, label, primary)| JsonSpan {
            start: span.start.offset,
            end: span.end.offset,
            line: span.start.line,
            column: span.start.column,
            label,
            primary,
        })
        .collect();
    let diagnostic = JsonDiagnostic {
        code: report.code,
        severity: "error",
        title: report.title,
        message: &report.message,
        file: filename,
        spans,
        parts: &report.parts,
    };
    serde_json::to_string(&diagnostic)
        .unwrap_or_else(|err| format!(r#"{{"code":"{}","error":"{err}"}}"#, report.code))
}
