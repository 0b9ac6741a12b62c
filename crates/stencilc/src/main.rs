//! The Stencil command-line tool.
//!
//! Provides the `stencilc` command with the following subcommands:
//!
//! - `stencilc infer <file>` - Infer the data schema a template consumes
//! - `stencilc dump <file> --stage <stage>` - Print one pipeline stage
//!
//! `<file>` may be `-` to read standard input.
//!
//! Options:
//! - `--json` - Output results and diagnostics as JSON (one object per line)
//! - `--no-color` - Disable colorized output
//! - `--timings` - Print per-stage timings to stderr (`infer` only)
//! - `--trace` - Print every solver step and rollback to stderr (`infer` only)

mod input;

use std::path::{Path, PathBuf};
use std::process;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand, ValueEnum};

use stencil_common::path::Path as DataPath;
use stencil_lexer::Lexer;
use stencil_typeck::constraint::{generate, Constraint};
use stencil_typeck::diagnostics::{render_diagnostic, DiagnosticOptions};
use stencil_typeck::solve::{SolveObserver, Solver};
use stencil_typeck::CheckError;

use crate::input::{read_input, Input};

#[derive(Parser)]
#[command(name = "stencilc", version, about = "Schema inference for Stencil templates")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Infer the schema of the data a template consumes
    Infer {
        /// Template file, or `-` for standard input
        file: PathBuf,

        /// Output the schema and diagnostics as JSON instead of human-readable format
        #[arg(long)]
        json: bool,

        /// Disable colorized output
        #[arg(long = "no-color")]
        no_color: bool,

        /// Print how long each stage took
        #[arg(long)]
        timings: bool,

        /// Print every solver step and rollback
        #[arg(long)]
        trace: bool,
    },
    /// Print the output of one pipeline stage
    Dump {
        /// Template file, or `-` for standard input
        file: PathBuf,

        /// The stage to print
        #[arg(long, value_enum, default_value_t = Stage::Statements)]
        stage: Stage,

        /// Output the stage as JSON
        #[arg(long)]
        json: bool,

        /// Disable colorized output
        #[arg(long = "no-color")]
        no_color: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Stage {
    Tokens,
    Chunks,
    Statements,
    Constraints,
}

fn main() {
    let cli = Cli::parse();

    let (result, json) = match cli.command {
        Commands::Infer {
            file,
            json,
            no_color,
            timings,
            trace,
        } => {
            let diag_opts = DiagnosticOptions {
                color: !no_color && !json,
                json,
            };
            (infer(&file, &diag_opts, timings, trace), json)
        }
        Commands::Dump {
            file,
            stage,
            json,
            no_color,
        } => {
            let diag_opts = DiagnosticOptions {
                color: !no_color && !json,
                json,
            };
            (dump(&file, stage, &diag_opts), json)
        }
    };

    if let Err(e) = result {
        if json {
            // In JSON mode, emit the final error as JSON too.
            let msg = serde_json::json!({
                "code": "C0001",
                "severity": "error",
                "message": e,
                "file": "",
                "spans": [],
            });
            eprintln!("{}", msg);
        } else {
            eprintln!("error: {}", e);
        }
        process::exit(1);
    }
}

/// Execute the inference pipeline: read -> parse -> constraints -> solve.
fn infer(file: &Path, diag_opts: &DiagnosticOptions, timings: bool, trace: bool) -> Result<(), String> {
    let input = read_input(file)?;
    let mut clock = Timings::default();

    let statements = clock.time("parse", || stencil_parser::parse(&input.text));
    let statements = statements.map_err(|e| report_error(&input, e.into(), diag_opts))?;

    let constraints = clock.time("constraints", || generate(&statements));

    let mut observer = TraceObserver {
        enabled: trace,
        rollbacks: 0,
    };
    let solution = clock.time("solve", || {
        Solver::with_observer(&mut observer).solve(&constraints)
    });
    let solution = solution.map_err(|e| report_error(&input, e.into(), diag_opts))?;

    if diag_opts.json {
        let lessons: Vec<String> = solution.lessons.iter().map(DataPath::to_string).collect();
        let msg = serde_json::json!({
            "file": input.name,
            "type": solution.ty,
            "display": solution.ty.to_string(),
            "lessons": lessons,
            "steps": solution.steps,
        });
        println!("{}", msg);
    } else {
        println!("{}", solution.ty);
    }

    if trace {
        eprintln!(
            "  solved in {} steps, {} rollback(s)",
            solution.steps, observer.rollbacks
        );
    }
    if timings {
        clock.print();
    }
    Ok(())
}

/// Print one stage of the pipeline for `file`.
fn dump(file: &Path, stage: Stage, diag_opts: &DiagnosticOptions) -> Result<(), String> {
    let input = read_input(file)?;
    let json = diag_opts.json;

    let tokens = Lexer::tokenize(&input.text);
    if stage == Stage::Tokens {
        if json {
            return print_json(&tokens);
        }
        for token in &tokens {
            println!(
                "{:?} {:?} {}:{}..{}:{}",
                token.kind,
                token.lexeme,
                token.span.start.line,
                token.span.start.column,
                token.span.end.line,
                token.span.end.column
            );
        }
        return Ok(());
    }

    let chunks = stencil_parser::chunk(tokens)
        .map_err(|e| report_error(&input, e.into(), diag_opts))?;
    if stage == Stage::Chunks {
        if json {
            return print_json(&chunks.chunks);
        }
        for chunk in &chunks.chunks {
            println!("{:?}", chunk);
        }
        return Ok(());
    }

    let statements = stencil_parser::parse_statements(chunks.chunks, chunks.end)
        .map_err(|e| report_error(&input, e.into(), diag_opts))?;
    if stage == Stage::Statements {
        if json {
            return print_json(&statements);
        }
        print!("{}", stencil_parser::debug_tree(&statements));
        return Ok(());
    }

    let constraints = generate(&statements);
    if json {
        return print_json(&constraints);
    }
    for constraint in &constraints {
        println!("{}", constraint);
    }
    Ok(())
}

/// Print a diagnostic for `error` to stderr and return the summary the
/// caller exits with.
fn report_error(input: &Input, error: CheckError, diag_opts: &DiagnosticOptions) -> String {
    let rendered = render_diagnostic(&error, &input.text, &input.name, diag_opts);
    if diag_opts.json {
        eprintln!("{}", rendered);
    } else {
        eprint!("{}", rendered);
    }
    format!("Could not infer a schema for '{}'.", input.name)
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string(value).map_err(|e| format!("Failed to encode JSON: {}", e))?;
    println!("{}", text);
    Ok(())
}

// ── Instrumentation ────────────────────────────────────────────────────

/// Wall-clock time per stage, in the order the stages ran.
#[derive(Default)]
struct Timings {
    stages: Vec<(&'static str, Duration)>,
}

impl Timings {
    fn time<T>(&mut self, stage: &'static str, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let value = f();
        self.stages.push((stage, start.elapsed()));
        value
    }

    fn print(&self) {
        let total: Duration = self.stages.iter().map(|(_, d)| *d).sum();
        for (stage, duration) in &self.stages {
            eprintln!("  {:<12} {:>10.3}ms", stage, duration.as_secs_f64() * 1000.0);
        }
        eprintln!("  {:<12} {:>10.3}ms", "total", total.as_secs_f64() * 1000.0);
    }
}

/// Prints solver progress to stderr when enabled.
struct TraceObserver {
    enabled: bool,
    rollbacks: usize,
}

impl SolveObserver for TraceObserver {
    fn on_step(&mut self, index: usize, constraint: &Constraint) {
        if self.enabled {
            eprintln!("  step {:>4}: {}", index, constraint);
        }
    }

    fn on_rollback(&mut self, lesson: &DataPath, index: usize, resume_at: usize) {
        self.rollbacks += 1;
        if self.enabled {
            eprintln!(
                "  rollback at {}: `{}` is a list, resuming at {}",
                index, lesson, resume_at
            );
        }
    }
}
