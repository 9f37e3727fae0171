//! oxide-tsql CLI
//!
//! Command-line tool for parsing T-SQL scripts and reporting syntax errors.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{Level, debug, info};
use tracing_subscriber::FmtSubscriber;

use oxide_tsql_core::ast::{ParamDecl, SyntaxNode};
use oxide_tsql_core::lexer::Span;
use oxide_tsql_core::{Batch, Error, Stmt, parse_expression, parse_script, split_batches};

/// Format-preserving T-SQL parser.
#[derive(Parser)]
#[command(name = "oxide-tsql")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output (same as `--log-level debug`).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log level: error, warn, info, debug or trace.
    #[arg(long, env = "OXIDE_TSQL_LOG", default_value = "warn", global = true)]
    log_level: Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse files and print what they contain.
    Parse {
        /// Files to parse (`-` reads standard input).
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Parse each file as one expression instead of a script.
        #[arg(short, long)]
        expression: bool,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Check that files parse, printing only errors.
    Check {
        /// Files to check (`-` reads standard input).
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// One line per statement: position, kind and object name.
    Text,
    /// A JSON summary per file.
    Json,
    /// Statements with comments removed and whitespace collapsed.
    Clean,
}

#[derive(Debug, Serialize)]
struct FileReport {
    file: String,
    batches: Vec<BatchReport>,
}

impl FileReport {
    fn has_errors(&self) -> bool {
        self.batches.iter().any(|b| b.error.is_some())
    }
}

#[derive(Debug, Serialize)]
struct BatchReport {
    line: usize,
    statements: Vec<StatementSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorSummary>,
}

#[derive(Debug, Serialize)]
struct StatementSummary {
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    object: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    params: Vec<String>,
    span: Location,
    #[serde(skip)]
    clean: String,
}

#[derive(Debug, Serialize)]
struct ErrorSummary {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<Location>,
}

/// A span in file coordinates.
#[derive(Debug, Clone, Copy, Serialize)]
struct Location {
    start: usize,
    end: usize,
    line: usize,
}

impl Location {
    fn new(batch: &Batch<'_>, span: Span) -> Self {
        let line = batch.line
            + batch
                .text
                .get(..span.start)
                .map_or(0, |before| before.matches('\n').count());
        Self {
            start: batch.offset + span.start,
            end: batch.offset + span.end,
            line,
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        cli.log_level
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut failed = false;
    match cli.command {
        Commands::Parse {
            files,
            expression,
            format,
        } => {
            let mut reports = Vec::with_capacity(files.len());
            for path in &files {
                let text = read_input(path)?;
                let report = if expression {
                    analyze_expression(path, &text)
                } else {
                    analyze_script(path, &text)
                };
                failed |= report.has_errors();
                if format != Format::Json {
                    print_report(&report, format);
                }
                reports.push(report);
            }
            if format == Format::Json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            }
        }

        Commands::Check { files } => {
            for path in &files {
                let text = read_input(path)?;
                let report = analyze_script(path, &text);
                print_errors(&report);
                if report.has_errors() {
                    failed = true;
                } else {
                    let count: usize = report.batches.iter().map(|b| b.statements.len()).sum();
                    info!(file = %report.file, statements = count, "ok");
                }
            }
        }
    }

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read standard input")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn analyze_script(path: &Path, text: &str) -> FileReport {
    let batches = split_batches(text);
    debug!(file = %path.display(), batches = batches.len(), "parsing script");
    let batches = batches
        .iter()
        .map(|batch| match parse_script(batch.text) {
            Ok(list) => BatchReport {
                line: batch.line,
                statements: list.iter().map(|stmt| summarize(batch, stmt)).collect(),
                error: None,
            },
            Err(err) => BatchReport {
                line: batch.line,
                statements: Vec::new(),
                error: Some(error_summary(batch, &err)),
            },
        })
        .collect();
    FileReport {
        file: path.display().to_string(),
        batches,
    }
}

fn analyze_expression(path: &Path, text: &str) -> FileReport {
    let batch = Batch {
        text,
        offset: 0,
        line: 1,
    };
    let report = match parse_expression(text) {
        Ok(expr) => BatchReport {
            line: 1,
            statements: vec![StatementSummary {
                kind: expr.kind_name(),
                object: None,
                params: Vec::new(),
                span: Location::new(&batch, expr.span()),
                clean: expr.to_clean_string(),
            }],
            error: None,
        },
        Err(err) => BatchReport {
            line: 1,
            statements: Vec::new(),
            error: Some(error_summary(&batch, &err)),
        },
    };
    FileReport {
        file: path.display().to_string(),
        batches: vec![report],
    }
}

fn summarize(batch: &Batch<'_>, stmt: &Stmt) -> StatementSummary {
    StatementSummary {
        kind: stmt.kind_name(),
        object: stmt.object_name(),
        params: routine_params(stmt)
            .iter()
            .map(|param| param.name().text().to_string())
            .collect(),
        span: Location::new(batch, stmt.span()),
        clean: stmt.to_clean_string(),
    }
}

fn routine_params(stmt: &Stmt) -> &[std::rc::Rc<ParamDecl>] {
    match stmt {
        Stmt::CreateProcedure(proc) => proc.params(),
        Stmt::CreateScalarFunction(func) => func.signature().params(),
        Stmt::CreateInlineFunction(func) => func.signature().params(),
        Stmt::CreateTableFunction(func) => func.signature().params(),
        _ => &[],
    }
}

fn error_summary(batch: &Batch<'_>, err: &Error) -> ErrorSummary {
    match err.as_syntax() {
        Some(syntax) => ErrorSummary {
            message: err.to_string(),
            location: Some(Location::new(batch, syntax.span)),
        },
        None => ErrorSummary {
            message: err.to_string(),
            location: None,
        },
    }
}

fn print_report(report: &FileReport, format: Format) {
    for batch in &report.batches {
        for stmt in &batch.statements {
            match format {
                Format::Clean => println!("{}", stmt.clean),
                _ => match &stmt.object {
                    Some(object) => {
                        println!("{}:{}: {} {}", report.file, stmt.span.line, stmt.kind, object);
                    }
                    None => println!("{}:{}: {}", report.file, stmt.span.line, stmt.kind),
                },
            }
        }
    }
    print_errors(report);
}

fn print_errors(report: &FileReport) {
    for batch in &report.batches {
        if let Some(error) = &batch.error {
            let line = error.location.map_or(batch.line, |l| l.line);
            eprintln!("{}:{}: error: {}", report.file, line, error.message);
        }
    }
}
