mod logger;
mod render;

use std::fs;
use std::io::{self, BufRead, IsTerminal, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use ctxforest_core::{
    DerivationTable, ForestConfig, Grammar, emit_dot, load_grammar, parse_text, read_source,
    to_pretty_json,
};
use ctxforest_diagnostics as diag;
use log::{info, warn};

use crate::render::{Format, print_summary, render_diagnostics};

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "ctxforest",
    version,
    about = "Parse text with a context grammar in binary normal form and render the shared parse forest"
)]
struct Cli {
    /// Grammar file.
    #[arg(short = 'g', long, value_name = "FILE")]
    grammar: Option<PathBuf>,

    /// Text to parse.
    #[arg(short = 'i', long, value_name = "TEXT")]
    input: Option<String>,

    /// File holding the text to parse (overrides --input).
    #[arg(short = 'f', long = "input-file", value_name = "FILE")]
    input_file: Option<PathBuf>,

    /// Write the forest to FILE instead of stdout.
    #[arg(short = 'o', long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Text to parse, when --input is not given. Extra values are ignored.
    #[arg(value_name = "TEXT")]
    text: Vec<String>,

    /// What to write: the forest as Graphviz DOT, or the table as JSON.
    #[arg(long, value_enum, default_value_t = Emit::Dot)]
    emit: Emit,

    /// Append `[start,end)` to every forest node label.
    #[arg(long)]
    show_spans: bool,

    /// Name of the emitted digraph.
    #[arg(long, value_name = "NAME", default_value = "ParseTree")]
    graph_name: String,

    /// Grammar diagnostics format. Defaults to "pretty" when stderr is a
    /// TTY, "plain" otherwise.
    #[arg(long, value_parser = ["pretty", "plain", "json"])]
    diagnostic_format: Option<String>,

    /// Explain a diagnostic ID (e.g. CTX1003) and exit.
    #[arg(long, value_name = "ID", exclusive = true)]
    explain: Option<String>,

    /// More log output (repeat for more).
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Output kind selected by `--emit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
    /// Graphviz DOT forest.
    Dot,
    /// JSON dump of the derivation table.
    Json,
}

/// Required configuration that was not supplied.
#[derive(Debug, thiserror::Error)]
enum ConfigError {
    #[error("grammar file not specified (use --grammar <FILE>)")]
    MissingGrammar,
    #[error("unknown diagnostic id '{0}'")]
    UnknownDiagnostic(String),
}

// ── Main ────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(logger::level_for(cli.verbose, cli.quiet));

    if let Some(id) = &cli.explain {
        return cmd_explain(id);
    }
    cmd_parse(&cli)
}

// ── Commands ────────────────────────────────────────────────────────────

fn cmd_explain(id: &str) -> Result<()> {
    let text = diag::explain(id).ok_or_else(|| ConfigError::UnknownDiagnostic(id.to_string()))?;
    let severity = diag::default_severity(id).unwrap_or(diag::Severity::Error);
    println!("{id} ({severity}): {text}");
    Ok(())
}

fn cmd_parse(cli: &Cli) -> Result<()> {
    let extra = ignored_positionals(cli);
    for text in extra {
        warn!("ignoring extra positional argument: {text}");
    }
    if cli.input.is_none() && cli.input_file.is_none() && cli.text.is_empty() {
        warn!("text file not specified, string will be acquired via stdin");
    }
    if cli.output.is_none() {
        warn!("output file not specified, forest will be written to stdout");
    }

    let grammar_path = cli.grammar.as_deref().ok_or(ConfigError::MissingGrammar)?;
    let format = Format::resolve_or_detect(cli.diagnostic_format.as_deref());
    let grammar = load(grammar_path, format)?;

    let text = read_input(cli)?;
    let table = parse_text(&grammar, &text)?;
    info!(
        "derived input of length {} ({} table entries)",
        table.size(),
        table.len()
    );

    write_output(cli.output.as_deref(), &render_output(cli, &table))
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// Positional values that do not become the input text.
fn ignored_positionals(cli: &Cli) -> &[String] {
    if cli.input.is_some() || cli.input_file.is_some() {
        &cli.text
    } else {
        cli.text.get(1..).unwrap_or_default()
    }
}

/// Read and check the grammar, rendering its diagnostics.
fn load(path: &Path, format: Format) -> Result<Grammar> {
    let src = read_source(path)?;
    let filename = path.display().to_string();
    let colored = format == Format::Pretty;
    match load_grammar(&src) {
        Ok((grammar, warnings)) => {
            render_diagnostics(&src, &filename, &warnings, format);
            print_summary(&warnings, colored);
            info!(
                "loaded grammar '{filename}': {} rule(s)",
                grammar.all_rules().len()
            );
            Ok(grammar)
        }
        Err(e) => {
            render_diagnostics(&src, &filename, e.diagnostics(), format);
            print_summary(e.diagnostics(), colored);
            Err(e).with_context(|| format!("cannot use grammar '{filename}'"))
        }
    }
}

/// The text to parse: `--input-file`, then `--input`, then the first
/// positional value, then stdin. File and stdin text is trimmed.
fn read_input(cli: &Cli) -> Result<String> {
    if let Some(path) = &cli.input_file {
        if cli.input.is_some() {
            info!("--input-file overrides --input");
        }
        return Ok(read_source(path)?.trim().to_string());
    }
    if let Some(text) = cli.input.as_ref().or(cli.text.first()) {
        return Ok(text.clone());
    }

    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    if interactive {
        eprint!("> ");
    }
    read_stdin_text(stdin.lock(), interactive).context("failed to read input text from stdin")
}

/// A terminal gives one line; piped input is read to EOF.
fn read_stdin_text(mut reader: impl BufRead, interactive: bool) -> io::Result<String> {
    let mut buf = String::new();
    if interactive {
        reader.read_line(&mut buf)?;
    } else {
        reader.read_to_string(&mut buf)?;
    }
    Ok(buf.trim().to_string())
}

fn render_output(cli: &Cli, table: &DerivationTable) -> String {
    match cli.emit {
        Emit::Dot => {
            let config = ForestConfig {
                graph_name: cli.graph_name.clone(),
                show_spans: cli.show_spans,
            };
            emit_dot(table, &config)
        }
        Emit::Json => {
            let mut json = to_pretty_json(table);
            json.push('\n');
            json
        }
    }
}

fn write_output(path: Option<&Path>, out: &str) -> Result<()> {
    match path {
        Some(path) => fs::write(path, out)
            .with_context(|| format!("failed to write '{}'", path.display())),
        None => {
            print!("{out}");
            Ok(())
        }
    }
}
