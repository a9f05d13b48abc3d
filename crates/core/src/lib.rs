//! ctxforest core library.
//!
//! Reads context grammars in binary normal form, runs the context-aware
//! chart parser over an input, and renders the resulting shared parse
//! forest. The main entry points are [`load_grammar`] for grammars,
//! [`parse_text`] for parsing, and [`emit_dot`] / [`to_pretty_json`] for
//! output.

#![warn(missing_docs)]

/// Derivation table, fixpoint engine, and forest serializers.
pub mod chart;
/// Typed errors of the pipeline.
pub mod error;
/// Grammar model, grammar-file reader, and form checks.
pub mod grammar;

use std::fs;
use std::path::Path;

use log::debug;

// ── Convenience re-exports ──────────────────────────────────────────────────

// Grammar
pub use grammar::alphabet::{Alphabet, Symbol, SymbolKind};
pub use grammar::ast::{Conjunct, ContextKind, Grammar, Rule};
pub use grammar::parser::{GrammarParseResult, parse_grammar};

// Chart
pub use chart::engine::{build_derivation, fixpoint, run_pass};
pub use chart::table::{DerivationRef, DerivationTable, ParseNode, Span};

// Output
pub use chart::dump::to_pretty_json;
pub use chart::forest::{ForestConfig, emit_dot};

// Errors and diagnostics
pub use error::{Error, SymbolResolutionError};
pub use grammar::diag::{Diagnostic, Severity, codes};

// ── Pipeline ────────────────────────────────────────────────────────────────

/// Read a grammar or input file.
pub fn read_source(path: impl AsRef<Path>) -> Result<String, Error> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|source| Error::File {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a grammar and check that it is in binary normal form.
///
/// On success, returns the grammar with any warnings (reader and form
/// checks combined). Error diagnostics are returned inside the error.
pub fn load_grammar(src: &str) -> Result<(Grammar, Vec<Diagnostic>), Error> {
    let GrammarParseResult {
        grammar,
        diagnostics,
    } = parse_grammar(src);
    let Some(grammar) = grammar else {
        return Err(Error::GrammarSyntax { diagnostics });
    };

    let mut all = diagnostics;
    all.extend(grammar.form_diagnostics());
    if ctxforest_diagnostics::has_errors(&all) {
        return Err(Error::GrammarForm { diagnostics: all });
    }
    debug!(
        "grammar: {} rule(s), {} context-free, {} symbol(s)",
        grammar.all_rules().len(),
        grammar.no_context_rules().len(),
        grammar.alphabet().len()
    );
    Ok((grammar, all))
}

/// Parse a symbol sequence, failing when the start symbol does not derive it.
pub fn parse_symbols(grammar: &Grammar, input: &[Symbol]) -> Result<DerivationTable, Error> {
    let table = build_derivation(grammar, input);
    if !table.derives_input() {
        return Err(Error::NoDerivation {
            start: grammar.alphabet().label(grammar.start_symbol()),
            len: input.len(),
        });
    }
    Ok(table)
}

/// Convert `raw` to symbols and parse it.
pub fn parse_text(grammar: &Grammar, raw: &str) -> Result<DerivationTable, Error> {
    let input = grammar.convert_text(raw)?;
    parse_symbols(grammar, &input)
}
