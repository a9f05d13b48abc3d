//! Shared test helpers for `ctxforest_core` integration tests.

#![allow(unreachable_pub)]

use std::path::PathBuf;

use ctxforest_core::{
    DerivationRef, DerivationTable, Diagnostic, Grammar, Span, Symbol, build_derivation,
    load_grammar,
};

// ─── Grammar helpers ─────────────────────────────────────────────────────────

/// Load a grammar that is expected to be valid.
#[allow(dead_code)]
pub fn grammar(src: &str) -> Grammar {
    match load_grammar(src) {
        Ok((grammar, _)) => grammar,
        Err(e) => panic!("grammar should load: {e}: {:?}", e.diagnostics()),
    }
}

/// Symbol for a nonterminal name or a one-character terminal.
#[allow(dead_code)]
pub fn sym(grammar: &Grammar, name: &str) -> Symbol {
    let alphabet = grammar.alphabet();
    alphabet
        .nonterminal(name)
        .or_else(|| {
            let mut chars = name.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => alphabet.terminal(ch),
                _ => None,
            }
        })
        .unwrap_or_else(|| panic!("symbol {name:?} not in grammar"))
}

/// Shorthand for "`name` derives `[start, end)`".
#[allow(dead_code)]
pub fn dref(grammar: &Grammar, name: &str, start: usize, end: usize) -> DerivationRef {
    DerivationRef::new(sym(grammar, name), Span::new(start, end))
}

// ─── Chart helpers ───────────────────────────────────────────────────────────

/// Run the full fixpoint over `text`, accepted or not.
#[allow(dead_code)]
pub fn chart(grammar: &Grammar, text: &str) -> DerivationTable {
    let input = grammar.convert_text(text).expect("input uses grammar terminals");
    build_derivation(grammar, &input)
}

/// Every entry as a sorted list of refs.
#[allow(dead_code)]
pub fn refs(table: &DerivationTable) -> Vec<DerivationRef> {
    let mut all: Vec<_> = table.entries().map(|(r, _)| r).collect();
    all.sort();
    all
}

// ─── Diagnostic helpers ──────────────────────────────────────────────────────

/// Collect diagnostic ids in order.
#[allow(dead_code)]
pub fn diag_codes(diags: &[Diagnostic]) -> Vec<String> {
    diags.iter().map(|d| d.id.to_string()).collect()
}

/// Find the first diagnostic with the given id.
#[allow(dead_code)]
pub fn find_diag<'a>(diags: &'a [Diagnostic], code: &str) -> &'a Diagnostic {
    diags
        .iter()
        .find(|d| d.id == code)
        .unwrap_or_else(|| panic!("expected diagnostic {code}, got {:?}", diag_codes(diags)))
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

/// Repository-level `samples/` directory.
#[allow(dead_code)]
pub fn samples_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../samples")
}

/// `S -> A B`, `A -> 'a'`, `B -> 'b'`.
#[allow(dead_code)]
pub const AB: &str = "S -> A B\nA -> 'a'\nB -> 'b'\n";

/// `AB` with a left context on `B`.
#[allow(dead_code)]
pub const LEFT_CONTEXT: &str = "S -> A B\nA -> 'a'\nB -> 'b' & <A\n";
