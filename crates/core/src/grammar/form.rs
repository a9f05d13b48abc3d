//! Binary-normal-form checks over a parsed grammar.
//!
//! The chart parser only understands productions of one or two symbols and
//! side-conditions naming a single symbol. Anything else is reported here,
//! before a parse run, with the span of the offending conjunct.

use std::collections::BTreeSet;

use super::alphabet::{Symbol, SymbolKind};
use super::ast::Grammar;
use super::diag::{Diagnostic, codes};

/// Check every rule of `grammar`. Errors make the grammar unusable;
/// warnings flag rules or symbols that can never take part in a derivation.
pub(crate) fn check_form(grammar: &Grammar) -> Vec<Diagnostic> {
    let mut diags = Vec::new();
    let alphabet = grammar.alphabet();

    for rule in grammar.all_rules() {
        let origin = alphabet.label(rule.origin);
        for conjunct in &rule.conjuncts {
            let n = conjunct.symbols.len();
            if conjunct.kind.is_side_condition() {
                if n != 1 {
                    diags.push(
                        Diagnostic::from_code(
                            codes::MULTI_SYMBOL_CONTEXT,
                            format!("side-condition of `{origin}` names {n} symbols, expected 1"),
                            Some(conjunct.span),
                        )
                        .with_context(std::collections::BTreeMap::from([
                            ("origin".to_string(), origin.clone()),
                            ("symbols".to_string(), n.to_string()),
                        ])),
                    );
                }
            } else if !(1..=2).contains(&n) {
                diags.push(
                    Diagnostic::from_code(
                        codes::NON_BINARY_PRODUCTION,
                        format!("production of `{origin}` has {n} symbols, expected 1 or 2"),
                        Some(conjunct.span),
                    )
                    .with_context(std::collections::BTreeMap::from([
                        ("origin".to_string(), origin.clone()),
                        ("symbols".to_string(), n.to_string()),
                    ])),
                );
            }
        }
        if rule.productions().next().is_none() {
            diags.push(Diagnostic::from_code(
                codes::CONTEXT_ONLY_RULE,
                format!("rule for `{origin}` has only side-conditions and never applies"),
                Some(rule.span),
            ));
        }
    }

    let defined: BTreeSet<Symbol> = grammar.all_rules().iter().map(|r| r.origin).collect();
    let mut reported = BTreeSet::new();
    for rule in grammar.all_rules() {
        for conjunct in &rule.conjuncts {
            for &sym in &conjunct.symbols {
                let undefined = alphabet.kind(sym) == Some(SymbolKind::Nonterminal)
                    && !defined.contains(&sym);
                if undefined && reported.insert(sym) {
                    diags.push(Diagnostic::from_code(
                        codes::UNDEFINED_NONTERMINAL,
                        format!("nonterminal `{}` is never defined", alphabet.label(sym)),
                        Some(conjunct.span),
                    ));
                }
            }
        }
    }

    diags
}
