//! The context-aware fixpoint over the derivation table.
//!
//! A single pass is a generalized CYK sweep: spans by increasing length,
//! left to right, every rule tried on every span. Side-conditions refer to
//! regions fixed by the whole input (left of, right of, or extending to the
//! current span), which may be longer than the span being filled and so not
//! yet populated in the current pass. Passes are therefore repeated until
//! one of them inserts nothing at an input boundary.

use log::{debug, trace};

use super::table::{DerivationRef, DerivationTable, ParseNode, Span};
use crate::grammar::alphabet::Symbol;
use crate::grammar::ast::{Conjunct, ContextKind, Grammar, Rule};

/// Populate a fresh table for `input` and run the fixpoint to completion.
///
/// The table comes back configured with the grammar's start symbol and
/// alphabet.
pub fn build_derivation(grammar: &Grammar, input: &[Symbol]) -> DerivationTable {
    let mut table = DerivationTable::new(input);
    table.set_start(grammar.start_symbol());
    table.set_alphabet(grammar.alphabet().clone());
    fixpoint(grammar, &mut table);
    table
}

/// Run one context-free pass, then full-rule passes until no boundary
/// insertion happens. Returns the number of full-rule passes.
///
/// Termination: a repeat needs at least one new entry, and there are
/// finitely many `(span, symbol)` pairs.
pub fn fixpoint(grammar: &Grammar, table: &mut DerivationTable) -> usize {
    run_pass(table, grammar.no_context_rules());
    debug!(
        "context-free pass: {} entries over {} positions",
        table.len(),
        table.size()
    );

    let rules = grammar.all_rules();
    let mut rounds = 1;
    while run_pass(table, rules) {
        debug!(
            "round {rounds}: boundary insertion, {} entries; repeating",
            table.len()
        );
        rounds += 1;
    }
    debug!("fixpoint after {rounds} round(s), {} entries", table.len());
    rounds
}

/// One sweep over every span with `rules`.
///
/// Returns true if an entry was inserted on a span touching either end of
/// the input, which is when side-conditions evaluated earlier in the sweep
/// may have missed it.
pub fn run_pass(table: &mut DerivationTable, rules: &[Rule]) -> bool {
    let n = table.size();
    let mut needs_repetition = false;
    for len in 1..=n {
        for i in 0..=(n - len) {
            let span = Span::new(i, i + len);
            for rule in rules {
                // First applicable rule wins: an established entry is final.
                if table.contains(span, rule.origin) {
                    continue;
                }
                let Some(node) = evaluate(table, rule, span) else {
                    continue;
                };
                trace!(
                    "{} derives {span} ({} production(s), {} context(s))",
                    table.alphabet().label(rule.origin),
                    node.productions.len(),
                    node.contexts.len()
                );
                *table.get_or_create(span, rule.origin) = node;
                if i == 0 || i + len == n {
                    needs_repetition = true;
                }
            }
        }
    }
    needs_repetition
}

/// Try `rule` on `span`. Returns the node to insert when every conjunct
/// holds and at least one of them is a production.
fn evaluate(table: &DerivationTable, rule: &Rule, span: Span) -> Option<ParseNode> {
    let mut node = ParseNode::default();
    let mut productions = 0usize;
    for conjunct in &rule.conjuncts {
        if conjunct.kind.is_side_condition() {
            let context = side_condition(table, conjunct, span)?;
            node.contexts.insert(context);
        } else {
            productions += 1;
            node.productions.insert(production(table, conjunct, span)?);
        }
    }
    (productions > 0).then_some(node)
}

/// Match a production conjunct against `span`.
///
/// For two symbols only the smallest valid split is recorded.
fn production(table: &DerivationTable, conjunct: &Conjunct, span: Span) -> Option<Vec<DerivationRef>> {
    match conjunct.symbols.as_slice() {
        &[only] => table
            .contains(span, only)
            .then(|| vec![DerivationRef::new(only, span)]),
        &[left, right] => (span.start + 1..span.end).find_map(|mid| {
            let l = Span::new(span.start, mid);
            let r = Span::new(mid, span.end);
            (table.contains(l, left) && table.contains(r, right))
                .then(|| vec![DerivationRef::new(left, l), DerivationRef::new(right, r)])
        }),
        _ => None,
    }
}

/// The region a side-condition refers to, for a rule tried on `span`.
pub fn condition_span(kind: ContextKind, span: Span, size: usize) -> Option<Span> {
    match kind {
        ContextKind::None => None,
        ContextKind::Left => Some(Span::new(0, span.start)),
        ContextKind::Right => Some(Span::new(span.end, size)),
        ContextKind::LeftExt => Some(Span::new(0, span.end)),
        ContextKind::RightExt => Some(Span::new(span.start, size)),
    }
}

fn side_condition(table: &DerivationTable, conjunct: &Conjunct, span: Span) -> Option<DerivationRef> {
    let &[symbol] = conjunct.symbols.as_slice() else {
        return None;
    };
    let region = condition_span(conjunct.kind, span, table.size())?;
    table
        .contains(region, symbol)
        .then(|| DerivationRef::new(symbol, region))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condition_regions_follow_the_span() {
        let span = Span::new(2, 4);
        assert_eq!(condition_span(ContextKind::Left, span, 6), Some(Span::new(0, 2)));
        assert_eq!(condition_span(ContextKind::Right, span, 6), Some(Span::new(4, 6)));
        assert_eq!(condition_span(ContextKind::LeftExt, span, 6), Some(Span::new(0, 4)));
        assert_eq!(condition_span(ContextKind::RightExt, span, 6), Some(Span::new(2, 6)));
        assert_eq!(condition_span(ContextKind::None, span, 6), None);
    }

    #[test]
    fn regions_at_the_input_edges_are_empty() {
        assert!(condition_span(ContextKind::Left, Span::new(0, 1), 3).is_some_and(Span::is_empty));
        assert!(condition_span(ContextKind::Right, Span::new(2, 3), 3).is_some_and(Span::is_empty));
    }

    #[test]
    fn empty_region_never_satisfies_a_condition() {
        let table = DerivationTable::new(&[Symbol(0), Symbol(1)]);
        let conjunct = Conjunct {
            kind: ContextKind::Left,
            symbols: vec![Symbol(0)],
            span: crate::grammar::diag::Span::new(0, 0),
        };
        assert!(side_condition(&table, &conjunct, Span::new(0, 1)).is_none());
        assert_eq!(
            side_condition(&table, &conjunct, Span::new(1, 2)),
            Some(DerivationRef::new(Symbol(0), Span::new(0, 1)))
        );
    }
}
