use serde::Serialize;

use super::table::{DerivationRef, DerivationTable, ParseNode, Span};
use crate::grammar::alphabet::Symbol;

/// Serializable view of a whole table, labels resolved through its alphabet.
#[derive(Debug, Serialize)]
pub struct TableDump<'a> {
    /// Input length.
    pub size: usize,
    /// Start symbol and its label.
    pub start: LabeledSymbol,
    /// Whether the start symbol derives the whole input.
    pub accepted: bool,
    /// Every entry in table order.
    pub entries: Vec<EntryDump<'a>>,
}

/// A symbol with its display label.
#[derive(Debug, Serialize)]
pub struct LabeledSymbol {
    /// Symbol id.
    pub id: Symbol,
    /// Display label.
    pub label: String,
}

/// One chart entry.
#[derive(Debug, Serialize)]
pub struct EntryDump<'a> {
    /// Derived span.
    pub span: Span,
    /// Deriving symbol.
    pub symbol: LabeledSymbol,
    /// Side-conditions recorded for the entry.
    pub contexts: Vec<DerivationRef>,
    /// Alternative decompositions.
    pub productions: Vec<&'a [DerivationRef]>,
}

impl<'a> TableDump<'a> {
    /// Build the view of `table`.
    pub fn new(table: &'a DerivationTable) -> Self {
        let label = |id: Symbol| LabeledSymbol {
            id,
            label: table.alphabet().label(id),
        };
        let entries = table
            .entries()
            .map(|(r, node): (DerivationRef, &'a ParseNode)| EntryDump {
                span: r.span,
                symbol: label(r.symbol),
                contexts: node.contexts.iter().copied().collect(),
                productions: node.productions.iter().map(Vec::as_slice).collect(),
            })
            .collect();
        Self {
            size: table.size(),
            start: label(table.start()),
            accepted: table.derives_input(),
            entries,
        }
    }
}

/// Serialize a table to a pretty-printed JSON string.
pub fn to_pretty_json(table: &DerivationTable) -> String {
    serde_json::to_string_pretty(&TableDump::new(table)).expect("TableDump serialization cannot fail")
}
