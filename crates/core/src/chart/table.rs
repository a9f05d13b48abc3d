use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::grammar::alphabet::{Alphabet, Symbol};

/// A half-open region `[start, end)` of input positions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Span {
    /// First position covered.
    pub start: usize,
    /// One past the last position covered.
    pub end: usize,
}

impl Span {
    /// Create a span. Empty spans are allowed as query keys.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of positions covered.
    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// True if the span covers no position.
    pub fn is_empty(self) -> bool {
        self.end <= self.start
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{})", self.start, self.end)
    }
}

/// Identity of one chart entry: "`symbol` derives `span`".
///
/// A plain value used as a key into the table; nodes refer to each other
/// only through these.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct DerivationRef {
    /// The deriving symbol.
    pub symbol: Symbol,
    /// The derived region.
    pub span: Span,
}

impl DerivationRef {
    /// Create a reference.
    pub fn new(symbol: Symbol, span: Span) -> Self {
        Self { symbol, span }
    }
}

/// Everything known about one chart entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseNode {
    /// Side-conditions that held when the entry was established.
    pub contexts: BTreeSet<DerivationRef>,
    /// Alternative decompositions, each one or two child refs.
    pub productions: BTreeSet<Vec<DerivationRef>>,
}

impl ParseNode {
    /// True for the seeded input symbols, which have no decomposition.
    pub fn is_leaf(&self) -> bool {
        self.productions.is_empty()
    }
}

/// The chart: for every span, the symbols known to derive it.
///
/// Cells are stored in a triangular vector, one per span `(start, end)` with
/// `start < end <= size`. Entries are only ever added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivationTable {
    size: usize,
    cells: Vec<BTreeMap<Symbol, ParseNode>>,
    start: Symbol,
    alphabet: Alphabet,
}

impl DerivationTable {
    /// Create a table for `input`, seeding each unit span with its terminal.
    pub fn new(input: &[Symbol]) -> Self {
        let size = input.len();
        let mut cells = vec![BTreeMap::new(); size * (size + 1) / 2];
        for (i, &sym) in input.iter().enumerate() {
            cells[cell_index(Span::new(i, i + 1))].insert(sym, ParseNode::default());
        }
        Self {
            size,
            cells,
            start: Symbol::default(),
            alphabet: Alphabet::default(),
        }
    }

    /// Input length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Set the symbol the forest is rooted at.
    pub fn set_start(&mut self, start: Symbol) {
        self.start = start;
    }

    /// The configured start symbol.
    pub fn start(&self) -> Symbol {
        self.start
    }

    /// Set the alphabet used for labels.
    pub fn set_alphabet(&mut self, alphabet: Alphabet) {
        self.alphabet = alphabet;
    }

    /// The configured alphabet.
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// The span covering the whole input.
    pub fn full_span(&self) -> Span {
        Span::new(0, self.size)
    }

    fn check(&self, span: Span) {
        assert!(
            span.start <= span.end && span.end <= self.size,
            "span {span} out of range for input of length {}",
            self.size
        );
    }

    /// Look up an entry without creating it.
    ///
    /// Empty spans never hold entries. Panics if `span` reaches past the input.
    pub fn try_get(&self, span: Span, symbol: Symbol) -> Option<&ParseNode> {
        self.check(span);
        if span.is_empty() {
            return None;
        }
        self.cells[cell_index(span)].get(&symbol)
    }

    /// True if `symbol` is known to derive `span`.
    pub fn contains(&self, span: Span, symbol: Symbol) -> bool {
        self.try_get(span, symbol).is_some()
    }

    /// Look up an entry, inserting an empty node if absent.
    ///
    /// Panics if `span` is empty or reaches past the input.
    pub fn get_or_create(&mut self, span: Span, symbol: Symbol) -> &mut ParseNode {
        self.check(span);
        assert!(!span.is_empty(), "cannot derive the empty span {span}");
        self.cells[cell_index(span)].entry(symbol).or_default()
    }

    /// The symbols deriving `span`, in symbol order.
    pub fn cell(&self, span: Span) -> impl Iterator<Item = (Symbol, &ParseNode)> {
        self.check(span);
        let cell = if span.is_empty() {
            None
        } else {
            self.cells.get(cell_index(span))
        };
        cell.into_iter().flat_map(|c| c.iter().map(|(&s, n)| (s, n)))
    }

    /// Every entry, by span end, then span start, then symbol.
    pub fn entries(&self) -> impl Iterator<Item = (DerivationRef, &ParseNode)> {
        (1..=self.size).flat_map(move |end| {
            (0..end).flat_map(move |start| {
                let span = Span::new(start, end);
                self.cells[cell_index(span)]
                    .iter()
                    .map(move |(&symbol, node)| (DerivationRef::new(symbol, span), node))
            })
        })
    }

    /// Number of entries in the table.
    pub fn len(&self) -> usize {
        self.cells.iter().map(BTreeMap::len).sum()
    }

    /// True if the table holds no entry (only for empty input).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if the start symbol derives the whole input.
    pub fn derives_input(&self) -> bool {
        self.size > 0 && self.contains(self.full_span(), self.start)
    }
}

/// Triangular index of a non-empty span: spans ending at `e` occupy
/// `e(e-1)/2 .. e(e+1)/2`.
fn cell_index(span: Span) -> usize {
    span.end * (span.end - 1) / 2 + span.start
}
