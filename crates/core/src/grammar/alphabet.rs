//! Symbols and the alphabet that names them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SymbolResolutionError;

/// A grammar symbol (terminal or nonterminal).
///
/// Symbols are dense ids assigned by the [`Alphabet`] in order of first
/// appearance in the grammar source.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Symbol(pub u32);

impl Symbol {
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Whether a symbol stands for an input character or a nonterminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "char", rename_all = "lowercase")]
pub enum SymbolKind {
    /// A single input character.
    Terminal(char),
    /// A named nonterminal.
    Nonterminal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    name: String,
    kind: SymbolKind,
}

/// Symbol table: id ↔ display name, plus the character → terminal mapping
/// used to convert raw input text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Alphabet {
    entries: Vec<Entry>,
    terminals: BTreeMap<char, Symbol>,
    nonterminals: BTreeMap<String, Symbol>,
}

impl Alphabet {
    /// Create an empty alphabet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the terminal symbol for `ch`, registering it if unseen.
    pub fn intern_terminal(&mut self, ch: char) -> Symbol {
        if let Some(&sym) = self.terminals.get(&ch) {
            return sym;
        }
        let sym = self.push(ch.to_string(), SymbolKind::Terminal(ch));
        self.terminals.insert(ch, sym);
        sym
    }

    /// Return the nonterminal symbol named `name`, registering it if unseen.
    pub fn intern_nonterminal(&mut self, name: &str) -> Symbol {
        if let Some(&sym) = self.nonterminals.get(name) {
            return sym;
        }
        let sym = self.push(name.to_string(), SymbolKind::Nonterminal);
        self.nonterminals.insert(name.to_string(), sym);
        sym
    }

    fn push(&mut self, name: String, kind: SymbolKind) -> Symbol {
        let sym = Symbol(self.entries.len() as u32);
        self.entries.push(Entry { name, kind });
        sym
    }

    /// Look up the terminal for an input character.
    pub fn terminal(&self, ch: char) -> Option<Symbol> {
        self.terminals.get(&ch).copied()
    }

    /// Look up a nonterminal by name.
    pub fn nonterminal(&self, name: &str) -> Option<Symbol> {
        self.nonterminals.get(name).copied()
    }

    /// Display name of a symbol. Unknown ids yield `None`.
    pub fn name(&self, sym: Symbol) -> Option<&str> {
        self.entries.get(sym.index()).map(|e| e.name.as_str())
    }

    /// Display name of a symbol, falling back to `#<id>` for unknown ids.
    pub fn label(&self, sym: Symbol) -> String {
        match self.name(sym) {
            Some(name) => name.to_string(),
            None => sym.to_string(),
        }
    }

    /// Kind of a symbol, if registered.
    pub fn kind(&self, sym: Symbol) -> Option<SymbolKind> {
        self.entries.get(sym.index()).map(|e| e.kind)
    }

    /// Number of registered symbols.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no symbol has been registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Convert raw text into terminal symbols, one per character.
    ///
    /// Fails on the first character that is not a terminal of the grammar.
    /// `position` in the error is the character index, not the byte offset.
    pub fn convert_text(&self, raw: &str) -> Result<Vec<Symbol>, SymbolResolutionError> {
        raw.chars()
            .enumerate()
            .map(|(position, character)| {
                self.terminal(character)
                    .ok_or(SymbolResolutionError {
                        character,
                        position,
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminals_and_nonterminals_share_id_space() {
        let mut a = Alphabet::new();
        let s = a.intern_nonterminal("S");
        let ta = a.intern_terminal('a');
        let na = a.intern_nonterminal("a");
        assert_eq!(s, Symbol(0));
        assert_eq!(ta, Symbol(1));
        assert_eq!(na, Symbol(2));
        assert_eq!(a.intern_terminal('a'), ta);
        assert_eq!(a.len(), 3);
        assert_eq!(a.kind(ta), Some(SymbolKind::Terminal('a')));
        assert_eq!(a.kind(na), Some(SymbolKind::Nonterminal));
    }

    #[test]
    fn label_falls_back_to_id() {
        let mut a = Alphabet::new();
        a.intern_nonterminal("Expr");
        assert_eq!(a.label(Symbol(0)), "Expr");
        assert_eq!(a.label(Symbol(7)), "#7");
    }

    #[test]
    fn convert_text_maps_each_character() {
        let mut a = Alphabet::new();
        let x = a.intern_terminal('x');
        let y = a.intern_terminal('y');
        assert_eq!(a.convert_text("xyx").unwrap(), vec![x, y, x]);
        assert_eq!(a.convert_text("").unwrap(), Vec::<Symbol>::new());
    }

    #[test]
    fn convert_text_reports_first_unknown_character() {
        let mut a = Alphabet::new();
        a.intern_terminal('a');
        let err = a.convert_text("aaza?").unwrap_err();
        assert_eq!(err.character, 'z');
        assert_eq!(err.position, 2);
    }
}
