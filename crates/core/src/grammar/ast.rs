use serde::{Deserialize, Serialize};

use super::alphabet::{Alphabet, Symbol};
use super::diag::{Diagnostic, Span};
use crate::error::SymbolResolutionError;

/// How a conjunct constrains the span a rule is evaluated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextKind {
    /// A production component: the symbols derive the span itself.
    None,
    /// The symbol derives everything left of the span, `(0, i)`.
    Left,
    /// The symbol derives everything right of the span, `(j, n)`.
    Right,
    /// The symbol derives the input up to the end of the span, `(0, j)`.
    LeftExt,
    /// The symbol derives the input from the start of the span, `(i, n)`.
    RightExt,
}

impl ContextKind {
    /// True for the four side-condition kinds.
    pub fn is_side_condition(self) -> bool {
        !matches!(self, ContextKind::None)
    }

    /// Grammar-file prefix for this kind (empty for productions).
    pub fn prefix(self) -> &'static str {
        match self {
            ContextKind::None => "",
            ContextKind::Left => "<",
            ContextKind::Right => ">",
            ContextKind::LeftExt => "<=",
            ContextKind::RightExt => ">=",
        }
    }
}

/// One `&`-separated item of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conjunct {
    /// Production component or side-condition.
    pub kind: ContextKind,
    /// Symbols of the conjunct, in order.
    pub symbols: Vec<Symbol>,
    /// Source span of the conjunct in the grammar file.
    pub span: Span,
}

/// A grammar rule: `origin -> conjunct & conjunct & ...`.
///
/// Alternatives written with `|` in the grammar file become separate rules,
/// kept in source order (rule order matters to the chart parser).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// The nonterminal this rule derives.
    pub origin: Symbol,
    /// Conjuncts, in source order.
    pub conjuncts: Vec<Conjunct>,
    /// Source span of the alternative in the grammar file.
    pub span: Span,
}

impl Rule {
    /// True if no conjunct is a side-condition.
    pub fn is_context_free(&self) -> bool {
        self.conjuncts.iter().all(|c| !c.kind.is_side_condition())
    }

    /// Production conjuncts only.
    pub fn productions(&self) -> impl Iterator<Item = &Conjunct> {
        self.conjuncts.iter().filter(|c| !c.kind.is_side_condition())
    }
}

/// A complete context grammar with its alphabet and start symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    alphabet: Alphabet,
    rules: Vec<Rule>,
    context_free: Vec<Rule>,
    start: Symbol,
}

impl Grammar {
    /// Assemble a grammar. `rules` keep their order.
    pub fn new(alphabet: Alphabet, rules: Vec<Rule>, start: Symbol) -> Self {
        let context_free = rules
            .iter()
            .filter(|r| r.is_context_free())
            .cloned()
            .collect();
        Self {
            alphabet,
            rules,
            context_free,
            start,
        }
    }

    /// Rules without side-conditions, in declaration order.
    pub fn no_context_rules(&self) -> &[Rule] {
        &self.context_free
    }

    /// Every rule, in declaration order.
    pub fn all_rules(&self) -> &[Rule] {
        &self.rules
    }

    /// True when every production has one or two symbols and every
    /// side-condition names exactly one symbol.
    pub fn is_binary_normal_form(&self) -> bool {
        !ctxforest_diagnostics::has_errors(&self.form_diagnostics())
    }

    /// Form violations (errors) and never-applicable rules (warnings).
    pub fn form_diagnostics(&self) -> Vec<Diagnostic> {
        super::form::check_form(self)
    }

    /// The symbol table.
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// The start symbol.
    pub fn start_symbol(&self) -> Symbol {
        self.start
    }

    /// Convert raw input text into terminal symbols.
    pub fn convert_text(&self, raw: &str) -> Result<Vec<Symbol>, SymbolResolutionError> {
        self.alphabet.convert_text(raw)
    }

    /// Render a rule back into grammar-file syntax.
    pub fn display_rule(&self, rule: &Rule) -> String {
        let body: Vec<String> = rule
            .conjuncts
            .iter()
            .map(|c| {
                let symbols: Vec<String> = c
                    .symbols
                    .iter()
                    .map(|&s| self.display_symbol(s))
                    .collect();
                format!("{}{}", c.kind.prefix(), symbols.join(" "))
            })
            .collect();
        format!(
            "{} -> {}",
            self.alphabet.label(rule.origin),
            body.join(" & ")
        )
    }

    fn display_symbol(&self, sym: Symbol) -> String {
        match self.alphabet.kind(sym) {
            Some(super::alphabet::SymbolKind::Terminal(ch)) => format!("{ch:?}"),
            _ => self.alphabet.label(sym),
        }
    }
}
