use super::{
    alphabet::{Alphabet, Symbol},
    ast::{Conjunct, ContextKind, Grammar, Rule},
    diag::{Diagnostic, Span, codes},
    lexer::{TokKind, Token, tokenize},
};

/// Shorthand for building a `BTreeMap<String, String>` context from key-value pairs.
macro_rules! ctx {
    ($($k:expr => $v:expr),+ $(,)?) => {
        std::collections::BTreeMap::from([$(($k.into(), $v.into())),+])
    };
}

/// Result of reading a grammar source.
#[derive(Debug)]
pub struct GrammarParseResult {
    /// The grammar, present only when no error diagnostic was produced.
    pub grammar: Option<Grammar>,
    /// Diagnostics (errors and warnings) produced while reading.
    pub diagnostics: Vec<Diagnostic>,
}

// ─── Public API ─────────────────────────────────────────────────────────────

/// Read a grammar from its textual source.
///
/// Errors are recovered at the next rule terminator, so one call reports
/// every syntax problem in the file.
pub fn parse_grammar(input: &str) -> GrammarParseResult {
    Parser::new(input).parse()
}

// ─── Parser Implementation ─────────────────────────────────────────────────

/// Why a quoted literal was rejected.
enum LiteralError {
    Unterminated,
    NotOneChar(usize),
}

struct Parser<'a> {
    input: &'a str,
    toks: Vec<Token<'a>>,
    pos: usize,
    diags: Vec<Diagnostic>,
    alphabet: Alphabet,
    rules: Vec<Rule>,
    /// Declared `%start` symbol and where it was declared.
    start: Option<(Symbol, Span)>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            toks: tokenize(input),
            pos: 0,
            diags: Vec::new(),
            alphabet: Alphabet::new(),
            rules: Vec::new(),
            start: None,
        }
    }

    // ── Token navigation ────────────────────────────────────────────────

    fn peek(&self) -> Option<Token<'a>> {
        self.toks.get(self.pos).copied()
    }

    fn peek_kind(&self) -> Option<TokKind> {
        self.peek().map(|t| t.kind)
    }

    fn bump(&mut self) -> Option<Token<'a>> {
        let tok = self.peek();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn skip_newlines(&mut self) {
        while self.peek_kind() == Some(TokKind::Newline) {
            self.pos += 1;
        }
    }

    /// Span of the current token, or an empty span at end of input.
    fn here(&self) -> Span {
        match self.peek() {
            Some(t) => Span::new(t.start, t.end),
            None => Span::empty(self.input.len()),
        }
    }

    fn at_terminator(&self) -> bool {
        matches!(
            self.peek_kind(),
            None | Some(TokKind::Newline) | Some(TokKind::Semi)
        )
    }

    /// If the next non-blank line starts with `|`, consume up to and
    /// including the pipe and return true.
    fn continues_with_pipe(&mut self) -> bool {
        let mut j = self.pos;
        while self.toks.get(j).is_some_and(|t| t.kind == TokKind::Newline) {
            j += 1;
        }
        if self.toks.get(j).is_some_and(|t| t.kind == TokKind::Pipe) {
            self.pos = j + 1;
            return true;
        }
        false
    }

    /// Skip the rest of the current rule, including continuation lines.
    fn recover(&mut self) {
        loop {
            while !self.at_terminator() {
                self.pos += 1;
            }
            self.bump();
            if !self.continues_with_pipe() {
                break;
            }
        }
    }

    // ── Diagnostics ─────────────────────────────────────────────────────

    fn report(&mut self, code: &'static str, message: impl Into<String>, span: Span) {
        self.diags
            .push(Diagnostic::from_code(code, message, Some(span)));
    }

    fn unexpected(&mut self, tok: Token<'a>, expected: &str) {
        let span = Span::new(tok.start, tok.end);
        let diag = if tok.kind == TokKind::Unknown {
            Diagnostic::from_code(
                codes::UNEXPECTED_CHARACTER,
                format!("unexpected character {:?}", tok.text),
                Some(span),
            )
        } else {
            Diagnostic::from_code(
                codes::UNEXPECTED_TOKEN,
                format!("unexpected `{}`, expected {expected}", tok.text),
                Some(span),
            )
            .with_context(ctx!("found" => tok.text, "expected" => expected))
        };
        self.diags.push(diag);
    }

    // ── Top level ───────────────────────────────────────────────────────

    fn parse(mut self) -> GrammarParseResult {
        while let Some(tok) = self.peek() {
            match tok.kind {
                TokKind::Newline | TokKind::Semi => self.pos += 1,
                TokKind::Directive => self.parse_directive(tok),
                TokKind::Ident => self.parse_rule(),
                _ => {
                    self.unexpected(tok, "a rule or directive");
                    self.recover();
                }
            }
        }
        self.finish()
    }

    fn finish(mut self) -> GrammarParseResult {
        if self.rules.is_empty() && !ctxforest_diagnostics::has_errors(&self.diags) {
            self.diags.push(Diagnostic::from_code(
                codes::EMPTY_GRAMMAR,
                "grammar defines no rules",
                None,
            ));
        }

        let start = match self.start {
            Some((sym, span)) => {
                if !self.rules.is_empty() && !self.rules.iter().any(|r| r.origin == sym) {
                    let name = self.alphabet.label(sym);
                    self.diags.push(
                        Diagnostic::from_code(
                            codes::UNDEFINED_START,
                            format!("start symbol `{name}` is not the origin of any rule"),
                            Some(span),
                        )
                        .with_context(ctx!("symbol" => name)),
                    );
                }
                Some(sym)
            }
            None => self.rules.first().map(|r| r.origin),
        };

        let grammar = match start {
            Some(start) if !ctxforest_diagnostics::has_errors(&self.diags) => {
                Some(Grammar::new(self.alphabet, self.rules, start))
            }
            _ => None,
        };
        GrammarParseResult {
            grammar,
            diagnostics: self.diags,
        }
    }

    // ── Directives ──────────────────────────────────────────────────────

    fn parse_directive(&mut self, tok: Token<'a>) {
        self.pos += 1;
        let dir_span = Span::new(tok.start, tok.end);
        if tok.text != "%start" {
            self.diags.push(
                Diagnostic::from_code(
                    codes::UNKNOWN_DIRECTIVE,
                    format!("unknown directive `{}`", tok.text),
                    Some(dir_span),
                )
                .with_context(ctx!("directive" => tok.text)),
            );
            self.recover();
            return;
        }

        let Some(name) = self.peek().filter(|t| t.kind == TokKind::Ident) else {
            let here = self.here();
            self.report(
                codes::EXPECTED_SYMBOL,
                "`%start` must name a nonterminal",
                here,
            );
            self.recover();
            return;
        };
        self.pos += 1;
        let span = dir_span.cover(Span::new(name.start, name.end));

        if self.start.is_some() {
            self.report(codes::DUPLICATE_START, "start symbol already declared", span);
        } else {
            let sym = self.alphabet.intern_nonterminal(name.text);
            self.start = Some((sym, span));
        }
        self.expect_terminator();
    }

    fn expect_terminator(&mut self) {
        if self.at_terminator() {
            self.bump();
        } else if let Some(tok) = self.peek() {
            self.unexpected(tok, "end of rule");
            self.recover();
        }
    }

    // ── Rules ───────────────────────────────────────────────────────────

    fn parse_rule(&mut self) {
        let Some(origin_tok) = self.bump() else {
            return;
        };
        if self.peek_kind() != Some(TokKind::Arrow) {
            let here = self.here();
            self.diags.push(
                Diagnostic::from_code(
                    codes::EXPECTED_ARROW,
                    format!("expected `->` after `{}`", origin_tok.text),
                    Some(here),
                )
                .with_context(ctx!("origin" => origin_tok.text)),
            );
            self.recover();
            return;
        }
        self.pos += 1;
        let origin = self.alphabet.intern_nonterminal(origin_tok.text);

        loop {
            self.skip_newlines();
            let Some((conjuncts, span)) = self.parse_alternative() else {
                self.recover();
                return;
            };
            self.rules.push(Rule {
                origin,
                conjuncts,
                span,
            });
            if self.peek_kind() == Some(TokKind::Pipe) {
                self.pos += 1;
                continue;
            }
            if self.continues_with_pipe() {
                continue;
            }
            break;
        }
        self.expect_terminator();
    }

    fn parse_alternative(&mut self) -> Option<(Vec<Conjunct>, Span)> {
        let first = self.parse_conjunct()?;
        let mut span = first.span;
        let mut conjuncts = vec![first];
        while self.peek_kind() == Some(TokKind::Amp) {
            self.pos += 1;
            self.skip_newlines();
            let next = self.parse_conjunct()?;
            span = span.cover(next.span);
            conjuncts.push(next);
        }
        Some((conjuncts, span))
    }

    fn parse_conjunct(&mut self) -> Option<Conjunct> {
        let start = self.here();
        let kind = match self.peek_kind() {
            Some(TokKind::Left) => ContextKind::Left,
            Some(TokKind::Right) => ContextKind::Right,
            Some(TokKind::LeftExt) => ContextKind::LeftExt,
            Some(TokKind::RightExt) => ContextKind::RightExt,
            _ => ContextKind::None,
        };
        if kind.is_side_condition() {
            self.pos += 1;
        }

        let mut symbols = Vec::new();
        let mut span = start;
        let mut ok = true;
        while let Some(tok) = self.peek() {
            let sym = match tok.kind {
                TokKind::Ident => Some(self.alphabet.intern_nonterminal(tok.text)),
                TokKind::Terminal => self.terminal(tok),
                _ => break,
            };
            self.pos += 1;
            span = span.cover(Span::new(tok.start, tok.end));
            match sym {
                Some(sym) => symbols.push(sym),
                None => ok = false,
            }
        }

        if symbols.is_empty() && ok {
            let here = self.here();
            let message = match self.peek() {
                Some(tok) if tok.kind != TokKind::Newline => {
                    format!("expected a symbol, found `{}`", tok.text)
                }
                _ => "expected a symbol before end of rule".to_string(),
            };
            self.report(codes::EXPECTED_SYMBOL, message, here);
            return None;
        }
        ok.then_some(Conjunct {
            kind,
            symbols,
            span,
        })
    }

    /// Decode and intern a terminal literal, reporting malformed ones.
    fn terminal(&mut self, tok: Token<'a>) -> Option<Symbol> {
        let span = Span::new(tok.start, tok.end);
        match decode_literal(tok.text) {
            Ok(ch) => Some(self.alphabet.intern_terminal(ch)),
            Err(LiteralError::Unterminated) => {
                self.report(
                    codes::UNTERMINATED_TERMINAL,
                    "terminal literal is missing its closing quote",
                    span,
                );
                None
            }
            Err(LiteralError::NotOneChar(n)) => {
                self.diags.push(
                    Diagnostic::from_code(
                        codes::INVALID_TERMINAL,
                        format!("terminal literal {} has {n} characters, expected 1", tok.text),
                        Some(span),
                    )
                    .with_context(ctx!("length" => n.to_string())),
                );
                None
            }
        }
    }
}

/// Decode a quoted literal (quotes included) into its single character.
fn decode_literal(text: &str) -> Result<char, LiteralError> {
    let mut chars = text.chars();
    let Some(quote) = chars.next() else {
        return Err(LiteralError::Unterminated);
    };
    let mut body = Vec::new();
    let mut closed = false;
    while let Some(ch) = chars.next() {
        if ch == quote {
            closed = true;
            break;
        }
        if ch == '\\' {
            let Some(esc) = chars.next() else {
                return Err(LiteralError::Unterminated);
            };
            body.push(match esc {
                'n' => '\n',
                't' => '\t',
                'r' => '\r',
                other => other,
            });
        } else {
            body.push(ch);
        }
    }
    if !closed {
        return Err(LiteralError::Unterminated);
    }
    match body.as_slice() {
        [ch] => Ok(*ch),
        other => Err(LiteralError::NotOneChar(other.len())),
    }
}
