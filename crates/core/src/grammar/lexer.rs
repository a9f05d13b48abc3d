/// Classification of a grammar-file token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokKind {
    /// Nonterminal name: `[A-Za-z_][A-Za-z0-9_]*`.
    Ident,
    /// Quoted terminal literal, quotes included. May be unterminated.
    Terminal,
    /// `->`
    Arrow,
    /// `|`
    Pipe,
    /// `&`
    Amp,
    /// `<`
    Left,
    /// `>`
    Right,
    /// `<=`
    LeftExt,
    /// `>=`
    RightExt,
    /// `;`
    Semi,
    /// A line feed (CRLF and CR are normalized).
    Newline,
    /// `%` followed by a directive name.
    Directive,
    /// A character that starts no token.
    Unknown,
}

/// A token that borrows its text directly from the grammar source.
///
/// `text` is always exactly `&input[start..end]`.
#[derive(Debug, Clone, Copy)]
pub struct Token<'a> {
    /// The classification of this token.
    pub kind: TokKind,
    /// Borrowed slice of the source for this token.
    pub text: &'a str,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Tokenize a grammar source. Whitespace and `#` comments are dropped;
/// newlines are kept because they terminate rules.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut toks = Vec::new();
    let mut i = 0usize;
    let b = input.as_bytes();

    let mut push = |kind: TokKind, start: usize, end: usize| {
        toks.push(Token {
            kind,
            text: &input[start..end],
            start,
            end,
        });
    };

    while i < b.len() {
        let start = i;
        let Some(c) = input[i..].chars().next() else {
            break;
        };
        match c {
            '\n' => {
                i += 1;
                push(TokKind::Newline, start, i);
            }
            '\r' => {
                i += if b.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                push(TokKind::Newline, start, i);
            }
            '#' => {
                while i < b.len() && b[i] != b'\n' && b[i] != b'\r' {
                    i += 1;
                }
            }
            c if c.is_whitespace() => {
                i += c.len_utf8();
            }
            '-' if b.get(i + 1) == Some(&b'>') => {
                i += 2;
                push(TokKind::Arrow, start, i);
            }
            '<' | '>' => {
                let ext = b.get(i + 1) == Some(&b'=');
                i += if ext { 2 } else { 1 };
                let kind = match (c, ext) {
                    ('<', false) => TokKind::Left,
                    ('<', true) => TokKind::LeftExt,
                    ('>', false) => TokKind::Right,
                    _ => TokKind::RightExt,
                };
                push(kind, start, i);
            }
            '|' => {
                i += 1;
                push(TokKind::Pipe, start, i);
            }
            '&' => {
                i += 1;
                push(TokKind::Amp, start, i);
            }
            ';' => {
                i += 1;
                push(TokKind::Semi, start, i);
            }
            '\'' | '"' => {
                i = scan_quoted(input, i, c);
                push(TokKind::Terminal, start, i);
            }
            '%' => {
                i += 1;
                while let Some(ch) = input[i..].chars().next() {
                    if !is_ident_continue(ch) {
                        break;
                    }
                    i += ch.len_utf8();
                }
                push(TokKind::Directive, start, i);
            }
            c if is_ident_start(c) => {
                i += 1;
                while let Some(ch) = input[i..].chars().next() {
                    if !is_ident_continue(ch) {
                        break;
                    }
                    i += 1;
                }
                push(TokKind::Ident, start, i);
            }
            other => {
                i += other.len_utf8();
                push(TokKind::Unknown, start, i);
            }
        }
    }
    toks
}

/// Scan a quoted literal starting at `open`; returns the end offset.
///
/// Stops after the closing quote, or before the end of the line when the
/// literal is unterminated. A backslash escapes the next character.
fn scan_quoted(input: &str, open: usize, quote: char) -> usize {
    let mut i = open + 1;
    let mut escaped = false;
    while let Some(ch) = input[i..].chars().next() {
        if ch == '\n' || ch == '\r' {
            return i;
        }
        i += ch.len_utf8();
        if escaped {
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if ch == quote {
            return i;
        }
    }
    i
}
