//! Grammar-file reader and form checks.

mod common;

use common::{diag_codes, find_diag, grammar, sym};
use ctxforest_core::grammar::diag::Span;
use ctxforest_core::{
    ContextKind, Error, Severity, Symbol, SymbolKind, codes, load_grammar, parse_grammar,
};

// ─── Reading ─────────────────────────────────────────────────────────────────

#[test]
fn symbols_are_numbered_by_first_appearance() {
    let g = grammar(common::AB);
    let names: Vec<String> = (0..g.alphabet().len())
        .map(|i| g.alphabet().label(Symbol(i as u32)))
        .collect();
    assert_eq!(names, ["S", "A", "B", "a", "b"]);
    assert_eq!(g.alphabet().kind(sym(&g, "a")), Some(SymbolKind::Terminal('a')));
    assert_eq!(g.alphabet().kind(sym(&g, "A")), Some(SymbolKind::Nonterminal));
}

#[test]
fn first_rule_origin_is_default_start() {
    let g = grammar("T -> 'x'\nS -> T T\n");
    assert_eq!(g.start_symbol(), sym(&g, "T"));
}

#[test]
fn start_directive_overrides_default() {
    let g = grammar("%start S\nT -> 'x'\nS -> T T\n");
    assert_eq!(g.start_symbol(), sym(&g, "S"));
}

#[test]
fn alternatives_become_rules_in_source_order() {
    let g = grammar("S -> 'a'\n   | 'b' S\n\nS -> 'c' | 'd'\n");
    let shown: Vec<String> = g.all_rules().iter().map(|r| g.display_rule(r)).collect();
    assert_eq!(shown, ["S -> 'a'", "S -> 'b' S", "S -> 'c'", "S -> 'd'"]);
}

#[test]
fn semicolons_terminate_rules() {
    let g = grammar("S -> A B; A -> 'a'; B -> 'b'");
    assert_eq!(g.all_rules().len(), 3);
}

#[test]
fn rules_may_span_lines_after_operators() {
    let g = grammar("S -> A B &\n  <A\nA -> 'a'\nB ->\n  'b'\n");
    assert_eq!(g.all_rules().len(), 3);
    assert_eq!(g.all_rules()[0].conjuncts.len(), 2);
}

#[test]
fn context_kinds_are_read_and_printed_back() {
    let src = "S -> A B & <L & <=M & >R & >=Q | 'a'";
    let res = parse_grammar(src);
    let g = res.grammar.expect("syntax is valid");
    let rules = g.all_rules();
    let kinds: Vec<ContextKind> = rules[0].conjuncts.iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        [
            ContextKind::None,
            ContextKind::Left,
            ContextKind::LeftExt,
            ContextKind::Right,
            ContextKind::RightExt,
        ]
    );
    assert_eq!(g.display_rule(&rules[0]), "S -> A B & <L & <=M & >R & >=Q");
    assert_eq!(g.display_rule(&rules[1]), "S -> 'a'");
}

#[test]
fn context_free_rules_are_split_out() {
    let g = grammar(common::LEFT_CONTEXT);
    assert_eq!(g.all_rules().len(), 3);
    let cf: Vec<String> = g.no_context_rules().iter().map(|r| g.display_rule(r)).collect();
    assert_eq!(cf, ["S -> A B", "A -> 'a'"]);
}

#[test]
fn escaped_terminals_decode() {
    let g = grammar(r"S -> Q N; Q -> '\''; N -> '\n'");
    assert!(g.alphabet().terminal('\'').is_some());
    assert!(g.alphabet().terminal('\n').is_some());
}

#[test]
fn comments_are_ignored() {
    let g = grammar("# header\nS -> 'a' # trailing\n# footer\n");
    assert_eq!(g.all_rules().len(), 1);
}

// ─── Syntax errors ───────────────────────────────────────────────────────────

#[test]
fn missing_arrow_is_reported() {
    let res = parse_grammar("S 'a'\n");
    assert!(res.grammar.is_none());
    assert_eq!(diag_codes(&res.diagnostics), [codes::EXPECTED_ARROW]);
}

#[test]
fn unterminated_terminal_is_reported() {
    let res = parse_grammar("S -> 'a\n");
    find_diag(&res.diagnostics, codes::UNTERMINATED_TERMINAL);
    assert!(res.grammar.is_none());
}

#[test]
fn multi_character_terminal_is_reported_with_span() {
    let res = parse_grammar("S -> 'ab'");
    let d = find_diag(&res.diagnostics, codes::INVALID_TERMINAL);
    assert_eq!(d.span, Some(Span::new(5, 9)));
    assert_eq!(d.severity, Severity::Error);
}

#[test]
fn stray_character_is_reported() {
    let res = parse_grammar("S -> A @\nA -> 'a'\n");
    find_diag(&res.diagnostics, codes::UNEXPECTED_CHARACTER);
}

#[test]
fn dangling_operator_expects_symbol() {
    let res = parse_grammar("A -> 'a'\nS -> A &\n");
    find_diag(&res.diagnostics, codes::EXPECTED_SYMBOL);
}

#[test]
fn unknown_directive_is_reported() {
    let res = parse_grammar("%begin S\nS -> 'a'\n");
    find_diag(&res.diagnostics, codes::UNKNOWN_DIRECTIVE);
}

#[test]
fn duplicate_start_is_reported() {
    let res = parse_grammar("%start S\n%start S\nS -> 'a'\n");
    find_diag(&res.diagnostics, codes::DUPLICATE_START);
    assert!(res.grammar.is_none());
}

#[test]
fn undefined_start_is_reported() {
    let res = parse_grammar("%start X\nS -> 'a'\n");
    let d = find_diag(&res.diagnostics, codes::UNDEFINED_START);
    assert_eq!(d.context.as_ref().and_then(|c| c.get("symbol")).map(String::as_str), Some("X"));
}

#[test]
fn empty_grammar_is_reported() {
    let res = parse_grammar("# nothing here\n\n");
    assert_eq!(diag_codes(&res.diagnostics), [codes::EMPTY_GRAMMAR]);
    assert!(res.grammar.is_none());
}

#[test]
fn recovery_reports_every_broken_rule() {
    let res = parse_grammar("S 'a'\nT -> 'ab'\nU -> 'u'\n");
    assert_eq!(
        diag_codes(&res.diagnostics),
        [codes::EXPECTED_ARROW, codes::INVALID_TERMINAL]
    );
}

#[test]
fn recovery_skips_continuation_lines() {
    let res = parse_grammar("S 'a'\n  | 'b' 'c'\nT -> 'x'\n");
    assert_eq!(diag_codes(&res.diagnostics), [codes::EXPECTED_ARROW]);
}

// ─── Form checks ─────────────────────────────────────────────────────────────

#[test]
fn long_production_is_not_binary() {
    let err = load_grammar("S -> A B A\nA -> 'a'\nB -> 'b'\n").unwrap_err();
    assert!(matches!(err, Error::GrammarForm { .. }));
    let d = find_diag(err.diagnostics(), codes::NON_BINARY_PRODUCTION);
    assert_eq!(d.context.as_ref().and_then(|c| c.get("symbols")).map(String::as_str), Some("3"));
}

#[test]
fn multi_symbol_context_is_rejected() {
    let err = load_grammar("S -> 'a' & <A B\nA -> 'a'\nB -> 'b'\n").unwrap_err();
    find_diag(err.diagnostics(), codes::MULTI_SYMBOL_CONTEXT);
}

#[test]
fn syntax_errors_surface_as_grammar_syntax() {
    let err = load_grammar("S -> 'ab'").unwrap_err();
    assert!(matches!(err, Error::GrammarSyntax { .. }));
    assert!(err.to_string().contains("1 syntax error"));
}

#[test]
fn undefined_nonterminal_is_a_warning_once() {
    let (g, warnings) = load_grammar("S -> A B | B A\nA -> 'a'\n").expect("warnings only");
    assert!(g.is_binary_normal_form());
    assert_eq!(diag_codes(&warnings), [codes::UNDEFINED_NONTERMINAL]);
    assert_eq!(warnings[0].severity, Severity::Warn);
}

#[test]
fn context_only_rule_is_a_warning() {
    let (_, warnings) = load_grammar("S -> 'a'\nT -> <S\n").expect("warnings only");
    find_diag(&warnings, codes::CONTEXT_ONLY_RULE);
}

#[test]
fn clean_grammar_has_no_diagnostics() {
    let (g, warnings) = load_grammar(common::LEFT_CONTEXT).expect("valid");
    assert!(warnings.is_empty());
    assert!(g.form_diagnostics().is_empty());
}

// ─── Input conversion ────────────────────────────────────────────────────────

#[test]
fn text_converts_to_terminals() {
    let g = grammar(common::AB);
    let input = g.convert_text("abba").expect("all terminals");
    assert_eq!(input, [sym(&g, "a"), sym(&g, "b"), sym(&g, "b"), sym(&g, "a")]);
}

#[test]
fn unknown_character_reports_position() {
    let g = grammar(common::AB);
    let err = g.convert_text("abc").unwrap_err();
    assert_eq!(err.character, 'c');
    assert_eq!(err.position, 2);
}

#[test]
fn nonterminal_names_are_not_input_characters() {
    let g = grammar(common::AB);
    assert!(g.convert_text("S").is_err());
}
