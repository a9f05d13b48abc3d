/// Symbols, the alphabet, and input text conversion.
pub mod alphabet;
/// Grammar model: rules, conjuncts, and context kinds.
pub mod ast;
/// Re-exports from the diagnostics crate.
pub mod diag;
/// Binary-normal-form checks.
mod form;
/// Grammar-file lexer: tokenizes a grammar source into borrowed tokens.
pub mod lexer;
/// Grammar-file parser: converts tokens into a [`ast::Grammar`].
pub mod parser;
