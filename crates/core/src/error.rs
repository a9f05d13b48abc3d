//! Typed errors for the grammar → chart → forest pipeline.

use std::io;
use std::path::PathBuf;

use ctxforest_diagnostics::Diagnostic;

/// An input character that no terminal of the grammar matches.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to resolve input character {character:?} at position {position} to a grammar symbol")]
pub struct SymbolResolutionError {
    /// The unmapped character.
    pub character: char,
    /// Character index in the input text.
    pub position: usize,
}

/// Fatal conditions of a parse run.
///
/// The core never terminates the process; every failure surfaces as one of
/// these values and the caller decides how to report it.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A grammar or input file could not be read.
    #[error("failed to read '{}'", .path.display())]
    File {
        /// Path that was attempted.
        path: PathBuf,
        /// The underlying OS error.
        #[source]
        source: io::Error,
    },

    /// The grammar source has syntax errors.
    #[error("grammar has {} syntax error(s)", count_errors(.diagnostics))]
    GrammarSyntax {
        /// Every diagnostic produced by the reader, warnings included.
        diagnostics: Vec<Diagnostic>,
    },

    /// The grammar is not in binary normal form.
    #[error("grammar form is not binary normal ({} violation(s))", count_errors(.diagnostics))]
    GrammarForm {
        /// Every form diagnostic, warnings included.
        diagnostics: Vec<Diagnostic>,
    },

    /// Some input character has no terminal symbol.
    #[error(transparent)]
    SymbolResolution(#[from] SymbolResolutionError),

    /// The start symbol does not derive the whole input.
    #[error("provided string cannot be derived with given grammar (start symbol `{start}`, input length {len})")]
    NoDerivation {
        /// Display name of the start symbol.
        start: String,
        /// Length of the input in symbols.
        len: usize,
    },
}

impl Error {
    /// Diagnostics attached to a grammar error, empty for other variants.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Error::GrammarSyntax { diagnostics } | Error::GrammarForm { diagnostics } => {
                diagnostics
            }
            _ => &[],
        }
    }
}

fn count_errors(diagnostics: &[Diagnostic]) -> usize {
    diagnostics.iter().filter(|d| d.is_error()).count()
}
