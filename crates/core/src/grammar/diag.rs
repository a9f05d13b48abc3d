pub use ctxforest_diagnostics::{Diagnostic, LineIndex, Severity, Span, codes};
