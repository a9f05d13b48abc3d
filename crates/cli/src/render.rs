//! Grammar diagnostic rendering.
//!
//! Converts [`Diagnostic`]s into ariadne [`Report`]s for coloured,
//! source-annotated terminal output. When stderr is not a terminal, falls
//! back to one `file:line:col` line per diagnostic, or a JSON array when
//! requested. Everything goes to stderr so stdout only carries the forest.

use std::io::{self, IsTerminal};

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use ctxforest_diagnostics::{Diagnostic, LineIndex, Severity};

// ── Output format ───────────────────────────────────────────────────────

/// Output format for diagnostic rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    /// Coloured, source-annotated output (ariadne).
    Pretty,
    /// One `file:line:col: severity[id]: message` line per diagnostic.
    Plain,
    /// Machine-readable JSON.
    Json,
}

impl Format {
    /// Use the explicit choice, or detect from whether stderr is a TTY.
    pub(crate) fn resolve_or_detect(explicit: Option<&str>) -> Self {
        match explicit {
            Some("json") => Format::Json,
            Some("plain") => Format::Plain,
            Some("pretty") => Format::Pretty,
            _ => {
                if io::stderr().is_terminal() {
                    Format::Pretty
                } else {
                    Format::Plain
                }
            }
        }
    }
}

// ── Severity mapping ────────────────────────────────────────────────────

fn report_kind(severity: Severity) -> ReportKind<'static> {
    match severity {
        Severity::Error => ReportKind::Error,
        Severity::Info => ReportKind::Advice,
        _ => ReportKind::Warning,
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Error => Color::Red,
        Severity::Warn => Color::Yellow,
        Severity::Info => Color::Blue,
        _ => Color::White,
    }
}

fn context_note(diag: &Diagnostic) -> Option<String> {
    let ctx = diag.context.as_ref().filter(|c| !c.is_empty())?;
    Some(
        ctx.iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", "),
    )
}

// ── Pretty rendering ────────────────────────────────────────────────────

fn render_pretty(source: &str, filename: &str, diagnostics: &[Diagnostic]) {
    let config = Config::default().with_compact(false);
    let mut cache = (filename, Source::from(source));

    for diag in diagnostics {
        let Some(span) = &diag.span else {
            eprintln!("{diag}");
            if let Some(explanation) = diag.explain() {
                eprintln!("  = help: {explanation}");
            }
            continue;
        };
        // Clamp to the source; end-of-input spans are empty.
        let start = span.start.min(source.len());
        let end = span.end.min(source.len()).max(start);

        let mut builder = Report::build(report_kind(diag.severity), (filename, start..end))
            .with_code(diag.id.as_ref())
            .with_message(&diag.message)
            .with_config(config)
            .with_label(
                Label::new((filename, start..end))
                    .with_message(context_note(diag).unwrap_or_else(|| diag.message.clone()))
                    .with_color(severity_color(diag.severity)),
            );
        if let Some(explanation) = diag.explain() {
            builder = builder.with_help(explanation);
        }
        builder.finish().eprint(&mut cache).ok();
    }
}

// ── Plain rendering ─────────────────────────────────────────────────────

/// Format one diagnostic as a single `file:line:col:` line.
pub(crate) fn plain_line(index: &LineIndex, filename: &str, diag: &Diagnostic) -> String {
    let mut line = match diag.span {
        Some(span) => {
            let (l, c) = index.line_col(span.start);
            format!("{filename}:{}:{}: {diag}", l + 1, c + 1)
        }
        None => format!("{filename}: {diag}"),
    };
    if let Some(note) = context_note(diag) {
        line.push_str(&format!(" ({note})"));
    }
    line
}

fn render_plain(source: &str, filename: &str, diagnostics: &[Diagnostic]) {
    let index = LineIndex::new(source);
    for diag in diagnostics {
        eprintln!("{}", plain_line(&index, filename, diag));
    }
}

// ── Unified entry point ─────────────────────────────────────────────────

/// Render diagnostics for `filename` to stderr in the given format.
pub(crate) fn render_diagnostics(
    source: &str,
    filename: &str,
    diagnostics: &[Diagnostic],
    format: Format,
) {
    if diagnostics.is_empty() {
        return;
    }
    match format {
        Format::Pretty => render_pretty(source, filename, diagnostics),
        Format::Plain => render_plain(source, filename, diagnostics),
        Format::Json => {
            let json = serde_json::to_string_pretty(diagnostics)
                .expect("Diagnostic serialization cannot fail");
            eprintln!("{json}");
        }
    }
}

// ── Summary line ────────────────────────────────────────────────────────

/// Print a summary line such as `2 errors, 1 warning`.
pub(crate) fn print_summary(diagnostics: &[Diagnostic], colored: bool) {
    use ariadne::Fmt;

    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    let warnings = diagnostics.len() - errors;
    if diagnostics.is_empty() {
        return;
    }

    let paint = |text: String, color: Color| {
        if colored {
            format!("{}", text.fg(color))
        } else {
            text
        }
    };
    let mut parts = Vec::new();
    if errors > 0 {
        let s = if errors == 1 { "" } else { "s" };
        parts.push(paint(format!("{errors} error{s}"), Color::Red));
    }
    if warnings > 0 {
        let s = if warnings == 1 { "" } else { "s" };
        parts.push(paint(format!("{warnings} warning{s}"), Color::Yellow));
    }
    eprintln!("{}", parts.join(", "));
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctxforest_diagnostics::{Span, codes};

    #[test]
    fn plain_line_is_one_indexed() {
        let src = "S -> A\nA -> 'ab'\n";
        let diag = Diagnostic::from_code(
            codes::INVALID_TERMINAL,
            "terminal literal 'ab' has 2 characters, expected 1",
            Some(Span::new(12, 16)),
        );
        let line = plain_line(&LineIndex::new(src), "g.cfg", &diag);
        assert_eq!(
            line,
            "g.cfg:2:6: error[CTX1003]: terminal literal 'ab' has 2 characters, expected 1"
        );
    }

    #[test]
    fn plain_line_without_span_names_the_file() {
        let diag = Diagnostic::from_code(codes::EMPTY_GRAMMAR, "grammar defines no rules", None);
        let line = plain_line(&LineIndex::new(""), "g.cfg", &diag);
        assert_eq!(line, "g.cfg: error[CTX1009]: grammar defines no rules");
    }

    #[test]
    fn explicit_format_wins() {
        assert_eq!(Format::resolve_or_detect(Some("json")), Format::Json);
        assert_eq!(Format::resolve_or_detect(Some("plain")), Format::Plain);
        assert_eq!(Format::resolve_or_detect(Some("pretty")), Format::Pretty);
    }
}
