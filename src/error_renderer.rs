//! Error rendering using ariadne
//!
//! Prints compilation diagnostics with the offending source lines, labels for
//! related locations and the help text of each diagnostic.

use crate::{Diagnostic, Error, Severity};
use ariadne::{ColorGenerator, Label, Report, ReportKind, Source};
use std::io::Write;
use std::ops::Range;

/// Render an error with formatting to stderr
///
/// # Example
/// ```no_run
/// # fn example(error: neots::Error) {
/// neots::render_error(&error);
/// # }
/// ```
pub fn render_error(error: &Error) {
    render_error_to_writer(error, &mut std::io::stderr(), true).ok();
}

/// Render an error to a specific writer
pub fn render_error_to(error: &Error, writer: &mut dyn Write) -> std::io::Result<()> {
    render_error_to_writer(error, writer, true)
}

/// Render an error to a String (useful for logs and editor integrations)
pub fn render_error_to_string(error: &Error) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, &mut buf, true).ok();
    String::from_utf8_lossy(&buf).to_string()
}

/// Render an error to a String without color codes (useful for tests)
pub fn render_error_to_string_no_color(error: &Error) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, &mut buf, false).ok();
    String::from_utf8_lossy(&buf).to_string()
}

fn render_error_to_writer(
    error: &Error,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    match error {
        Error::Setup(diagnostic) => match &diagnostic.code {
            Some(code) => writeln!(writer, "Setup error [{}]: {}", code, diagnostic.message),
            None => writeln!(writer, "Setup error: {}", diagnostic.message),
        },
        Error::Compilation {
            name,
            text,
            diagnostics,
        } => render_diagnostics(name, text, diagnostics, writer, use_color),
    }
}

/// Render `diagnostics` against the file `name` whose contents are `source`.
pub fn render_diagnostics(
    name: &str,
    source: &str,
    diagnostics: &[Diagnostic],
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    for diag in diagnostics {
        let mut colors = ColorGenerator::new();
        colors.next(); // Skip the first color.

        let kind = match diag.severity {
            Severity::Error => ReportKind::Error,
            Severity::Warning => ReportKind::Warning,
            Severity::Info => ReportKind::Advice,
        };
        let span = clamp(diag.span.into(), source.len());

        let mut report = Report::build(kind, (name, span.clone()))
            .with_message(&diag.message)
            .with_config(ariadne::Config::default().with_color(use_color));

        if let Some(code) = &diag.code {
            report = report.with_code(code);
        }

        let color = colors.next();
        report = report.with_label(
            Label::new((name, span))
                .with_message(&diag.message)
                .with_color(color),
        );

        for related in &diag.related {
            let color = colors.next();
            report = report.with_label(
                Label::new((name, clamp(related.span.into(), source.len())))
                    .with_message(&related.message)
                    .with_color(color),
            );
        }

        for help_msg in &diag.help {
            report = report.with_help(help_msg);
        }

        report.finish().write((name, Source::from(source)), &mut *writer)?;
    }

    Ok(())
}

/// Spans come from the checker's tree; keep them inside the text we print.
fn clamp(span: Range<usize>, len: usize) -> Range<usize> {
    let start = span.start.min(len);
    start..span.end.clamp(start, len)
}
