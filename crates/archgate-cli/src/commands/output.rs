//! Terminal output of reports.

use anyhow::Result;
use archgate_core::{
    CompactRenderer, JsonRenderer, MarkdownRenderer, Report, ReportRenderer, TextRenderer,
};
use std::io::{IsTerminal, Write};

use crate::OutputFormat;

/// Picks the renderer for a terminal format. Text is coloured only when
/// stdout is a terminal.
#[must_use]
pub fn renderer(format: OutputFormat) -> Box<dyn ReportRenderer> {
    match format {
        OutputFormat::Text if std::io::stdout().is_terminal() => Box::new(TextRenderer::colored()),
        OutputFormat::Text => Box::new(TextRenderer::plain()),
        OutputFormat::Json => Box::new(JsonRenderer),
        OutputFormat::Compact => Box::new(CompactRenderer),
        OutputFormat::Markdown => Box::new(MarkdownRenderer),
    }
}

/// Prints a report to stdout in the specified format.
pub fn print(report: &Report, format: OutputFormat) -> Result<()> {
    let rendered = renderer(format).render(report)?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(rendered.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
