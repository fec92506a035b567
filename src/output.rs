use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

use crate::pipeline::extract::Extraction;

/// How extracted accents are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One line of space-separated hex colors per image
    Plain,
    /// A JSON array with colors and how they were obtained
    Json,
    /// CSS custom properties `--accent-1` through `--accent-4`
    Css,
}

/// Render extractions in the requested format.
pub fn render(extractions: &[Extraction], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Plain => Ok(render_plain(extractions)),
        OutputFormat::Json => render_json(extractions),
        OutputFormat::Css => Ok(render_css(extractions)),
    }
}

fn render_plain(extractions: &[Extraction]) -> String {
    let labelled = extractions.len() > 1;
    let mut out = String::new();
    for extraction in extractions {
        if labelled {
            out.push_str(&extraction.source);
            out.push_str(": ");
        }
        out.push_str(&extraction.colors.join(" "));
        out.push('\n');
    }
    out
}

fn render_json(extractions: &[Extraction]) -> Result<String> {
    let mut out =
        serde_json::to_string_pretty(extractions).context("failed to serialize extractions")?;
    out.push('\n');
    Ok(out)
}

fn render_css(extractions: &[Extraction]) -> String {
    let single = extractions.len() == 1;
    let mut out = String::new();
    for (i, extraction) in extractions.iter().enumerate() {
        let selector = if single {
            ":root".to_string()
        } else {
            format!(".cover-{}", i + 1)
        };
        // String writes are infallible.
        let _ = writeln!(out, "/* {} */", extraction.source.replace("*/", "* /"));
        let _ = writeln!(out, "{selector} {{");
        for (n, color) in extraction.colors.iter().enumerate() {
            let _ = writeln!(out, "  --accent-{}: {color};", n + 1);
        }
        out.push_str("}\n");
    }
    out
}

/// Write rendered output to an arbitrary path.
pub fn write_to(content: &str, path: &Path) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("failed to write output to {}", path.display()))
}
