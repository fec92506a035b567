pub mod widgets;

use std::io::stdout;

use anyhow::{Context, Result};
use ratatui::backend::CrosstermBackend;
use ratatui::{Terminal, TerminalOptions, Viewport};

use crate::pipeline::extract::Extraction;
use widgets::AccentsWidget;

/// Draw the accent swatches inline below the cursor.
pub fn print_preview(extractions: &[Extraction]) -> Result<()> {
    let widget = AccentsWidget::new(extractions);
    let mut terminal = Terminal::with_options(
        CrosstermBackend::new(stdout()),
        TerminalOptions {
            viewport: Viewport::Inline(widget.height()),
        },
    )
    .context("failed to set up terminal preview")?;

    terminal
        .draw(|frame| frame.render_widget(widget, frame.area()))
        .context("failed to draw preview")?;
    println!();
    Ok(())
}
