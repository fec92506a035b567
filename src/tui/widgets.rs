use ratatui::prelude::*;
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::color::Color as AppColor;
use crate::pipeline::extract::{Extraction, Outcome};

/// Renders each extraction as a row of four colored swatches labelled with
/// their hex codes, followed by the image source.
#[derive(Clone, Copy)]
pub struct AccentsWidget<'a> {
    extractions: &'a [Extraction],
}

impl<'a> AccentsWidget<'a> {
    pub fn new(extractions: &'a [Extraction]) -> Self {
        Self { extractions }
    }

    /// Rows needed to draw every extraction inside the border.
    pub fn height(&self) -> u16 {
        u16::try_from(self.extractions.len())
            .unwrap_or(u16::MAX - 2)
            .saturating_add(2)
    }
}

fn to_color(c: AppColor) -> Color {
    Color::Rgb(c.r, c.g, c.b)
}

/// Choose black or white foreground for readable text on the given background.
fn contrast_fg(c: AppColor) -> Color {
    if c.relative_luminance() > 0.4 {
        Color::Black
    } else {
        Color::White
    }
}

fn outcome_note(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Extracted { padded: 0, .. } => "",
        Outcome::Extracted { .. } => " (padded)",
        Outcome::Monochrome { .. } => " (monochrome)",
        Outcome::LoadFailed => " (load failed)",
        Outcome::EmptyPalette => " (no colors)",
    }
}

/// One swatch per accent, 9 chars wide with the hex code centered.
fn build_swatch_row(extraction: &Extraction) -> Line<'static> {
    let mut spans = vec![Span::raw(" ")];
    for hex in &extraction.colors {
        let style = match AppColor::from_hex(hex) {
            Ok(c) => Style::default().bg(to_color(c)).fg(contrast_fg(c)),
            Err(_) => Style::default(),
        };
        spans.push(Span::styled(format!("{hex:^9}"), style));
        spans.push(Span::raw(" "));
    }
    spans.push(Span::styled(
        format!("{}{}", extraction.source, outcome_note(extraction.outcome)),
        Style::default().fg(Color::DarkGray),
    ));
    Line::from(spans)
}

impl Widget for AccentsWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered().title("Accents");
        let inner = block.inner(area);
        block.render(area, buf);

        let lines: Vec<Line> = self.extractions.iter().map(build_swatch_row).collect();
        Paragraph::new(lines).render(inner, buf);
    }
}
