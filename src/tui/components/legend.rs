//! Colour key for the chart layers.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::config::Palette;

/// Layer names paired with their colours, in drawing order from the top.
pub fn entries(palette: &Palette) -> [(&'static str, Color); 5] {
    [
        ("Close", palette.close),
        ("Open", palette.open),
        ("Close-Open", palette.close_open),
        ("High-Low", palette.high_low),
        ("Volume", palette.volume),
    ]
}

/// Renders the legend.
pub fn render(frame: &mut Frame, area: Rect, palette: &Palette) {
    let mut spans = vec![Span::styled(" Legend: ", Style::default().fg(Color::Gray))];
    for (label, color) in entries(palette) {
        spans.push(Span::styled("━━ ", Style::default().fg(color)));
        spans.push(Span::raw(format!("{label}  ")));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
