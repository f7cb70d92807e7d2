//! Portfolio summary line.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use rust_decimal::Decimal;

use crate::models::PortfolioSummary;
use crate::tui::app::App;

/// Summary text, e.g. `Total Value: 1234.00 SEK : Change: +34.00 SEK`.
pub fn summary_text(summary: &PortfolioSummary, currency: &str) -> String {
    format!(
        "Total Value: {:.2} {currency} : Change: {:+.2} {currency}",
        summary.total_value, summary.total_value_change
    )
}

/// Renders the header.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let change_color = if app.summary.total_value_change >= Decimal::ZERO {
        Color::Green
    } else {
        Color::Red
    };

    let updated = app.last_tick.map_or_else(
        || "not refreshed yet".to_string(),
        |t| {
            format!(
                "updated {}",
                t.with_timezone(&chrono::Local).format("%H:%M:%S")
            )
        },
    );

    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", summary_text(&app.summary, &app.display_currency)),
            Style::default()
                .fg(change_color)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("│"),
        Span::styled(format!(" {updated} "), Style::default().fg(Color::Gray)),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}
