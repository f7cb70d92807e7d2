//! Status bar component.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::tui::app::{App, RefreshStatus};

const KEY_HELP: &str = " r refresh · l legend · q quit ";

/// Renders the status bar.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let status_color = match app.refresh_status {
        RefreshStatus::Idle => Color::Green,
        RefreshStatus::Refreshing => Color::Yellow,
        RefreshStatus::Waiting => Color::Gray,
    };

    let unavailable = app.unavailable_count();
    let slots_span = if unavailable == 0 {
        Span::styled(
            format!(" {} symbols ", app.slots.len()),
            Style::default().fg(Color::White),
        )
    } else {
        Span::styled(
            format!(" {unavailable}/{} unavailable ", app.slots.len()),
            Style::default().fg(Color::Yellow),
        )
    };

    let period = format!(" every {}s ", app.refresh_period.as_secs());

    let error_span = if let Some(ref error) = app.error_message {
        Span::styled(
            format!(" {} ", error.message),
            Style::default().fg(Color::Red),
        )
    } else {
        Span::raw("")
    };

    let left = vec![
        Span::styled(
            format!(" {} ", app.refresh_status.label()),
            Style::default().fg(status_color),
        ),
        Span::raw("│"),
        Span::raw(format!(" tick {} ", app.ticks_completed)),
        Span::raw("│"),
        slots_span,
        Span::raw("│"),
        Span::raw(period),
        Span::raw("│"),
        error_span,
    ];

    let used: usize = left.iter().map(Span::width).sum();
    let mut spans = left;
    spans.push(Span::styled(
        format!(
            "{:>width$}",
            KEY_HELP,
            width = usize::from(area.width).saturating_sub(used)
        ),
        Style::default().fg(Color::Gray),
    ));

    let para = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(para, area);
}
