//! One instrument's panel in the grid.
//!
//! Ready slots draw on a Braille canvas, bottom layer first:
//! volume bars over the lowest quarter of the panel, the high–low band, the
//! close–open band, then the open and close lines. Bars are spaced by index,
//! so gaps in trading do not leave holes in the plot.

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Block, Borders, Paragraph, Wrap,
        canvas::{Canvas, Context, Line as Segment},
    },
};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::config::Palette;
use crate::models::{DisplayMetrics, PriceSeries};
use crate::refresh::{SlotState, SlotView};
use crate::tui::app::App;

/// Share of the plot height given to volume bars.
const VOLUME_SHARE: f64 = 0.25;

/// Renders the slot for the instrument at `index`.
pub fn render(frame: &mut Frame, area: Rect, app: &App, index: usize) {
    let symbol = app.symbols.get(index).map_or("?", String::as_str);
    let state = app.slots.get(index).unwrap_or(&SlotState::Pending);

    let title = match state {
        SlotState::Ready(view) => slot_title(&view.metrics, &app.display_currency),
        _ => symbol.to_string(),
    };
    let title_width = usize::from(area.width.saturating_sub(4));

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" {} ", fit_title(&title, title_width)),
            title_style(state),
        ));
    if let SlotState::Ready(view) = state
        && let Some(range) = time_range(&view.series)
    {
        block = block.title_bottom(Line::from(format!(" {range} ")).alignment(Alignment::Right));
    }

    let inner = block.inner(area);
    frame.render_widget(block, area);

    match state {
        SlotState::Pending => {
            render_placeholder(frame, inner, "waiting for first refresh", Color::DarkGray);
        }
        SlotState::Unavailable(err) => {
            render_placeholder(frame, inner, &err.to_string(), Color::Red);
        }
        SlotState::Ready(view) => render_plot(frame, inner, view, &app.palette),
    }
}

fn title_style(state: &SlotState) -> Style {
    match state.metrics() {
        Some(m) if m.is_up() => Style::default().fg(Color::Green),
        Some(_) => Style::default().fg(Color::Red),
        None => Style::default().fg(Color::White),
    }
    .add_modifier(Modifier::BOLD)
}

fn render_placeholder(frame: &mut Frame, area: Rect, message: &str, color: Color) {
    let para = Paragraph::new(message)
        .style(Style::default().fg(color))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(para, area);
}

fn render_plot(frame: &mut Frame, area: Rect, view: &SlotView, palette: &Palette) {
    let observations = view.series.observations();
    let Some((y_min, y_max)) = price_bounds(&view.series) else {
        render_placeholder(frame, area, "no data available", Color::Red);
        return;
    };
    let x_max = observations.len().saturating_sub(1).max(1) as f64;
    let max_volume = observations
        .iter()
        .map(|o| o.volume)
        .max()
        .unwrap_or(Decimal::ZERO);

    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([0.0, x_max])
        .y_bounds([y_min, y_max])
        .paint(move |ctx| {
            let x = |i: usize| i as f64;

            for (i, o) in observations.iter().enumerate() {
                let top = volume_top(o.volume, max_volume, y_min, y_max);
                if top > y_min {
                    vertical(ctx, x(i), y_min, top, palette.volume);
                }
            }
            ctx.layer();

            for (i, o) in observations.iter().enumerate() {
                vertical(ctx, x(i), to_f64(o.low), to_f64(o.high), palette.high_low);
            }
            ctx.layer();

            for (i, o) in observations.iter().enumerate() {
                vertical(ctx, x(i), to_f64(o.open), to_f64(o.close), palette.close_open);
            }
            ctx.layer();

            for (i, pair) in observations.windows(2).enumerate() {
                ctx.draw(&Segment::new(
                    x(i),
                    to_f64(pair[0].open),
                    x(i + 1),
                    to_f64(pair[1].open),
                    palette.open,
                ));
            }
            ctx.layer();

            for (i, pair) in observations.windows(2).enumerate() {
                ctx.draw(&Segment::new(
                    x(i),
                    to_f64(pair[0].close),
                    x(i + 1),
                    to_f64(pair[1].close),
                    palette.close,
                ));
            }
        });

    frame.render_widget(canvas, area);
}

fn vertical(ctx: &mut Context<'_>, x: f64, from: f64, to: f64, color: Color) {
    ctx.draw(&Segment::new(x, from, x, to, color));
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Vertical extent of the plot: lowest low to highest high, padded by 2% of
/// the span so the extremes stay off the border. Flat series get a unit span.
pub fn price_bounds(series: &PriceSeries) -> Option<(f64, f64)> {
    let observations = series.observations();
    let low = observations.iter().map(|o| o.low).min()?;
    let high = observations.iter().map(|o| o.high).max()?;
    let (low, high) = (to_f64(low), to_f64(high));

    let span = high - low;
    if span <= f64::EPSILON {
        return Some((low - 0.5, high + 0.5));
    }
    let pad = span * 0.02;
    Some((low - pad, high + pad))
}

/// Top of a volume bar, scaled so the largest volume fills the lowest
/// quarter of the plot.
pub fn volume_top(volume: Decimal, max_volume: Decimal, y_min: f64, y_max: f64) -> f64 {
    if max_volume <= Decimal::ZERO {
        return y_min;
    }
    let ratio = to_f64(volume) / to_f64(max_volume);
    y_min + (y_max - y_min) * VOLUME_SHARE * ratio.clamp(0.0, 1.0)
}

/// Panel heading for a ready slot.
///
/// Prices are in the instrument's own currency; holding value and
/// purchase difference are in the display currency.
pub fn slot_title(metrics: &DisplayMetrics, display_currency: &str) -> String {
    let pct = metrics
        .intraday_change_pct
        .map_or_else(|| "n/a".to_string(), |p| format!("{p:+.2}%"));
    format!(
        "{} : Close: {:.2} : {:.2} {cur} : Diff: {:+.2} ({pct}) : Purch. Diff. {:+.2} {cur}",
        metrics.symbol,
        metrics.latest_close,
        metrics.holding_value,
        metrics.intraday_change,
        metrics.value_change,
        cur = display_currency,
    )
}

/// Truncates `title` to `max_width` terminal columns, marking the cut with
/// an ellipsis.
pub fn fit_title(title: &str, max_width: usize) -> String {
    if title.width() <= max_width {
        return title.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let mut fitted = String::new();
    let mut used = 0;
    for ch in title.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        fitted.push(ch);
        used += w;
    }
    fitted.push('…');
    fitted
}

/// First and last bar times in the exchange's local time.
pub fn time_range(series: &PriceSeries) -> Option<String> {
    let first = series.observations().first()?;
    let last = series.observations().last()?;
    let first = series.local_time(first.timestamp);
    let last = series.local_time(last.timestamp);

    if first.date_naive() == last.date_naive() {
        Some(format!(
            "{} {}–{}",
            first.format("%Y-%m-%d"),
            first.format("%H:%M"),
            last.format("%H:%M")
        ))
    } else {
        Some(format!(
            "{} – {}",
            first.format("%m-%d %H:%M"),
            last.format("%m-%d %H:%M")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Instrument, Observation};
    use chrono::DateTime;
    use rust_decimal_macros::dec;

    fn bar(secs: i64, low: Decimal, high: Decimal, close: Decimal) -> Observation {
        Observation {
            timestamp: DateTime::from_timestamp(secs, 0).unwrap(),
            open: close,
            high,
            low,
            close,
            volume: dec!(1000),
        }
    }

    #[test]
    fn title_shows_values_and_signs() {
        let series = PriceSeries::new(
            "AAPL",
            vec![
                bar(60, dec!(100), dec!(100), dec!(100)),
                bar(120, dec!(120), dec!(120), dec!(120)),
            ],
        )
        .unwrap();
        let instrument = Instrument::with_holding("AAPL", dec!(5), dec!(100));
        let metrics = DisplayMetrics::derive(&instrument, &series, "SEK", None).unwrap();

        assert_eq!(
            slot_title(&metrics, "SEK"),
            "AAPL : Close: 120.00 : 600.00 SEK : Diff: +20.00 (+20.00%) : Purch. Diff. +100.00 SEK"
        );
    }

    #[test]
    fn title_without_percentage() {
        let series = PriceSeries::new(
            "ZERO",
            vec![
                bar(60, dec!(0), dec!(0), dec!(0)),
                bar(120, dec!(1), dec!(1), dec!(1)),
            ],
        )
        .unwrap();
        let metrics =
            DisplayMetrics::derive(&Instrument::new("ZERO"), &series, "SEK", None).unwrap();
        assert!(slot_title(&metrics, "SEK").contains("(n/a)"));
    }

    #[test]
    fn fit_title_truncates_on_width() {
        assert_eq!(fit_title("AAPL : Close", 20), "AAPL : Close");
        assert_eq!(fit_title("AAPL : Close", 6), "AAPL …");
        assert_eq!(fit_title("AAPL", 0), "");
        // Wide characters count as two columns.
        assert_eq!(fit_title("日本株式", 5), "日本…");
    }

    #[test]
    fn bounds_pad_the_price_span() {
        let series = PriceSeries::new(
            "AAPL",
            vec![
                bar(60, dec!(90), dec!(110), dec!(100)),
                bar(120, dec!(95), dec!(105), dec!(100)),
            ],
        )
        .unwrap();
        let (lo, hi) = price_bounds(&series).unwrap();
        assert!((lo - 89.6).abs() < 1e-9);
        assert!((hi - 110.4).abs() < 1e-9);
    }

    #[test]
    fn flat_series_gets_unit_span() {
        let series =
            PriceSeries::new("FLAT", vec![bar(60, dec!(5), dec!(5), dec!(5))]).unwrap();
        assert_eq!(price_bounds(&series), Some((4.5, 5.5)));
        assert_eq!(price_bounds(&PriceSeries::empty("NONE")), None);
    }

    #[test]
    fn volume_fills_bottom_quarter() {
        assert_eq!(volume_top(dec!(50), dec!(100), 0.0, 100.0), 12.5);
        assert_eq!(volume_top(dec!(100), dec!(100), 0.0, 100.0), 25.0);
        assert_eq!(volume_top(dec!(10), Decimal::ZERO, 0.0, 100.0), 0.0);
    }

    #[test]
    fn time_range_uses_exchange_offset() {
        // 2023-11-14 14:30 and 21:00 UTC; New York is UTC-5 in November.
        let series = PriceSeries::new(
            "AAPL",
            vec![
                bar(1_699_972_200, dec!(1), dec!(1), dec!(1)),
                bar(1_699_995_600, dec!(1), dec!(1), dec!(1)),
            ],
        )
        .unwrap()
        .with_utc_offset(-5 * 3600);
        assert_eq!(time_range(&series).unwrap(), "2023-11-14 09:30–16:00");
    }
}
