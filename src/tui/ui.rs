//! Main UI rendering coordinator.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
};

use super::app::App;
use super::components::{header, legend, slot_chart, status_bar};

/// Renders the entire application UI.
pub fn render(frame: &mut Frame, app: &App) {
    let legend_height = u16::from(app.show_legend);
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),             // Summary header
            Constraint::Min(3),                // Chart grid
            Constraint::Length(legend_height), // Legend
            Constraint::Length(1),             // Status bar
        ])
        .split(frame.area());

    header::render(frame, main_layout[0], app);

    let cells = grid_cells(main_layout[1], app.layout.rows(), app.layout.columns());
    for slot in app.layout.slots() {
        if let Some(&cell) = cells.get(slot.row * app.layout.columns() + slot.column) {
            slot_chart::render(frame, cell, app, slot.index);
        }
    }

    if app.show_legend {
        legend::render(frame, main_layout[2], &app.palette);
    }
    status_bar::render(frame, main_layout[3], app);
}

/// Splits `area` into `rows` × `columns` equal cells, row-major.
pub fn grid_cells(area: Rect, rows: usize, columns: usize) -> Vec<Rect> {
    if rows == 0 || columns == 0 {
        return Vec::new();
    }

    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, rows as u32); rows])
        .split(area);

    row_areas
        .iter()
        .flat_map(|&row| {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints(vec![Constraint::Ratio(1, columns as u32); columns])
                .split(row)
                .to_vec()
        })
        .collect()
}
