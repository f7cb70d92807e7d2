//! Reusable UI pieces.

pub mod header;
pub mod legend;
pub mod slot_chart;
pub mod status_bar;
