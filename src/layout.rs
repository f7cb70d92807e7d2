//! Chart grid planning.
//!
//! Up to `max_single_column` instruments are stacked in one column. Beyond
//! that the grid switches to `columns_when_split` columns and as many rows
//! as needed. Slots are handed out row-major in declaration order and never
//! move for the lifetime of the run.

use crate::{Result, SymbolWatchError};

/// Grid position owned by one instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayoutSlot {
    /// Index of the instrument in declaration order.
    pub index: usize,
    pub row: usize,
    pub column: usize,
}

/// Grid shape plus one slot per instrument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridLayout {
    rows: usize,
    columns: usize,
    slots: Vec<LayoutSlot>,
}

impl GridLayout {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Slots in declaration order.
    pub fn slots(&self) -> &[LayoutSlot] {
        &self.slots
    }

    /// Number of instruments placed.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Total grid cells, including trailing cells with no instrument.
    pub fn cell_count(&self) -> usize {
        self.rows * self.columns
    }

    /// Slot assigned to the instrument at `index`.
    pub fn slot(&self, index: usize) -> Option<&LayoutSlot> {
        self.slots.get(index)
    }

    /// Slot occupying the given cell, if any.
    pub fn slot_at(&self, row: usize, column: usize) -> Option<&LayoutSlot> {
        if column >= self.columns {
            return None;
        }
        self.slots.get(row * self.columns + column)
    }
}

/// Computes the grid for `count` instruments.
///
/// # Errors
///
/// Returns [`SymbolWatchError::Config`] if `count` is zero (nothing to
/// watch) or either threshold is zero.
pub fn plan_layout(
    count: usize,
    max_single_column: usize,
    columns_when_split: usize,
) -> Result<GridLayout> {
    if count == 0 {
        return Err(SymbolWatchError::Config(
            "no instruments configured".to_string(),
        ));
    }
    if max_single_column == 0 {
        return Err(SymbolWatchError::Config(
            "max_single_column must be at least 1".to_string(),
        ));
    }
    if columns_when_split == 0 {
        return Err(SymbolWatchError::Config(
            "columns_when_split must be at least 1".to_string(),
        ));
    }

    let (rows, columns) = if count == 1 {
        (1, 1)
    } else if count <= max_single_column {
        (count, 1)
    } else {
        (count.div_ceil(columns_when_split), columns_when_split)
    };

    let slots = (0..count)
        .map(|index| LayoutSlot {
            index,
            row: index / columns,
            column: index % columns,
        })
        .collect();

    Ok(GridLayout {
        rows,
        columns,
        slots,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn single_instrument_gets_one_cell() {
        let layout = plan_layout(1, 4, 2).unwrap();
        assert_eq!((layout.rows(), layout.columns()), (1, 1));
        assert_eq!(layout.slots(), &[LayoutSlot { index: 0, row: 0, column: 0 }]);
    }

    #[test]
    fn single_instrument_ignores_thresholds() {
        let layout = plan_layout(1, 1, 3).unwrap();
        assert_eq!((layout.rows(), layout.columns()), (1, 1));
    }

    #[test]
    fn stacks_up_to_threshold() {
        let layout = plan_layout(4, 4, 2).unwrap();
        assert_eq!((layout.rows(), layout.columns()), (4, 1));
        for (i, slot) in layout.slots().iter().enumerate() {
            assert_eq!((slot.row, slot.column), (i, 0));
        }
    }

    #[test]
    fn splits_beyond_threshold() {
        let layout = plan_layout(5, 4, 2).unwrap();
        assert_eq!((layout.rows(), layout.columns()), (3, 2));
        assert_eq!(layout.cell_count(), 6);
        let last = layout.slot(4).unwrap();
        assert_eq!((last.row, last.column), (2, 0));
        assert!(layout.slot_at(2, 1).is_none());
    }

    #[test]
    fn split_uses_configured_column_count() {
        let layout = plan_layout(7, 2, 3).unwrap();
        assert_eq!((layout.rows(), layout.columns()), (3, 3));
        let slot = layout.slot(5).unwrap();
        assert_eq!((slot.row, slot.column), (1, 2));
    }

    #[test]
    fn slot_lookup_round_trips() {
        let layout = plan_layout(6, 4, 2).unwrap();
        for slot in layout.slots() {
            assert_eq!(layout.slot_at(slot.row, slot.column), Some(slot));
        }
        assert!(layout.slot_at(0, 2).is_none());
    }

    #[test]
    fn every_slot_is_unique() {
        for count in 1..=25 {
            for max_single in 1..=6 {
                for cols in 1..=4 {
                    let layout = plan_layout(count, max_single, cols).unwrap();
                    assert_eq!(layout.len(), count);
                    assert!(layout.cell_count() >= count);
                    let cells: HashSet<_> =
                        layout.slots().iter().map(|s| (s.row, s.column)).collect();
                    assert_eq!(cells.len(), count);
                    assert!(layout.slots().iter().all(|s| s.row < layout.rows()
                        && s.column < layout.columns()));
                }
            }
        }
    }

    #[test]
    fn rejects_empty_watch_list() {
        let err = plan_layout(0, 4, 2).unwrap_err();
        assert!(matches!(err, SymbolWatchError::Config(_)));
        assert!(err.to_string().contains("no instruments"));
    }

    #[test]
    fn rejects_zero_thresholds() {
        assert!(matches!(plan_layout(3, 0, 2), Err(SymbolWatchError::Config(_))));
        assert!(matches!(plan_layout(3, 1, 0), Err(SymbolWatchError::Config(_))));
    }

    #[test]
    fn row_count_differs_from_fixed_divisor_of_two() {
        // Older releases divided by a literal two when splitting, whatever
        // column count was configured. Rows follow the configured count.
        let count: usize = 9;
        let layout = plan_layout(count, 4, 3).unwrap();
        let fixed_divisor_rows = count.div_ceil(2);
        assert_eq!(layout.rows(), 3);
        assert_eq!(fixed_divisor_rows, 5);
        assert_ne!(layout.rows(), fixed_divisor_rows);

        // With two columns the two agree.
        let layout = plan_layout(count, 4, 2).unwrap();
        assert_eq!(layout.rows(), count.div_ceil(2));
    }
}
