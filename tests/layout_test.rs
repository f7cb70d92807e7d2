//! Grid planning tests through the public API.

use symbolwatch::SymbolWatchError;
use symbolwatch::config::LayoutConfig;
use symbolwatch::layout::plan_layout;

#[test]
fn test_default_thresholds() {
    let layout = LayoutConfig::default();
    let expected = [
        (1, (1, 1)),
        (2, (2, 1)),
        (3, (3, 1)),
        (4, (4, 1)),
        (5, (3, 2)),
        (6, (3, 2)),
        (7, (4, 2)),
        (10, (5, 2)),
    ];

    for (count, shape) in expected {
        let grid = layout.plan(count).unwrap();
        assert_eq!((grid.rows(), grid.columns()), shape, "{count} instruments");
    }
}

#[test]
fn test_slots_follow_declaration_order() {
    let grid = plan_layout(5, 4, 2).unwrap();
    let cells: Vec<_> = grid.slots().iter().map(|s| (s.index, s.row, s.column)).collect();
    assert_eq!(
        cells,
        vec![(0, 0, 0), (1, 0, 1), (2, 1, 0), (3, 1, 1), (4, 2, 0)]
    );
}

#[test]
fn test_plan_is_stable() {
    assert_eq!(plan_layout(9, 4, 3).unwrap(), plan_layout(9, 4, 3).unwrap());
}

#[test]
fn test_empty_watch_list_is_config_error() {
    assert!(matches!(
        LayoutConfig::default().plan(0),
        Err(SymbolWatchError::Config(_))
    ));
}
