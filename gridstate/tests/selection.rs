//! Tests for id-based row selection.

use gridstate::column::{CellValue, Column, TableRow};
use gridstate::selection::SelectionMode;
use gridstate::table::TableEngine;
use gridstate_settings::{MemoryBackend, SettingsRegistry, SettingsStore};

#[derive(Clone)]
struct Item {
    id: String,
    name: String,
}

impl TableRow for Item {
    fn row_id(&self) -> String {
        self.id.clone()
    }
}

fn items(count: usize) -> Vec<Item> {
    (0..count)
        .map(|i| Item {
            id: format!("id-{i:02}"),
            name: format!("item-{i:02}"),
        })
        .collect()
}

fn columns() -> Vec<Column<Item>> {
    vec![
        Column::new("name", "Name", |i: &Item| CellValue::Text(i.name.clone())).sortable(),
    ]
}

fn store() -> SettingsStore {
    let registry = SettingsRegistry::new(MemoryBackend::new());
    registry.store("items", Some("name")).unwrap()
}

#[test]
fn test_selection_survives_page_navigation() {
    let table = TableEngine::with_dataset(columns(), &store(), items(25));

    table.toggle_row_selected("id-03");
    table.toggle_row_selected("id-07");

    table.go_to_page(1);
    table.go_to_page(0);

    assert!(table.is_row_selected("id-03"));
    assert!(table.is_row_selected("id-07"));
    assert_eq!(table.selected_ids().len(), 2);
}

#[test]
fn test_selection_survives_resort_and_refilter() {
    let table = TableEngine::with_dataset(columns(), &store(), items(25));

    table.toggle_row_selected("id-03");
    table.set_sort("name", true).unwrap();
    table.set_filter_text("item-2");

    // The selected row no longer passes the filter; it is still selected.
    assert!(table.is_row_selected("id-03"));
    let view = table.derived_view();
    assert_eq!(view.selected_rows.len(), 1);
    assert_eq!(view.selected_rows[0].name, "item-03");
}

#[test]
fn test_selection_survives_dataset_refresh() {
    let table = TableEngine::with_dataset(columns(), &store(), items(25));

    table.toggle_row_selected("id-03");
    table.set_dataset(items(25));
    assert!(table.is_row_selected("id-03"));
}

#[test]
fn test_select_page_selects_only_the_rendered_page() {
    let table = TableEngine::with_dataset(columns(), &store(), items(25));

    let added = table.select_page();
    assert_eq!(added.len(), 10);
    assert!(table.is_row_selected("id-00"));
    assert!(table.is_row_selected("id-09"));
    assert!(!table.is_row_selected("id-10"));

    table.go_to_page(2);
    let added = table.select_page();
    assert_eq!(added.len(), 5);
    assert_eq!(table.selected_ids().len(), 15);
}

#[test]
fn test_clear_selection_is_explicit() {
    let table = TableEngine::with_dataset(columns(), &store(), items(25));

    table.toggle_row_selected("id-03");
    table.toggle_row_selected("id-04");
    let removed = table.clear_selection();
    assert_eq!(removed.len(), 2);
    assert!(table.selected_ids().is_empty());
}

#[test]
fn test_toggle_deselects_a_selected_row() {
    let table = TableEngine::with_dataset(columns(), &store(), items(5));

    table.toggle_row_selected("id-01");
    assert!(table.is_row_selected("id-01"));
    table.toggle_row_selected("id-01");
    assert!(!table.is_row_selected("id-01"));
}

#[test]
fn test_set_selected_rows_replaces_the_selection() {
    let table = TableEngine::with_dataset(columns(), &store(), items(5));

    table.toggle_row_selected("id-00");
    table.set_selected_rows(vec!["id-02".to_string(), "id-04".to_string()]);
    assert_eq!(table.selected_ids(), vec!["id-02", "id-04"]);
}

#[test]
fn test_selection_mode_none_ignores_selection() {
    let table = TableEngine::with_dataset(columns(), &store(), items(5));
    table.set_selection_mode(SelectionMode::None);

    table.toggle_row_selected("id-01");
    assert!(table.selected_ids().is_empty());
    assert!(table.select_page().is_empty());
}

#[test]
fn test_selection_mode_single_replaces_on_select() {
    let table = TableEngine::with_dataset(columns(), &store(), items(5));
    table.set_selection_mode(SelectionMode::Single);

    table.toggle_row_selected("id-01");
    table.toggle_row_selected("id-03");
    assert_eq!(table.selected_ids(), vec!["id-03"]);
}

#[test]
fn test_switching_to_mode_none_clears_selection() {
    let table = TableEngine::with_dataset(columns(), &store(), items(5));

    table.toggle_row_selected("id-01");
    table.set_selection_mode(SelectionMode::None);
    assert!(table.selected_ids().is_empty());
}
