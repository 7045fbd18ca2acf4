//! Tests for the filter/sort/slice pipeline and its paging contracts.

use gridstate::column::{CellValue, Column, TableRow};
use gridstate::error::TableError;
use gridstate::table::TableEngine;
use gridstate_settings::{MemoryBackend, SettingsRegistry, SettingsStore};

#[derive(Clone)]
struct Item {
    id: String,
    name: String,
    size: Option<i64>,
}

impl TableRow for Item {
    fn row_id(&self) -> String {
        self.id.clone()
    }
}

fn item(index: usize, size: Option<i64>) -> Item {
    Item {
        id: format!("id-{index:02}"),
        name: format!("item-{index:02}"),
        size,
    }
}

fn items(count: usize) -> Vec<Item> {
    (0..count).map(|i| item(i, Some(i as i64))).collect()
}

fn columns() -> Vec<Column<Item>> {
    vec![
        Column::new("name", "Name", |i: &Item| CellValue::Text(i.name.clone())).sortable(),
        Column::new("size", "Size", |i: &Item| {
            i.size.map_or(CellValue::Missing, CellValue::Integer)
        })
        .sortable(),
    ]
}

fn store() -> SettingsStore {
    let registry = SettingsRegistry::new(MemoryBackend::new());
    registry.store("items", Some("name")).unwrap()
}

fn names(view_rows: &[Item]) -> Vec<String> {
    view_rows.iter().map(|i| i.name.clone()).collect()
}

#[test]
fn test_first_page_of_sorted_dataset() {
    let table = TableEngine::with_dataset(columns(), &store(), items(25));

    let view = table.derived_view();
    assert_eq!(view.page_count, 3);
    assert_eq!(view.total_filtered_count, 25);
    assert_eq!(view.rows.len(), 10);
    assert_eq!(view.rows[0].name, "item-00");
    assert_eq!(view.rows[9].name, "item-09");
}

#[test]
fn test_last_page_is_partial() {
    let table = TableEngine::with_dataset(columns(), &store(), items(25));

    table.go_to_page(2);
    let view = table.derived_view();
    assert_eq!(view.rows.len(), 5);
    assert_eq!(view.rows[0].name, "item-20");
    assert_eq!(view.rows[4].name, "item-24");
    assert_eq!(view.page_count, 3);
}

#[test]
fn test_filter_matches_by_contained_text() {
    let table = TableEngine::with_dataset(columns(), &store(), items(25));

    table.set_filter_text("item-1");
    let view = table.derived_view();
    assert_eq!(view.total_filtered_count, 10);
    assert_eq!(view.page_count, 1);
    assert_eq!(
        names(&view.rows),
        (10..20).map(|i| format!("item-{i}")).collect::<Vec<_>>()
    );
}

#[test]
fn test_filter_is_case_insensitive() {
    let table = TableEngine::with_dataset(columns(), &store(), items(5));

    table.set_filter_text("ITEM-03");
    let view = table.derived_view();
    assert_eq!(names(&view.rows), vec!["item-03"]);
    assert_eq!(view.total_filtered_count, 1);
}

#[test]
fn test_filter_resets_to_first_page() {
    let table = TableEngine::with_dataset(columns(), &store(), items(25));

    table.go_to_page(2);
    table.set_filter_text("item");
    assert_eq!(table.page_index(), 0);
}

#[test]
fn test_columns_opted_out_of_filtering_do_not_match() {
    // Sizes 1000+i so "1003" can only match through the size column.
    let dataset: Vec<Item> = (0..25).map(|i| item(i, Some(1000 + i as i64))).collect();

    let table = TableEngine::with_dataset(columns(), &store(), dataset.clone());
    table.set_filter_text("1003");
    assert_eq!(names(&table.derived_view().rows), vec!["item-03"]);

    let opted_out = vec![
        Column::new("name", "Name", |i: &Item| CellValue::Text(i.name.clone())),
        Column::new("size", "Size", |i: &Item| {
            i.size.map_or(CellValue::Missing, CellValue::Integer)
        })
        .exclude_from_filter(),
    ];
    let table = TableEngine::with_dataset(opted_out, &store(), dataset);
    table.set_filter_text("1003");
    assert_eq!(table.derived_view().total_filtered_count, 0);
}

#[test]
fn test_paging_concatenation_reproduces_the_full_sequence() {
    let table = TableEngine::with_dataset(columns(), &store(), items(25));
    table.set_filter_text("item");

    let view = table.derived_view();
    let mut concatenated = Vec::new();
    for page in 0..view.page_count {
        table.go_to_page(page);
        concatenated.extend(names(&table.derived_view().rows));
    }

    let expected: Vec<String> = (0..25).map(|i| format!("item-{i:02}")).collect();
    assert_eq!(concatenated, expected);
}

#[test]
fn test_sort_then_filter_then_sort_is_idempotent() {
    let table = TableEngine::with_dataset(columns(), &store(), items(25));
    table.set_page_size(25).unwrap();

    table.set_sort("size", true).unwrap();
    table.set_filter_text("item-1");
    let once = names(&table.derived_view().rows);

    table.set_sort("size", true).unwrap();
    let twice = names(&table.derived_view().rows);

    assert_eq!(once, twice);
    assert_eq!(once[0], "item-19");
}

#[test]
fn test_descending_sort_reverses_order() {
    let table = TableEngine::with_dataset(columns(), &store(), items(5));

    table.set_sort("name", true).unwrap();
    let view = table.derived_view();
    assert_eq!(
        names(&view.rows),
        vec!["item-04", "item-03", "item-02", "item-01", "item-00"]
    );
}

#[test]
fn test_toggle_sort_flips_direction_then_new_column_starts_ascending() {
    let table = TableEngine::with_dataset(columns(), &store(), items(5));

    // The store's default sort is name ascending.
    assert_eq!(table.sort().column_id.as_deref(), Some("name"));
    assert!(!table.sort().descending);

    table.toggle_sort("name").unwrap();
    assert!(table.sort().descending);

    table.toggle_sort("size").unwrap();
    assert_eq!(table.sort().column_id.as_deref(), Some("size"));
    assert!(!table.sort().descending);
}

#[test]
fn test_sort_change_resets_page_index() {
    let table = TableEngine::with_dataset(columns(), &store(), items(25));

    table.go_to_page(2);
    table.set_sort("size", false).unwrap();
    assert_eq!(table.page_index(), 0);
}

#[test]
fn test_missing_values_sort_last_in_both_directions() {
    let dataset = vec![
        item(0, Some(5)),
        item(1, None),
        item(2, Some(1)),
        item(3, None),
        item(4, Some(3)),
    ];
    let table = TableEngine::with_dataset(columns(), &store(), dataset);

    table.set_sort("size", false).unwrap();
    let ascending = names(&table.derived_view().rows);
    assert_eq!(
        ascending,
        vec!["item-02", "item-04", "item-00", "item-01", "item-03"]
    );

    table.set_sort("size", true).unwrap();
    let descending = names(&table.derived_view().rows);
    assert_eq!(
        descending,
        vec!["item-00", "item-04", "item-02", "item-01", "item-03"]
    );
}

#[test]
fn test_unknown_sort_column_is_a_contract_violation() {
    let table = TableEngine::with_dataset(columns(), &store(), items(5));
    let store = table.settings_store().clone();

    let result = table.set_sort("nope", false);
    assert!(matches!(result, Err(TableError::UnknownColumn(id)) if id == "nope"));

    // Neither local nor persisted state moved.
    assert_eq!(table.sort().column_id.as_deref(), Some("name"));
    assert_eq!(store.get().sort.column_id.as_deref(), Some("name"));
}

#[test]
fn test_zero_page_size_is_a_contract_violation() {
    let table = TableEngine::with_dataset(columns(), &store(), items(25));

    table.go_to_page(1);
    let result = table.set_page_size(0);
    assert!(result.is_err());
    assert_eq!(table.page_size(), 10);
    assert_eq!(table.page_index(), 1);
}

#[test]
fn test_page_size_change_keeps_first_row_visible() {
    let table = TableEngine::with_dataset(columns(), &store(), items(25));

    table.go_to_page(2);
    table.set_page_size(5).unwrap();

    // The page started at row 20; with 5 rows per page that is page 4.
    assert_eq!(table.page_index(), 4);
    let view = table.derived_view();
    assert_eq!(view.rows[0].name, "item-20");
    assert_eq!(view.page_count, 5);
}

#[test]
fn test_out_of_range_page_requests_clamp() {
    let table = TableEngine::with_dataset(columns(), &store(), items(25));

    table.go_to_page(99);
    assert_eq!(table.page_index(), 2);

    table.set_filter_text("item-2");
    // 6 matches fit one page; the index follows the filter reset.
    assert_eq!(table.page_index(), 0);
    table.go_to_page(7);
    assert_eq!(table.page_index(), 0);
}

#[test]
fn test_empty_dataset_yields_an_empty_view() {
    let table = TableEngine::with_dataset(columns(), &store(), Vec::new());

    let view = table.derived_view();
    assert!(view.rows.is_empty());
    assert_eq!(view.page_count, 0);
    assert_eq!(view.total_filtered_count, 0);

    table.go_to_page(5);
    assert_eq!(table.page_index(), 0);
}

#[test]
fn test_dataset_shrink_reclamps_page_index() {
    let table = TableEngine::with_dataset(columns(), &store(), items(25));

    table.go_to_page(2);
    table.set_dataset(items(8));
    assert_eq!(table.page_index(), 0);
    assert_eq!(table.derived_view().page_count, 1);
}

#[test]
fn test_hidden_columns_do_not_affect_filter_or_sort() {
    let table = TableEngine::with_dataset(columns(), &store(), items(25));
    table.settings_store()
        .set_hidden_columns(vec!["size".to_string()])
        .unwrap();

    // The hidden size column still participates in sorting...
    table.set_sort("size", true).unwrap();
    assert_eq!(table.derived_view().rows[0].name, "item-24");

    // ...and in filtering.
    table.set_filter_text("13");
    assert_eq!(names(&table.derived_view().rows), vec!["item-13"]);

    // Only rendering changes.
    let visible: Vec<String> = table
        .visible_columns()
        .iter()
        .map(|c| c.id().to_string())
        .collect();
    assert_eq!(visible, vec!["name"]);
}

#[test]
fn test_loading_flag_is_data_not_an_error() {
    let table = TableEngine::with_dataset(columns(), &store(), Vec::new());

    table.set_loading(true);
    assert!(table.is_loading());
    assert!(table.derived_view().rows.is_empty());

    table.set_loading(false);
    assert!(!table.is_loading());
}

// -----------------------------------------------------------------------------
// Externally-paginated mode
// -----------------------------------------------------------------------------

#[test]
fn test_external_mode_disables_slicing() {
    let table = TableEngine::with_dataset(columns(), &store(), items(10));
    table.set_external_page_count(Some(5));
    table.set_total_count(Some(47));

    let view = table.derived_view();
    // The dataset is exactly one page; all ten rows render.
    assert_eq!(view.rows.len(), 10);
    assert_eq!(view.page_count, 5);
    assert_eq!(view.total_filtered_count, 47);
}

#[test]
fn test_external_mode_pages_against_the_supplied_count() {
    let table = TableEngine::with_dataset(columns(), &store(), items(10));
    table.set_external_page_count(Some(5));

    table.go_to_page(4);
    assert_eq!(table.page_index(), 4);

    table.go_to_page(99);
    assert_eq!(table.page_index(), 4);
}

#[test]
fn test_external_mode_still_filters_and_sorts_locally() {
    let table = TableEngine::with_dataset(columns(), &store(), items(10));
    table.set_external_page_count(Some(3));

    table.set_sort("name", true).unwrap();
    table.set_filter_text("item-0");
    let view = table.derived_view();
    assert_eq!(view.rows.len(), 10);
    assert_eq!(view.rows[0].name, "item-09");
}

#[test]
fn test_returning_to_client_mode_restores_slicing() {
    let table = TableEngine::with_dataset(columns(), &store(), items(25));
    table.set_external_page_count(Some(9));
    table.set_external_page_count(None);

    let view = table.derived_view();
    assert_eq!(view.rows.len(), 10);
    assert_eq!(view.page_count, 3);
}
