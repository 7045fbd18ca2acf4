//! Table engine state and intent operations.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, Weak};

use gridstate_settings::{SettingsError, SettingsRecord, SettingsStore, SortSpec, Subscription};
use log::warn;

use crate::column::{Column, TableRow};
use crate::error::TableError;
use crate::expansion::Expansion;
use crate::selection::{Selection, SelectionMode};

use super::view::DerivedView;

/// Unique identifier for an engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EngineId(usize);

impl EngineId {
    fn new() -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl std::fmt::Display for EngineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "__table_{}", self.0)
    }
}

/// Internal state for the table engine.
struct EngineInner<T: TableRow> {
    /// Column schema, immutable after construction.
    columns: Vec<Column<T>>,
    /// Current dataset. In externally-paginated mode this is exactly the
    /// current page as fetched by the data collaborator.
    dataset: Vec<T>,
    /// Authoritative row count supplied with the dataset, when it exceeds
    /// `dataset.len()` (externally-paginated mode).
    total_count: Option<usize>,
    /// Dataset fetch in flight; surfaced to the shell as data, not an error.
    is_loading: bool,
    /// Current sort, persisted through the bound store.
    sort: SortSpec,
    /// Zero-based page index, transient.
    page_index: usize,
    /// Rows per page, persisted through the bound store.
    page_size: usize,
    /// In-progress search text, transient.
    filter_text: String,
    /// Hidden column ids; affects rendering output only.
    hidden_columns: HashSet<String>,
    /// Id-keyed selection state.
    selection: Selection,
    /// Selection mode.
    selection_mode: SelectionMode,
    /// Id-keyed expansion state.
    expansion: Expansion,
    /// `Some` switches the engine to externally-paginated mode with the
    /// supplied page count; slicing is then the fetcher's responsibility.
    external_page_count: Option<usize>,
}

/// The table state engine.
///
/// One engine exists per mounted table view. It reads its initial
/// persisted values (sort, page size, hidden columns) from the bound
/// [`SettingsStore`] at creation, registers one store observer so engines
/// sharing a storage key converge within the same synchronous turn, and
/// drops that registration with the engine.
///
/// All operations are synchronous `&self` calls; a mutation's effect is
/// visible to any reader queried immediately afterward. Selection and
/// expansion are never reset implicitly - re-sorting, re-filtering,
/// re-paging and dataset replacement all leave both sets untouched.
pub struct TableEngine<T: TableRow> {
    /// Unique identifier.
    id: EngineId,
    /// Internal state.
    inner: Arc<RwLock<EngineInner<T>>>,
    /// Dirty flag for re-render.
    dirty: Arc<AtomicBool>,
    /// Bound settings store.
    store: SettingsStore,
    /// Store observer; deregisters when the last engine clone drops.
    _store_subscription: Arc<Subscription>,
}

impl<T: TableRow> TableEngine<T> {
    /// Create an engine bound to a settings store, with an empty dataset.
    ///
    /// Initial sort, page size and hidden columns come from the store's
    /// record. A persisted sort column that is no longer in the schema
    /// degrades to "no sort".
    pub fn new(columns: Vec<Column<T>>, store: &SettingsStore) -> Self {
        for (index, column) in columns.iter().enumerate() {
            if columns[..index].iter().any(|other| other.id() == column.id()) {
                warn!(
                    "duplicate column id {} in schema; the first definition wins",
                    column.id()
                );
            }
        }

        let record = store.get();
        let sort = resolve_sort(&record.sort, &columns);
        let hidden_columns = hidden_set(&record, &columns);

        let inner = Arc::new(RwLock::new(EngineInner {
            columns,
            dataset: Vec::new(),
            total_count: None,
            is_loading: false,
            sort,
            page_index: 0,
            page_size: record.page_size.max(1),
            filter_text: String::new(),
            hidden_columns,
            selection: Selection::new(),
            selection_mode: SelectionMode::Multiple,
            expansion: Expansion::new(),
            external_page_count: None,
        }));
        let dirty = Arc::new(AtomicBool::new(true));

        let subscription = {
            let inner = Arc::downgrade(&inner);
            let dirty = Arc::clone(&dirty);
            store.subscribe(move |record| apply_record(&inner, &dirty, record))
        };

        Self {
            id: EngineId::new(),
            inner,
            dirty,
            store: store.clone(),
            _store_subscription: Arc::new(subscription),
        }
    }

    /// Create an engine with an initial dataset.
    pub fn with_dataset(columns: Vec<Column<T>>, store: &SettingsStore, dataset: Vec<T>) -> Self {
        let engine = Self::new(columns, store);
        engine.set_dataset(dataset);
        engine
    }

    /// Get the unique ID.
    pub fn id(&self) -> EngineId {
        self.id
    }

    /// The settings store this engine persists through.
    pub fn settings_store(&self) -> &SettingsStore {
        &self.store
    }

    // -------------------------------------------------------------------------
    // Dataset
    // -------------------------------------------------------------------------

    /// Replace the dataset.
    ///
    /// The page index re-clamps against the new row count; selection and
    /// expansion are kept (row identity, not position, decides what they
    /// refer to).
    pub fn set_dataset(&self, dataset: Vec<T>) {
        if let Ok(mut guard) = self.inner.write() {
            guard.dataset = dataset;
            clamp_page(&mut guard);
            self.dirty.store(true, Ordering::SeqCst);
        }
    }

    /// Set the authoritative total row count reported by the fetcher.
    pub fn set_total_count(&self, total_count: Option<usize>) {
        if let Ok(mut guard) = self.inner.write() {
            if guard.total_count != total_count {
                guard.total_count = total_count;
                self.dirty.store(true, Ordering::SeqCst);
            }
        }
    }

    /// Flag a dataset fetch as in flight.
    pub fn set_loading(&self, is_loading: bool) {
        if let Ok(mut guard) = self.inner.write() {
            if guard.is_loading != is_loading {
                guard.is_loading = is_loading;
                self.dirty.store(true, Ordering::SeqCst);
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.inner.read().map(|g| g.is_loading).unwrap_or(false)
    }

    /// Switch between client-side and externally-paginated mode.
    ///
    /// `Some(page_count)` disables the engine's own slicing: the dataset is
    /// treated as exactly one page and the supplied count drives paging.
    /// `goToPage`/`setPageSize` keep working; re-fetching the matching page
    /// of data is the caller's responsibility. `None` restores client-side
    /// slicing.
    pub fn set_external_page_count(&self, page_count: Option<usize>) {
        if let Ok(mut guard) = self.inner.write() {
            if guard.external_page_count != page_count {
                guard.external_page_count = page_count;
                clamp_page(&mut guard);
                self.dirty.store(true, Ordering::SeqCst);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Sort
    // -------------------------------------------------------------------------

    /// Sort by a schema column.
    ///
    /// Resets the page index (the old page boundaries are meaningless under
    /// a new order) and forwards the choice to the settings store. An id
    /// not in the schema is a contract violation.
    pub fn set_sort(&self, column_id: &str, descending: bool) -> Result<(), TableError> {
        if let Ok(mut guard) = self.inner.write() {
            if !guard.columns.iter().any(|c| c.id() == column_id) {
                return Err(TableError::UnknownColumn(column_id.to_string()));
            }
            let sort = SortSpec {
                column_id: Some(column_id.to_string()),
                descending,
            };
            if guard.sort != sort || guard.page_index != 0 {
                guard.sort = sort;
                guard.page_index = 0;
                self.dirty.store(true, Ordering::SeqCst);
            }
        }
        self.store.set_sort(Some(column_id), descending)?;
        Ok(())
    }

    /// Sort by a column the way a header click does: a repeated column
    /// flips the direction, a new column starts ascending.
    pub fn toggle_sort(&self, column_id: &str) -> Result<(), TableError> {
        let descending = {
            let sort = self.sort();
            sort.column_id.as_deref() == Some(column_id) && !sort.descending
        };
        self.set_sort(column_id, descending)
    }

    pub fn sort(&self) -> SortSpec {
        self.inner.read().map(|g| g.sort.clone()).unwrap_or_default()
    }

    // -------------------------------------------------------------------------
    // Filter
    // -------------------------------------------------------------------------

    /// Set the free-text filter and return to the first page.
    ///
    /// A row matches if any filterable column's rendered value contains the
    /// text case-insensitively. Hidden columns still participate:
    /// visibility affects rendering only.
    pub fn set_filter_text(&self, text: impl Into<String>) {
        let text = text.into();
        if let Ok(mut guard) = self.inner.write() {
            if guard.filter_text != text || guard.page_index != 0 {
                guard.filter_text = text;
                guard.page_index = 0;
                self.dirty.store(true, Ordering::SeqCst);
            }
        }
    }

    pub fn filter_text(&self) -> String {
        self.inner
            .read()
            .map(|g| g.filter_text.clone())
            .unwrap_or_default()
    }

    // -------------------------------------------------------------------------
    // Paging
    // -------------------------------------------------------------------------

    /// Go to a page, silently clamping into the valid range.
    pub fn go_to_page(&self, index: usize) {
        if let Ok(mut guard) = self.inner.write() {
            let page_count = page_count_of(&guard, filtered_count(&guard));
            let clamped = index.min(page_count.saturating_sub(1));
            if guard.page_index != clamped {
                guard.page_index = clamped;
                self.dirty.store(true, Ordering::SeqCst);
            }
        }
    }

    /// Change the rows-per-page choice and forward it to the settings
    /// store.
    ///
    /// The page index is recomputed so the first row of the current page
    /// stays visible. Zero is a contract violation and leaves all state
    /// unchanged.
    pub fn set_page_size(&self, page_size: usize) -> Result<(), TableError> {
        if page_size == 0 {
            return Err(SettingsError::InvalidPageSize.into());
        }
        if let Ok(mut guard) = self.inner.write() {
            if guard.page_size != page_size {
                guard.page_index = guard.page_index * guard.page_size / page_size;
                guard.page_size = page_size;
                self.dirty.store(true, Ordering::SeqCst);
            }
        }
        self.store.set_page_size(page_size)?;
        Ok(())
    }

    pub fn page_index(&self) -> usize {
        self.inner.read().map(|g| g.page_index).unwrap_or(0)
    }

    pub fn page_size(&self) -> usize {
        self.inner
            .read()
            .map(|g| g.page_size)
            .unwrap_or(gridstate_settings::DEFAULT_PAGE_SIZE)
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Get the selection mode.
    pub fn selection_mode(&self) -> SelectionMode {
        self.inner
            .read()
            .map(|g| g.selection_mode)
            .unwrap_or_default()
    }

    /// Set the selection mode. Switching to `None` clears the selection.
    pub fn set_selection_mode(&self, mode: SelectionMode) {
        if let Ok(mut guard) = self.inner.write() {
            guard.selection_mode = mode;
            if mode == SelectionMode::None {
                guard.selection.clear();
            }
            self.dirty.store(true, Ordering::SeqCst);
        }
    }

    /// Toggle one row's selection by id.
    pub fn toggle_row_selected(&self, row_id: &str) {
        if let Ok(mut guard) = self.inner.write() {
            match guard.selection_mode {
                SelectionMode::None => return,
                SelectionMode::Single => {
                    guard.selection.select(row_id);
                }
                SelectionMode::Multiple => {
                    guard.selection.toggle(row_id);
                }
            }
            self.dirty.store(true, Ordering::SeqCst);
        }
    }

    /// Replace the selection wholesale.
    pub fn set_selected_rows(&self, ids: impl IntoIterator<Item = String>) {
        if let Ok(mut guard) = self.inner.write() {
            if guard.selection_mode == SelectionMode::None {
                return;
            }
            guard.selection.set(ids);
            self.dirty.store(true, Ordering::SeqCst);
        }
    }

    /// Select every row on the currently rendered page.
    ///
    /// This is the page-scoped select-all: rows on other pages are not
    /// selected. Returns the ids that were newly selected.
    pub fn select_page(&self) -> Vec<String> {
        if let Ok(mut guard) = self.inner.write() {
            if guard.selection_mode != SelectionMode::Multiple {
                return Vec::new();
            }
            let ids: Vec<String> = current_page_rows(&guard)
                .iter()
                .map(TableRow::row_id)
                .collect();
            let added = guard.selection.select_all(&ids);
            if !added.is_empty() {
                self.dirty.store(true, Ordering::SeqCst);
            }
            return added;
        }
        Vec::new()
    }

    /// Clear the selection. Returns the ids that were deselected.
    pub fn clear_selection(&self) -> Vec<String> {
        if let Ok(mut guard) = self.inner.write() {
            let removed = guard.selection.clear();
            if !removed.is_empty() {
                self.dirty.store(true, Ordering::SeqCst);
            }
            return removed;
        }
        Vec::new()
    }

    /// Check selection from a row's identity alone.
    pub fn is_row_selected(&self, row_id: &str) -> bool {
        self.inner
            .read()
            .map(|g| g.selection.is_selected(row_id))
            .unwrap_or(false)
    }

    /// Get all selected ids (sorted).
    pub fn selected_ids(&self) -> Vec<String> {
        self.inner
            .read()
            .map(|g| g.selection.selected())
            .unwrap_or_default()
    }

    // -------------------------------------------------------------------------
    // Expansion
    // -------------------------------------------------------------------------

    /// Toggle one row's expansion by id. Returns whether the row is now
    /// expanded. Other rows stay as they are.
    pub fn toggle_row_expanded(&self, row_id: &str) -> bool {
        if let Ok(mut guard) = self.inner.write() {
            let expanded = guard.expansion.toggle(row_id);
            self.dirty.store(true, Ordering::SeqCst);
            return expanded;
        }
        false
    }

    /// Collapse every row. Returns the ids that were expanded.
    pub fn collapse_all(&self) -> Vec<String> {
        if let Ok(mut guard) = self.inner.write() {
            let removed = guard.expansion.collapse_all();
            if !removed.is_empty() {
                self.dirty.store(true, Ordering::SeqCst);
            }
            return removed;
        }
        Vec::new()
    }

    /// Check expansion from a row's identity alone.
    pub fn is_row_expanded(&self, row_id: &str) -> bool {
        self.inner
            .read()
            .map(|g| g.expansion.is_expanded(row_id))
            .unwrap_or(false)
    }

    /// Get all expanded ids (sorted).
    pub fn expanded_ids(&self) -> Vec<String> {
        self.inner
            .read()
            .map(|g| g.expansion.expanded())
            .unwrap_or_default()
    }

    // -------------------------------------------------------------------------
    // Columns
    // -------------------------------------------------------------------------

    /// The full column schema, in declaration order.
    pub fn columns(&self) -> Vec<Column<T>> {
        self.inner.read().map(|g| g.columns.clone()).unwrap_or_default()
    }

    /// The columns a shell should render: schema order minus hidden ones.
    pub fn visible_columns(&self) -> Vec<Column<T>> {
        self.inner
            .read()
            .map(|g| {
                g.columns
                    .iter()
                    .filter(|c| !g.hidden_columns.contains(c.id()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Ids of currently hidden columns (sorted).
    pub fn hidden_column_ids(&self) -> Vec<String> {
        self.inner
            .read()
            .map(|g| {
                let mut ids: Vec<_> = g.hidden_columns.iter().cloned().collect();
                ids.sort();
                ids
            })
            .unwrap_or_default()
    }

    // -------------------------------------------------------------------------
    // Derived view
    // -------------------------------------------------------------------------

    /// Compute the current view: filter, then sort, then slice.
    ///
    /// Pure read; the engine is unchanged. In externally-paginated mode the
    /// slice step is skipped and the caller-supplied page count and total
    /// are reported.
    pub fn derived_view(&self) -> DerivedView<T> {
        self.inner
            .read()
            .map(|guard| build_view(&guard))
            .unwrap_or_else(|_| DerivedView {
                rows: Vec::new(),
                page_count: 0,
                total_filtered_count: 0,
                selected_rows: Vec::new(),
                expanded: HashSet::new(),
            })
    }

    // -------------------------------------------------------------------------
    // Dirty tracking
    // -------------------------------------------------------------------------

    /// Check if the engine has changed since the last render.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Clear the dirty flag.
    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }
}

impl<T: TableRow> Clone for TableEngine<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Arc::clone(&self.inner),
            dirty: Arc::clone(&self.dirty),
            store: self.store.clone(),
            _store_subscription: Arc::clone(&self._store_subscription),
        }
    }
}

// =============================================================================
// Store synchronization
// =============================================================================

/// Re-apply a settings record after a store mutation.
///
/// Runs for every mutation on the bound store, including this engine's own
/// forwards; the change checks make those self-notifications no-ops. A sort
/// or page-size change made through another engine resets/remaps the page
/// index exactly like the local operation would.
fn apply_record<T: TableRow>(
    inner: &Weak<RwLock<EngineInner<T>>>,
    dirty: &AtomicBool,
    record: &SettingsRecord,
) {
    let Some(inner) = inner.upgrade() else { return };
    if let Ok(mut guard) = inner.write() {
        let mut changed = false;

        let sort = resolve_sort(&record.sort, &guard.columns);
        if guard.sort != sort {
            guard.sort = sort;
            guard.page_index = 0;
            changed = true;
        }

        let page_size = record.page_size.max(1);
        if guard.page_size != page_size {
            guard.page_index = guard.page_index * guard.page_size / page_size;
            guard.page_size = page_size;
            changed = true;
        }

        let hidden = hidden_set(record, &guard.columns);
        if guard.hidden_columns != hidden {
            guard.hidden_columns = hidden;
            changed = true;
        }

        if changed {
            dirty.store(true, Ordering::SeqCst);
        }
    }
}

/// Degrade a persisted sort whose column left the schema to "no sort".
fn resolve_sort<T: TableRow>(sort: &SortSpec, columns: &[Column<T>]) -> SortSpec {
    match sort.column_id.as_deref() {
        Some(id) if !columns.iter().any(|c| c.id() == id) => {
            warn!("persisted sort column {id} is not in the schema, falling back to unsorted");
            SortSpec::unsorted()
        }
        _ => sort.clone(),
    }
}

/// Hidden ids for a record: the user's choice when configured, otherwise
/// the schema's default-hidden flags.
fn hidden_set<T: TableRow>(record: &SettingsRecord, columns: &[Column<T>]) -> HashSet<String> {
    match &record.hidden_columns {
        Some(ids) => ids.iter().cloned().collect(),
        None => columns
            .iter()
            .filter(|c| c.is_hidden_by_default())
            .map(|c| c.id().to_string())
            .collect(),
    }
}

// =============================================================================
// Derivation pipeline
// =============================================================================

fn row_matches<T: TableRow>(inner: &EngineInner<T>, row: &T, needle: &str) -> bool {
    inner.columns.iter().any(|column| {
        column.is_filterable()
            && column
                .value(row)
                .to_string()
                .to_lowercase()
                .contains(needle)
    })
}

fn filtered_rows<T: TableRow>(inner: &EngineInner<T>) -> Vec<T> {
    if inner.filter_text.is_empty() {
        return inner.dataset.clone();
    }
    let needle = inner.filter_text.to_lowercase();
    inner
        .dataset
        .iter()
        .filter(|row| row_matches(inner, row, &needle))
        .cloned()
        .collect()
}

fn filtered_count<T: TableRow>(inner: &EngineInner<T>) -> usize {
    if inner.filter_text.is_empty() {
        return inner.dataset.len();
    }
    let needle = inner.filter_text.to_lowercase();
    inner
        .dataset
        .iter()
        .filter(|row| row_matches(inner, row, &needle))
        .count()
}

fn sort_rows<T: TableRow>(rows: &mut [T], inner: &EngineInner<T>) {
    let Some(column_id) = inner.sort.column_id.as_deref() else {
        return;
    };
    // A stale persisted id that slipped past construction degrades to the
    // dataset's natural order rather than failing.
    let Some(column) = inner.columns.iter().find(|c| c.id() == column_id) else {
        return;
    };
    let descending = inner.sort.descending;
    rows.sort_by(|a, b| column.compare_rows(a, b, descending));
}

fn page_count_of<T: TableRow>(inner: &EngineInner<T>, filtered: usize) -> usize {
    match inner.external_page_count {
        Some(count) => count,
        None => filtered.div_ceil(inner.page_size),
    }
}

fn slice_page<T: TableRow>(rows: Vec<T>, inner: &EngineInner<T>, page_count: usize) -> Vec<T> {
    match inner.external_page_count {
        // The dataset already is exactly one page.
        Some(_) => rows,
        None => {
            let page_index = inner.page_index.min(page_count.saturating_sub(1));
            let start = (page_index * inner.page_size).min(rows.len());
            let end = (start + inner.page_size).min(rows.len());
            rows[start..end].to_vec()
        }
    }
}

fn current_page_rows<T: TableRow>(inner: &EngineInner<T>) -> Vec<T> {
    let mut rows = filtered_rows(inner);
    sort_rows(&mut rows, inner);
    let page_count = page_count_of(inner, rows.len());
    slice_page(rows, inner, page_count)
}

fn clamp_page<T: TableRow>(inner: &mut EngineInner<T>) {
    let page_count = page_count_of(inner, filtered_count(inner));
    let max_index = page_count.saturating_sub(1);
    if inner.page_index > max_index {
        inner.page_index = max_index;
    }
}

fn build_view<T: TableRow>(inner: &EngineInner<T>) -> DerivedView<T> {
    let mut rows = filtered_rows(inner);
    sort_rows(&mut rows, inner);

    let filtered = rows.len();
    let total_filtered_count = match inner.external_page_count {
        Some(_) => inner.total_count.unwrap_or(filtered),
        None => filtered,
    };
    let page_count = page_count_of(inner, filtered);
    let rows = slice_page(rows, inner, page_count);

    let selected_rows = inner
        .dataset
        .iter()
        .filter(|row| inner.selection.is_selected(&row.row_id()))
        .cloned()
        .collect();

    DerivedView {
        rows,
        page_count,
        total_filtered_count,
        selected_rows,
        expanded: inner.expansion.ids().clone(),
    }
}
