//! Row identity trait and column schema types.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Trait for records displayed as table rows.
///
/// The engine never interprets a row's shape beyond this identity and the
/// column accessors. The id must be stable across dataset refreshes for the
/// same logical entity: selection and expansion are tracked by it, never by
/// array position.
///
/// # Examples
///
/// ```ignore
/// impl TableRow for Container {
///     fn row_id(&self) -> String {
///         self.id.clone()
///     }
/// }
/// ```
pub trait TableRow: Clone + Send + Sync + 'static {
    /// Stable identity for selection and expansion tracking.
    fn row_id(&self) -> String;
}

/// Rendered value of a single cell.
///
/// [`Display`](fmt::Display) gives the string used for text filtering and
/// export; [`CellValue::compare`] gives the default sort order.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Number(f64),
    Bool(bool),
    /// Absent data; sorts after every present value regardless of direction.
    Missing,
}

impl CellValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Integer(value) => Some(*value as f64),
            CellValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    fn type_rank(&self) -> u8 {
        match self {
            CellValue::Integer(_) | CellValue::Number(_) => 0,
            CellValue::Text(_) => 1,
            CellValue::Bool(_) => 2,
            CellValue::Missing => 3,
        }
    }

    /// Type-aware ascending compare: numbers numerically, strings
    /// case-insensitively, bools false-before-true. Mixed types order by
    /// type rank (numbers, text, bools, then missing).
    pub fn compare(&self, other: &CellValue) -> Ordering {
        if let (Some(a), Some(b)) = (self.as_number(), other.as_number()) {
            return a.total_cmp(&b);
        }

        let rank = self.type_rank().cmp(&other.type_rank());
        if rank != Ordering::Equal {
            return rank;
        }

        match (self, other) {
            (CellValue::Text(a), CellValue::Text(b)) => {
                let folded = a.to_lowercase().cmp(&b.to_lowercase());
                // Tie-break case-insensitive equals for a deterministic order
                if folded == Ordering::Equal { a.cmp(b) } else { folded }
            }
            (CellValue::Bool(a), CellValue::Bool(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(value) => write!(f, "{value}"),
            CellValue::Integer(value) => write!(f, "{value}"),
            CellValue::Number(value) => write!(f, "{value}"),
            CellValue::Bool(value) => write!(f, "{value}"),
            CellValue::Missing => Ok(()),
        }
    }
}

type Accessor<T> = Arc<dyn Fn(&T) -> CellValue + Send + Sync>;
type Comparator<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// Column configuration.
///
/// Columns define the schema of a table: an id unique within the schema, an
/// accessor from row to cell value, and optional sorting, filtering and
/// visibility behavior. Columns are immutable once a table is constructed.
///
/// # Examples
///
/// ```ignore
/// let columns = vec![
///     Column::new("name", "Name", |c: &Container| CellValue::Text(c.name.clone())).sortable(),
///     Column::new("created", "Created", |c| CellValue::Integer(c.created)).sortable(),
///     Column::new("ports", "Ports", |c| ports_cell(c)).hideable(),
/// ];
/// ```
pub struct Column<T> {
    id: String,
    header: String,
    accessor: Accessor<T>,
    comparator: Option<Comparator<T>>,
    sortable: bool,
    filterable: bool,
    can_toggle_visibility: bool,
    hidden_by_default: bool,
}

impl<T> Column<T> {
    /// Create a column with an id, header text, and cell accessor.
    pub fn new(
        id: impl Into<String>,
        header: impl Into<String>,
        accessor: impl Fn(&T) -> CellValue + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            header: header.into(),
            accessor: Arc::new(accessor),
            comparator: None,
            sortable: false,
            filterable: true,
            can_toggle_visibility: false,
            hidden_by_default: false,
        }
    }

    /// Make the column sortable.
    ///
    /// Sortable columns are the ones a rendering shell offers sort
    /// indicators for; the engine itself accepts a sort on any schema
    /// column.
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Use a custom row comparator instead of the type-aware default.
    ///
    /// The comparator defines the ascending order and owns its own
    /// missing-value semantics; descending sorts reverse it wholesale.
    pub fn with_comparator(
        mut self,
        comparator: impl Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    ) -> Self {
        self.comparator = Some(Arc::new(comparator));
        self.sortable = true;
        self
    }

    /// Exclude this column's values from text filtering.
    pub fn exclude_from_filter(mut self) -> Self {
        self.filterable = false;
        self
    }

    /// Allow the user to toggle this column's visibility.
    pub fn hideable(mut self) -> Self {
        self.can_toggle_visibility = true;
        self
    }

    /// Hide the column until the user configures visibility.
    pub fn hidden_by_default(mut self) -> Self {
        self.can_toggle_visibility = true;
        self.hidden_by_default = true;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    pub fn is_filterable(&self) -> bool {
        self.filterable
    }

    pub fn can_toggle_visibility(&self) -> bool {
        self.can_toggle_visibility
    }

    pub fn is_hidden_by_default(&self) -> bool {
        self.hidden_by_default
    }

    /// Rendered value of this column's cell for a row.
    pub fn value(&self, row: &T) -> CellValue {
        (self.accessor)(row)
    }

    /// Compare two rows under this column in the given direction.
    ///
    /// With the default comparator, missing values sort last in both
    /// directions; a custom comparator is reversed wholesale for descending.
    pub fn compare_rows(&self, a: &T, b: &T, descending: bool) -> Ordering {
        if let Some(comparator) = &self.comparator {
            let ordering = comparator(a, b);
            return if descending { ordering.reverse() } else { ordering };
        }

        let a = self.value(a);
        let b = self.value(b);
        match (a.is_missing(), b.is_missing()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => {
                let ordering = a.compare(&b);
                if descending { ordering.reverse() } else { ordering }
            }
        }
    }
}

impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            header: self.header.clone(),
            accessor: Arc::clone(&self.accessor),
            comparator: self.comparator.as_ref().map(Arc::clone),
            sortable: self.sortable,
            filterable: self.filterable,
            can_toggle_visibility: self.can_toggle_visibility,
            hidden_by_default: self.hidden_by_default,
        }
    }
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("id", &self.id)
            .field("header", &self.header)
            .field("sortable", &self.sortable)
            .field("filterable", &self.filterable)
            .field("can_toggle_visibility", &self.can_toggle_visibility)
            .field("hidden_by_default", &self.hidden_by_default)
            .finish_non_exhaustive()
    }
}
