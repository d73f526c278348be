use crate::{
    id::RecordId,
    page::{Cursor, Filter, PageSize, Record, SortDirection},
};

/// One component of the composite sort order handed to storage.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

/// Everything a list query asks for.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageRequest {
    /// Caller-supplied criteria; the boundary condition is added to these.
    pub filter: Filter,
    /// Resume after this position; `None` for the first page.
    pub cursor: Option<Cursor>,
    pub size: PageSize,
}

impl PageRequest {
    pub fn first(filter: Filter, size: PageSize) -> Self {
        Self {
            filter,
            cursor: None,
            size,
        }
    }

    /// The request for the page following `page`, or `None` if it was the
    /// last one.
    #[must_use]
    pub fn next<T>(&self, page: &Page<T>) -> Option<Self> {
        page.next_cursor.as_ref().map(|cursor| Self {
            filter: self.filter.clone(),
            cursor: Some(cursor.clone()),
            size: self.size,
        })
    }
}

/// A trimmed page of rows.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub has_more: bool,
    /// Position of the last row, present iff `has_more`.
    pub next_cursor: Option<Cursor>,
}

impl<T> Page<T> {
    pub const fn empty() -> Self {
        Self {
            rows: Vec::new(),
            has_more: false,
            next_cursor: None,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

/// The storage collaborator of a list query.
///
/// Implementations must return a consistent snapshot of the rows matching
/// `filter`, ordered by `sort` (each key in its own direction), truncated to
/// `limit` rows when a limit is given.
pub trait PageSource {
    type Row: Record;
    type Error;

    /// Executes one query.
    ///
    /// # Errors
    ///
    /// Whatever the storage layer reports; the paginator passes it through
    /// untouched.
    fn fetch(
        &self,
        filter: &Filter,
        sort: &[SortKey],
        limit: Option<usize>,
    ) -> Result<Vec<Self::Row>, Self::Error>;
}

/// A [`PageSource`] that can also load a single row by identifier, for
/// clients that resume after "the last id I saw" rather than a cursor.
pub trait BoundaryLookup: PageSource {
    /// Loads the row with `id`, if it exists.
    ///
    /// # Errors
    ///
    /// Whatever the storage layer reports.
    fn find_by_id(&self, id: RecordId) -> Result<Option<Self::Row>, Self::Error>;
}

impl<S: PageSource + ?Sized> PageSource for &S {
    type Row = S::Row;
    type Error = S::Error;

    fn fetch(
        &self,
        filter: &Filter,
        sort: &[SortKey],
        limit: Option<usize>,
    ) -> Result<Vec<Self::Row>, Self::Error> {
        (**self).fetch(filter, sort, limit)
    }
}

impl<S: BoundaryLookup + ?Sized> BoundaryLookup for &S {
    fn find_by_id(&self, id: RecordId) -> Result<Option<Self::Row>, Self::Error> {
        (**self).find_by_id(id)
    }
}
