use core::{cmp::Ordering, convert::Infallible};

use crate::{
    id::RecordId,
    page::{BoundaryLookup, Filter, PageSource, Record, SortKey},
};

/// An in-memory collection that answers queries the way a document store
/// would: filter, order by the sort keys, then limit.
///
/// A missing sort field compares as smaller than any value.
#[derive(Clone, Debug)]
pub struct MemoryCollection<R> {
    rows: Vec<R>,
}

impl<R> MemoryCollection<R> {
    pub const fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn insert(&mut self, row: R) {
        self.rows.push(row);
    }

    /// Removes every row with `id`, returning how many were removed.
    pub fn remove(&mut self, id: RecordId) -> usize
    where
        R: Record,
    {
        let before = self.rows.len();
        self.rows.retain(|row| row.id() != id);
        before - self.rows.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }
}

impl<R> Default for MemoryCollection<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> From<Vec<R>> for MemoryCollection<R> {
    fn from(rows: Vec<R>) -> Self {
        Self { rows }
    }
}

impl<R> FromIterator<R> for MemoryCollection<R> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

fn compare<R: Record>(a: &R, b: &R, sort: &[SortKey]) -> Ordering {
    sort.iter()
        .map(|key| {
            key.direction
                .apply(a.value(&key.field).cmp(&b.value(&key.field)))
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

impl<R: Record + Clone> PageSource for MemoryCollection<R> {
    type Row = R;
    type Error = Infallible;

    fn fetch(
        &self,
        filter: &Filter,
        sort: &[SortKey],
        limit: Option<usize>,
    ) -> Result<Vec<R>, Self::Error> {
        let mut matched: Vec<&R> = self.rows.iter().filter(|r| filter.matches(*r)).collect();
        matched.sort_by(|a, b| compare(*a, *b, sort));
        let limit = limit.unwrap_or(matched.len());
        Ok(matched.into_iter().take(limit).cloned().collect())
    }
}

impl<R: Record + Clone> BoundaryLookup for MemoryCollection<R> {
    fn find_by_id(&self, id: RecordId) -> Result<Option<R>, Self::Error> {
        Ok(self.rows.iter().find(|row| row.id() == id).cloned())
    }
}
