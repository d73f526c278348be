#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    id::RecordId,
    page::{
        BoundaryLookup, Cursor, Error, Filter, ID_FIELD, Page, PageRequest, PageSize, PageSource,
        PaginateError, Record, Result, SortDirection, SortKey, Value,
    },
};

/// Keyset ("cursor") pagination over a composite `(sort_field, id)` key.
///
/// The paginator is stateless: it turns a cursor into a filter, tells the
/// storage collaborator how to order and how many rows to fetch, and trims
/// the over-fetched result. Because the record identifier is always the
/// second sort key, the order is total even when the sort field has ties,
/// and pages neither repeat nor skip rows.
///
/// ```
/// use keyflake::{Cursor, Filter, KeysetPaginator, RecordId, SortDirection, Value};
///
/// let paginator = KeysetPaginator::new("created_at", SortDirection::Descending);
/// let cursor = Cursor::new(Value::Timestamp(500), RecordId::from(9, 0, 0));
///
/// let filter = paginator.build_filter(Filter::eq("kind", "movie"), Some(&cursor));
/// assert_eq!(
///     filter.to_string(),
///     "(kind = \"movie\" AND (created_at < 500 OR (created_at = 500 AND _id < 37748736)))",
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeysetPaginator {
    sort_field: String,
    direction: SortDirection,
}

impl KeysetPaginator {
    pub fn new(sort_field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            sort_field: sort_field.into(),
            direction,
        }
    }

    /// Paginates by identifier alone, which is creation order.
    pub fn by_id(direction: SortDirection) -> Self {
        Self::new(ID_FIELD, direction)
    }

    pub fn sort_field(&self) -> &str {
        &self.sort_field
    }

    pub const fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Adds the "strictly past the cursor" condition to `base`.
    ///
    /// Without a cursor, `base` is returned unchanged. With one, the result
    /// is `base AND (f beyond v OR (f = v AND id beyond cursor.id))`, where
    /// "beyond" is `>` ascending and `<` descending.
    pub fn build_filter(&self, base: Filter, cursor: Option<&Cursor>) -> Filter {
        let Some(cursor) = cursor else {
            return base;
        };
        let id = Value::Id(cursor.id);
        if self.sort_field == ID_FIELD {
            return base.and(self.direction.beyond(ID_FIELD, id));
        }
        let boundary = self
            .direction
            .beyond(self.sort_field.clone(), cursor.value.clone())
            .or(Filter::eq(self.sort_field.clone(), cursor.value.clone())
                .and(self.direction.beyond(ID_FIELD, id)));
        base.and(boundary)
    }

    /// The composite order storage must return rows in.
    pub fn sort_keys(&self) -> [SortKey; 2] {
        [
            SortKey::new(self.sort_field.clone(), self.direction),
            SortKey::new(ID_FIELD, self.direction),
        ]
    }

    /// Cursor positioned at `row`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingSortField`] if the row has no value for the
    /// sort field.
    pub fn cursor_after<R: Record + ?Sized>(&self, row: &R) -> Result<Cursor> {
        Cursor::from_record(row, &self.sort_field).ok_or_else(|| Error::MissingSortField {
            field: self.sort_field.clone(),
            id: row.id(),
        })
    }

    /// Trims an over-fetched result to one page.
    ///
    /// `rows` must be what storage returned for [`PageSize::fetch_limit`]:
    /// at most `size + 1` rows in scan order. Exactly `size + 1` rows means
    /// there is another page; the extra row is dropped and the cursor of the
    /// last kept row is returned. Order is preserved.
    ///
    /// # Errors
    ///
    /// - [`Error::Overfetched`] if more than `size + 1` rows were passed
    /// - [`Error::MissingSortField`] if the last kept row lacks the sort field
    pub fn trim_page<R: Record>(&self, mut rows: Vec<R>, size: PageSize) -> Result<Page<R>> {
        let (Some(size), Some(limit)) = (size.get(), size.fetch_limit()) else {
            return Ok(Page {
                rows,
                has_more: false,
                next_cursor: None,
            });
        };

        if rows.len() > limit {
            return Err(Error::Overfetched {
                rows: rows.len(),
                limit,
            });
        }

        let has_more = rows.len() == limit;
        if has_more {
            rows.truncate(size);
        }
        let next_cursor = match rows.last() {
            Some(last) if has_more => Some(self.cursor_after(last)?),
            _ => None,
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            sort_field = %self.sort_field,
            rows = rows.len(),
            has_more,
            "trimmed page"
        );

        Ok(Page {
            rows,
            has_more,
            next_cursor,
        })
    }

    /// One full list-query round trip: build the filter, fetch
    /// `size + 1` rows in composite order, trim.
    ///
    /// # Errors
    ///
    /// - [`PaginateError::Source`] with the storage error, unchanged
    /// - [`PaginateError::Page`] if trimming fails
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "trace", skip_all, fields(sort_field = %self.sort_field))
    )]
    pub fn paginate<S: PageSource>(
        &self,
        source: &S,
        request: &PageRequest,
    ) -> Result<Page<S::Row>, PaginateError<S::Error>> {
        let filter = self.build_filter(request.filter.clone(), request.cursor.as_ref());
        let rows = source
            .fetch(&filter, &self.sort_keys(), request.size.fetch_limit())
            .map_err(PaginateError::Source)?;
        Ok(self.trim_page(rows, request.size)?)
    }

    /// Builds the cursor for a client that names the previous page's last
    /// row by identifier.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownBoundary`] if no row has `id`
    /// - [`Error::MissingSortField`] if the row lacks the sort field
    /// - [`PaginateError::Source`] with the storage error, unchanged
    pub fn cursor_from_last_id<S: BoundaryLookup>(
        &self,
        source: &S,
        id: RecordId,
    ) -> Result<Cursor, PaginateError<S::Error>> {
        let row = source
            .find_by_id(id)
            .map_err(PaginateError::Source)?
            .ok_or(Error::UnknownBoundary { id })?;
        Ok(self.cursor_after(&row)?)
    }
}
