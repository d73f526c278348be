use crate::{base32, id::RecordId, page::MAX_PAGE_SIZE};

/// A result type defaulting to the pagination [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors raised by the pagination primitives themselves.
///
/// Storage failures are never folded into this type; see [`PaginateError`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A page size outside `1..=MAX_PAGE_SIZE`.
    #[error("page size {size} is outside 1..={max}", max = MAX_PAGE_SIZE)]
    InvalidPageSize { size: usize },

    #[error("invalid sort direction {input:?}; expected asc, desc, 1 or -1")]
    InvalidDirection { input: String },

    #[error("unknown value kind {input:?}")]
    InvalidValueKind { input: String },

    /// The caller handed [`trim_page`] more rows than the fetch limit, which
    /// means the query was issued with the wrong limit.
    ///
    /// [`trim_page`]: crate::page::KeysetPaginator::trim_page
    #[error("received {rows} rows but the fetch limit is {limit}")]
    Overfetched { rows: usize, limit: usize },

    /// A row used as a page boundary has no value for the sort field.
    #[error("record {id} has no value for sort field {field:?}")]
    MissingSortField { field: String, id: RecordId },

    /// The row named as the previous page's last row does not exist.
    #[error("no record with id {id} to resume after")]
    UnknownBoundary { id: RecordId },

    /// The cursor token is not valid base32.
    #[error("malformed cursor: {0}")]
    CursorEncoding(#[from] base32::Error),

    /// The decoded cursor is shorter than its fixed header and trailer.
    #[error("cursor is truncated ({len} bytes)")]
    CursorTruncated { len: usize },

    #[error("unsupported cursor version {version}")]
    CursorVersion { version: u8 },

    #[error("unknown cursor value tag {tag}")]
    CursorValueTag { tag: u8 },

    /// The payload does not match the shape its tag promises.
    #[error("cursor payload is malformed")]
    CursorPayload,

    /// The cursor's identifier sets the reserved bit.
    #[error("cursor identifier {raw} is not a valid record id")]
    CursorId { raw: u64 },

    /// A JSON document could not be used as a record.
    #[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
    #[cfg(feature = "serde")]
    #[error("invalid record: {reason}")]
    InvalidRecord { reason: String },
}

/// Failure of a full pagination round trip.
///
/// The storage collaborator's error is carried through untouched in
/// [`PaginateError::Source`].
#[derive(Debug, thiserror::Error)]
pub enum PaginateError<E> {
    #[error(transparent)]
    Page(#[from] Error),

    #[error("page source failed")]
    Source(#[source] E),
}

impl<E> PaginateError<E> {
    /// Returns the storage error, if that is what failed.
    pub fn into_source(self) -> Option<E> {
        match self {
            Self::Source(e) => Some(e),
            Self::Page(_) => None,
        }
    }
}
