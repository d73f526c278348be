//! Keyset (cursor) pagination.
//!
//! A list query goes through three steps:
//!
//! 1. [`KeysetPaginator::build_filter`] adds "strictly past the cursor" to
//!    the caller's filter.
//! 2. The storage collaborator ([`PageSource`]) runs the query ordered by
//!    [`KeysetPaginator::sort_keys`] with limit [`PageSize::fetch_limit`],
//!    one more row than the page holds.
//! 3. [`KeysetPaginator::trim_page`] drops the extra row, if any, and
//!    reports `has_more` together with the cursor for the next page.
//!
//! [`KeysetPaginator::paginate`] runs all three.
//!
//! ```
//! use keyflake::{KeysetPaginator, PageRequest, PageSize, Record, RecordId, SortDirection, Value};
//! use keyflake::page::MemoryCollection;
//!
//! #[derive(Clone)]
//! struct Episode { id: RecordId, aired: i64 }
//!
//! impl Record for Episode {
//!     fn id(&self) -> RecordId { self.id }
//!     fn field(&self, name: &str) -> Option<Value> {
//!         (name == "aired").then_some(Value::Timestamp(self.aired))
//!     }
//! }
//!
//! let episodes: MemoryCollection<Episode> = (0..7)
//!     .map(|i| Episode { id: RecordId::from(i, 1, 0), aired: 1_000 * (i as i64 / 2) })
//!     .collect();
//!
//! let paginator = KeysetPaginator::new("aired", SortDirection::Descending);
//! let mut request = PageRequest::first(Default::default(), PageSize::new(3).unwrap());
//! let mut seen = Vec::new();
//! loop {
//!     let page = paginator.paginate(&episodes, &request).unwrap();
//!     let next = request.next(&page);
//!     seen.extend(page.rows.iter().map(|e| e.id.timestamp()));
//!     match next {
//!         Some(r) => request = r,
//!         None => break,
//!     }
//! }
//! assert_eq!(seen, [6, 5, 4, 3, 2, 1, 0]);
//! ```

mod cursor;
mod direction;
mod error;
mod filter;
#[cfg(feature = "serde")]
mod json;
mod memory;
mod paginator;
mod record;
mod size;
mod source;
mod value;

pub use cursor::*;
pub use direction::*;
pub use error::*;
pub use filter::*;
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
#[cfg(feature = "serde")]
pub use json::*;
pub use memory::*;
pub use paginator::*;
pub use record::*;
pub use size::*;
pub use source::*;
pub use value::*;
