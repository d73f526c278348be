use core::{fmt, num::NonZeroUsize, str::FromStr};

use crate::page::Error;

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: usize = 100;

/// Page size used when the request does not name one.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// A validated page size.
///
/// Bounded sizes lie in `1..=MAX_PAGE_SIZE`. [`PageSize::unbounded`] is the
/// explicit "no limit" form for internal listings; nothing converts to it
/// implicitly, and a size of zero is always an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PageSize(Option<NonZeroUsize>);

impl PageSize {
    /// # Errors
    ///
    /// Returns [`Error::InvalidPageSize`] if `size` is zero or larger than
    /// [`MAX_PAGE_SIZE`].
    pub fn new(size: usize) -> Result<Self, Error> {
        match NonZeroUsize::new(size) {
            Some(n) if size <= MAX_PAGE_SIZE => Ok(Self(Some(n))),
            _ => Err(Error::InvalidPageSize { size }),
        }
    }

    /// Every matching row on one page.
    pub const fn unbounded() -> Self {
        Self(None)
    }

    pub const fn is_unbounded(&self) -> bool {
        self.0.is_none()
    }

    /// Rows per page, or `None` when unbounded.
    pub fn get(&self) -> Option<usize> {
        self.0.map(NonZeroUsize::get)
    }

    /// How many rows to ask the storage collaborator for: one more than the
    /// page holds, so that the extra row signals `has_more`.
    pub fn fetch_limit(&self) -> Option<usize> {
        self.get().map(|n| n + 1)
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self(NonZeroUsize::new(DEFAULT_PAGE_SIZE))
    }
}

impl TryFrom<usize> for PageSize {
    type Error = Error;

    fn try_from(size: usize) -> Result<Self, Self::Error> {
        Self::new(size)
    }
}

impl FromStr for PageSize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("unbounded") {
            return Ok(Self::unbounded());
        }
        // Negative or non-numeric input is reported as size 0.
        Self::new(trimmed.parse().unwrap_or(0))
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(n) => write!(f, "{n}"),
            None => f.write_str("unbounded"),
        }
    }
}
