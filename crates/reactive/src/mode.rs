//! Pagination mode selection.

/// How a live view materializes its result set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PaginationMode {
    /// Everything at once; no bound on the query.
    None,
    /// A growing prefix of the result, extended with "load more".
    InfiniteScroll,
    /// Discrete pages of a fixed size.
    Traditional,
}

impl PaginationMode {
    /// Returns true if the mode bounds its queries.
    #[inline]
    pub fn is_paginated(self) -> bool {
        !matches!(self, PaginationMode::None)
    }
}

/// Selects the pagination mode for a page size and optional starting page.
///
/// A zero page size disables pagination regardless of the starting page.
pub fn select_mode(page_size: usize, starting_page: Option<usize>) -> PaginationMode {
    if page_size == 0 {
        PaginationMode::None
    } else if starting_page.is_none() {
        PaginationMode::InfiniteScroll
    } else {
        PaginationMode::Traditional
    }
}
