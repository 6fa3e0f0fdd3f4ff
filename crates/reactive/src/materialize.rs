//! Derivation of concrete queries from configuration and state.

use crate::config::PaginationConfig;
use crate::mode::PaginationMode;
use crate::state::{PageCursor, PaginationState};
use livepage_source::QueryDescription;

/// Builds the result query for the current state.
pub fn materialize_query<T>(
    state: &PaginationState<T>,
    config: &PaginationConfig,
    mode: PaginationMode,
) -> QueryDescription {
    query_for_cursor(state.cursor(), config, mode)
}

/// Builds the result query for a cursor.
pub fn query_for_cursor(
    cursor: PageCursor,
    config: &PaginationConfig,
    mode: PaginationMode,
) -> QueryDescription {
    let mut query = QueryDescription::new();
    if let Some(field) = config.sort_by() {
        query = query.with_sort(field, config.sort_order());
    }

    match mode {
        PaginationMode::None => query,
        PaginationMode::InfiniteScroll => query.with_limit(cursor.limit),
        PaginationMode::Traditional => {
            let page_size = config.page_size();
            let page = cursor.page.unwrap_or(1);
            query
                .with_skip(page.saturating_sub(1).saturating_mul(page_size))
                .with_limit(page_size)
        }
    }
}

/// Builds the query that counts every item of the base query.
#[inline]
pub fn count_query() -> QueryDescription {
    QueryDescription::new()
}

/// Number of pages needed for `total` items.
#[inline]
pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        0
    } else {
        total.div_ceil(page_size)
    }
}
