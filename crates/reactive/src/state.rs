//! Pagination state and its reducer.
//!
//! State only changes through `reduce`, a pure function from the current
//! state and an event to the next state. Deciding whether an event applies in
//! the current mode is the pager's job, not the reducer's: every event is
//! accepted in every state.

use crate::config::PaginationConfig;
use crate::mode::PaginationMode;
use alloc::vec::Vec;

/// The bounds a result query is derived from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PageCursor {
    /// Requested result bound.
    pub limit: usize,
    /// Current 1-based page.
    pub page: Option<usize>,
}

/// State of a paginated live view.
#[derive(Clone, Debug, PartialEq)]
pub struct PaginationState<T> {
    /// Items currently materialized, in query order.
    pub result: Vec<T>,
    /// True while waiting for the current query's result.
    pub is_fetching: bool,
    /// True once a fetch returned fewer items than requested.
    pub is_exhausted: bool,
    /// Requested result bound.
    pub limit: usize,
    /// Current 1-based page; `None` when unpaginated.
    pub page: Option<usize>,
    /// Total number of pages, as last counted.
    pub page_count: usize,
}

impl<T> PaginationState<T> {
    /// Creates the mount-time state for a configuration.
    ///
    /// The view starts out fetching with an empty result.
    pub fn initial(config: &PaginationConfig) -> Self {
        let page = match config.mode() {
            PaginationMode::None => None,
            PaginationMode::InfiniteScroll => Some(1),
            PaginationMode::Traditional => config.starting_page(),
        };
        Self {
            result: Vec::new(),
            is_fetching: true,
            is_exhausted: false,
            limit: config.page_size(),
            page,
            page_count: 0,
        }
    }

    /// Returns the bounds the result query is derived from.
    #[inline]
    pub fn cursor(&self) -> PageCursor {
        PageCursor {
            limit: self.limit,
            page: self.page,
        }
    }
}

impl<T> Default for PaginationState<T> {
    fn default() -> Self {
        Self {
            result: Vec::new(),
            is_fetching: true,
            is_exhausted: false,
            limit: 0,
            page: None,
            page_count: 0,
        }
    }
}

/// Input to the reducer.
#[derive(Clone, Debug, PartialEq)]
pub enum PaginationEvent<T> {
    /// Drop the result and shrink the bound back to the given page size.
    Reset(usize),
    /// Grow the bound by the given page size.
    FetchMore(usize),
    /// Jump to a page.
    FetchPage(usize),
    /// A new total page count.
    CountPages(usize),
    /// The current query produced a result.
    FetchSuccess(Vec<T>),
    /// The materialized query changed; a new result is pending.
    QueryChanged,
}

/// Computes the next state.
pub fn reduce<T>(state: PaginationState<T>, event: PaginationEvent<T>) -> PaginationState<T> {
    match event {
        PaginationEvent::Reset(page_size) => PaginationState {
            result: Vec::new(),
            is_fetching: true,
            limit: page_size,
            ..state
        },
        PaginationEvent::FetchMore(page_size) => PaginationState {
            is_fetching: true,
            page: state.page.map(|page| page.saturating_add(1)),
            limit: state.limit.saturating_add(page_size),
            ..state
        },
        PaginationEvent::FetchPage(page) => PaginationState {
            is_fetching: true,
            page: Some(page),
            ..state
        },
        PaginationEvent::CountPages(page_count) => PaginationState { page_count, ..state },
        PaginationEvent::FetchSuccess(items) => {
            // A short result means nothing lies beyond it right now.
            let is_exhausted = state.limit == 0 || items.len() < state.limit;
            PaginationState {
                result: items,
                is_fetching: false,
                is_exhausted,
                ..state
            }
        }
        PaginationEvent::QueryChanged => PaginationState {
            is_fetching: true,
            ..state
        },
    }
}
