//! The paginated live view.
//!
//! `LivePager` ties the pieces together: it owns the state, runs every event
//! through the reducer, keeps the subscriptions in step via the
//! `SubscriptionManager`, and exposes the consumer-facing operations.
//!
//! The state lives in a shared core that source callbacks reach through a
//! weak reference, so a dropped pager is never called back.

use crate::config::PaginationConfig;
use crate::manager::{PaginationDriver, SubscriptionManager};
use crate::mode::PaginationMode;
use crate::state::{reduce, PageCursor, PaginationEvent, PaginationState};
use crate::watch::{StateWatchers, WatchId};
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;
use livepage_core::{Materialize, Materialized, Result};
use livepage_source::{LiveSource, SourceId};
use tracing::{debug, trace};

struct Core<S: LiveSource> {
    config: PaginationConfig,
    mode: PaginationMode,
    state: RefCell<PaginationState<S::Item>>,
    watchers: RefCell<StateWatchers<S::Item>>,
    manager: SubscriptionManager<S>,
    disposed: Cell<bool>,
}

impl<S: LiveSource + 'static> PaginationDriver<S::Item> for Core<S> {
    fn config(&self) -> &PaginationConfig {
        &self.config
    }

    fn mode(&self) -> PaginationMode {
        self.mode
    }

    fn cursor(&self) -> PageCursor {
        self.state.borrow().cursor()
    }

    fn dispatch(&self, event: PaginationEvent<S::Item>) {
        if self.disposed.get() {
            trace!("event after dispose dropped");
            return;
        }

        {
            let mut state = self.state.borrow_mut();
            let current = core::mem::take(&mut *state);
            *state = reduce(current, event);
        }

        // Watchers may call back into the pager, so no borrow is held while
        // they run.
        let callbacks = self.watchers.borrow().callbacks();
        if callbacks.is_empty() {
            return;
        }
        let snapshot = self.state.borrow().clone();
        for callback in callbacks {
            callback(&snapshot);
        }
    }

    fn is_disposed(&self) -> bool {
        self.disposed.get()
    }
}

/// A reactive, paginated view over a live source.
///
/// # Example
///
/// ```rust
/// use livepage_core::Record;
/// use livepage_reactive::{LivePager, PaginationConfig};
/// use livepage_source::Collection;
///
/// let items = Collection::new("items");
/// for i in 1..=3 {
///     items.insert(Record::new(i)).unwrap();
/// }
///
/// let config = PaginationConfig::builder().page_size(2).build().unwrap();
/// let pager = LivePager::new(items.clone(), config).unwrap();
/// assert_eq!(pager.items().len(), 2);
/// assert!(!pager.is_exhausted());
///
/// assert!(pager.fetch_more());
/// assert_eq!(pager.items().len(), 3);
/// assert!(pager.is_exhausted());
/// ```
pub struct LivePager<S: LiveSource + 'static> {
    core: Rc<Core<S>>,
}

impl<S: LiveSource + 'static> LivePager<S> {
    /// Creates a pager over `source` and opens its subscriptions.
    ///
    /// Fails if the configuration does not validate.
    pub fn new(source: S, config: PaginationConfig) -> Result<Self> {
        config.validate()?;
        let mode = config.mode();
        let core = Rc::new(Core {
            state: RefCell::new(PaginationState::initial(&config)),
            config,
            mode,
            watchers: RefCell::new(StateWatchers::new()),
            manager: SubscriptionManager::new(source),
            disposed: Cell::new(false),
        });
        debug!(?mode, source = core.manager.source_id(), "pager created");

        let pager = Self { core };
        pager.sync();
        Ok(pager)
    }

    /// Loads the next batch. Infinite scroll only.
    ///
    /// Ignored while a fetch is in flight or once the source is exhausted.
    /// Returns true if the request was accepted.
    pub fn fetch_more(&self) -> bool {
        if self.is_disposed() {
            return false;
        }
        if self.core.mode != PaginationMode::InfiniteScroll {
            trace!(mode = ?self.core.mode, "fetch_more ignored outside infinite scroll");
            return false;
        }
        let (fetching, exhausted) = {
            let state = self.core.state.borrow();
            (state.is_fetching, state.is_exhausted)
        };
        if fetching || exhausted {
            trace!(fetching, exhausted, "fetch_more ignored");
            return false;
        }

        self.core
            .dispatch(PaginationEvent::FetchMore(self.core.config.page_size()));
        self.sync();
        true
    }

    /// Jumps to a 1-based page. Page-based pagination only.
    ///
    /// Pages outside `1..=page_count` are ignored. Returns true if the
    /// request was accepted.
    pub fn fetch_page(&self, page: usize) -> bool {
        if self.is_disposed() {
            return false;
        }
        if self.core.mode != PaginationMode::Traditional {
            trace!(mode = ?self.core.mode, "fetch_page ignored outside page-based pagination");
            return false;
        }
        let (page_count, current) = {
            let state = self.core.state.borrow();
            (state.page_count, state.page)
        };
        if page == 0 || page > page_count {
            trace!(page, page_count, "fetch_page out of range");
            return false;
        }

        self.core.dispatch(PaginationEvent::FetchPage(page));
        if current == Some(page) {
            // Same query: reopen it so the fetch completes.
            self.core.manager.invalidate_result();
        }
        self.sync();
        true
    }

    /// Shrinks an infinite-scroll view back to its first batch.
    ///
    /// Ignored when only the first batch is loaded. Returns true if the
    /// request was accepted.
    pub fn reset_list(&self) -> bool {
        if self.is_disposed() {
            return false;
        }
        if self.core.mode != PaginationMode::InfiniteScroll {
            trace!(mode = ?self.core.mode, "reset_list ignored outside infinite scroll");
            return false;
        }
        let page_size = self.core.config.page_size();
        let limit = self.core.state.borrow().limit;
        if limit <= page_size {
            trace!(limit, page_size, "reset_list ignored");
            return false;
        }

        self.core.dispatch(PaginationEvent::Reset(page_size));
        self.sync();
        true
    }

    /// Returns the raw result items.
    pub fn items(&self) -> Vec<S::Item> {
        self.core.state.borrow().result.clone()
    }

    /// Returns a copy of the full state.
    pub fn snapshot(&self) -> PaginationState<S::Item> {
        self.core.state.borrow().clone()
    }

    #[inline]
    pub fn is_fetching(&self) -> bool {
        self.core.state.borrow().is_fetching
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.core.state.borrow().is_exhausted
    }

    #[inline]
    pub fn page_count(&self) -> usize {
        self.core.state.borrow().page_count
    }

    /// Returns the current page, `None` when unpaginated.
    #[inline]
    pub fn current_page(&self) -> Option<usize> {
        self.core.state.borrow().page
    }

    #[inline]
    pub fn limit(&self) -> usize {
        self.core.state.borrow().limit
    }

    #[inline]
    pub fn mode(&self) -> PaginationMode {
        self.core.mode
    }

    #[inline]
    pub fn config(&self) -> &PaginationConfig {
        &self.core.config
    }

    /// Registers a callback run with the new state after every transition.
    pub fn watch<F>(&self, callback: F) -> WatchId
    where
        F: Fn(&PaginationState<S::Item>) + 'static,
    {
        self.core.watchers.borrow_mut().watch(callback)
    }

    /// Removes a watcher. Returns true if it was registered.
    pub fn unwatch(&self, id: WatchId) -> bool {
        self.core.watchers.borrow_mut().unwatch(id)
    }

    /// Swaps the live source and resubscribes against it.
    pub fn replace_source(&self, source: S) {
        if self.is_disposed() {
            return;
        }
        self.core.manager.replace_source(source);
        self.sync();
    }

    /// Retries subscribing, e.g. after the source rejected a query.
    pub fn resync(&self) {
        if !self.is_disposed() {
            self.sync();
        }
    }

    /// Returns the identity of the current source.
    pub fn source_id(&self) -> SourceId {
        self.core.manager.source_id()
    }

    /// Returns the number of live subscriptions (at most two).
    pub fn live_subscriptions(&self) -> usize {
        self.core.manager.live_count()
    }

    /// Releases every subscription and watcher.
    ///
    /// The pager keeps its last state but never changes again. Calling this
    /// more than once is harmless; dropping the pager does it too.
    pub fn dispose(&self) {
        if self.core.disposed.replace(true) {
            return;
        }
        self.core.manager.release_all();
        self.core.watchers.borrow_mut().clear();
        debug!(source = self.core.manager.source_id(), "pager disposed");
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.core.disposed.get()
    }

    fn sync(&self) {
        self.core.manager.sync(&self.core);
    }
}

impl<S> LivePager<S>
where
    S: LiveSource + 'static,
    S::Item: Materialize,
{
    /// Returns the result, projected to plain values when configured to.
    pub fn result(&self) -> Vec<Materialized<S::Item>> {
        let plain = self.core.config.materialize_plain();
        self.core
            .state
            .borrow()
            .result
            .iter()
            .map(|item| Materialized::project(item.clone(), plain))
            .collect()
    }
}

impl<S: LiveSource + 'static> Drop for LivePager<S> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<S: LiveSource + 'static> fmt::Debug for LivePager<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.core.state.borrow();
        f.debug_struct("LivePager")
            .field("mode", &self.core.mode)
            .field("items", &state.result.len())
            .field("is_fetching", &state.is_fetching)
            .field("is_exhausted", &state.is_exhausted)
            .field("limit", &state.limit)
            .field("page", &state.page)
            .field("page_count", &state.page_count)
            .field("disposed", &self.core.disposed.get())
            .finish()
    }
}
