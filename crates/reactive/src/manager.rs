//! Subscription lifecycle of a paginated view.
//!
//! The manager owns two slots: the "result" subscription, which feeds the
//! current page or prefix into the reducer, and (page-based pagination only)
//! the "count" subscription, which keeps the page count up to date.
//!
//! A slot holds at most one live handle. Replacing it always disposes the old
//! handle first, and every subscription is tagged with the slot generation it
//! was opened under. Emissions carrying an outdated generation are dropped, so
//! a superseded query can never overwrite the result of its successor.

use crate::config::PaginationConfig;
use crate::materialize::{count_query, page_count, query_for_cursor};
use crate::mode::PaginationMode;
use crate::state::{PageCursor, PaginationEvent};
use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::string::String;
use core::cell::{Cell, RefCell};
use livepage_core::SortOrder;
use livepage_source::{Emission, Listener, LiveSource, SourceId, SubscriptionHandle};
use tracing::{debug, trace};

/// The side of a pager the manager drives.
///
/// Implemented by the pager core; the manager reads the configuration and
/// cursor from it and feeds events back through `dispatch`.
pub trait PaginationDriver<T> {
    /// Returns the configuration.
    fn config(&self) -> &PaginationConfig;

    /// Returns the pagination mode.
    fn mode(&self) -> PaginationMode;

    /// Returns the current query bounds.
    fn cursor(&self) -> PageCursor;

    /// Runs an event through the reducer.
    fn dispatch(&self, event: PaginationEvent<T>);

    /// Returns true once the driver has been torn down. A disposed driver
    /// never gets new subscriptions.
    fn is_disposed(&self) -> bool;
}

/// Inputs that identify a result query.
#[derive(Clone, Debug, PartialEq, Eq)]
struct ResultKey {
    source: SourceId,
    page_size: usize,
    mode: PaginationMode,
    sort_by: Option<String>,
    sort_order: SortOrder,
    limit: usize,
    page: Option<usize>,
}

/// Inputs that identify a count query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct CountKey {
    source: SourceId,
    page_size: usize,
}

/// A subscription slot.
struct Slot<K> {
    name: &'static str,
    handle: RefCell<Option<SubscriptionHandle>>,
    key: RefCell<Option<K>>,
    generation: Rc<Cell<u64>>,
}

impl<K: PartialEq> Slot<K> {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            handle: RefCell::new(None),
            key: RefCell::new(None),
            generation: Rc::new(Cell::new(0)),
        }
    }

    fn is_current(&self, key: &K) -> bool {
        self.key.borrow().as_ref() == Some(key)
    }

    fn is_generation(&self, generation: u64) -> bool {
        self.generation.get() == generation
    }

    /// Starts a new generation for `key`. Emissions of older generations are
    /// dropped from here on.
    fn begin(&self, key: K) -> u64 {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        *self.key.borrow_mut() = Some(key);
        generation
    }

    /// Disposes the held handle, if any.
    fn teardown(&self) -> bool {
        let old = self.handle.borrow_mut().take();
        match old {
            Some(handle) => {
                let id = handle.id();
                handle.dispose();
                debug!(slot = self.name, subscription = id, "subscription released");
                true
            }
            None => false,
        }
    }

    /// Installs a freshly opened handle, unless `generation` was superseded
    /// while the source was subscribing.
    fn install(&self, generation: u64, handle: SubscriptionHandle) {
        if !self.is_generation(generation) {
            trace!(slot = self.name, subscription = handle.id(), "superseded subscription released");
            handle.dispose();
            return;
        }
        self.teardown();
        debug!(slot = self.name, subscription = handle.id(), generation, "subscription opened");
        *self.handle.borrow_mut() = Some(handle);
    }

    /// Releases the slot and invalidates its generation.
    fn release(&self) -> bool {
        self.generation.set(self.generation.get() + 1);
        *self.key.borrow_mut() = None;
        self.teardown()
    }

    fn is_live(&self) -> bool {
        self.handle
            .borrow()
            .as_ref()
            .map(|handle| !handle.is_released())
            .unwrap_or(false)
    }
}

/// Keeps a pager's live subscriptions in step with its state.
pub struct SubscriptionManager<S: LiveSource> {
    source: RefCell<Rc<S>>,
    result: Slot<ResultKey>,
    count: Slot<CountKey>,
}

impl<S: LiveSource + 'static> SubscriptionManager<S> {
    /// Creates a manager over `source` with no live subscriptions.
    pub fn new(source: S) -> Self {
        Self {
            source: RefCell::new(Rc::new(source)),
            result: Slot::new("result"),
            count: Slot::new("count"),
        }
    }

    /// Returns the identity of the current source.
    pub fn source_id(&self) -> SourceId {
        self.source.borrow().source_id()
    }

    /// Swaps the source. The next `sync` resubscribes against it.
    pub fn replace_source(&self, source: S) {
        let old = core::mem::replace(&mut *self.source.borrow_mut(), Rc::new(source));
        debug!(from = old.source_id(), to = self.source_id(), "source replaced");
    }

    /// Brings the subscriptions in line with the driver's current state.
    pub fn sync<D>(&self, driver: &Rc<D>)
    where
        D: PaginationDriver<S::Item> + 'static,
    {
        if driver.is_disposed() {
            return;
        }
        if self.sync_result(driver) {
            self.sync_count(driver);
        }
    }

    /// Releases every subscription. Pending emissions are discarded.
    pub fn release_all(&self) {
        self.result.release();
        self.count.release();
    }

    /// Returns the number of live subscription handles.
    pub fn live_count(&self) -> usize {
        usize::from(self.result.is_live()) + usize::from(self.count.is_live())
    }

    /// Forgets the current result query so the next `sync` reopens it.
    pub fn invalidate_result(&self) {
        *self.result.key.borrow_mut() = None;
    }

    /// Returns true if a count subscription is held.
    pub fn has_count_subscription(&self) -> bool {
        self.count.is_live()
    }

    fn current_source(&self) -> Rc<S> {
        self.source.borrow().clone()
    }

    /// Returns false if the source rejected the result query.
    fn sync_result<D>(&self, driver: &Rc<D>) -> bool
    where
        D: PaginationDriver<S::Item> + 'static,
    {
        let source = self.current_source();
        let config = driver.config();
        let mode = driver.mode();
        let cursor = driver.cursor();
        let key = ResultKey {
            source: source.source_id(),
            page_size: config.page_size(),
            mode,
            sort_by: config.sort_by().map(String::from),
            sort_order: config.sort_order(),
            limit: cursor.limit,
            page: cursor.page,
        };
        let query = query_for_cursor(cursor, config, mode);
        if !source.is_query_valid(&query) {
            let released_result = self.result.release();
            let released_count = self.count.release();
            debug!(
                source = key.source,
                ?query,
                released_result,
                released_count,
                "query not subscribable"
            );
            return false;
        }
        if self.result.is_current(&key) {
            return true;
        }

        let generation = self.result.begin(key);
        driver.dispatch(PaginationEvent::QueryChanged);
        if driver.is_disposed() {
            return false;
        }
        if !self.result.is_generation(generation) {
            // A re-entrant sync already moved on.
            return true;
        }

        self.result.teardown();
        let listener = result_listener(
            Rc::downgrade(driver),
            self.result.generation.clone(),
            generation,
        );
        debug!(source = source.source_id(), ?query, generation, "subscribing");
        let handle = source.subscribe(&query, listener);
        self.result.install(generation, handle);
        true
    }

    fn sync_count<D>(&self, driver: &Rc<D>)
    where
        D: PaginationDriver<S::Item> + 'static,
    {
        if driver.is_disposed() {
            return;
        }
        if driver.mode() != PaginationMode::Traditional || driver.cursor().page.is_none() {
            self.count.release();
            return;
        }

        let source = self.current_source();
        let page_size = driver.config().page_size();
        let key = CountKey {
            source: source.source_id(),
            page_size,
        };
        let query = count_query();
        if !source.is_query_valid(&query) {
            self.count.release();
            debug!(source = key.source, "count query not subscribable");
            return;
        }
        if self.count.is_current(&key) {
            return;
        }

        let generation = self.count.begin(key);
        self.count.teardown();
        let listener = count_listener(
            Rc::downgrade(driver),
            self.count.generation.clone(),
            generation,
            page_size,
        );
        let handle = source.subscribe(&query, listener);
        self.count.install(generation, handle);
    }
}

impl<S: LiveSource> Drop for SubscriptionManager<S> {
    fn drop(&mut self) {
        self.result.release();
        self.count.release();
    }
}

fn result_listener<D, T>(driver: Weak<D>, current: Rc<Cell<u64>>, generation: u64) -> Listener<T>
where
    D: PaginationDriver<T> + 'static,
    T: 'static,
{
    Box::new(move |emission: Emission<T>| {
        if current.get() != generation {
            trace!(generation, "stale result emission discarded");
            return;
        }
        if let Some(driver) = driver.upgrade() {
            let items = emission.into_items();
            trace!(generation, items = items.len(), "result emission");
            driver.dispatch(PaginationEvent::FetchSuccess(items));
        }
    })
}

fn count_listener<D, T>(
    driver: Weak<D>,
    current: Rc<Cell<u64>>,
    generation: u64,
    page_size: usize,
) -> Listener<T>
where
    D: PaginationDriver<T> + 'static,
    T: 'static,
{
    Box::new(move |emission: Emission<T>| {
        if current.get() != generation {
            trace!(generation, "stale count emission discarded");
            return;
        }
        if let Some(driver) = driver.upgrade() {
            let total = emission.len();
            trace!(generation, total, "count emission");
            driver.dispatch(PaginationEvent::CountPages(page_count(total, page_size)));
        }
    })
}
