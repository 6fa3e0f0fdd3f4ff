//! In-memory collection with live queries.
//!
//! A `Collection` stores records and re-evaluates every live query after each
//! mutation. Queries whose result changed (by record id and version) are
//! notified with the full new result; unchanged queries stay silent.
//!
//! Notifications are either delivered synchronously (`Delivery::Immediate`)
//! or queued until `flush` (`Delivery::Deferred`). Queued notifications for the
//! same subscription are coalesced, and a released subscription never receives
//! a queued notification.

use crate::query::QueryDescription;
use crate::registry::{Pending, Registry};
use crate::source::{next_source_id, Listener, LiveSource, SourceId};
use crate::subscription::{Subscription, SubscriptionHandle};
use alloc::collections::BTreeMap;
use alloc::rc::{Rc, Weak};
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use livepage_core::{Error, Record, RecordId, Result};
use tracing::{debug, trace};

pub use crate::registry::Selector;

/// When change notifications reach listeners.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Delivery {
    /// Notify inside the mutating call.
    #[default]
    Immediate,
    /// Queue notifications until `Collection::flush`.
    Deferred,
}

struct Inner {
    id: SourceId,
    name: String,
    delivery: Delivery,
    open: Cell<bool>,
    /// Records ordered by id.
    records: RefCell<BTreeMap<RecordId, Rc<Record>>>,
    registry: RefCell<Registry>,
    pending: RefCell<Vec<Pending>>,
}

/// An in-memory record collection supporting live queries.
///
/// Cloning a `Collection` yields another handle to the same data.
#[derive(Clone)]
pub struct Collection {
    inner: Rc<Inner>,
}

impl Collection {
    /// Creates an empty collection with immediate delivery.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_delivery(name, Delivery::Immediate)
    }

    /// Creates an empty collection with the given delivery mode.
    pub fn with_delivery(name: impl Into<String>, delivery: Delivery) -> Self {
        Self {
            inner: Rc::new(Inner {
                id: next_source_id(),
                name: name.into(),
                delivery,
                open: Cell::new(true),
                records: RefCell::new(BTreeMap::new()),
                registry: RefCell::new(Registry::default()),
                pending: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Returns the collection name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Returns the delivery mode.
    pub fn delivery(&self) -> Delivery {
        self.inner.delivery
    }

    /// Returns false once the collection has been closed.
    pub fn is_open(&self) -> bool {
        self.inner.open.get()
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.inner.records.borrow().len()
    }

    /// Returns true if the collection holds no records.
    pub fn is_empty(&self) -> bool {
        self.inner.records.borrow().is_empty()
    }

    /// Gets a record by id.
    pub fn get(&self, id: RecordId) -> Option<Rc<Record>> {
        self.inner.records.borrow().get(&id).cloned()
    }

    /// Returns all records ordered by id.
    pub fn records(&self) -> Vec<Rc<Record>> {
        self.inner.records.borrow().values().cloned().collect()
    }

    /// Inserts a new record.
    pub fn insert(&self, record: Record) -> Result<RecordId> {
        self.ensure_open()?;
        let id = record.id();
        {
            let mut records = self.inner.records.borrow_mut();
            if records.contains_key(&id) {
                return Err(Error::duplicate_record(self.name(), id));
            }
            records.insert(id, Rc::new(record));
        }
        self.changed();
        Ok(id)
    }

    /// Inserts many records, notifying live queries once.
    ///
    /// The batch is all or nothing: if any id is already taken, or appears
    /// twice in the batch, nothing is inserted.
    pub fn insert_many(&self, batch: impl IntoIterator<Item = Record>) -> Result<usize> {
        self.ensure_open()?;
        let mut staged: BTreeMap<RecordId, Rc<Record>> = BTreeMap::new();
        {
            let records = self.inner.records.borrow();
            for record in batch {
                let id = record.id();
                if records.contains_key(&id) || staged.contains_key(&id) {
                    return Err(Error::duplicate_record(self.name(), id));
                }
                staged.insert(id, Rc::new(record));
            }
        }
        if staged.is_empty() {
            return Ok(0);
        }

        let inserted = staged.len();
        self.inner.records.borrow_mut().append(&mut staged);
        self.changed();
        Ok(inserted)
    }

    /// Inserts a record, or replaces the record with the same id.
    ///
    /// A replaced record gets the next version of the one it replaces.
    pub fn upsert(&self, mut record: Record) -> Result<RecordId> {
        self.ensure_open()?;
        let id = record.id();
        {
            let mut records = self.inner.records.borrow_mut();
            if let Some(existing) = records.get(&id) {
                record.set_version(existing.version().wrapping_add(1));
            }
            records.insert(id, Rc::new(record));
        }
        self.changed();
        Ok(id)
    }

    /// Applies `f` to a copy of the record and stores it as a new version.
    pub fn update<F>(&self, id: RecordId, f: F) -> Result<Rc<Record>>
    where
        F: FnOnce(&mut Record),
    {
        self.ensure_open()?;
        let updated = {
            let mut records = self.inner.records.borrow_mut();
            let current = records
                .get(&id)
                .ok_or_else(|| Error::record_not_found(self.name(), id))?;
            let mut next = (**current).clone();
            f(&mut next);
            next.increment_version();
            let next = Rc::new(next);
            records.insert(id, next.clone());
            next
        };
        self.changed();
        Ok(updated)
    }

    /// Deletes a record, returning it.
    pub fn delete(&self, id: RecordId) -> Result<Rc<Record>> {
        self.ensure_open()?;
        let removed = self
            .inner
            .records
            .borrow_mut()
            .remove(&id)
            .ok_or_else(|| Error::record_not_found(self.name(), id))?;
        self.changed();
        Ok(removed)
    }

    /// Removes every record.
    pub fn clear(&self) -> Result<()> {
        self.ensure_open()?;
        self.inner.records.borrow_mut().clear();
        self.changed();
        Ok(())
    }

    /// Closes the collection.
    ///
    /// Every live query is dropped, queued notifications are discarded, and
    /// all queries become invalid.
    pub fn close(&self) {
        if !self.inner.open.replace(false) {
            return;
        }
        self.inner.registry.borrow_mut().clear();
        self.inner.pending.borrow_mut().clear();
        debug!(collection = %self.inner.name, "collection closed");
    }

    /// Delivers queued notifications. Returns the number delivered.
    pub fn flush(&self) -> usize {
        let pending = core::mem::take(&mut *self.inner.pending.borrow_mut());
        let mut delivered = 0;
        for p in pending {
            if p.deliver() {
                delivered += 1;
            }
        }
        trace!(collection = %self.inner.name, delivered, "flushed notifications");
        delivered
    }

    /// Returns the number of queued notifications.
    pub fn pending_count(&self) -> usize {
        self.inner.pending.borrow().len()
    }

    /// Returns the number of live queries.
    pub fn live_query_count(&self) -> usize {
        self.inner.registry.borrow().len()
    }

    /// Returns a live source over the records matching `selector`.
    pub fn find<F>(&self, selector: F) -> CollectionQuery
    where
        F: Fn(&Record) -> bool + 'static,
    {
        CollectionQuery::new(self.clone(), Some(Rc::new(selector)), false)
    }

    /// Returns a live source emitting only the first record matching `selector`.
    pub fn find_one<F>(&self, selector: F) -> CollectionQuery
    where
        F: Fn(&Record) -> bool + 'static,
    {
        CollectionQuery::new(self.clone(), Some(Rc::new(selector)), true)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(Error::collection_closed(self.name()))
        }
    }

    fn valid(&self, query: &QueryDescription) -> bool {
        self.is_open()
            && query
                .sort
                .as_ref()
                .map(|sort| !sort.field.is_empty())
                .unwrap_or(true)
    }

    /// Re-evaluates live queries after a mutation.
    fn changed(&self) {
        let records = self.records();
        let pending = self.inner.registry.borrow_mut().refresh(&records);
        if !pending.is_empty() {
            trace!(collection = %self.inner.name, queries = pending.len(), "live queries changed");
        }
        self.dispatch(pending);
    }

    fn dispatch(&self, pending: Vec<Pending>) {
        match self.inner.delivery {
            Delivery::Immediate => {
                for p in pending {
                    p.deliver();
                }
            }
            Delivery::Deferred => {
                let mut queue = self.inner.pending.borrow_mut();
                for p in pending {
                    let id = p.subscription.id();
                    match queue.iter_mut().find(|q| q.subscription.id() == id) {
                        Some(slot) => *slot = p,
                        None => queue.push(p),
                    }
                }
            }
        }
    }

    fn subscribe_with(
        &self,
        query: &QueryDescription,
        selector: Option<Selector>,
        single: bool,
        listener: Listener<Rc<Record>>,
    ) -> SubscriptionHandle {
        if !self.is_open() {
            debug!(collection = %self.inner.name, "subscribe on closed collection ignored");
            return SubscriptionHandle::detached(0);
        }

        let pending = {
            let records = self.inner.records.borrow();
            let mut registry = self.inner.registry.borrow_mut();
            let id = registry.allocate_id();
            registry.register(
                Subscription::new(id, listener),
                query.clone(),
                selector,
                single,
                records.values(),
            )
        };
        let id = pending.subscription.id();
        debug!(collection = %self.inner.name, subscription = id, ?query, "live query registered");

        let weak: Weak<Inner> = Rc::downgrade(&self.inner);
        let handle = SubscriptionHandle::new(id, move || {
            if let Some(inner) = weak.upgrade() {
                if inner.registry.borrow_mut().unregister(id) {
                    debug!(collection = %inner.name, subscription = id, "live query released");
                }
            }
        });

        self.dispatch(alloc::vec![pending]);
        handle
    }
}

impl LiveSource for Collection {
    type Item = Rc<Record>;

    fn source_id(&self) -> SourceId {
        self.inner.id
    }

    fn is_query_valid(&self, query: &QueryDescription) -> bool {
        self.valid(query)
    }

    fn subscribe(
        &self,
        query: &QueryDescription,
        listener: Listener<Rc<Record>>,
    ) -> SubscriptionHandle {
        self.subscribe_with(query, None, false, listener)
    }
}

/// A filtered view over a collection, usable as its own live source.
#[derive(Clone)]
pub struct CollectionQuery {
    collection: Collection,
    id: SourceId,
    selector: Option<Selector>,
    single: bool,
}

impl CollectionQuery {
    fn new(collection: Collection, selector: Option<Selector>, single: bool) -> Self {
        Self {
            collection,
            id: next_source_id(),
            selector,
            single,
        }
    }

    /// Returns the underlying collection.
    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    /// Returns true if this query emits a single record.
    pub fn is_single(&self) -> bool {
        self.single
    }
}

impl LiveSource for CollectionQuery {
    type Item = Rc<Record>;

    fn source_id(&self) -> SourceId {
        self.id
    }

    fn is_query_valid(&self, query: &QueryDescription) -> bool {
        self.collection.valid(query)
    }

    fn subscribe(
        &self,
        query: &QueryDescription,
        listener: Listener<Rc<Record>>,
    ) -> SubscriptionHandle {
        self.collection
            .subscribe_with(query, self.selector.clone(), self.single, listener)
    }
}
