//! Live query registry for a collection.
//!
//! Each registered query keeps its last result. When the collection changes,
//! every query is re-evaluated and only queries whose result actually changed
//! are scheduled for delivery.

use crate::emission::Emission;
use crate::query::QueryDescription;
use crate::subscription::{Subscription, SubscriptionId};
use alloc::rc::Rc;
use alloc::vec::Vec;
use hashbrown::HashMap;
use livepage_core::Record;

/// Predicate selecting the records a query ranges over.
pub type Selector = Rc<dyn Fn(&Record) -> bool>;

/// Rows shared between the registry and listeners.
pub(crate) type Rows = Vec<Rc<Record>>;

/// A registered live query.
pub(crate) struct LiveQuery {
    query: QueryDescription,
    selector: Option<Selector>,
    single: bool,
    result: Rows,
    subscription: Rc<Subscription<Rc<Record>>>,
}

impl LiveQuery {
    /// Evaluates the query over `records` (in collection order).
    fn evaluate<'a>(
        query: &QueryDescription,
        selector: Option<&Selector>,
        records: impl Iterator<Item = &'a Rc<Record>>,
    ) -> Rows {
        let rows: Rows = match selector {
            Some(selector) => records.filter(|r| selector(r)).cloned().collect(),
            None => records.cloned().collect(),
        };
        query.apply(rows)
    }

    fn emission(&self) -> Emission<Rc<Record>> {
        to_emission(self.single, self.result.clone())
    }
}

/// Builds the emission for a result. Single-item queries emit `One` when they
/// matched something.
pub(crate) fn to_emission(single: bool, mut rows: Rows) -> Emission<Rc<Record>> {
    if single && !rows.is_empty() {
        rows.truncate(1);
        match rows.pop() {
            Some(row) => Emission::One(row),
            None => Emission::Many(rows),
        }
    } else {
        Emission::Many(rows)
    }
}

/// A delivery waiting to be made.
pub(crate) struct Pending {
    pub(crate) subscription: Rc<Subscription<Rc<Record>>>,
    pub(crate) emission: Emission<Rc<Record>>,
}

impl Pending {
    /// Delivers the emission. Returns true if the listener ran.
    pub(crate) fn deliver(self) -> bool {
        self.subscription.notify(self.emission)
    }
}

/// Registry of live queries keyed by subscription id.
#[derive(Default)]
pub(crate) struct Registry {
    queries: HashMap<SubscriptionId, LiveQuery>,
    next_id: SubscriptionId,
}

impl Registry {
    /// Allocates a subscription id.
    pub(crate) fn allocate_id(&mut self) -> SubscriptionId {
        self.next_id += 1;
        self.next_id
    }

    /// Registers a query, evaluating it against `records`.
    ///
    /// Returns the initial delivery.
    pub(crate) fn register<'a>(
        &mut self,
        subscription: Subscription<Rc<Record>>,
        query: QueryDescription,
        selector: Option<Selector>,
        single: bool,
        records: impl Iterator<Item = &'a Rc<Record>>,
    ) -> Pending {
        let result = LiveQuery::evaluate(&query, selector.as_ref(), records);
        let subscription = Rc::new(subscription);
        let live = LiveQuery {
            query,
            selector,
            single,
            result,
            subscription: subscription.clone(),
        };
        let emission = live.emission();
        self.queries.insert(subscription.id(), live);
        Pending {
            subscription,
            emission,
        }
    }

    /// Unregisters a query. Its subscription is deactivated so queued
    /// deliveries are dropped.
    pub(crate) fn unregister(&mut self, id: SubscriptionId) -> bool {
        match self.queries.remove(&id) {
            Some(live) => {
                live.subscription.deactivate();
                true
            }
            None => false,
        }
    }

    /// Re-evaluates every query against `records`, returning deliveries for
    /// the queries whose result changed.
    pub(crate) fn refresh(&mut self, records: &[Rc<Record>]) -> Vec<Pending> {
        let mut pending = Vec::new();
        for live in self.queries.values_mut() {
            let new_result =
                LiveQuery::evaluate(&live.query, live.selector.as_ref(), records.iter());
            if !results_equal(&live.result, &new_result) {
                live.result = new_result;
                pending.push(Pending {
                    subscription: live.subscription.clone(),
                    emission: live.emission(),
                });
            }
        }
        pending
    }

    /// Returns the number of registered queries.
    pub(crate) fn len(&self) -> usize {
        self.queries.len()
    }

    /// Unregisters every query.
    pub(crate) fn clear(&mut self) {
        for live in self.queries.values() {
            live.subscription.deactivate();
        }
        self.queries.clear();
    }
}

/// Compares two results by record id and version.
fn results_equal(old: &[Rc<Record>], new: &[Rc<Record>]) -> bool {
    old.len() == new.len()
        && old
            .iter()
            .zip(new.iter())
            .all(|(a, b)| a.id() == b.id() && a.version() == b.version())
}
