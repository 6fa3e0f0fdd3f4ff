//! The live source capability surface.

use crate::emission::Emission;
use crate::query::QueryDescription;
use crate::subscription::SubscriptionHandle;
use alloc::boxed::Box;
use alloc::rc::Rc;
use core::sync::atomic::{AtomicU64, Ordering};

/// Identity of a live source. Two sources with the same id evaluate the same
/// base query.
pub type SourceId = u64;

static NEXT_SOURCE_ID: AtomicU64 = AtomicU64::new(1);

/// Allocates a fresh source identity.
pub fn next_source_id() -> SourceId {
    NEXT_SOURCE_ID.fetch_add(1, Ordering::SeqCst)
}

/// Listener invoked with every emission of a subscription.
pub type Listener<T> = Box<dyn Fn(Emission<T>)>;

/// A base query that can be bounded, sorted and observed.
///
/// `subscribe` must push the current result to the listener (synchronously or
/// later) and push again whenever the result changes. Disposing the returned
/// handle stops further emissions.
pub trait LiveSource {
    /// Item type produced by the query.
    type Item: Clone + 'static;

    /// Returns the identity of the base query.
    fn source_id(&self) -> SourceId;

    /// Returns false if `query` cannot currently be subscribed to.
    fn is_query_valid(&self, query: &QueryDescription) -> bool;

    /// Opens a live subscription for `query`.
    fn subscribe(&self, query: &QueryDescription, listener: Listener<Self::Item>)
        -> SubscriptionHandle;
}

impl<S: LiveSource + ?Sized> LiveSource for Rc<S> {
    type Item = S::Item;

    fn source_id(&self) -> SourceId {
        (**self).source_id()
    }

    fn is_query_valid(&self, query: &QueryDescription) -> bool {
        (**self).is_query_valid(query)
    }

    fn subscribe(
        &self,
        query: &QueryDescription,
        listener: Listener<Self::Item>,
    ) -> SubscriptionHandle {
        (**self).subscribe(query, listener)
    }
}
