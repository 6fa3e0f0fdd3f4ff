//! Subscriptions to live queries.
//!
//! A `Subscription` is the source-side record of a listener; a
//! `SubscriptionHandle` is the consumer-side token that releases it.

use crate::emission::Emission;
use crate::source::Listener;
use alloc::boxed::Box;
use core::cell::Cell;
use core::fmt;

/// Unique identifier for a subscription.
pub type SubscriptionId = u64;

/// A listener registered with a live source.
pub(crate) struct Subscription<T> {
    /// Unique identifier
    id: SubscriptionId,
    /// Listener to invoke on emissions
    listener: Listener<T>,
    /// Whether this subscription is still live
    active: Cell<bool>,
}

impl<T> Subscription<T> {
    /// Creates a new, active subscription.
    pub(crate) fn new(id: SubscriptionId, listener: Listener<T>) -> Self {
        Self {
            id,
            listener,
            active: Cell::new(true),
        }
    }

    /// Returns the subscription ID.
    #[inline]
    pub(crate) fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Returns whether this subscription is active.
    #[inline]
    pub(crate) fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Deactivates this subscription. Later emissions are dropped.
    #[inline]
    pub(crate) fn deactivate(&self) {
        self.active.set(false);
    }

    /// Delivers an emission if the subscription is still active.
    ///
    /// Returns true if the listener was invoked.
    pub(crate) fn notify(&self, emission: Emission<T>) -> bool {
        if self.is_active() {
            (self.listener)(emission);
            true
        } else {
            false
        }
    }
}

/// Disposable handle to a live subscription.
///
/// Releasing is idempotent and also happens on drop, so a handle can never
/// leak its subscription.
pub struct SubscriptionHandle {
    id: SubscriptionId,
    release: Option<Box<dyn FnOnce()>>,
}

impl SubscriptionHandle {
    /// Creates a handle that runs `release` when disposed.
    pub fn new<F>(id: SubscriptionId, release: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        Self {
            id,
            release: Some(Box::new(release)),
        }
    }

    /// Creates a handle with nothing to release.
    pub fn detached(id: SubscriptionId) -> Self {
        Self { id, release: None }
    }

    /// Returns the subscription ID.
    #[inline]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Returns true once the subscription has been released.
    #[inline]
    pub fn is_released(&self) -> bool {
        self.release.is_none()
    }

    /// Releases the subscription.
    pub fn dispose(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("id", &self.id)
            .field("released", &self.is_released())
            .finish()
    }
}
