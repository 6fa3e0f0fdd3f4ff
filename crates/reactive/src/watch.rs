//! Consumer change notification.
//!
//! Watchers observe a pager's state after every transition. The registry
//! hands out cloned callbacks so the pager can invoke them without holding a
//! borrow, which lets a watcher call back into the pager.

use crate::state::PaginationState;
use alloc::rc::Rc;
use alloc::vec::Vec;
use hashbrown::HashMap;

/// Identifier returned by `watch`, used to unwatch.
pub type WatchId = u64;

/// Callback receiving the state after a transition.
pub type WatchCallback<T> = Rc<dyn Fn(&PaginationState<T>)>;

/// Registry of state watchers.
pub struct StateWatchers<T> {
    watchers: HashMap<WatchId, WatchCallback<T>>,
    next_id: WatchId,
}

impl<T> Default for StateWatchers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> StateWatchers<T> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            watchers: HashMap::new(),
            next_id: 1,
        }
    }

    /// Registers a watcher.
    pub fn watch<F>(&mut self, callback: F) -> WatchId
    where
        F: Fn(&PaginationState<T>) + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;
        self.watchers.insert(id, Rc::new(callback));
        id
    }

    /// Removes a watcher. Returns true if it was registered.
    pub fn unwatch(&mut self, id: WatchId) -> bool {
        self.watchers.remove(&id).is_some()
    }

    /// Returns the registered callbacks in registration order.
    pub fn callbacks(&self) -> Vec<WatchCallback<T>> {
        let mut entries: Vec<_> = self.watchers.iter().collect();
        entries.sort_unstable_by_key(|(id, _)| **id);
        entries.into_iter().map(|(_, cb)| cb.clone()).collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.watchers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.watchers.is_empty()
    }

    /// Removes every watcher.
    pub fn clear(&mut self) {
        self.watchers.clear();
    }
}
