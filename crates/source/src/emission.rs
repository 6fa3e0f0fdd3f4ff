//! Pushed query results.

use alloc::vec;
use alloc::vec::Vec;

/// A result pushed by a live source.
///
/// Sources that resolve a query to a single item emit `One`; everything else
/// emits `Many`. Consumers that only care about sequences use `into_items`.
#[derive(Clone, Debug, PartialEq)]
pub enum Emission<T> {
    /// A single item.
    One(T),
    /// An ordered sequence of items.
    Many(Vec<T>),
}

impl<T> Emission<T> {
    /// Normalizes the emission into a sequence.
    ///
    /// A single item becomes a one-element sequence.
    pub fn into_items(self) -> Vec<T> {
        match self {
            Emission::One(item) => vec![item],
            Emission::Many(items) => items,
        }
    }

    /// Returns the number of items carried.
    pub fn len(&self) -> usize {
        match self {
            Emission::One(_) => 1,
            Emission::Many(items) => items.len(),
        }
    }

    /// Returns true if no items are carried.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_normalizes_to_single_element() {
        let emission = Emission::One(7);
        assert_eq!(emission.len(), 1);
        assert_eq!(emission.into_items(), vec![7]);
    }

    #[test]
    fn test_many_keeps_order() {
        let emission = Emission::Many(vec![3, 1, 2]);
        assert_eq!(emission.len(), 3);
        assert_eq!(emission.into_items(), vec![3, 1, 2]);
    }

    #[test]
    fn test_empty_many() {
        let emission: Emission<u8> = Emission::Many(Vec::new());
        assert!(emission.is_empty());
        assert!(emission.into_items().is_empty());
    }
}
