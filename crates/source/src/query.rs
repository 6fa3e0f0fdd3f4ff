//! Query descriptions.
//!
//! A `QueryDescription` is the bounded, sorted shape of a query handed to a
//! live source. Absent fields mean "unconstrained". Sources evaluate it in a
//! fixed order: sort, then skip, then limit.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;
use livepage_core::{Record, SortOrder};

/// Sort by a single field.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SortSpec {
    /// Field to compare.
    pub field: String,
    /// Direction.
    pub order: SortOrder,
}

impl SortSpec {
    /// Creates a sort on `field`.
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }

    /// Compares two records by the sort field.
    ///
    /// A record missing the field compares as smaller than one that has it.
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let cmp = match (a.get(&self.field), b.get(&self.field)) {
            (Some(av), Some(bv)) => av.cmp(bv),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        self.order.apply(cmp)
    }
}

/// Skip / limit / sort parameters of a live query.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct QueryDescription {
    /// Number of leading results to drop.
    pub skip: Option<usize>,
    /// Maximum number of results.
    pub limit: Option<usize>,
    /// Result ordering.
    pub sort: Option<SortSpec>,
}

impl QueryDescription {
    /// Creates an unconstrained query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the skip.
    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Sets the limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the sort.
    pub fn with_sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some(SortSpec::new(field, order));
        self
    }

    /// Returns true if neither skip nor limit is set.
    pub fn is_unbounded(&self) -> bool {
        self.skip.is_none() && self.limit.is_none()
    }

    /// Applies sort, skip and limit to `rows`.
    pub fn apply(&self, mut rows: Vec<Rc<Record>>) -> Vec<Rc<Record>> {
        if let Some(sort) = &self.sort {
            // stable: ties keep source order
            rows.sort_by(|a, b| sort.compare(a, b));
        }

        let len = rows.len();
        let start = self.skip.unwrap_or(0).min(len);
        let end = match self.limit {
            Some(limit) => start.saturating_add(limit).min(len),
            None => len,
        };

        rows.truncate(end);
        if start > 0 {
            rows.drain(..start);
        }
        rows
    }
}
