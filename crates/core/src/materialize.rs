//! Output projection for result items.
//!
//! A pager can hand out either the items a source emitted (record handles) or
//! their plain-value projection. `Materialize` defines that projection and
//! `Materialized` carries whichever shape was requested.

use crate::record::Record;
use crate::value::Value;
use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::String;
use core::fmt;

/// Plain field values of a record, detached from its identity and version.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PlainRecord(BTreeMap<String, Value>);

impl PlainRecord {
    /// Creates an empty plain record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets a field value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Iterates over fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the plain record, returning the field map.
    pub fn into_inner(self) -> BTreeMap<String, Value> {
        self.0
    }
}

impl From<BTreeMap<String, Value>> for PlainRecord {
    fn from(fields: BTreeMap<String, Value>) -> Self {
        Self(fields)
    }
}

/// Projection of a result item into a plain value.
pub trait Materialize {
    /// The plain-value shape of the item.
    type Plain: Clone + PartialEq + fmt::Debug;

    /// Returns the plain-value projection of this item.
    fn to_plain(&self) -> Self::Plain;
}

impl Materialize for Record {
    type Plain = PlainRecord;

    fn to_plain(&self) -> PlainRecord {
        PlainRecord(self.fields().clone())
    }
}

impl<T: Materialize + ?Sized> Materialize for Rc<T> {
    type Plain = T::Plain;

    fn to_plain(&self) -> Self::Plain {
        (**self).to_plain()
    }
}

/// A result item in the shape the consumer asked for.
pub enum Materialized<T: Materialize> {
    /// The item as emitted by the source.
    Handle(T),
    /// The item's plain-value projection.
    Plain(T::Plain),
}

impl<T: Materialize> Materialized<T> {
    /// Projects `item` into the requested shape.
    pub fn project(item: T, plain: bool) -> Self {
        if plain {
            Materialized::Plain(item.to_plain())
        } else {
            Materialized::Handle(item)
        }
    }

    /// Returns the handle, if this is one.
    pub fn as_handle(&self) -> Option<&T> {
        match self {
            Materialized::Handle(item) => Some(item),
            Materialized::Plain(_) => None,
        }
    }

    /// Returns the plain value, if this is one.
    pub fn as_plain(&self) -> Option<&T::Plain> {
        match self {
            Materialized::Handle(_) => None,
            Materialized::Plain(plain) => Some(plain),
        }
    }

    /// Converts into the plain shape, projecting a handle if needed.
    pub fn into_plain(self) -> T::Plain {
        match self {
            Materialized::Handle(item) => item.to_plain(),
            Materialized::Plain(plain) => plain,
        }
    }
}

impl<T: Materialize + Clone> Clone for Materialized<T> {
    fn clone(&self) -> Self {
        match self {
            Materialized::Handle(item) => Materialized::Handle(item.clone()),
            Materialized::Plain(plain) => Materialized::Plain(plain.clone()),
        }
    }
}

impl<T: Materialize + fmt::Debug> fmt::Debug for Materialized<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Materialized::Handle(item) => f.debug_tuple("Handle").field(item).finish(),
            Materialized::Plain(plain) => f.debug_tuple("Plain").field(plain).finish(),
        }
    }
}

impl<T: Materialize + PartialEq> PartialEq for Materialized<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Materialized::Handle(a), Materialized::Handle(b)) => a == b,
            (Materialized::Plain(a), Materialized::Plain(b)) => a == b,
            _ => false,
        }
    }
}
