//! Record structure for livepage.
//!
//! A `Record` is the unit a live source stores and emits: a unique id, a
//! version that changes on every update, and a set of named fields.

use crate::value::Value;
use alloc::collections::BTreeMap;
use alloc::string::String;
use core::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a record.
pub type RecordId = u64;

/// Global record ID counter for generating unique record IDs.
static NEXT_RECORD_ID: AtomicU64 = AtomicU64::new(1);

/// Gets the next unique record ID.
pub fn next_record_id() -> RecordId {
    NEXT_RECORD_ID.fetch_add(1, Ordering::SeqCst)
}

/// Sets the next record ID.
pub fn set_next_record_id(id: RecordId) {
    NEXT_RECORD_ID.store(id, Ordering::SeqCst);
}

/// A record with named fields.
#[derive(Clone, Debug)]
pub struct Record {
    /// Unique identifier for this record.
    id: RecordId,
    /// Version number for change detection. Incremented on each update.
    version: u64,
    /// Field values keyed by field name.
    fields: BTreeMap<String, Value>,
}

impl Record {
    /// Creates an empty record with the given ID.
    /// Version defaults to 1 for new records.
    pub fn new(id: RecordId) -> Self {
        Self {
            id,
            version: 1,
            fields: BTreeMap::new(),
        }
    }

    /// Creates an empty record with an automatically assigned ID.
    pub fn create() -> Self {
        Self::new(next_record_id())
    }

    /// Adds a field, returning the record for chaining.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Returns the record ID.
    #[inline]
    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Returns the version number.
    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Sets the version number.
    #[inline]
    pub fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    /// Increments the version number and returns the new value.
    #[inline]
    pub fn increment_version(&mut self) -> u64 {
        self.version = self.version.wrapping_add(1);
        self.version
    }

    /// Gets the value of a field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Sets a field, returning the previous value if there was one.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    /// Removes a field, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    /// Returns the fields ordered by name.
    #[inline]
    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// Returns the number of fields.
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the record has no fields.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.fields == other.fields
    }
}
