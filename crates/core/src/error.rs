//! Error types for livepage.
//!
//! The pagination state machine itself never fails: invalid consumer calls are
//! ignored and invalid queries are simply not subscribed. These errors cover the
//! fallible edges around it (configuration building and source mutations).

use crate::record::RecordId;
use alloc::string::String;
use core::fmt;

/// Result type alias for livepage operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types for livepage operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// A pagination configuration was rejected.
    InvalidConfig {
        message: String,
    },
    /// Record not found in a collection.
    RecordNotFound {
        collection: String,
        id: RecordId,
    },
    /// A record with the same id already exists.
    DuplicateRecord {
        collection: String,
        id: RecordId,
    },
    /// The collection was closed and no longer accepts operations.
    CollectionClosed {
        name: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidConfig { message } => {
                write!(f, "Invalid pagination config: {}", message)
            }
            Error::RecordNotFound { collection, id } => {
                write!(f, "Record {} not found in collection {}", id, collection)
            }
            Error::DuplicateRecord { collection, id } => {
                write!(f, "Record {} already exists in collection {}", id, collection)
            }
            Error::CollectionClosed { name } => {
                write!(f, "Collection is closed: {}", name)
            }
        }
    }
}

impl Error {
    /// Creates an invalid config error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfig {
            message: message.into(),
        }
    }

    /// Creates a record not found error.
    pub fn record_not_found(collection: impl Into<String>, id: RecordId) -> Self {
        Error::RecordNotFound {
            collection: collection.into(),
            id,
        }
    }

    /// Creates a duplicate record error.
    pub fn duplicate_record(collection: impl Into<String>, id: RecordId) -> Self {
        Error::DuplicateRecord {
            collection: collection.into(),
            id,
        }
    }

    /// Creates a collection closed error.
    pub fn collection_closed(name: impl Into<String>) -> Self {
        Error::CollectionClosed { name: name.into() }
    }
}
