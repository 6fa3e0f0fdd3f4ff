//! Livepage Core - Core types shared by the livepage crates.
//!
//! This crate provides the foundational types used by live sources and the
//! reactive pager:
//!
//! - `Value`: Field values stored in a record
//! - `Record`: A keyed, versioned set of named fields
//! - `PlainRecord`: The plain-value projection of a record
//! - `Materialize`: Projection of a result item into its plain form
//! - `SortOrder`: Ascending / descending ordering
//! - `Error`: Error types for fallible collaborator operations
//!
//! # Example
//!
//! ```rust
//! use livepage_core::{Materialize, Record, Value};
//!
//! let record = Record::new(1)
//!     .with_field("title", "Alpha")
//!     .with_field("score", 10i64);
//!
//! assert_eq!(record.id(), 1);
//! assert_eq!(record.get("title"), Some(&Value::String("Alpha".into())));
//!
//! let plain = record.to_plain();
//! assert_eq!(plain.get("score"), Some(&Value::Int64(10)));
//! ```

#![no_std]

extern crate alloc;

mod error;
mod materialize;
mod record;
mod sort;
mod value;

pub use error::{Error, Result};
pub use materialize::{Materialize, Materialized, PlainRecord};
pub use record::{next_record_id, set_next_record_id, Record, RecordId};
pub use sort::SortOrder;
pub use value::Value;
