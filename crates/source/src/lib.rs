//! Livepage Source - Live query sources for livepage.
//!
//! A live source evaluates a bounded, sorted query and pushes its result to a
//! listener: once on subscribe, and again whenever the underlying data changes
//! the result. This crate defines that capability surface and ships an
//! in-memory implementation.
//!
//! - `QueryDescription`: skip / limit / sort parameters of a query
//! - `Emission`: a pushed result, either a single item or a sequence
//! - `SubscriptionHandle`: disposable handle releasing a live subscription
//! - `LiveSource`: the trait a pager consumes
//! - `Collection`: in-memory record store with live queries
//!
//! # Example
//!
//! ```rust
//! use livepage_core::{Record, SortOrder};
//! use livepage_source::{Collection, LiveSource, QueryDescription};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let todos = Collection::new("todos");
//! todos.insert(Record::new(1).with_field("rank", 2i64)).unwrap();
//! todos.insert(Record::new(2).with_field("rank", 1i64)).unwrap();
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = seen.clone();
//! let query = QueryDescription::new()
//!     .with_sort("rank", SortOrder::Ascending)
//!     .with_limit(1);
//!
//! let handle = todos.subscribe(&query, Box::new(move |emission| {
//!     let ids: Vec<u64> = emission.into_items().iter().map(|r| r.id()).collect();
//!     sink.borrow_mut().push(ids);
//! }));
//!
//! todos.insert(Record::new(3).with_field("rank", 0i64)).unwrap();
//! assert_eq!(*seen.borrow(), vec![vec![2], vec![3]]);
//!
//! handle.dispose();
//! assert_eq!(todos.live_query_count(), 0);
//! ```
//!
//! The source-side listener record stays internal; consumers only ever hold
//! a `SubscriptionHandle`:
//!
//! ```compile_fail
//! use livepage_source::subscription::Subscription;
//! ```

#![no_std]

extern crate alloc;

pub mod collection;
pub mod emission;
pub mod query;
mod registry;
pub mod source;
pub mod subscription;

pub use collection::{Collection, CollectionQuery, Delivery, Selector};
pub use emission::Emission;
pub use query::{QueryDescription, SortSpec};
pub use source::{next_source_id, Listener, LiveSource, SourceId};
pub use subscription::{SubscriptionHandle, SubscriptionId};
