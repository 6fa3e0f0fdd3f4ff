//! Livepage Reactive - Paginated live views for livepage.
//!
//! This crate turns a live source into a paginated view that stays current as
//! the underlying data changes. A view is configured once and then driven by
//! three consumer operations: load more, jump to page, and reset.
//!
//! # Core Concepts
//!
//! - `PaginationMode`: None, infinite scroll, or discrete pages, derived from
//!   the configuration
//! - `PaginationState` / `reduce`: the view's state and its pure transition
//!   function
//! - `materialize_query`: the concrete skip / limit / sort query for a state
//! - `SubscriptionManager`: keeps at most one result and one count
//!   subscription live, resubscribing whenever the query changes
//! - `LivePager`: the facade owning all of the above
//!
//! # Example
//!
//! ```rust
//! use livepage_core::{Record, SortOrder};
//! use livepage_reactive::{LivePager, PaginationConfig, PaginationMode};
//! use livepage_source::Collection;
//!
//! let posts = Collection::new("posts");
//! for i in 1..=12 {
//!     posts.insert(Record::new(i).with_field("published", i as i64)).unwrap();
//! }
//!
//! let config = PaginationConfig::builder()
//!     .page_size(5)
//!     .starting_page(1)
//!     .sort_by("published")
//!     .sort_order(SortOrder::Ascending)
//!     .build()
//!     .unwrap();
//!
//! let pager = LivePager::new(posts.clone(), config).unwrap();
//! assert_eq!(pager.mode(), PaginationMode::Traditional);
//! assert_eq!(pager.page_count(), 3);
//!
//! assert!(pager.fetch_page(3));
//! let ids: Vec<u64> = pager.items().iter().map(|r| r.id()).collect();
//! assert_eq!(ids, vec![11, 12]);
//!
//! // The view follows the data.
//! posts.insert(Record::new(13).with_field("published", 13i64)).unwrap();
//! assert_eq!(pager.items().len(), 3);
//!
//! drop(pager);
//! assert_eq!(posts.live_query_count(), 0);
//! ```

#![no_std]

extern crate alloc;

pub mod config;
pub mod manager;
pub mod materialize;
pub mod mode;
pub mod pager;
pub mod state;
pub mod watch;

pub use config::{PaginationConfig, PaginationConfigBuilder};
pub use manager::{PaginationDriver, SubscriptionManager};
pub use materialize::{count_query, materialize_query, page_count, query_for_cursor};
pub use mode::{select_mode, PaginationMode};
pub use pager::LivePager;
pub use state::{reduce, PageCursor, PaginationEvent, PaginationState};
pub use watch::{StateWatchers, WatchCallback, WatchId};

// Re-export commonly used types from dependencies
pub use livepage_core::{Materialized, SortOrder};
pub use livepage_source::{LiveSource, QueryDescription};
