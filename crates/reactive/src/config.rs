//! Pagination configuration.
//!
//! A `PaginationConfig` is fixed for the lifetime of a pager. It is built and
//! validated with `PaginationConfigBuilder`:
//!
//! ```rust
//! use livepage_core::SortOrder;
//! use livepage_reactive::{PaginationConfig, PaginationMode};
//!
//! let config = PaginationConfig::builder()
//!     .page_size(20)
//!     .starting_page(1)
//!     .sort_by("created_at")
//!     .sort_order(SortOrder::Ascending)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.mode(), PaginationMode::Traditional);
//! ```

use crate::mode::{select_mode, PaginationMode};
use alloc::string::String;
use livepage_core::{Error, Result, SortOrder};

/// Configuration of a paginated live view.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct PaginationConfig {
    /// Items per batch or page; 0 disables pagination.
    page_size: usize,
    /// First page to show; its presence selects page-based pagination.
    starting_page: Option<usize>,
    /// Field to sort results by.
    sort_by: Option<String>,
    /// Direction of the sort.
    sort_order: SortOrder,
    /// Hand out plain values instead of item handles.
    #[cfg_attr(feature = "serde", serde(rename = "materializeAsPlainValues", alias = "json"))]
    materialize_plain: bool,
}

impl PaginationConfig {
    /// Returns a builder with default settings (no pagination, descending).
    pub fn builder() -> PaginationConfigBuilder {
        PaginationConfigBuilder::default()
    }

    /// Returns the page size.
    #[inline]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Returns the starting page, if page-based pagination was requested.
    #[inline]
    pub fn starting_page(&self) -> Option<usize> {
        self.starting_page
    }

    /// Returns the sort field.
    #[inline]
    pub fn sort_by(&self) -> Option<&str> {
        self.sort_by.as_deref()
    }

    /// Returns the sort direction.
    #[inline]
    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// Returns true if results are projected to plain values.
    #[inline]
    pub fn materialize_plain(&self) -> bool {
        self.materialize_plain
    }

    /// Returns the pagination mode this configuration selects.
    #[inline]
    pub fn mode(&self) -> PaginationMode {
        select_mode(self.page_size, self.starting_page)
    }

    /// Checks the configuration.
    ///
    /// Configurations from the builder are always valid; this is for
    /// configurations obtained some other way (e.g. deserialized).
    pub fn validate(&self) -> Result<()> {
        if self.starting_page == Some(0) {
            return Err(Error::invalid_config("starting page must be at least 1"));
        }
        if matches!(self.sort_by.as_deref(), Some("")) {
            return Err(Error::invalid_config("sort field must not be empty"));
        }
        Ok(())
    }
}

/// Builder for `PaginationConfig`.
#[derive(Clone, Debug, Default)]
pub struct PaginationConfigBuilder {
    config: PaginationConfig,
}

impl PaginationConfigBuilder {
    /// Sets the page size.
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.config.page_size = page_size;
        self
    }

    /// Sets the starting page, selecting page-based pagination.
    pub fn starting_page(mut self, page: usize) -> Self {
        self.config.starting_page = Some(page);
        self
    }

    /// Sets the sort field.
    pub fn sort_by(mut self, field: impl Into<String>) -> Self {
        self.config.sort_by = Some(field.into());
        self
    }

    /// Sets the sort direction.
    pub fn sort_order(mut self, order: SortOrder) -> Self {
        self.config.sort_order = order;
        self
    }

    /// Requests plain-value results.
    pub fn materialize_plain(mut self, plain: bool) -> Self {
        self.config.materialize_plain = plain;
        self
    }

    /// Validates and returns the configuration.
    pub fn build(self) -> Result<PaginationConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
