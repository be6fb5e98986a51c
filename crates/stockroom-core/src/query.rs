//! # Tax List Query
//!
//! Filter, sort and pagination parameters for the tax list, plus the page
//! type the store returns. The store turns a [`TaxQuery`] into SQL; keeping
//! the parameters here lets the clamping rules be tested without a database.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::{TaxStatus, TaxType};

/// Default number of taxes per page.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest page a caller may ask for.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Column the tax list is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum TaxSortField {
    Name,
    Rate,
    Type,
    Status,
    #[default]
    UpdatedAt,
}

impl FromStr for TaxSortField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "name" => Ok(TaxSortField::Name),
            "rate" => Ok(TaxSortField::Rate),
            "type" => Ok(TaxSortField::Type),
            "status" => Ok(TaxSortField::Status),
            "updatedAt" | "updated_at" => Ok(TaxSortField::UpdatedAt),
            _ => Err(ValidationError::not_allowed(
                "sort",
                &["name", "rate", "type", "status", "updatedAt"],
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Parameters for listing taxes.
///
/// ## Example
/// ```rust
/// use stockroom_core::{TaxQuery, TaxSortField, SortDirection, TaxStatus};
///
/// let query = TaxQuery {
///     search: Some("sales".into()),
///     status: Some(TaxStatus::Active),
///     sort_by: TaxSortField::Name,
///     sort_direction: SortDirection::Asc,
///     ..Default::default()
/// };
/// assert_eq!(query.normalized().offset(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct TaxQuery {
    /// Case-insensitive substring of the tax name.
    pub search: Option<String>,
    pub tax_type: Option<TaxType>,
    pub status: Option<TaxStatus>,
    pub sort_by: TaxSortField,
    pub sort_direction: SortDirection,
    /// 1-based page number.
    pub page: u32,
    pub page_size: u32,
}

impl Default for TaxQuery {
    fn default() -> Self {
        TaxQuery {
            search: None,
            tax_type: None,
            status: None,
            sort_by: TaxSortField::default(),
            sort_direction: SortDirection::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl TaxQuery {
    /// Clamps paging into range and drops a blank search term.
    pub fn normalized(mut self) -> Self {
        self.page = self.page.max(1);
        self.page_size = match self.page_size {
            0 => DEFAULT_PAGE_SIZE,
            n => n.min(MAX_PAGE_SIZE),
        };
        self.search = self
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self
    }

    /// Rows to skip for the requested page.
    pub fn offset(&self) -> u32 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Matching rows across all pages.
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, query: &TaxQuery) -> Self {
        let page_size = query.page_size.max(1);
        let total_pages = total.div_ceil(page_size as u64) as u32;

        Page {
            items,
            total,
            page: query.page,
            page_size,
            total_pages,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
