//! Pagination envelopes for list screens

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::impl_enum_str_conversions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl_enum_str_conversions!(SortOrder {
    Asc => "asc",
    Desc => "desc",
});

/// List query sent as URL parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page index
    pub page: u32,
    pub page_size: u32,
    pub search: Option<String>,
    pub sort: Option<(String, SortOrder)>,
    /// Extra equality filters (e.g. `status=active`)
    pub filters: Vec<(String, String)>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, page_size: DEFAULT_PAGE_SIZE, search: None, sort: None, filters: Vec::new() }
    }
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size, ..Self::default() }
    }

    #[must_use]
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    #[must_use]
    pub fn sort_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some((field.into(), order));
        self
    }

    #[must_use]
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((key.into(), value.into()));
        self
    }

    /// Render as query parameters. Page is clamped to >= 1 and page size to
    /// `1..=MAX_PAGE_SIZE`; blank search terms are dropped.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = vec![
            ("page".to_string(), self.page.max(1).to_string()),
            ("pageSize".to_string(), self.page_size.clamp(1, MAX_PAGE_SIZE).to_string()),
        ];

        if let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            query.push(("search".to_string(), term.to_string()));
        }

        if let Some((field, order)) = &self.sort {
            query.push(("sortBy".to_string(), field.clone()));
            query.push(("sortOrder".to_string(), order.to_string()));
        }

        query.extend(self.filters.iter().cloned());
        query
    }
}

/// Paginated list response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.page_size))
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.total_pages()
    }
}
