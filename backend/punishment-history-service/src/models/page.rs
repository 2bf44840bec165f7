//! Offset pagination request and result

use crate::error::{HistoryError, Result};
use serde::Serialize;

/// Validated 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    pub fn new(page: u32, per_page: u32) -> Result<Self> {
        if page < 1 {
            return Err(HistoryError::InvalidInput("page must be >= 1".to_string()));
        }
        if per_page < 1 {
            return Err(HistoryError::InvalidInput(
                "per_page must be >= 1".to_string(),
            ));
        }
        Ok(Self { page, per_page })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }
}

pub fn total_pages(total_count: i64, per_page: u32) -> i64 {
    if total_count <= 0 {
        return 0;
    }
    let per_page = i64::from(per_page.max(1));
    (total_count + per_page - 1) / per_page
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub total_count: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: i64,
    pub has_prev: bool,
    pub has_next: bool,
}

impl<T> PageResult<T> {
    pub fn new(items: Vec<T>, total_count: i64, request: PageRequest) -> Self {
        debug_assert!(items.len() <= request.per_page() as usize);

        let total_pages = total_pages(total_count, request.per_page());
        let page = request.page();

        Self {
            items,
            total_count,
            page,
            page_size: request.per_page(),
            total_pages,
            has_prev: page > 1,
            has_next: i64::from(page) < total_pages,
        }
    }

    /// Convert the items, keeping the page metadata
    pub fn map<U, F>(self, f: F) -> PageResult<U>
    where
        F: FnMut(T) -> U,
    {
        PageResult {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
            has_prev: self.has_prev,
            has_next: self.has_next,
        }
    }
}
