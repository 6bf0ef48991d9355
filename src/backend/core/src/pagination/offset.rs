//! Page/limit parameter handling and page metadata computation.

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════════
// Page Metadata
// ═══════════════════════════════════════════════════════════════════════════════

/// Metadata about a paginated result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    /// Current page number (1-indexed).
    pub page: u64,
    /// Number of items per page.
    pub per_page: u64,
    /// Total number of items across all pages.
    pub total_items: u64,
    /// Total number of pages.
    pub total_pages: u64,
    /// Whether there is a previous page.
    pub has_previous: bool,
    /// Whether there is a next page.
    pub has_next: bool,
}

impl PageMetadata {
    /// Create page metadata from pagination parameters and total count.
    pub fn new(page: u64, per_page: u64, total_items: u64) -> Self {
        let total_pages = if total_items == 0 {
            0
        } else {
            total_items.div_ceil(per_page)
        };

        let has_previous = page > 1;
        let has_next = page < total_pages;

        Self {
            page,
            per_page,
            total_items,
            total_pages,
            has_previous,
            has_next,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Offset Pagination
// ═══════════════════════════════════════════════════════════════════════════════

/// Offset-based pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetPagination {
    /// Current page number (1-indexed).
    pub page: u64,
    /// Number of items per page.
    pub per_page: u64,
}

impl OffsetPagination {
    /// Create pagination with the given page and page size, clamped to
    /// sane bounds.
    pub fn new(page: u64, per_page: u64) -> Self {
        Self {
            page: page.max(super::MIN_PAGE_NUMBER),
            per_page: per_page.clamp(1, super::MAX_PAGE_SIZE),
        }
    }

    /// Get the SQL OFFSET value.
    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.per_page
    }

    /// Get the SQL LIMIT value.
    pub fn limit(&self) -> u64 {
        self.per_page
    }

    /// Create page metadata from a total count.
    pub fn metadata(&self, total_items: u64) -> PageMetadata {
        PageMetadata::new(self.page, self.per_page, total_items)
    }

    /// Apply pagination to an already-filtered slice.
    pub fn paginate_slice<T: Clone>(&self, items: &[T]) -> Vec<T> {
        let start = self.offset() as usize;
        let end = (start + self.per_page as usize).min(items.len());

        if start >= items.len() {
            Vec::new()
        } else {
            items[start..end].to_vec()
        }
    }
}

impl Default for OffsetPagination {
    fn default() -> Self {
        Self::new(super::MIN_PAGE_NUMBER, super::DEFAULT_PAGE_SIZE)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
