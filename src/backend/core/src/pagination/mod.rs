//! Offset pagination for list endpoints.
//!
//! Every list route takes `page` and `limit` query parameters and answers
//! with `page`, `limit`, a total count, and `totalPages` in the envelope.

mod offset;

pub use offset::{OffsetPagination, PageMetadata};

/// Default page size if not specified.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Maximum allowed page size.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Minimum page number (1-indexed).
pub const MIN_PAGE_NUMBER: u64 = 1;
